use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::toaster::ToasterOptions;

const APP_DIR: &str = "toastline";
const TOASTER_CONFIG_FILE: &str = "toaster.json";

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing HOME environment variable")]
    MissingHomeDirectory,
    #[error("failed to read toaster config: {path}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse toaster config: {path}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Toaster options from `toaster.json`, or defaults when the file is missing
/// or unusable.
pub fn load_toaster_options() -> ToasterOptions {
    let (xdg_config_home, home) = config_env_dirs();
    load_toaster_options_with(xdg_config_home.as_deref(), home.as_deref())
}

fn load_toaster_options_with(xdg_config_home: Option<&Path>, home: Option<&Path>) -> ToasterOptions {
    match read_toaster_options_with(xdg_config_home, home) {
        Ok(Some(options)) => options,
        Ok(None) => ToasterOptions::default(),
        Err(err) => {
            tracing::warn!(%err, "using default toaster options");
            ToasterOptions::default()
        }
    }
}

/// Reads `toaster.json`; `Ok(None)` when the file does not exist.
pub fn read_toaster_options_with(
    xdg_config_home: Option<&Path>,
    home: Option<&Path>,
) -> ConfigResult<Option<ToasterOptions>> {
    let path = app_config_path(APP_DIR, TOASTER_CONFIG_FILE, xdg_config_home, home)?;
    if !path.exists() {
        tracing::debug!(?path, "no toaster config file");
        return Ok(None);
    }
    let contents = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
        path: path.clone(),
        source,
    })?;
    let options = serde_json::from_str(&contents)
        .map_err(|source| ConfigError::Parse { path, source })?;
    Ok(Some(options))
}

pub(crate) fn config_env_dirs() -> (Option<PathBuf>, Option<PathBuf>) {
    (
        std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from),
        std::env::var_os("HOME").map(PathBuf::from),
    )
}

pub(crate) fn app_config_path(
    app_dir: &str,
    file_name: &str,
    xdg_config_home: Option<&Path>,
    home: Option<&Path>,
) -> ConfigResult<PathBuf> {
    let mut path = config_root(xdg_config_home, home)?;
    path.push(app_dir);
    path.push(file_name);
    Ok(path)
}

fn config_root(xdg_config_home: Option<&Path>, home: Option<&Path>) -> ConfigResult<PathBuf> {
    if let Some(xdg) = xdg_config_home.filter(|path| !path.as_os_str().is_empty()) {
        return Ok(xdg.to_path_buf());
    }

    let home = home.ok_or(ConfigError::MissingHomeDirectory)?;
    Ok(home.join(".config"))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::theme::ThemeMode;

    fn fixture_root() -> PathBuf {
        let mut path = std::env::temp_dir();
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::SystemTime::UNIX_EPOCH)
            .map_or(0, |d| d.as_nanos());
        let pid = std::process::id();
        path.push(format!("toastline-config-{pid}-{nanos}"));
        path
    }

    fn with_temp_root<F: FnOnce(&Path)>(f: F) {
        let root = fixture_root();
        fs::create_dir_all(&root).unwrap();
        f(&root);
        let _ = fs::remove_dir_all(&root);
    }

    fn write_config(root: &Path, contents: &str) {
        let path = app_config_path(APP_DIR, TOASTER_CONFIG_FILE, Some(root), None).unwrap();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn app_config_path_prefers_xdg_config_home() {
        let path = app_config_path(
            "toastline",
            "toaster.json",
            Some(Path::new("/tmp/config-root")),
            Some(Path::new("/tmp/home")),
        )
        .expect("path should resolve");

        assert_eq!(
            path,
            PathBuf::from("/tmp/config-root/toastline/toaster.json")
        );
    }

    #[test]
    fn app_config_path_falls_back_to_home_dot_config() {
        let path = app_config_path(
            "toastline",
            "toaster.json",
            Some(Path::new("")),
            Some(Path::new("/tmp/home")),
        )
        .expect("path should resolve");

        assert_eq!(path, PathBuf::from("/tmp/home/.config/toastline/toaster.json"));
    }

    #[test]
    fn app_config_path_errors_when_home_missing_and_xdg_unset() {
        let error = app_config_path("toastline", "toaster.json", None, None).unwrap_err();
        assert!(matches!(error, ConfigError::MissingHomeDirectory));
    }

    #[test]
    fn missing_file_yields_defaults() {
        with_temp_root(|root| {
            assert!(read_toaster_options_with(Some(root), None)
                .unwrap()
                .is_none());
            assert_eq!(
                load_toaster_options_with(Some(root), None),
                ToasterOptions::default()
            );
        });
    }

    #[test]
    fn config_file_overrides_defaults() {
        with_temp_root(|root| {
            write_config(
                root,
                r#"{ "position": "top-center", "theme": "system", "closeButton": true }"#,
            );
            let options = load_toaster_options_with(Some(root), None);
            assert_eq!(options.position.to_string(), "top-center");
            assert_eq!(options.theme, ThemeMode::System);
            assert!(options.close_button);
            assert_eq!(options.visible_toasts, 3);
        });
    }

    #[test]
    fn malformed_file_reports_parse_error_and_loads_defaults() {
        with_temp_root(|root| {
            write_config(root, "{ not json");
            let error = read_toaster_options_with(Some(root), None).unwrap_err();
            assert!(matches!(error, ConfigError::Parse { .. }));
            assert_eq!(
                load_toaster_options_with(Some(root), None),
                ToasterOptions::default()
            );
        });
    }
}
