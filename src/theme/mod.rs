use std::fmt;

use serde::{Deserialize, Serialize};

/// Theme requested by the toaster options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
    System,
}

impl ThemeMode {
    /// The theme to apply directly, or `None` when it follows the system.
    pub const fn fixed(self) -> Option<ResolvedTheme> {
        match self {
            Self::Light => Some(ResolvedTheme::Light),
            Self::Dark => Some(ResolvedTheme::Dark),
            Self::System => None,
        }
    }
}

/// Theme actually rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolvedTheme {
    #[default]
    Light,
    Dark,
}

impl ResolvedTheme {
    pub const fn from_prefers_dark(prefers_dark: bool) -> Self {
        if prefers_dark {
            Self::Dark
        } else {
            Self::Light
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

/// Desktop-level light/dark preference.
pub trait SystemThemeSource {
    fn current(&self) -> ResolvedTheme;

    /// Calls `on_change` with the new preference every time it changes, until
    /// the returned handle is dropped.
    fn watch(&self, on_change: Box<dyn Fn(ResolvedTheme)>) -> ThemeWatch;
}

/// Handle for an active preference watch; dropping it stops the watch.
#[must_use = "dropping a ThemeWatch stops watching the system theme"]
pub struct ThemeWatch {
    disconnect: Option<Box<dyn FnOnce()>>,
}

impl ThemeWatch {
    pub fn new(disconnect: impl FnOnce() + 'static) -> Self {
        Self {
            disconnect: Some(Box::new(disconnect)),
        }
    }

    /// A watch with nothing to undo.
    pub fn detached() -> Self {
        Self { disconnect: None }
    }
}

impl fmt::Debug for ThemeWatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThemeWatch")
            .field("active", &self.disconnect.is_some())
            .finish()
    }
}

impl Drop for ThemeWatch {
    fn drop(&mut self) {
        if let Some(disconnect) = self.disconnect.take() {
            disconnect();
        }
    }
}

/// Guesses the theme from a GTK theme name such as `Adwaita-dark`.
pub fn mode_from_theme_name(theme_name: &str) -> Option<ResolvedTheme> {
    let normalized = theme_name.trim().to_ascii_lowercase();
    if normalized.is_empty() {
        return None;
    }
    if normalized.contains("dark") {
        return Some(ResolvedTheme::Dark);
    }
    if normalized.contains("light") {
        return Some(ResolvedTheme::Light);
    }
    None
}


#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::testing::FakeThemeSource;
    use super::*;

    #[test]
    fn fixed_modes_resolve_directly() {
        assert_eq!(ThemeMode::Light.fixed(), Some(ResolvedTheme::Light));
        assert_eq!(ThemeMode::Dark.fixed(), Some(ResolvedTheme::Dark));
        assert_eq!(ThemeMode::System.fixed(), None);
    }

    #[test]
    fn theme_mode_parses_lowercase_names() {
        let mode: ThemeMode = serde_json::from_str("\"system\"").expect("mode should parse");
        assert_eq!(mode, ThemeMode::System);
        assert!(serde_json::from_str::<ThemeMode>("\"sepia\"").is_err());
    }

    #[test]
    fn mode_from_theme_name_detects_variants() {
        assert_eq!(
            mode_from_theme_name("Adwaita-dark"),
            Some(ResolvedTheme::Dark)
        );
        assert_eq!(
            mode_from_theme_name(" Breeze-Light "),
            Some(ResolvedTheme::Light)
        );
        assert_eq!(mode_from_theme_name("Adwaita"), None);
        assert_eq!(mode_from_theme_name("   "), None);
    }

    #[test]
    fn dropping_watch_runs_disconnect_once() {
        let calls = Rc::new(Cell::new(0));
        let watch = {
            let calls = calls.clone();
            ThemeWatch::new(move || calls.set(calls.get() + 1))
        };
        drop(watch);
        assert_eq!(calls.get(), 1);
        drop(ThemeWatch::detached());
    }

    #[test]
    fn fake_source_notifies_until_watch_dropped() {
        let source = FakeThemeSource::new(ResolvedTheme::Light);
        let seen = Rc::new(Cell::new(ResolvedTheme::Light));
        let watch = {
            let seen = seen.clone();
            source.watch(Box::new(move |theme| seen.set(theme)))
        };

        source.set(ResolvedTheme::Dark);
        assert_eq!(seen.get(), ResolvedTheme::Dark);
        assert_eq!(source.current(), ResolvedTheme::Dark);

        drop(watch);
        assert_eq!(source.watcher_count(), 0);
        source.set(ResolvedTheme::Light);
        assert_eq!(seen.get(), ResolvedTheme::Dark);
    }
}
