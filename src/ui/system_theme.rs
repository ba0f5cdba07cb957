use std::cell::Cell;
use std::rc::Rc;

use gtk4::prelude::*;

use crate::theme::{mode_from_theme_name, ResolvedTheme, SystemThemeSource, ThemeWatch};

const COLOR_SCHEME_PROPERTY: &str = "gtk-interface-color-scheme";
const WATCHED_PROPERTIES: [&str; 3] = [
    COLOR_SCHEME_PROPERTY,
    "gtk-theme-name",
    "gtk-application-prefer-dark-theme",
];

/// Desktop light/dark preference read from `gtk4::Settings`.
#[derive(Debug, Clone)]
pub struct GtkSystemTheme {
    settings: gtk4::Settings,
}

impl GtkSystemTheme {
    /// `None` when there is no display to read settings from.
    pub fn for_default_display() -> Option<Self> {
        gtk4::Settings::default().map(|settings| Self { settings })
    }
}

impl SystemThemeSource for GtkSystemTheme {
    fn current(&self) -> ResolvedTheme {
        resolve_system_theme(&self.settings)
    }

    fn watch(&self, on_change: Box<dyn Fn(ResolvedTheme)>) -> ThemeWatch {
        let on_change: Rc<dyn Fn(ResolvedTheme)> = Rc::from(on_change);
        let last = Rc::new(Cell::new(self.current()));
        let known_properties = self
            .settings
            .list_properties()
            .iter()
            .map(|prop| prop.name().to_string())
            .collect::<Vec<_>>();

        let handler_ids = WATCHED_PROPERTIES
            .into_iter()
            .filter(|name| known_properties.iter().any(|known| known == name))
            .map(|name| {
                let on_change = on_change.clone();
                let last = last.clone();
                self.settings
                    .connect_notify_local(Some(name), move |settings, _| {
                        let theme = resolve_system_theme(settings);
                        if last.replace(theme) != theme {
                            on_change(theme);
                        }
                    })
            })
            .collect::<Vec<_>>();

        let settings = self.settings.clone();
        ThemeWatch::new(move || {
            for handler_id in handler_ids {
                settings.disconnect(handler_id);
            }
        })
    }
}

fn resolve_system_theme(settings: &gtk4::Settings) -> ResolvedTheme {
    if settings
        .list_properties()
        .iter()
        .any(|prop| prop.name() == COLOR_SCHEME_PROPERTY)
    {
        let color_scheme = settings.property_value(COLOR_SCHEME_PROPERTY);
        if let Ok(raw_scheme) = color_scheme.get::<i32>() {
            match raw_scheme {
                // GTK_INTERFACE_COLOR_SCHEME_DARK
                2 => return ResolvedTheme::Dark,
                // GTK_INTERFACE_COLOR_SCHEME_LIGHT
                3 => return ResolvedTheme::Light,
                _ => {}
            }
        }
    }

    if let Some(theme) = settings
        .gtk_theme_name()
        .and_then(|name| mode_from_theme_name(name.as_str()))
    {
        return theme;
    }

    #[allow(deprecated)]
    {
        ResolvedTheme::from_prefers_dark(settings.is_gtk_application_prefer_dark_theme())
    }
}
