use std::time::Duration;

use crate::theme::ResolvedTheme;
use crate::toast::{StyleMap, Toast};

use super::options::{HorizontalEdge, Position, ToasterOptions, VerticalEdge, GAP, TOAST_WIDTH};
use super::state::ToasterState;

pub const FRONT_TOAST_HEIGHT_PROPERTY: &str = "--front-toast-height";
pub const OFFSET_PROPERTY: &str = "--offset";
pub const WIDTH_PROPERTY: &str = "--width";
pub const GAP_PROPERTY: &str = "--gap";

/// Render description of a non-empty toaster: a labeled landmark wrapping an
/// ordered list of toasts.
#[derive(Debug, Clone, PartialEq)]
pub struct StackView {
    pub aria_label: String,
    pub class: Option<String>,
    pub theme: ResolvedTheme,
    pub rich_colors: bool,
    pub y_position: VerticalEdge,
    pub x_position: HorizontalEdge,
    pub expanded: bool,
    /// Custom properties first, then caller style overrides.
    pub style: Vec<(String, String)>,
    pub items: Vec<ToastItemView>,
}

impl StackView {
    /// Attributes stylesheets can select on.
    pub fn attributes(&self) -> [(&'static str, String); 4] {
        [
            ("data-theme", self.theme.as_str().to_string()),
            ("rich-colors", self.rich_colors.to_string()),
            ("y-position", self.y_position.as_str().to_string()),
            ("x-position", self.x_position.as_str().to_string()),
        ]
    }

    pub fn style_value(&self, name: &str) -> Option<&str> {
        self.style
            .iter()
            .rev()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn inline_style(&self) -> String {
        self.style
            .iter()
            .map(|(name, value)| format!("{name}: {value};"))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Everything the per-toast renderer receives for one toast.
#[derive(Debug, Clone, PartialEq)]
pub struct ToastItemView {
    pub toast: Toast,
    /// Changes when the toast's id is reused by a newer toast.
    pub generation: u64,
    pub index: usize,
    pub expand_by_default: bool,
    pub position: Position,
    pub visible_toasts: usize,
    pub close_button: bool,
    pub duration: Duration,
    pub class: Option<String>,
    pub description_class: Option<String>,
    pub style: StyleMap,
}

impl ToastItemView {
    pub fn is_front(&self) -> bool {
        self.index == 0
    }

    pub fn is_visible(&self) -> bool {
        self.index < self.visible_toasts
    }

    /// Collapsed stacks show the front toast only, unless the toaster
    /// expands by default.
    pub fn is_shown(&self, expanded: bool) -> bool {
        self.is_front() || ((expanded || self.expand_by_default) && self.is_visible())
    }
}

/// Builds the stack for `state`, or `None` when there is nothing to show.
pub fn render(state: &ToasterState, options: &ToasterOptions) -> Option<StackView> {
    if state.is_empty() {
        return None;
    }

    let front_height = state.front_height().unwrap_or(0.0);
    let mut style = vec![
        (
            FRONT_TOAST_HEIGHT_PROPERTY.to_string(),
            format!("{front_height}px"),
        ),
        (OFFSET_PROPERTY.to_string(), options.offset.to_css()),
        (WIDTH_PROPERTY.to_string(), format!("{TOAST_WIDTH}px")),
        (GAP_PROPERTY.to_string(), format!("{GAP}px")),
    ];
    style.extend(
        options
            .style
            .iter()
            .map(|(name, value)| (name.clone(), value.clone())),
    );

    let toast_style = &options.toast_options;
    let items = state
        .toasts()
        .iter()
        .enumerate()
        .map(|(index, toast)| ToastItemView {
            toast: toast.clone(),
            generation: state.generation(&toast.id).unwrap_or_default(),
            index,
            expand_by_default: options.expand,
            position: options.position,
            visible_toasts: options.visible_toasts,
            close_button: options.close_button,
            duration: toast.duration().unwrap_or_else(|| options.duration()),
            class: toast_style.class.clone(),
            description_class: toast_style.description_class.clone(),
            style: toast_style.style.clone(),
        })
        .collect();

    Some(StackView {
        aria_label: format!("Notifications {}", options.hotkey.label()),
        class: options.class.clone(),
        theme: state.theme(),
        rich_colors: options.rich_colors,
        y_position: options.position.y,
        x_position: options.position.x,
        expanded: state.expanded(),
        style,
        items,
    })
}
