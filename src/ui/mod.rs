mod key_bridge;
mod runtime_css;
pub mod style;
mod system_theme;
mod toast_row;
mod toaster_widget;

pub use style::{color_tokens_for, css_pixels, ColorTokens, KindColors, StyleTokens, LAYOUT_TOKENS};
pub use system_theme::GtkSystemTheme;
pub use toaster_widget::ToasterWidget;
