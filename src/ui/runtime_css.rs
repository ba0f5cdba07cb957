use std::sync::Once;

use gtk4::CssProvider;

use super::style::{color_tokens_for, ColorTokens, KindColors, StyleTokens, LAYOUT_TOKENS};
use crate::theme::ResolvedTheme;
use crate::toast::StyleMap;
use crate::toaster::StackView;

pub(super) const TOASTER_CLASS: &str = "toastline-toaster";
pub(super) const TOAST_CLASS: &str = "toastline-toast";

pub(super) fn install_runtime_css() {
    static RUNTIME_CSS_SETUP: Once = Once::new();

    RUNTIME_CSS_SETUP.call_once(|| {
        let css = toaster_css(
            LAYOUT_TOKENS,
            &color_tokens_for(ResolvedTheme::Light),
            &color_tokens_for(ResolvedTheme::Dark),
        );
        let provider = CssProvider::new();
        provider.load_from_data(&css);
        if !attach_provider(&provider) {
            tracing::warn!("no display available; toaster stylesheet not installed");
        }
    });
}

/// Registers `provider` on the default display.
pub(super) fn attach_provider(provider: &CssProvider) -> bool {
    let Some(display) = gtk4::gdk::Display::default() else {
        return false;
    };
    gtk4::style_context_add_provider_for_display(
        &display,
        provider,
        gtk4::STYLE_PROVIDER_PRIORITY_APPLICATION,
    );
    true
}

fn theme_rules(theme: &str, colors: &ColorTokens) -> String {
    let rule = |stack_selector: &str, toast_selector: &str, kind: &KindColors| {
        format!(
            "{stack_selector} .{TOAST_CLASS}{toast_selector} {{
  background: {background};
  border-color: {border};
  color: {text};
}}
",
            background = kind.background,
            border = kind.border,
            text = kind.text,
        )
    };

    let stack = format!(".{TOASTER_CLASS}.theme-{theme}");
    let rich = format!("{stack}.rich-colors");
    let mut css = rule(&stack, "", &colors.normal);
    css.push_str(&format!(
        "{stack} .{TOAST_CLASS} {{\n  box-shadow: 0 4px 12px {shadow};\n}}\n",
        shadow = colors.shadow
    ));
    css.push_str(&rule(&rich, ".toast-success", &colors.success));
    css.push_str(&rule(&rich, ".toast-error", &colors.error));
    css
}

pub(super) fn toaster_css(tokens: StyleTokens, light: &ColorTokens, dark: &ColorTokens) -> String {
    let mut css = format!(
        "
.{TOASTER_CLASS} {{
  background: transparent;
}}
.{TOASTER_CLASS} .{TOAST_CLASS} {{
  border-radius: {toast_radius}px;
  border: {border_width}px solid transparent;
  padding: {toast_padding}px;
  min-width: {toast_width}px;
  transition: opacity {motion_standard_ms}ms ease;
}}
.{TOASTER_CLASS} .{TOAST_CLASS}.toast-leaving {{
  opacity: 0;
  transition: opacity {exit_ms}ms ease;
}}
.{TOASTER_CLASS} .{TOAST_CLASS} .toast-title {{
  font-size: {title_size}px;
  font-weight: 500;
}}
.{TOASTER_CLASS} .{TOAST_CLASS} .toast-description {{
  font-size: {description_size}px;
  opacity: 0.8;
}}
.{TOASTER_CLASS} .{TOAST_CLASS} button.toast-close {{
  min-width: {close_button_size}px;
  min-height: {close_button_size}px;
  padding: 0;
}}
",
        toast_radius = tokens.toast_radius,
        border_width = tokens.border_width,
        toast_padding = tokens.toast_padding,
        toast_width = tokens.toast_width,
        motion_standard_ms = tokens.motion_standard_ms,
        exit_ms = tokens.exit_ms,
        title_size = tokens.title_size,
        description_size = tokens.description_size,
        close_button_size = tokens.close_button_size,
    );
    css.push_str(&theme_rules("light", light));
    css.push_str(&theme_rules("dark", dark));
    css
}

/// Rules carrying one stack's custom properties and per-toast style
/// overrides. `toast_classes` pairs each item with its generated class.
///
/// GTK only parses `--name` declarations from 4.16 on; older runtimes get the
/// plain declarations alone.
pub(super) fn stack_css(
    stack_class: &str,
    view: &StackView,
    toast_classes: &[(String, StyleMap)],
    custom_properties: bool,
) -> String {
    let mut css = format!(".{stack_class} {{\n");
    for (name, value) in &view.style {
        if name.starts_with("--") && !custom_properties {
            continue;
        }
        css.push_str(&format!("  {name}: {value};\n"));
    }
    css.push_str("}\n");

    for (class, style) in toast_classes {
        if style.is_empty() {
            continue;
        }
        css.push_str(&format!(".{stack_class} .{class} {{\n"));
        for (name, value) in style {
            css.push_str(&format!("  {name}: {value};\n"));
        }
        css.push_str("}\n");
    }
    css
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toast::{Toast, ToastKind, ToastOptions};
    use crate::toaster::{view, ToasterAction, ToasterOptions, ToasterState};

    #[test]
    fn toaster_css_covers_both_themes() {
        let css = toaster_css(
            LAYOUT_TOKENS,
            &color_tokens_for(ResolvedTheme::Light),
            &color_tokens_for(ResolvedTheme::Dark),
        );
        assert!(css.contains(".toastline-toaster.theme-light .toastline-toast"));
        assert!(css.contains(".toastline-toaster.theme-dark .toastline-toast"));
        assert!(css.contains("min-width: 356px;"));
        assert!(css.contains(".toast-leaving"));
    }

    #[test]
    fn stack_css_emits_custom_properties_and_toast_rules() {
        let mut state = ToasterState::new(false, ResolvedTheme::Light);
        state.apply(ToasterAction::ToastAdded(Toast::from_options(
            "a",
            ToastKind::Normal,
            ToastOptions::new().with_id("a"),
        )));
        let view = view::render(&state, &ToasterOptions::default()).expect("stack");
        let mut style = StyleMap::new();
        style.insert("color".to_string(), "red".to_string());

        let css = stack_css(
            "toaster-1",
            &view,
            &[
                ("toast-1".to_string(), style),
                ("toast-2".to_string(), StyleMap::new()),
            ],
            true,
        );

        assert!(css.starts_with(".toaster-1 {\n  --front-toast-height: 0px;\n"));
        assert!(css.contains("  --gap: 14px;\n"));
        assert!(css.contains(".toaster-1 .toast-1 {\n  color: red;\n}\n"));
        assert!(!css.contains("toast-2"));

        let legacy = stack_css("toaster-1", &view, &[], false);
        assert_eq!(legacy, ".toaster-1 {\n}\n");
    }
}
