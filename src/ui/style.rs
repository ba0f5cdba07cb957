use crate::theme::ResolvedTheme;
use crate::toaster::options::{GAP, TOAST_WIDTH};

/// Compile-time layout tokens — not user-overridable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyleTokens {
    pub toast_width: i32,
    pub gap: i32,
    pub toast_radius: u16,
    pub toast_padding: u16,
    pub border_width: u16,
    pub title_size: u16,
    pub description_size: u16,
    pub close_button_size: i32,
    pub motion_standard_ms: u32,
    pub exit_ms: u32,
}

pub const LAYOUT_TOKENS: StyleTokens = StyleTokens {
    toast_width: TOAST_WIDTH as i32,
    gap: GAP as i32,
    toast_radius: 8,
    toast_padding: 16,
    border_width: 1,
    title_size: 13,
    description_size: 12,
    close_button_size: 20,
    motion_standard_ms: 400,
    exit_ms: 200,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindColors {
    pub background: &'static str,
    pub border: &'static str,
    pub text: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorTokens {
    pub normal: KindColors,
    pub success: KindColors,
    pub error: KindColors,
    pub shadow: &'static str,
}

const LIGHT_COLORS: ColorTokens = ColorTokens {
    normal: KindColors {
        background: "#ffffff",
        border: "#ededed",
        text: "#171717",
    },
    success: KindColors {
        background: "#ecfdf3",
        border: "#d3fde5",
        text: "#008a2e",
    },
    error: KindColors {
        background: "#fff0f0",
        border: "#ffe0e1",
        text: "#e60000",
    },
    shadow: "rgba(0, 0, 0, 0.10)",
};

const DARK_COLORS: ColorTokens = ColorTokens {
    normal: KindColors {
        background: "#000000",
        border: "#333333",
        text: "#fcfcfc",
    },
    success: KindColors {
        background: "#001f0f",
        border: "#003d1c",
        text: "#59f3a6",
    },
    error: KindColors {
        background: "#2d0607",
        border: "#4d0408",
        text: "#ff9ea1",
    },
    shadow: "rgba(0, 0, 0, 0.40)",
};

pub const fn color_tokens_for(theme: ResolvedTheme) -> ColorTokens {
    match theme {
        ResolvedTheme::Light => LIGHT_COLORS,
        ResolvedTheme::Dark => DARK_COLORS,
    }
}

/// Pixel value of a CSS length such as `32px` or `12`; other units yield `None`.
pub fn css_pixels(value: &str) -> Option<i32> {
    let value = value.trim();
    let number = value.strip_suffix("px").unwrap_or(value).trim();
    let parsed = number.parse::<f64>().ok()?;
    parsed.is_finite().then(|| parsed.round() as i32)
}
