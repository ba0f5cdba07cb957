use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::input::Hotkey;
use crate::theme::ThemeMode;
use crate::toast::StyleMap;

pub const TOAST_WIDTH: u32 = 356;
pub const GAP: u32 = 14;
pub const VISIBLE_TOASTS: usize = 3;
pub const TOAST_DURATION_MS: u64 = 4_000;
pub const VIEWPORT_OFFSET: &str = "32px";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PositionError {
    #[error("invalid toaster position {0:?}; expected \"<top|bottom>-<left|center|right>\"")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VerticalEdge {
    Top,
    #[default]
    Bottom,
}

impl VerticalEdge {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Bottom => "bottom",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HorizontalEdge {
    Left,
    Center,
    #[default]
    Right,
}

impl HorizontalEdge {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
        }
    }
}

/// Screen corner (or edge center) the stack is anchored to, written `"<y>-<x>"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Position {
    pub y: VerticalEdge,
    pub x: HorizontalEdge,
}

impl Position {
    pub const fn new(y: VerticalEdge, x: HorizontalEdge) -> Self {
        Self { y, x }
    }
}

impl FromStr for Position {
    type Err = PositionError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || PositionError::Invalid(value.to_string());
        let (y, x) = value.trim().split_once('-').ok_or_else(invalid)?;
        let y = match y {
            "top" => VerticalEdge::Top,
            "bottom" => VerticalEdge::Bottom,
            _ => return Err(invalid()),
        };
        let x = match x {
            "left" => HorizontalEdge::Left,
            "center" => HorizontalEdge::Center,
            "right" => HorizontalEdge::Right,
            _ => return Err(invalid()),
        };
        Ok(Self { y, x })
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.y.as_str(), self.x.as_str())
    }
}

impl Serialize for Position {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Position {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

fn lenient_position<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Position, D::Error> {
    let raw = String::deserialize(deserializer)?;
    Ok(raw.parse().unwrap_or_else(|err| {
        tracing::warn!(%err, "using default toaster position");
        Position::default()
    }))
}

/// Distance between the stack and the viewport edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Offset {
    Pixels(f64),
    Css(String),
}

impl Offset {
    pub fn to_css(&self) -> String {
        match self {
            Self::Pixels(px) => format!("{px}px"),
            Self::Css(value) => value.clone(),
        }
    }
}

impl Default for Offset {
    fn default() -> Self {
        Self::Css(VIEWPORT_OFFSET.to_string())
    }
}

/// Class and style overrides handed to every toast.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ToastStyleOptions {
    pub class: Option<String>,
    #[serde(alias = "descriptionClassName")]
    pub description_class: Option<String>,
    pub style: StyleMap,
}

/// Toaster configuration. Fields missing from a deserialized document keep
/// their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ToasterOptions {
    #[serde(deserialize_with = "lenient_position")]
    pub position: Position,
    pub expand: bool,
    pub theme: ThemeMode,
    pub hotkey: Hotkey,
    pub offset: Offset,
    pub visible_toasts: usize,
    pub close_button: bool,
    /// Default auto-dismiss delay in milliseconds.
    pub duration: u64,
    pub rich_colors: bool,
    pub class: Option<String>,
    pub style: StyleMap,
    pub toast_options: ToastStyleOptions,
}

impl Default for ToasterOptions {
    fn default() -> Self {
        Self {
            position: Position::default(),
            expand: false,
            theme: ThemeMode::default(),
            hotkey: Hotkey::default(),
            offset: Offset::default(),
            visible_toasts: VISIBLE_TOASTS,
            close_button: false,
            duration: TOAST_DURATION_MS,
            rich_colors: false,
            class: None,
            style: StyleMap::new(),
            toast_options: ToastStyleOptions::default(),
        }
    }
}

impl ToasterOptions {
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration)
    }
}
