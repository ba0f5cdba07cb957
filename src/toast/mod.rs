mod id;

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use id::generate_id;

/// Inline style declarations, property name to value.
pub type StyleMap = BTreeMap<String, String>;

/// Fields a caller passed that this crate does not interpret.
pub type ExtraFields = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ToastId(String);

impl ToastId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ToastId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ToastId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ToastId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    #[default]
    Normal,
    Success,
    Error,
}

impl ToastKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

/// Per-call options accepted by the `notify*` functions.
///
/// Nothing here is validated. Keys the renderer does not know about are kept
/// in `extra` and travel with the toast untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToastOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ToastId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Auto-dismiss delay in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description_class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<StyleMap>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl ToastOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<ToastId>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX));
        self
    }

    #[must_use]
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self
    }
}

/// A single notification as carried on the bus and held by the toaster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Toast {
    pub id: ToastId,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: ToastKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dismiss: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description_class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<StyleMap>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl Toast {
    /// Builds a toast, taking the caller's id or generating one.
    pub fn from_options(title: impl Into<String>, kind: ToastKind, options: ToastOptions) -> Self {
        let ToastOptions {
            id,
            description,
            duration,
            class,
            description_class,
            style,
            extra,
        } = options;

        Self {
            id: id.unwrap_or_else(generate_id),
            title: title.into(),
            kind,
            dismiss: None,
            description,
            duration,
            class,
            description_class,
            style,
            extra,
        }
    }

    pub fn is_dismissed(&self) -> bool {
        self.dismiss == Some(true)
    }

    /// Copy of this toast flagged for removal.
    #[must_use]
    pub fn dismissed(&self) -> Self {
        Self {
            dismiss: Some(true),
            ..self.clone()
        }
    }

    pub fn duration(&self) -> Option<Duration> {
        self.duration.map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_options_keeps_caller_id() {
        let toast = Toast::from_options(
            "Done",
            ToastKind::Success,
            ToastOptions::new().with_id("x"),
        );
        assert_eq!(toast.id, ToastId::from("x"));
        assert_eq!(toast.title, "Done");
        assert_eq!(toast.kind, ToastKind::Success);
        assert_eq!(toast.dismiss, None);
    }

    #[test]
    fn from_options_generates_id_when_missing() {
        let toast = Toast::from_options("Saved", ToastKind::Normal, ToastOptions::new());
        assert!(toast.id.as_str().parse::<u32>().is_ok());
    }

    #[test]
    fn dismissed_copy_only_changes_flag() {
        let toast = Toast::from_options(
            "Saved",
            ToastKind::Normal,
            ToastOptions::new().with_id("a").with_description("file.txt"),
        );
        let flagged = toast.dismissed();
        assert!(flagged.is_dismissed());
        assert!(!toast.is_dismissed());
        assert_eq!(
            Toast {
                dismiss: None,
                ..flagged
            },
            toast
        );
    }

    #[test]
    fn unknown_option_fields_pass_through() {
        let options: ToastOptions = serde_json::from_str(
            r#"{ "id": "k", "duration": 1500, "important": true, "icon": "bell" }"#,
        )
        .expect("options should parse");
        assert_eq!(options.duration, Some(1500));
        assert_eq!(options.extra.len(), 2);

        let toast = Toast::from_options("Ping", ToastKind::Normal, options);
        let json = serde_json::to_value(&toast).expect("toast should serialize");
        assert_eq!(json["type"], "normal");
        assert_eq!(json["important"], true);
        assert_eq!(json["icon"], "bell");
        assert!(json.get("dismiss").is_none());
        assert_eq!(toast.duration(), Some(Duration::from_millis(1500)));
    }

    #[test]
    fn kind_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&ToastKind::Error).expect("serialize"),
            "\"error\""
        );
        assert_eq!(ToastKind::Success.as_str(), "success");
    }
}
