use serde::{Deserialize, Serialize};

pub const ESCAPE_CODE: &str = "Escape";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub alt: bool,
    pub ctrl: bool,
    pub shift: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const fn new(alt: bool, ctrl: bool, shift: bool, meta: bool) -> Self {
        Self {
            alt,
            ctrl,
            shift,
            meta,
        }
    }

    fn flag(self, identifier: &str) -> Option<bool> {
        match identifier {
            "altKey" => Some(self.alt),
            "ctrlKey" => Some(self.ctrl),
            "shiftKey" => Some(self.shift),
            "metaKey" => Some(self.meta),
            _ => None,
        }
    }
}

/// A key press reduced to its physical code (`KeyT`, `Digit1`, `Escape`, ...)
/// and the modifiers held while it happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPress {
    pub code: String,
    pub modifiers: Modifiers,
}

impl KeyPress {
    pub fn new(code: impl Into<String>, modifiers: Modifiers) -> Self {
        Self {
            code: code.into(),
            modifiers,
        }
    }

    pub fn is_escape(&self) -> bool {
        self.code == ESCAPE_CODE
    }
}

/// Ordered key combination that expands the toaster.
///
/// `altKey`, `ctrlKey`, `shiftKey` and `metaKey` name modifier flags; every
/// other identifier is compared against the pressed key code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Hotkey(Vec<String>);

impl Hotkey {
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(keys.into_iter().map(Into::into).collect())
    }

    pub fn keys(&self) -> &[String] {
        &self.0
    }

    /// True when every identifier of the combination is satisfied by `press`.
    /// An empty combination never matches.
    pub fn is_pressed(&self, press: &KeyPress) -> bool {
        !self.0.is_empty()
            && self.0.iter().all(|key| {
                press.modifiers.flag(key).unwrap_or(false) || press.code == key.as_str()
            })
    }

    /// Human readable form used in the stack's accessible label, e.g. `alt + T`.
    pub fn label(&self) -> String {
        self.0
            .join(" + ")
            .replace("Key", "")
            .replace("Digit", "")
    }
}

impl Default for Hotkey {
    fn default() -> Self {
        Self::new(["altKey", "KeyT"])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALT: Modifiers = Modifiers::new(true, false, false, false);

    #[test]
    fn default_hotkey_requires_alt_and_t() {
        let hotkey = Hotkey::default();
        assert!(hotkey.is_pressed(&KeyPress::new("KeyT", ALT)));
        assert!(!hotkey.is_pressed(&KeyPress::new("KeyT", Modifiers::default())));
        assert!(!hotkey.is_pressed(&KeyPress::new("KeyR", ALT)));
    }

    #[test]
    fn extra_modifiers_do_not_prevent_a_match() {
        let hotkey = Hotkey::default();
        let press = KeyPress::new("KeyT", Modifiers::new(true, true, true, false));
        assert!(hotkey.is_pressed(&press));
    }

    #[test]
    fn multi_modifier_hotkey_needs_every_flag() {
        let hotkey = Hotkey::new(["ctrlKey", "shiftKey", "Digit1"]);
        assert!(hotkey.is_pressed(&KeyPress::new(
            "Digit1",
            Modifiers::new(false, true, true, false)
        )));
        assert!(!hotkey.is_pressed(&KeyPress::new(
            "Digit1",
            Modifiers::new(false, true, false, false)
        )));
    }

    #[test]
    fn empty_hotkey_never_matches() {
        let hotkey = Hotkey::new(Vec::<String>::new());
        assert!(!hotkey.is_pressed(&KeyPress::new("KeyT", ALT)));
    }

    #[test]
    fn label_strips_key_and_digit_prefixes() {
        assert_eq!(Hotkey::default().label(), "alt + T");
        assert_eq!(
            Hotkey::new(["metaKey", "shiftKey", "Digit9"]).label(),
            "meta + shift + 9"
        );
    }

    #[test]
    fn hotkey_deserializes_from_plain_list() {
        let hotkey: Hotkey =
            serde_json::from_str(r#"["ctrlKey", "KeyN"]"#).expect("hotkey should parse");
        assert_eq!(hotkey.keys(), ["ctrlKey".to_string(), "KeyN".to_string()]);
    }

    #[test]
    fn escape_press_is_recognized() {
        assert!(KeyPress::new(ESCAPE_CODE, Modifiers::default()).is_escape());
        assert!(!KeyPress::new("KeyE", Modifiers::default()).is_escape());
    }
}
