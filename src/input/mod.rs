mod hotkey;

pub use hotkey::{Hotkey, KeyPress, Modifiers, ESCAPE_CODE};
