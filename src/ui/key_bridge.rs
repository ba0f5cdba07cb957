use crate::input::{KeyPress, Modifiers, ESCAPE_CODE};

/// Wayland/XKB keycodes are evdev+8; evdev rows are used so the hotkey
/// keeps working under non-latin layouts.
fn evdev_from_keycode(keycode: u32) -> Option<u32> {
    keycode.checked_sub(8)
}

fn letter_from_keycode(keycode: u32) -> Option<char> {
    const TOP_ROW: &[u8] = b"qwertyuiop";
    const HOME_ROW: &[u8] = b"asdfghjkl";
    const BOTTOM_ROW: &[u8] = b"zxcvbnm";
    let evdev = evdev_from_keycode(keycode)?;
    let (row, start) = match evdev {
        16..=25 => (TOP_ROW, 16),
        30..=38 => (HOME_ROW, 30),
        44..=50 => (BOTTOM_ROW, 44),
        _ => return None,
    };
    row.get((evdev - start) as usize).map(|byte| char::from(*byte))
}

fn digit_from_keycode(keycode: u32) -> Option<char> {
    const DIGIT_ROW: &[u8] = b"1234567890";
    let evdev = evdev_from_keycode(keycode)?;
    match evdev {
        2..=11 => DIGIT_ROW.get((evdev - 2) as usize).map(|byte| char::from(*byte)),
        _ => None,
    }
}

/// Physical key code in the `KeyT` / `Digit1` / `Escape` naming.
pub(super) fn key_code(key: gtk4::gdk::Key, keycode: u32) -> Option<String> {
    match key {
        gtk4::gdk::Key::Escape => return Some(ESCAPE_CODE.to_string()),
        gtk4::gdk::Key::Return | gtk4::gdk::Key::KP_Enter => return Some("Enter".to_string()),
        gtk4::gdk::Key::Tab => return Some("Tab".to_string()),
        gtk4::gdk::Key::space => return Some("Space".to_string()),
        gtk4::gdk::Key::BackSpace => return Some("Backspace".to_string()),
        gtk4::gdk::Key::Delete => return Some("Delete".to_string()),
        _ => {}
    }

    match key.to_unicode().filter(|character| character.is_ascii()) {
        Some(character) if character.is_ascii_alphabetic() => {
            Some(format!("Key{}", character.to_ascii_uppercase()))
        }
        Some(character) if character.is_ascii_digit() => Some(format!("Digit{character}")),
        // Shifted digits and non-latin letters report a different keyval.
        _ => digit_from_keycode(keycode)
            .map(|character| format!("Digit{character}"))
            .or_else(|| {
                letter_from_keycode(keycode)
                    .map(|character| format!("Key{}", character.to_ascii_uppercase()))
            }),
    }
}

pub(super) fn modifiers(modifier: gtk4::gdk::ModifierType) -> Modifiers {
    Modifiers {
        alt: modifier.contains(gtk4::gdk::ModifierType::ALT_MASK),
        ctrl: modifier.contains(gtk4::gdk::ModifierType::CONTROL_MASK),
        shift: modifier.contains(gtk4::gdk::ModifierType::SHIFT_MASK),
        meta: modifier
            .intersects(gtk4::gdk::ModifierType::SUPER_MASK | gtk4::gdk::ModifierType::META_MASK),
    }
}

pub(super) fn key_press(
    key: gtk4::gdk::Key,
    keycode: u32,
    modifier: gtk4::gdk::ModifierType,
) -> Option<KeyPress> {
    key_code(key, keycode).map(|code| KeyPress::new(code, modifiers(modifier)))
}
