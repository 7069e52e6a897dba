//! Windows virtual-key codes and `SendInput` event sequences.
//!
//! VK codes are from the Windows SDK (winuser.h). Event sequences are built
//! here as plain data so they can be checked on any host; `send_input` turns
//! them into `INPUT` records.

use crate::platform::keys::{Chord, Key};

/// `KEYEVENTF_EXTENDEDKEY`: set for keys on the extended block (Insert).
pub const EXTENDED: u32 = 0x0001;
/// `KEYEVENTF_KEYUP`.
pub const KEYUP: u32 = 0x0002;
/// `KEYEVENTF_UNICODE`: `scan` carries a UTF-16 code unit instead of a key.
pub const UNICODE: u32 = 0x0004;

/// One `KEYBDINPUT` worth of data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub vk: u16,
    pub scan: u16,
    pub flags: u32,
}

/// Returns `(vk, extra_flags)`; modifiers map to their left-hand variant.
pub fn vk_code(key: Key) -> (u16, u32) {
    match key {
        Key::Shift => (0xA0, 0),   // VK_LSHIFT
        Key::Control => (0xA2, 0), // VK_LCONTROL
        Key::Meta => (0x5B, 0),    // VK_LWIN
        Key::Insert => (0x2D, EXTENDED),
        Key::Return => (0x0D, 0),
        Key::ScrollLock => (0x91, 0),
        Key::V => (0x56, 0),
    }
}

/// Modifier down, key down, key up, modifier up.
pub fn chord_events(chord: Chord) -> Vec<KeyEvent> {
    let down = chord.press_order().map(|k| {
        let (vk, flags) = vk_code(k);
        KeyEvent { vk, scan: 0, flags }
    });
    let up = chord.release_order().map(|k| {
        let (vk, flags) = vk_code(k);
        KeyEvent {
            vk,
            scan: 0,
            flags: flags | KEYUP,
        }
    });
    down.chain(up).collect()
}

/// A down/up pair per UTF-16 code unit. Surrogate pairs go through as two
/// units, which is what `KEYEVENTF_UNICODE` expects.
pub fn text_events(text: &str) -> Vec<KeyEvent> {
    text.encode_utf16()
        .flat_map(|unit| {
            [
                KeyEvent {
                    vk: 0,
                    scan: unit,
                    flags: UNICODE,
                },
                KeyEvent {
                    vk: 0,
                    scan: unit,
                    flags: UNICODE | KEYUP,
                },
            ]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shift_insert_sequence() {
        let events = chord_events(Chord::SHIFT_INSERT);
        let summary: Vec<_> = events.iter().map(|e| (e.vk, e.flags)).collect();
        assert_eq!(
            summary,
            vec![
                (0xA0, 0),
                (0x2D, EXTENDED),
                (0x2D, EXTENDED | KEYUP),
                (0xA0, KEYUP),
            ]
        );
    }

    #[test]
    fn scroll_lock_is_a_single_tap() {
        let events = chord_events(Chord::SCROLL_LOCK);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].vk, 0x91);
        assert_eq!(events[1].flags, KEYUP);
    }

    #[test]
    fn text_uses_utf16_units() {
        let events = text_events("a😀");
        // 'a' is one unit, the emoji is a surrogate pair.
        assert_eq!(events.len(), 6);
        assert!(events.iter().all(|e| e.vk == 0 && e.flags & UNICODE != 0));
        assert_eq!(events[0].scan, u16::from(b'a'));
        assert_eq!(events[2].scan, 0xD83D);
    }
}
