//! Key naming for the Linux keyboard tools.
//!
//! Each tool spells keys differently:
//!
//! - `xdotool` and `xvkbd` take X keysym names (`Shift`, `Scroll_Lock`).
//! - `xte` wants side-specific modifiers (`Shift_L`, `Control_L`) and a
//!   single command-string argument.
//! - `wtype` separates modifiers (`-M shift`) from keys (`-P Insert`).
//! - `ydotool` takes raw evdev codes from `linux/input-event-codes.h` as
//!   `code:1` (down) / `code:0` (up) pairs.

use crate::platform::keyboard::KeyTool;
use crate::platform::keys::{Chord, Key};
use crate::platform::process::Invocation;
use crate::platform::PlatformError;

/// Keystroke delay passed to `xdotool type`, in milliseconds.
const XDOTOOL_TYPE_DELAY_MS: &str = "50";

// ---------------------------------------------------------------------------
// Per-tool key names
// ---------------------------------------------------------------------------

fn xdotool_name(key: Key) -> &'static str {
    match key {
        Key::Shift => "Shift",
        Key::Control => "Ctrl",
        Key::Meta => "super",
        Key::Insert => "Insert",
        Key::Return => "Return",
        Key::ScrollLock => "Scroll_Lock",
        Key::V => "v",
    }
}

fn xte_name(key: Key) -> &'static str {
    match key {
        Key::Shift => "Shift_L",
        Key::Control => "Control_L",
        Key::Meta => "Super_L",
        Key::Insert => "Insert",
        Key::Return => "Return",
        Key::ScrollLock => "Scroll_Lock",
        Key::V => "v",
    }
}

fn xvkbd_name(key: Key) -> &'static str {
    match key {
        Key::Shift => "Shift",
        Key::Control => "Control",
        Key::Meta => "Meta_L",
        Key::Insert => "Insert",
        Key::Return => "Return",
        Key::ScrollLock => "Scroll_Lock",
        Key::V => "v",
    }
}

fn wtype_modifier(key: Key) -> Option<&'static str> {
    match key {
        Key::Shift => Some("shift"),
        Key::Control => Some("ctrl"),
        Key::Meta => Some("logo"),
        _ => None,
    }
}

fn wtype_key(key: Key) -> &'static str {
    match key {
        Key::Insert => "Insert",
        Key::Return => "Return",
        Key::ScrollLock => "Scroll_Lock",
        Key::V => "v",
        Key::Shift => "Shift_L",
        Key::Control => "Control_L",
        Key::Meta => "Super_L",
    }
}

/// evdev codes as sent to `ydotool key`.
pub fn evdev_code(key: Key) -> u16 {
    match key {
        Key::Shift => 42,
        Key::Control => 29,
        Key::Meta => 125,
        // The established ydotool paste sequence uses 118 for Insert.
        Key::Insert => 118,
        Key::Return => 28,
        Key::ScrollLock => 70,
        Key::V => 47,
    }
}

// ---------------------------------------------------------------------------
// Invocations
// ---------------------------------------------------------------------------

/// Command line that presses `chord` with `tool`.
pub fn chord_invocation(tool: KeyTool, chord: Chord) -> Result<Invocation, PlatformError> {
    let inv = match tool {
        KeyTool::Xdotool => {
            let combo = chord
                .press_order()
                .map(xdotool_name)
                .collect::<Vec<_>>()
                .join("+");
            Invocation::new("xdotool", ["key".to_owned(), combo])
        }
        KeyTool::Xte => {
            let keys = chord
                .press_order()
                .map(xte_name)
                .collect::<Vec<_>>()
                .join(" ");
            Invocation::new("xte", [format!("key {keys}")])
        }
        KeyTool::Xvkbd => {
            let text: String = chord
                .press_order()
                .map(|k| format!("\\[{}]", xvkbd_name(k)))
                .collect();
            Invocation::new("xvkbd", ["-text".to_owned(), text])
        }
        KeyTool::Wtype => {
            let mut args = Vec::with_capacity(4);
            if let Some(m) = chord.modifier {
                let name = wtype_modifier(m).ok_or(PlatformError::Unsupported {
                    mechanism: "wtype",
                    action: "this modifier",
                })?;
                args.extend(["-M", name]);
            }
            args.extend(["-P", wtype_key(chord.key)]);
            Invocation::new("wtype", args)
        }
        KeyTool::Ydotool => {
            let down = chord.press_order().map(|k| format!("{}:1", evdev_code(k)));
            let up = chord.release_order().map(|k| format!("{}:0", evdev_code(k)));
            Invocation::new(
                "ydotool",
                std::iter::once("key".to_owned()).chain(down).chain(up),
            )
        }
    };
    Ok(inv)
}

/// Command line that types `text` with `tool`.
pub fn text_invocation(tool: KeyTool, text: &str) -> Result<Invocation, PlatformError> {
    match tool {
        KeyTool::Xdotool => Ok(Invocation::new(
            "xdotool",
            ["type", "--delay", XDOTOOL_TYPE_DELAY_MS, text],
        )),
        KeyTool::Xte => Ok(Invocation::new("xte", [format!("type {text}")])),
        KeyTool::Wtype => Ok(Invocation::new("wtype", [text])),
        KeyTool::Xvkbd | KeyTool::Ydotool => Err(PlatformError::Unsupported {
            mechanism: tool.name(),
            action: "text entry",
        }),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
