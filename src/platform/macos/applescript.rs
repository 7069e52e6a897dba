//! Keystrokes through `osascript` and System Events.
//!
//! Requires the Accessibility permission for whichever process launched
//! `osascript` (System Settings > Privacy & Security > Accessibility).

use crate::platform::keys::{Chord, Key};
use crate::platform::process::Invocation;
use crate::platform::PlatformError;

const MECHANISM: &str = "osascript";

/// AppleScript term for a key: a quoted character or a bare constant.
fn keystroke_term(key: Key) -> Option<&'static str> {
    match key {
        Key::V => Some("\"v\""),
        Key::Return => Some("return"),
        // No Insert or Scroll Lock on Mac keyboards.
        _ => None,
    }
}

fn modifier_term(key: Key) -> Option<&'static str> {
    match key {
        Key::Meta => Some("command down"),
        Key::Control => Some("control down"),
        Key::Shift => Some("shift down"),
        _ => None,
    }
}

/// Escapes `text` for use inside an AppleScript string literal.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '"') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn script(body: &str) -> Invocation {
    Invocation::new(
        "osascript",
        ["-e".to_owned(), format!("tell application \"System Events\" to {body}")],
    )
}

pub fn chord_invocation(chord: Chord) -> Result<Invocation, PlatformError> {
    let unsupported = PlatformError::Unsupported {
        mechanism: MECHANISM,
        action: "this key",
    };
    let key = keystroke_term(chord.key).ok_or(unsupported)?;
    let body = match chord.modifier {
        Some(m) => {
            let modifier = modifier_term(m).ok_or(PlatformError::Unsupported {
                mechanism: MECHANISM,
                action: "this modifier",
            })?;
            format!("keystroke {key} using {modifier}")
        }
        None => format!("keystroke {key}"),
    };
    Ok(script(&body))
}

pub fn text_invocation(text: &str) -> Invocation {
    script(&format!("keystroke \"{}\"", escape(text)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paste_script() {
        let inv = chord_invocation(Chord::CMD_V).unwrap();
        assert_eq!(inv.program, "osascript");
        assert_eq!(
            inv.args,
            vec![
                "-e",
                "tell application \"System Events\" to keystroke \"v\" using command down"
            ]
        );
    }

    #[test]
    fn ctrl_enter_script() {
        let inv = chord_invocation(Chord::CTRL_RETURN).unwrap();
        assert_eq!(
            inv.args[1],
            "tell application \"System Events\" to keystroke return using control down"
        );
    }

    #[test]
    fn scroll_lock_is_unsupported() {
        assert!(matches!(
            chord_invocation(Chord::SCROLL_LOCK),
            Err(PlatformError::Unsupported { .. })
        ));
    }

    #[test]
    fn text_is_escaped() {
        let inv = text_invocation(r#"say "hi" \o/"#);
        assert_eq!(
            inv.args[1],
            r#"tell application "System Events" to keystroke "say \"hi\" \\o/""#
        );
    }
}
