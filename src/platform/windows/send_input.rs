//! Native keyboard injection via `SendInput`.
//!
//! Each call submits the whole sequence in one `SendInput` call, so the
//! events cannot interleave with physical input. On other hosts both entry
//! points fail with `Unavailable`.

use super::keycodes::{self, KeyEvent};
use crate::platform::keys::Chord;
use crate::platform::PlatformError;

pub(crate) fn press_chord(chord: Chord) -> Result<(), PlatformError> {
    send(&keycodes::chord_events(chord))
}

pub(crate) fn type_text(text: &str) -> Result<(), PlatformError> {
    send(&keycodes::text_events(text))
}

#[cfg(target_os = "windows")]
fn send(events: &[KeyEvent]) -> Result<(), PlatformError> {
    use windows_sys::Win32::UI::Input::KeyboardAndMouse::{
        SendInput, INPUT, INPUT_0, INPUT_KEYBOARD, KEYBDINPUT,
    };

    if events.is_empty() {
        return Ok(());
    }

    let inputs: Vec<INPUT> = events
        .iter()
        .map(|e| INPUT {
            r#type: INPUT_KEYBOARD,
            Anonymous: INPUT_0 {
                ki: KEYBDINPUT {
                    wVk: e.vk,
                    wScan: e.scan,
                    dwFlags: e.flags,
                    time: 0,
                    dwExtraInfo: 0,
                },
            },
        })
        .collect();

    let sent = unsafe {
        SendInput(
            inputs.len() as u32,
            inputs.as_ptr(),
            std::mem::size_of::<INPUT>() as i32,
        )
    };

    // A short count means UIPI blocked the injection part-way.
    if sent as usize != inputs.len() {
        return Err(PlatformError::Other(format!(
            "SendInput accepted {sent} of {} events",
            inputs.len()
        )));
    }
    log::trace!("keyboard: SendInput injected {sent} events");
    Ok(())
}

#[cfg(not(target_os = "windows"))]
fn send(_events: &[KeyEvent]) -> Result<(), PlatformError> {
    Err(PlatformError::Unavailable("SendInput requires Windows".into()))
}
