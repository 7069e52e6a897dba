//! One text delivery: copy, paste, notify, optionally submit.
//!
//! The request handler on the desktop side calls `deliver` once per text it
//! receives. Keyboard failure is not fatal: the text is still on the
//! clipboard and the user can paste by hand.

use std::fmt;
use std::time::Duration;

use crate::platform::AdapterBundle;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryOptions {
    /// Send Ctrl+Enter after a successful paste.
    pub submit: bool,
    /// Play the notification sound after a successful paste.
    pub play_sound: bool,
    /// Wait between the paste and Ctrl+Enter.
    pub submit_delay: Duration,
}

impl Default for DeliveryOptions {
    fn default() -> Self {
        Self {
            submit: false,
            play_sound: true,
            submit_delay: Duration::from_millis(100),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// Text pasted; `submitted` reports whether Ctrl+Enter went through.
    Pasted { submitted: bool },
    /// Text is on the clipboard but no paste keystroke could be sent.
    CopiedOnly,
    ClipboardFailed,
    /// Nothing to deliver.
    Empty,
}

impl DeliveryOutcome {
    /// True when the text reached the user in some form.
    pub fn is_success(self) -> bool {
        matches!(self, DeliveryOutcome::Pasted { .. } | DeliveryOutcome::CopiedOnly)
    }
}

impl fmt::Display for DeliveryOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DeliveryOutcome::Pasted { submitted: true } => "pasted and submitted",
            DeliveryOutcome::Pasted { submitted: false } => "pasted",
            DeliveryOutcome::CopiedOnly => "text is on the clipboard, paste manually",
            DeliveryOutcome::ClipboardFailed => "clipboard operation failed",
            DeliveryOutcome::Empty => "empty text",
        })
    }
}

pub fn deliver(bundle: &AdapterBundle, text: &str, options: &DeliveryOptions) -> DeliveryOutcome {
    if text.is_empty() {
        log::warn!("delivery: received empty text");
        return DeliveryOutcome::Empty;
    }

    if !bundle.clipboard.copy_text(text) {
        log::error!("delivery: clipboard operation failed");
        return DeliveryOutcome::ClipboardFailed;
    }

    if !bundle.keyboard.send_paste_command() {
        log::warn!("delivery: keyboard simulation failed, paste manually");
        return DeliveryOutcome::CopiedOnly;
    }

    if options.play_sound && !bundle.notifications.play_notification_sound() {
        log::debug!("delivery: notification sound failed");
    }

    let mut submitted = false;
    if options.submit {
        std::thread::sleep(options.submit_delay);
        submitted = bundle.keyboard.send_ctrl_enter();
        if !submitted {
            log::warn!("delivery: Ctrl+Enter failed, text was pasted");
        }
    }

    log::info!("delivery: pasted {} chars", text.chars().count());
    DeliveryOutcome::Pasted { submitted }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
