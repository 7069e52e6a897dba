//! Keyboard fallback chains.
//!
//! A `KeyChain` holds the mechanisms detected for one bundle, in the order
//! they are tried, and implements `KeyboardAdapter` on top of them. Bundles
//! differ only in how they build the chain (`linux::keyboard` and each
//! `create_bundle`) and which chords they use for paste.
//!
//! Every operation is synchronous and bounded: external tools run under the
//! key-press or text timeout from `AdapterSettings`.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use super::automation::Automation;
use super::fallback::first_success;
use super::keys::Chord;
use super::process::{CommandRunner, Invocation};
use super::{linux, macos, windows, AdapterContext, KeyboardAdapter, PlatformError};

// ---------------------------------------------------------------------------
// Mechanisms
// ---------------------------------------------------------------------------

/// External keyboard tools, all driven through `CommandRunner`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyTool {
    Xdotool,
    Xte,
    Xvkbd,
    Wtype,
    Ydotool,
}

impl KeyTool {
    pub fn name(self) -> &'static str {
        match self {
            KeyTool::Xdotool => "xdotool",
            KeyTool::Xte => "xte",
            KeyTool::Xvkbd => "xvkbd",
            KeyTool::Wtype => "wtype",
            KeyTool::Ydotool => "ydotool",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyMechanism {
    Tool(KeyTool),
    /// The generic automation library (`enigo`).
    Automation,
    /// Win32 `SendInput`.
    SendInput,
    /// `osascript` driving System Events.
    AppleScript,
}

impl KeyMechanism {
    /// Whether the mechanism can type arbitrary text.
    pub fn types_text(self) -> bool {
        !matches!(
            self,
            KeyMechanism::Tool(KeyTool::Ydotool) | KeyMechanism::Tool(KeyTool::Xvkbd)
        )
    }
}

impl fmt::Display for KeyMechanism {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyMechanism::Tool(tool) => f.write_str(tool.name()),
            KeyMechanism::Automation => f.write_str("enigo"),
            KeyMechanism::SendInput => f.write_str("SendInput"),
            KeyMechanism::AppleScript => f.write_str("osascript"),
        }
    }
}

// ---------------------------------------------------------------------------
// Driver
// ---------------------------------------------------------------------------

/// Performs one key action through one mechanism.
struct KeyDriver {
    runner: Arc<dyn CommandRunner>,
    automation: Arc<dyn Automation>,
    key_timeout: Duration,
    text_timeout: Duration,
}

impl KeyDriver {
    fn press(&self, mechanism: KeyMechanism, chord: Chord) -> Result<(), PlatformError> {
        match mechanism {
            KeyMechanism::Tool(tool) => {
                self.run(&linux::keycodes::chord_invocation(tool, chord)?, self.key_timeout)
            }
            KeyMechanism::Automation => self.automation.press_chord(chord),
            KeyMechanism::SendInput => windows::send_input::press_chord(chord),
            KeyMechanism::AppleScript => {
                self.run(&macos::applescript::chord_invocation(chord)?, self.key_timeout)
            }
        }
    }

    fn type_text(&self, mechanism: KeyMechanism, text: &str) -> Result<(), PlatformError> {
        match mechanism {
            KeyMechanism::Tool(tool) => {
                self.run(&linux::keycodes::text_invocation(tool, text)?, self.text_timeout)
            }
            KeyMechanism::Automation => self.automation.type_text(text),
            KeyMechanism::SendInput => windows::send_input::type_text(text),
            KeyMechanism::AppleScript => {
                self.run(&macos::applescript::text_invocation(text), self.text_timeout)
            }
        }
    }

    fn run(&self, invocation: &Invocation, timeout: Duration) -> Result<(), PlatformError> {
        log::trace!("keyboard: running {invocation}");
        self.runner.run(invocation, timeout)
    }
}

// ---------------------------------------------------------------------------
// Chain
// ---------------------------------------------------------------------------

/// Ordered keyboard mechanisms plus the chords a bundle uses for paste.
pub struct KeyChain {
    mechanisms: Vec<KeyMechanism>,
    /// Tried in order; each chord goes through the whole chain.
    paste_chords: Vec<Chord>,
    keep_alive_gap: Duration,
    driver: KeyDriver,
}

impl KeyChain {
    pub fn new(mechanisms: Vec<KeyMechanism>, paste_chords: &[Chord], ctx: &AdapterContext) -> Self {
        Self {
            mechanisms,
            paste_chords: paste_chords.to_vec(),
            keep_alive_gap: ctx.settings.keep_alive_gap,
            driver: KeyDriver {
                runner: ctx.backends.runner.clone(),
                automation: ctx.backends.automation.clone(),
                key_timeout: ctx.settings.key_timeout,
                text_timeout: ctx.settings.text_timeout,
            },
        }
    }

    pub fn mechanisms(&self) -> &[KeyMechanism] {
        &self.mechanisms
    }

    /// Sends `chord` through the first mechanism that accepts it.
    pub fn chord(&self, operation: &str, chord: Chord) -> bool {
        first_success(operation, &self.mechanisms, |m| self.driver.press(m, chord))
    }

    /// Taps `chord` twice, `keep_alive_gap` apart, on one mechanism.
    fn double_tap(&self, mechanism: KeyMechanism, chord: Chord) -> Result<(), PlatformError> {
        self.driver.press(mechanism, chord)?;
        std::thread::sleep(self.keep_alive_gap);
        self.driver.press(mechanism, chord)
    }
}

impl KeyboardAdapter for KeyChain {
    fn send_paste_command(&self) -> bool {
        self.paste_chords
            .iter()
            .any(|&chord| self.chord("keyboard: paste", chord))
    }

    fn send_ctrl_enter(&self) -> bool {
        self.chord("keyboard: ctrl+enter", Chord::CTRL_RETURN)
    }

    fn send_text(&self, text: &str) -> bool {
        let typists: Vec<_> = self
            .mechanisms
            .iter()
            .copied()
            .filter(|m| m.types_text())
            .collect();
        first_success("keyboard: type", &typists, |m| self.driver.type_text(m, text))
    }

    fn keep_alive(&self) -> bool {
        first_success("keyboard: keep-alive", &self.mechanisms, |m| {
            self.double_tap(m, Chord::SCROLL_LOCK)
        })
    }

    fn is_available(&self) -> bool {
        !self.mechanisms.is_empty()
    }

    fn available_methods(&self) -> Vec<String> {
        self.mechanisms.iter().map(ToString::to_string).collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    use crate::platform::testing::{FakeAutomation, FakeClipboard, Harness, RecordingRunner};

    const XDOTOOL: KeyMechanism = KeyMechanism::Tool(KeyTool::Xdotool);
    const YDOTOOL: KeyMechanism = KeyMechanism::Tool(KeyTool::Ydotool);

    #[test]
    fn first_working_tool_short_circuits() {
        let h = Harness::with(
            RecordingRunner::failing(&["xdotool"]),
            FakeAutomation::new(),
            FakeClipboard::new(),
        );
        let chain = KeyChain::new(
            vec![XDOTOOL, KeyMechanism::Tool(KeyTool::Xte), KeyMechanism::Automation],
            &[Chord::SHIFT_INSERT],
            &h.context(),
        );
        assert!(chain.send_paste_command());
        assert_eq!(h.runner.programs(), vec!["xdotool", "xte"]);
        assert!(h.automation.chords().is_empty());
    }

    #[test]
    fn keep_alive_taps_twice_on_one_mechanism() {
        let h = Harness::new();
        let chain = KeyChain::new(vec![YDOTOOL, XDOTOOL], &[Chord::SHIFT_INSERT], &h.context());
        assert!(chain.keep_alive());
        let runs = h.runner.runs();
        assert_eq!(runs.len(), 2);
        for run in runs {
            assert_eq!(run.program, "ydotool");
            assert_eq!(run.args, vec!["key", "70:1", "70:0"]);
        }
    }

    #[test]
    fn keep_alive_taps_are_a_gap_apart() {
        let h = Harness::new();
        let mut ctx = h.context();
        ctx.settings.keep_alive_gap = Duration::from_millis(100);
        let chain = KeyChain::new(vec![KeyMechanism::Automation], &[], &ctx);

        let started = Instant::now();
        assert!(chain.keep_alive());
        assert!(started.elapsed() >= Duration::from_millis(100));
        assert_eq!(h.automation.chords(), vec![Chord::SCROLL_LOCK, Chord::SCROLL_LOCK]);
    }

    #[test]
    fn failed_first_tap_skips_the_gap() {
        let h = Harness::with(RecordingRunner::new(), FakeAutomation::broken(), FakeClipboard::new());
        let mut ctx = h.context();
        ctx.settings.keep_alive_gap = Duration::from_secs(2);
        let chain = KeyChain::new(vec![KeyMechanism::Automation], &[], &ctx);

        let started = Instant::now();
        assert!(!chain.keep_alive());
        assert!(started.elapsed() < Duration::from_secs(1));
        assert_eq!(h.automation.chords().len(), 1);
    }

    #[test]
    fn text_skips_tools_that_cannot_type() {
        let h = Harness::new();
        let chain = KeyChain::new(vec![YDOTOOL, KeyMechanism::Automation], &[], &h.context());
        assert!(chain.send_text("héllo"));
        assert!(h.runner.runs().is_empty());
        assert_eq!(h.automation.texts(), vec!["héllo"]);
    }

    #[test]
    fn paste_chords_tried_in_order() {
        let h = Harness::with(RecordingRunner::new(), FakeAutomation::broken(), FakeClipboard::new());
        let chain = KeyChain::new(
            vec![KeyMechanism::Automation],
            &[Chord::SHIFT_INSERT, Chord::CTRL_V],
            &h.context(),
        );
        assert!(!chain.send_paste_command());
        assert_eq!(h.automation.chords(), vec![Chord::SHIFT_INSERT, Chord::CTRL_V]);
    }

    #[test]
    fn empty_chain_is_unavailable() {
        let h = Harness::new();
        let chain = KeyChain::new(Vec::new(), &[Chord::SHIFT_INSERT], &h.context());
        assert!(!chain.is_available());
        assert!(!chain.send_paste_command());
        assert!(!chain.send_ctrl_enter());
        assert!(!chain.send_text("x"));
        assert!(!chain.keep_alive());
        assert!(h.runner.runs().is_empty());
        assert!(h.automation.chords().is_empty());
    }

    #[test]
    fn method_names() {
        let h = Harness::new();
        let chain = KeyChain::new(
            vec![XDOTOOL, KeyMechanism::Automation, KeyMechanism::SendInput, KeyMechanism::AppleScript],
            &[],
            &h.context(),
        );
        assert_eq!(chain.available_methods(), vec!["xdotool", "enigo", "SendInput", "osascript"]);
    }
}
