//! Notification sound.
//!
//! Three independent layers, each best-effort:
//!
//! 1. the bundled sound file through the first audio player that launches,
//! 2. the OS system beep (`MessageBeep`, `NSBeep`),
//! 3. a BEL character on stdout.
//!
//! Players are spawned detached; a player that starts but cannot decode the
//! file still counts as success.

use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::detect::{OsFamily, PlatformDescriptor};
use super::fallback::first_success;
use super::process::{CommandRunner, Invocation};
use super::resources::ResourceLocator;
use super::{AdapterContext, NotificationAdapter, PlatformError};

// ---------------------------------------------------------------------------
// Players
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundPlayer {
    Aplay,
    Paplay,
    Afplay,
    Mplayer,
    Vlc,
    PowerShell,
}

impl SoundPlayer {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "aplay" => Some(SoundPlayer::Aplay),
            "paplay" => Some(SoundPlayer::Paplay),
            "afplay" => Some(SoundPlayer::Afplay),
            "mplayer" => Some(SoundPlayer::Mplayer),
            "vlc" => Some(SoundPlayer::Vlc),
            "powershell" => Some(SoundPlayer::PowerShell),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SoundPlayer::Aplay => "aplay",
            SoundPlayer::Paplay => "paplay",
            SoundPlayer::Afplay => "afplay",
            SoundPlayer::Mplayer => "mplayer",
            SoundPlayer::Vlc => "vlc",
            SoundPlayer::PowerShell => "powershell",
        }
    }

    pub fn invocation(self, file: &Path) -> Invocation {
        let file = file.display().to_string();
        match self {
            SoundPlayer::PowerShell => Invocation::new(
                "powershell",
                [
                    "-c".to_owned(),
                    format!(
                        "(New-Object Media.SoundPlayer \"{}\").PlaySync();",
                        escape_powershell(&file)
                    ),
                ],
            ),
            player => Invocation::new(player.name(), [file]),
        }
    }
}

/// Escapes `s` for a double-quoted PowerShell string, where the backtick is
/// the escape character and `$` starts an expansion.
fn escape_powershell(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '`' | '"' | '$') {
            out.push('`');
        }
        out.push(c);
    }
    out
}

impl fmt::Display for SoundPlayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// System beep
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemBeep {
    /// `MessageBeep(MB_ICONASTERISK)`.
    MessageBeep,
    /// AppKit `NSBeep()`.
    NsBeep,
}

impl SystemBeep {
    fn for_platform(descriptor: &PlatformDescriptor) -> Option<Self> {
        if !descriptor.tool_inventory.libraries.system_beep {
            return None;
        }
        match descriptor.os_family {
            OsFamily::Windows => Some(SystemBeep::MessageBeep),
            OsFamily::MacOs => Some(SystemBeep::NsBeep),
            _ => None,
        }
    }

    fn beep(self) -> Result<(), PlatformError> {
        match self {
            SystemBeep::MessageBeep => message_beep(),
            SystemBeep::NsBeep => ns_beep(),
        }
    }
}

#[cfg(target_os = "windows")]
fn message_beep() -> Result<(), PlatformError> {
    use windows_sys::Win32::System::Diagnostics::Debug::MessageBeep;
    use windows_sys::Win32::UI::WindowsAndMessaging::MB_ICONASTERISK;

    if unsafe { MessageBeep(MB_ICONASTERISK) } == 0 {
        return Err(std::io::Error::last_os_error().into());
    }
    Ok(())
}

#[cfg(not(target_os = "windows"))]
fn message_beep() -> Result<(), PlatformError> {
    Err(PlatformError::Unavailable("MessageBeep requires Windows".into()))
}

#[cfg(target_os = "macos")]
fn ns_beep() -> Result<(), PlatformError> {
    #[link(name = "AppKit", kind = "framework")]
    extern "C" {
        fn NSBeep();
    }
    unsafe { NSBeep() };
    Ok(())
}

#[cfg(not(target_os = "macos"))]
fn ns_beep() -> Result<(), PlatformError> {
    Err(PlatformError::Unavailable("NSBeep requires macOS".into()))
}

fn ring_bell() -> bool {
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(b"\x07").and_then(|()| stdout.flush()).is_ok()
}

// ---------------------------------------------------------------------------
// Adapter
// ---------------------------------------------------------------------------

pub(crate) struct SoundNotifier {
    runner: Arc<dyn CommandRunner>,
    players: Vec<SoundPlayer>,
    beep: Option<SystemBeep>,
    sound_file: PathBuf,
    locator: ResourceLocator,
}

impl SoundNotifier {
    /// `preferred` lists the players this platform knows how to drive, in
    /// order; only those found by detection are kept.
    pub(crate) fn new(
        descriptor: &PlatformDescriptor,
        ctx: &AdapterContext,
        preferred: &[&str],
        locator: ResourceLocator,
    ) -> Self {
        let inventory = &descriptor.tool_inventory;
        let players = preferred
            .iter()
            .filter(|p| inventory.has_audio_player(p))
            .filter_map(|p| SoundPlayer::from_name(p))
            .collect();
        Self {
            runner: ctx.backends.runner.clone(),
            players,
            beep: SystemBeep::for_platform(descriptor),
            sound_file: ctx.settings.sound_file.clone(),
            locator,
        }
    }

    fn play_file(&self) -> bool {
        let Some(file) = self.locator.resolve(&self.sound_file) else {
            log::debug!("notify: {} not found", self.sound_file.display());
            return false;
        };
        first_success("notify: play", &self.players, |player| {
            self.runner.spawn_detached(&player.invocation(&file))
        })
    }
}

impl NotificationAdapter for SoundNotifier {
    fn play_notification_sound(&self) -> bool {
        if self.play_file() {
            return true;
        }
        if let Some(beep) = self.beep {
            match beep.beep() {
                Ok(()) => return true,
                Err(e) => log::debug!("notify: system beep failed: {e}"),
            }
        }
        ring_bell()
    }

    fn is_supported(&self) -> bool {
        !self.players.is_empty() || self.beep.is_some()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::detect::{GENERIC_AUDIO_PLAYERS, LINUX_AUDIO_PLAYERS};
    use crate::platform::testing::{FakeAutomation, FakeClipboard, Harness, RecordingRunner};

    fn linux(players: &[&str]) -> PlatformDescriptor {
        PlatformDescriptor::new(OsFamily::Linux).with_audio_players(players)
    }

    fn bundle_with_sound() -> (tempfile::TempDir, ResourceLocator) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("assets")).unwrap();
        std::fs::write(dir.path().join("assets/notification.wav"), b"RIFF").unwrap();
        let locator = ResourceLocator {
            bundle_dirs: vec![dir.path().to_path_buf()],
            ..ResourceLocator::default()
        };
        (dir, locator)
    }

    #[test]
    fn plays_bundled_file_detached() {
        let (dir, locator) = bundle_with_sound();
        let h = Harness::new();
        let n = SoundNotifier::new(&linux(&["paplay"]), &h.context(), LINUX_AUDIO_PLAYERS, locator);
        assert!(n.is_supported());
        assert!(n.play_notification_sound());

        let spawned = h.runner.detached();
        assert_eq!(spawned.len(), 1);
        assert_eq!(spawned[0].program, "paplay");
        assert_eq!(
            spawned[0].args,
            vec![dir.path().join("assets/notification.wav").display().to_string()]
        );
        assert!(h.runner.runs().is_empty());
    }

    #[test]
    fn failing_player_falls_through_to_next() {
        let (_dir, locator) = bundle_with_sound();
        let h = Harness::with(RecordingRunner::failing(&["aplay"]), FakeAutomation::new(), FakeClipboard::new());
        let n = SoundNotifier::new(&linux(&["aplay", "paplay"]), &h.context(), LINUX_AUDIO_PLAYERS, locator);
        assert!(n.play_notification_sound());
        let programs: Vec<_> = h.runner.detached().into_iter().map(|i| i.program).collect();
        assert_eq!(programs, vec!["aplay", "paplay"]);
    }

    #[test]
    fn missing_file_skips_players() {
        let h = Harness::new();
        let n = SoundNotifier::new(
            &linux(&["aplay"]),
            &h.context(),
            LINUX_AUDIO_PLAYERS,
            ResourceLocator::default(),
        );
        // Terminal bell still succeeds.
        assert!(n.play_notification_sound());
        assert!(h.runner.detached().is_empty());
    }

    #[test]
    fn players_follow_platform_order() {
        let h = Harness::new();
        let d = PlatformDescriptor::new(OsFamily::Other("freebsd".into()))
            .with_audio_players(&["vlc", "mplayer"]);
        let n = SoundNotifier::new(&d, &h.context(), GENERIC_AUDIO_PLAYERS, ResourceLocator::default());
        assert_eq!(n.players, vec![SoundPlayer::Mplayer, SoundPlayer::Vlc]);
    }

    #[test]
    fn no_players_no_beep_is_unsupported() {
        let h = Harness::new();
        let n = SoundNotifier::new(&linux(&[]), &h.context(), LINUX_AUDIO_PLAYERS, ResourceLocator::default());
        assert!(!n.is_supported());
    }

    #[test]
    fn powershell_path_is_escaped() {
        let inv = SoundPlayer::PowerShell.invocation(Path::new(r#"C:/a"b/`x`/$env/n.wav"#));
        assert_eq!(
            inv.args[1],
            r#"(New-Object Media.SoundPlayer "C:/a`"b/``x``/`$env/n.wav").PlaySync();"#
        );
    }

    #[test]
    fn powershell_command() {
        let inv = SoundPlayer::PowerShell.invocation(Path::new("C:/app/assets/notification.wav"));
        assert_eq!(inv.program, "powershell");
        assert_eq!(
            inv.args,
            vec![
                "-c",
                "(New-Object Media.SoundPlayer \"C:/app/assets/notification.wav\").PlaySync();"
            ]
        );
    }
}
