//! Host detection.
//!
//! `detect()` inspects environment variables, filesystem markers and the
//! executable search path, and produces an immutable `PlatformDescriptor`.
//! Detection never fails: every probe that cannot answer degrades to
//! "not found" (or `"unknown"` for the OS version).
//!
//! All host access goes through `SystemProbe` so the rules can be tested
//! against an in-memory host instead of the real environment.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use serde::{Serialize, Serializer};

use super::linux::detect as linux_detect;
use super::process::{self, Invocation};

// ---------------------------------------------------------------------------
// Probe lists
// ---------------------------------------------------------------------------

/// Linux clipboard tools, in probe order.
pub const LINUX_CLIPBOARD_TOOLS: &[&str] = &["xclip", "wl-copy", "xsel", "wl-paste"];

/// Linux keyboard tools, in probe order. Selection logic later relies on this
/// order being preserved in the inventory.
pub const LINUX_KEYBOARD_TOOLS: &[&str] = &["wtype", "ydotool", "xdotool", "xte", "xvkbd"];

pub const LINUX_AUDIO_PLAYERS: &[&str] = &["aplay", "paplay"];
pub const MACOS_AUDIO_PLAYERS: &[&str] = &["afplay"];
pub const WINDOWS_AUDIO_PLAYERS: &[&str] = &["powershell"];
pub const GENERIC_AUDIO_PLAYERS: &[&str] = &["aplay", "paplay", "afplay", "mplayer", "vlc"];

const VERSION_PROBE_TIMEOUT: Duration = Duration::from_secs(2);

// ---------------------------------------------------------------------------
// Descriptor types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OsFamily {
    Linux,
    Windows,
    MacOs,
    /// Any other OS name; served by the generic bundle.
    Other(String),
}

impl OsFamily {
    /// Maps `std::env::consts::OS` style names.
    pub fn from_os_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "linux" => OsFamily::Linux,
            "windows" => OsFamily::Windows,
            "macos" | "darwin" => OsFamily::MacOs,
            _ => OsFamily::Other(name.to_owned()),
        }
    }
}

impl fmt::Display for OsFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OsFamily::Linux => f.write_str("Linux"),
            OsFamily::Windows => f.write_str("Windows"),
            OsFamily::MacOs => f.write_str("macOS"),
            OsFamily::Other(name) => f.write_str(name),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DisplayProtocol {
    X11,
    Wayland,
    Cocoa,
}

impl fmt::Display for DisplayProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DisplayProtocol::X11 => "X11",
            DisplayProtocol::Wayland => "Wayland",
            DisplayProtocol::Cocoa => "Cocoa",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DesktopEnvironment {
    Kde,
    Gnome,
    Ubuntu,
    Xfce,
    I3,
    Windows,
    Aqua,
    Wsl,
}

impl fmt::Display for DesktopEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DesktopEnvironment::Kde => "KDE",
            DesktopEnvironment::Gnome => "GNOME",
            DesktopEnvironment::Ubuntu => "Ubuntu",
            DesktopEnvironment::Xfce => "XFCE",
            DesktopEnvironment::I3 => "i3",
            DesktopEnvironment::Windows => "Windows",
            DesktopEnvironment::Aqua => "Aqua",
            DesktopEnvironment::Wsl => "WSL",
        })
    }
}

macro_rules! serialize_as_display {
    ($($ty:ty),*) => {
        $(impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        })*
    };
}

serialize_as_display!(OsFamily, DisplayProtocol, DesktopEnvironment);

/// Optional in-process libraries, fixed at build time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Libraries {
    /// Generic keyboard automation (enigo).
    pub automation: bool,
    /// Generic clipboard library (arboard).
    pub clipboard: bool,
    /// System tray library (tray-icon).
    pub tray: bool,
    /// Windows `SendInput`.
    pub native_input: bool,
    /// `MessageBeep` / `NSBeep`.
    pub system_beep: bool,
}

impl Libraries {
    /// Flags for the running binary on the given OS family.
    pub fn compiled_in(os: &OsFamily) -> Self {
        Self {
            automation: cfg!(feature = "automation"),
            clipboard: cfg!(feature = "clipboard-lib"),
            // Status items on macOS must live on the main thread, which the
            // background tray loop cannot provide.
            tray: cfg!(feature = "tray") && *os != OsFamily::MacOs,
            native_input: cfg!(target_os = "windows") && *os == OsFamily::Windows,
            system_beep: (cfg!(target_os = "windows") && *os == OsFamily::Windows)
                || (cfg!(target_os = "macos") && *os == OsFamily::MacOs),
        }
    }
}

/// Externally installed executables and in-process libraries found at probe time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolInventory {
    pub clipboard_tools: Vec<String>,
    pub keyboard_tools: Vec<String>,
    pub audio_players: Vec<String>,
    pub libraries: Libraries,
}

impl ToolInventory {
    pub fn has_keyboard_tool(&self, tool: &str) -> bool {
        self.keyboard_tools.iter().any(|t| t == tool)
    }

    pub fn has_clipboard_tool(&self, tool: &str) -> bool {
        self.clipboard_tools.iter().any(|t| t == tool)
    }

    pub fn has_audio_player(&self, player: &str) -> bool {
        self.audio_players.iter().any(|p| p == player)
    }
}

/// Immutable snapshot of the detected environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformDescriptor {
    pub os_family: OsFamily,
    pub os_version: String,
    pub display_protocol: Option<DisplayProtocol>,
    pub desktop_environment: Option<DesktopEnvironment>,
    #[serde(rename = "isWSL")]
    pub is_wsl: bool,
    pub tool_inventory: ToolInventory,
}

impl PlatformDescriptor {
    /// A descriptor with nothing detected beyond the OS family.
    pub fn new(os_family: OsFamily) -> Self {
        Self {
            os_family,
            os_version: "unknown".into(),
            display_protocol: None,
            desktop_environment: None,
            is_wsl: false,
            tool_inventory: ToolInventory::default(),
        }
    }

    pub fn with_display_protocol(mut self, protocol: DisplayProtocol) -> Self {
        self.display_protocol = Some(protocol);
        self
    }

    pub fn with_desktop(mut self, desktop: DesktopEnvironment) -> Self {
        self.desktop_environment = Some(desktop);
        self
    }

    pub fn with_keyboard_tools(mut self, tools: &[&str]) -> Self {
        self.tool_inventory.keyboard_tools = tools.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn with_clipboard_tools(mut self, tools: &[&str]) -> Self {
        self.tool_inventory.clipboard_tools = tools.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn with_audio_players(mut self, players: &[&str]) -> Self {
        self.tool_inventory.audio_players = players.iter().map(|p| p.to_string()).collect();
        self
    }

    pub fn with_libraries(mut self, libraries: Libraries) -> Self {
        self.tool_inventory.libraries = libraries;
        self
    }

    /// Key under which the factory caches this descriptor's bundle.
    pub fn cache_key(&self) -> String {
        fn or_none<T: fmt::Display>(v: &Option<T>) -> String {
            v.as_ref().map_or_else(|| "None".to_owned(), |v| v.to_string())
        }
        format!(
            "{}_{}_{}",
            self.os_family,
            or_none(&self.display_protocol),
            or_none(&self.desktop_environment)
        )
    }

    pub fn is_wayland(&self) -> bool {
        self.display_protocol == Some(DisplayProtocol::Wayland)
    }

    pub fn is_kde(&self) -> bool {
        self.desktop_environment == Some(DesktopEnvironment::Kde)
    }
}

// ---------------------------------------------------------------------------
// Host access
// ---------------------------------------------------------------------------

/// Read-only view of the host used by detection.
pub trait SystemProbe {
    /// OS name in `std::env::consts::OS` form.
    fn os_name(&self) -> String;

    /// Non-empty value of an environment variable.
    fn var(&self, key: &str) -> Option<String>;

    fn read_to_string(&self, path: &Path) -> Option<String>;

    fn has_executable(&self, name: &str) -> bool;

    /// Trimmed stdout of a short-lived command.
    fn command_output(&self, program: &str, args: &[&str]) -> Option<String>;
}

/// The real host.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostProbe;

impl SystemProbe for HostProbe {
    fn os_name(&self) -> String {
        std::env::consts::OS.to_owned()
    }

    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|v| !v.is_empty())
    }

    fn read_to_string(&self, path: &Path) -> Option<String> {
        std::fs::read_to_string(path).ok()
    }

    fn has_executable(&self, name: &str) -> bool {
        process::find_executable(name).is_some()
    }

    fn command_output(&self, program: &str, args: &[&str]) -> Option<String> {
        let invocation = Invocation::new(program, args.iter().copied());
        process::capture_stdout(&invocation, VERSION_PROBE_TIMEOUT)
            .ok()
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty())
    }
}

// ---------------------------------------------------------------------------
// Detection
// ---------------------------------------------------------------------------

/// Detects the running host.
pub fn detect() -> PlatformDescriptor {
    detect_with(&HostProbe)
}

/// Detects a host through `probe`.
pub fn detect_with(probe: &dyn SystemProbe) -> PlatformDescriptor {
    let os_family = OsFamily::from_os_name(&probe.os_name());
    let mut descriptor = PlatformDescriptor::new(os_family.clone());
    descriptor.os_version = os_version(probe, &os_family);

    let (clipboard_probe, keyboard_probe, audio_probe): (&[&str], &[&str], &[&str]) =
        match os_family {
            OsFamily::Linux => {
                let session = linux_detect::detect_session(probe);
                descriptor.display_protocol = session.display_protocol;
                descriptor.desktop_environment = session.desktop_environment;
                descriptor.is_wsl = session.is_wsl;
                (LINUX_CLIPBOARD_TOOLS, LINUX_KEYBOARD_TOOLS, LINUX_AUDIO_PLAYERS)
            }
            OsFamily::Windows => {
                descriptor.desktop_environment = Some(DesktopEnvironment::Windows);
                (&["clip"], &[], WINDOWS_AUDIO_PLAYERS)
            }
            OsFamily::MacOs => {
                descriptor.desktop_environment = Some(DesktopEnvironment::Aqua);
                descriptor.display_protocol = Some(DisplayProtocol::Cocoa);
                (&["pbcopy"], &["osascript"], MACOS_AUDIO_PLAYERS)
            }
            OsFamily::Other(_) => (&[], &[], GENERIC_AUDIO_PLAYERS),
        };

    let inventory = &mut descriptor.tool_inventory;
    inventory.clipboard_tools = probe_tools(probe, clipboard_probe);
    inventory.keyboard_tools = probe_tools(probe, keyboard_probe);
    inventory.audio_players = probe_tools(probe, audio_probe);
    inventory.libraries = Libraries::compiled_in(&os_family);

    log::debug!(
        "detect: {} {} display={:?} desktop={:?} wsl={} keyboard={:?} clipboard={:?}",
        descriptor.os_family,
        descriptor.os_version,
        descriptor.display_protocol,
        descriptor.desktop_environment,
        descriptor.is_wsl,
        descriptor.tool_inventory.keyboard_tools,
        descriptor.tool_inventory.clipboard_tools,
    );

    descriptor
}

/// Returns the tools from `candidates` that exist, preserving probe order.
fn probe_tools(probe: &dyn SystemProbe, candidates: &[&str]) -> Vec<String> {
    candidates
        .iter()
        .filter(|tool| probe.has_executable(tool))
        .map(|tool| (*tool).to_owned())
        .collect()
}

fn os_version(probe: &dyn SystemProbe, os: &OsFamily) -> String {
    let version = match os {
        OsFamily::Linux => probe
            .read_to_string(Path::new("/proc/sys/kernel/osrelease"))
            .map(|s| s.trim().to_owned()),
        OsFamily::MacOs => probe.command_output("sw_vers", &["-productVersion"]),
        OsFamily::Windows => probe.command_output("cmd", &["/C", "ver"]),
        OsFamily::Other(_) => None,
    };
    version
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| "unknown".into())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
