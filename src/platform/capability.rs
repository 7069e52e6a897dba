//! Support-level classification per feature.
//!
//! A pure function of the descriptor. Used for diagnostics (`probe`) and to
//! decide whether the tray may be created; the keyboard and clipboard adapters
//! build their chains from the inventory directly.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use super::detect::{OsFamily, PlatformDescriptor};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    KeyboardSimulation,
    Clipboard,
    SystemTray,
    ResourceLoading,
}

impl Feature {
    pub const ALL: [Feature; 4] = [
        Feature::KeyboardSimulation,
        Feature::Clipboard,
        Feature::SystemTray,
        Feature::ResourceLoading,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Feature::KeyboardSimulation => "keyboard_simulation",
            Feature::Clipboard => "clipboard",
            Feature::SystemTray => "system_tray",
            Feature::ResourceLoading => "resource_loading",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SupportLevel {
    Supported,
    Partial,
    NotSupported,
    Unknown,
}

impl SupportLevel {
    /// `supported` or `partial`.
    pub fn is_usable(self) -> bool {
        matches!(self, SupportLevel::Supported | SupportLevel::Partial)
    }
}

impl fmt::Display for SupportLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SupportLevel::Supported => "supported",
            SupportLevel::Partial => "partial",
            SupportLevel::NotSupported => "not_supported",
            SupportLevel::Unknown => "unknown",
        })
    }
}

/// Feature key → support level.
pub type CapabilityReport = BTreeMap<Feature, SupportLevel>;

/// Feature key → advisory strings.
pub type Advice = BTreeMap<Feature, Vec<String>>;

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
pub struct Capabilities<'a> {
    descriptor: &'a PlatformDescriptor,
}

impl<'a> Capabilities<'a> {
    pub fn new(descriptor: &'a PlatformDescriptor) -> Self {
        Self { descriptor }
    }

    pub fn level(&self, feature: Feature) -> SupportLevel {
        match feature {
            Feature::KeyboardSimulation => self.keyboard_simulation(),
            Feature::Clipboard => self.clipboard(),
            Feature::SystemTray => self.system_tray(),
            Feature::ResourceLoading => SupportLevel::Supported,
        }
    }

    pub fn report(&self) -> CapabilityReport {
        Feature::ALL.iter().map(|&f| (f, self.level(f))).collect()
    }

    pub fn supports(&self, feature: Feature) -> bool {
        self.level(feature).is_usable()
    }

    fn keyboard_simulation(&self) -> SupportLevel {
        let d = self.descriptor;
        let inventory = &d.tool_inventory;
        match d.os_family {
            OsFamily::Windows | OsFamily::MacOs => SupportLevel::Supported,
            OsFamily::Linux if d.is_wayland() => {
                if inventory.has_keyboard_tool("wtype") || inventory.has_keyboard_tool("ydotool") {
                    SupportLevel::Partial
                } else {
                    SupportLevel::NotSupported
                }
            }
            OsFamily::Linux if inventory.keyboard_tools.is_empty() => SupportLevel::NotSupported,
            OsFamily::Linux => SupportLevel::Supported,
            OsFamily::Other(_) => SupportLevel::Unknown,
        }
    }

    fn clipboard(&self) -> SupportLevel {
        let d = self.descriptor;
        match d.os_family {
            OsFamily::Windows | OsFamily::MacOs => SupportLevel::Supported,
            OsFamily::Linux if d.tool_inventory.clipboard_tools.is_empty() => SupportLevel::Partial,
            OsFamily::Linux => SupportLevel::Supported,
            OsFamily::Other(_) => SupportLevel::Unknown,
        }
    }

    fn system_tray(&self) -> SupportLevel {
        let d = self.descriptor;
        if !d.tool_inventory.libraries.tray {
            return SupportLevel::NotSupported;
        }
        match d.os_family {
            OsFamily::Linux if d.is_wayland() && d.is_kde() => SupportLevel::Partial,
            OsFamily::Linux if d.is_wayland() => SupportLevel::NotSupported,
            OsFamily::Linux | OsFamily::Windows | OsFamily::MacOs => SupportLevel::Supported,
            OsFamily::Other(_) => SupportLevel::Unknown,
        }
    }

    // -----------------------------------------------------------------------
    // Advice
    // -----------------------------------------------------------------------

    /// Advisory strings per feature, naming the same mechanism families the
    /// adapters try.
    pub fn recommended_approaches(&self) -> Advice {
        let d = self.descriptor;
        let mut advice: Advice = Feature::ALL.iter().map(|&f| (f, Vec::new())).collect();
        let mut add = |feature: Feature, text: String| {
            advice.entry(feature).or_default().push(text);
        };

        match d.os_family {
            OsFamily::Linux => {
                if d.is_wayland() {
                    if d.is_kde() {
                        add(Feature::KeyboardSimulation, "KDE Wayland may support xdotool through XWayland".into());
                    }
                    add(Feature::KeyboardSimulation, "Use wtype if available".into());
                    add(Feature::KeyboardSimulation, "Try ydotool as fallback".into());
                    add(Feature::SystemTray, "Tray icons may not work on Wayland".into());
                } else if d.display_protocol.is_some() {
                    add(Feature::KeyboardSimulation, "Use xdotool as primary method".into());
                    add(Feature::KeyboardSimulation, "Try xte or xvkbd as fallback".into());
                }
                add(Feature::KeyboardSimulation, "The enigo automation library is the last resort".into());

                let tools = &d.tool_inventory.clipboard_tools;
                if tools.is_empty() {
                    add(Feature::Clipboard, "Install xclip for X11 or wl-clipboard for Wayland".into());
                } else {
                    add(Feature::Clipboard, format!("Available tools: {}", tools.join(", ")));
                }
            }
            OsFamily::Windows => {
                add(Feature::KeyboardSimulation, "Use enigo or the SendInput API".into());
                add(Feature::Clipboard, "Use the Windows clipboard API, or clip.exe".into());
            }
            OsFamily::MacOs => {
                add(Feature::KeyboardSimulation, "Use enigo or AppleScript via osascript".into());
                add(Feature::Clipboard, "Use the system pasteboard API, or pbcopy".into());
            }
            OsFamily::Other(_) => {
                add(Feature::KeyboardSimulation, "Only the enigo automation library is tried".into());
                add(Feature::Clipboard, "Only the arboard clipboard library is tried".into());
            }
        }
        add(Feature::ResourceLoading, "Resources are looked up next to the executable, then the working directory".into());
        advice
    }

    /// What the user can do instead when a Linux feature is limited.
    pub fn fallback_methods(&self) -> Advice {
        let mut fallbacks = Advice::new();
        if self.descriptor.os_family != OsFamily::Linux {
            return fallbacks;
        }
        if self.keyboard_simulation() != SupportLevel::Supported {
            fallbacks.insert(
                Feature::KeyboardSimulation,
                vec!["Ask user to manually paste".into(), "Use clipboard-only mode".into()],
            );
        }
        if self.system_tray() != SupportLevel::Supported {
            fallbacks.insert(
                Feature::SystemTray,
                vec!["Keep window visible".into(), "Use minimize to taskbar".into()],
            );
        }
        fallbacks
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
