//! Linux session detection.
//!
//! Determines whether the session runs under WSL, which display server is
//! active, and which desktop environment is in charge, by inspecting the
//! kernel version marker and the variables set by the session manager.
//!
//! Note: `DISPLAY` being set alongside `WAYLAND_DISPLAY` means XWayland is
//! running as a compatibility layer for legacy X11 apps. The session is still
//! classified as Wayland.

use std::path::Path;

use crate::platform::detect::{DesktopEnvironment, DisplayProtocol, SystemProbe};

/// Display and desktop facts for a Linux host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LinuxSession {
    pub display_protocol: Option<DisplayProtocol>,
    pub desktop_environment: Option<DesktopEnvironment>,
    pub is_wsl: bool,
}

// ---------------------------------------------------------------------------
// Detection
// ---------------------------------------------------------------------------

pub fn detect_session(probe: &dyn SystemProbe) -> LinuxSession {
    let wsl = probe
        .read_to_string(Path::new("/proc/version"))
        .is_some_and(|v| is_wsl_kernel(&v));
    if wsl {
        // No display server detection under WSL.
        return LinuxSession {
            display_protocol: None,
            desktop_environment: Some(DesktopEnvironment::Wsl),
            is_wsl: true,
        };
    }

    let display_protocol = classify_display(
        probe.var("WAYLAND_DISPLAY").is_some(),
        probe.var("DISPLAY").is_some(),
    );
    let desktop_environment = classify_desktop(&DesktopMarkers {
        current_desktop: probe.var("XDG_CURRENT_DESKTOP").unwrap_or_default(),
        session_desktop: probe.var("XDG_SESSION_DESKTOP").unwrap_or_default(),
        kde_session: probe.var("KDE_SESSION_VERSION").is_some(),
        i3_socket: probe.var("I3SOCK").is_some(),
    });

    LinuxSession {
        display_protocol,
        desktop_environment,
        is_wsl: false,
    }
}

/// True when a `/proc/version` string identifies a WSL kernel.
fn is_wsl_kernel(version: &str) -> bool {
    let lower = version.to_lowercase();
    lower.contains("microsoft") || lower.contains("wsl")
}

/// Classifies the display server from boolean presence flags.
///
/// Extracted from `detect_session` so the classification logic can be
/// unit-tested without mutating process environment variables.
fn classify_display(has_wayland: bool, has_display: bool) -> Option<DisplayProtocol> {
    match (has_wayland, has_display) {
        (true, _) => Some(DisplayProtocol::Wayland),
        (false, true) => Some(DisplayProtocol::X11),
        (false, false) => None,
    }
}

struct DesktopMarkers {
    current_desktop: String,
    session_desktop: String,
    kde_session: bool,
    i3_socket: bool,
}

/// First match wins: KDE > GNOME > Ubuntu > XFCE > i3.
fn classify_desktop(markers: &DesktopMarkers) -> Option<DesktopEnvironment> {
    let current = markers.current_desktop.to_lowercase();
    let session = markers.session_desktop.to_lowercase();
    let either = |needle: &str| current.contains(needle) || session.contains(needle);

    if either("kde") || markers.kde_session {
        Some(DesktopEnvironment::Kde)
    } else if either("gnome") {
        Some(DesktopEnvironment::Gnome)
    } else if current.contains("ubuntu") {
        Some(DesktopEnvironment::Ubuntu)
    } else if either("xfce") {
        Some(DesktopEnvironment::Xfce)
    } else if current.contains("i3") || markers.i3_socket {
        Some(DesktopEnvironment::I3)
    } else {
        None
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
