//! Platform abstraction layer.
//!
//! Defines the five adapter traits (keyboard, clipboard, tray, resources,
//! notifications), the `AdapterBundle` that groups one implementation of each,
//! and the shared error type. Detection lives in `detect`, the support-level
//! model in `capability`, and bundle construction in `factory`.
//!
//! Every adapter operation is total: failures are absorbed inside the adapter
//! and surface only as a `false` return. `PlatformError` is used internally
//! between a mechanism attempt and the fallback chain that consumes it.

pub mod automation;
pub mod capability;
pub mod clipboard;
pub mod detect;
pub mod factory;
mod fallback;
mod generic;
pub mod keyboard;
pub mod keys;
mod linux;
mod macos;
pub mod notification;
pub mod process;
pub mod resources;
pub mod tray;
mod windows;

#[cfg(test)]
pub(crate) mod testing;

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

pub use automation::Automation;
pub use capability::{Capabilities, CapabilityReport, Feature, SupportLevel};
pub use clipboard::ClipboardLibrary;
pub use detect::{
    detect, DesktopEnvironment, DisplayProtocol, Libraries, OsFamily, PlatformDescriptor,
    ToolInventory,
};
pub use factory::AdapterFactory;
pub use process::{CommandRunner, Invocation, SystemRunner};
pub use resources::IconImage;
pub use tray::MenuItem;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Failure of a single mechanism attempt.
///
/// Never crosses the adapter boundary; the fallback chain logs it and moves on
/// to the next candidate.
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("{0}")]
    Unavailable(String),

    #[error("{mechanism} cannot perform {action}")]
    Unsupported {
        mechanism: &'static str,
        action: &'static str,
    },

    #[error("failed to launch {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} timed out after {timeout:?}")]
    Timeout { program: String, timeout: Duration },

    #[error("{program} exited with {status}")]
    ExitStatus {
        program: String,
        status: std::process::ExitStatus,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

// ---------------------------------------------------------------------------
// Adapter traits
// ---------------------------------------------------------------------------

/// Simulated keystrokes delivered to the focused application.
pub trait KeyboardAdapter: Send + Sync {
    /// Shift+Insert on Linux and Windows, Cmd+V on macOS.
    fn send_paste_command(&self) -> bool;

    /// Ctrl+Return on every platform.
    fn send_ctrl_enter(&self) -> bool;

    /// Types `text` directly instead of going through the clipboard.
    fn send_text(&self, text: &str) -> bool;

    /// Taps Scroll Lock twice to reset OS idle timers.
    fn keep_alive(&self) -> bool;

    /// True if at least one mechanism was detected at construction.
    fn is_available(&self) -> bool;

    /// Names of the detected mechanisms, in the order they are tried.
    fn available_methods(&self) -> Vec<String>;
}

pub trait ClipboardAdapter: Send + Sync {
    /// Selects the preferred tool. Called once by `AdapterBundle::initialize`.
    fn setup(&mut self);

    /// Places `text` on the system clipboard.
    fn copy_text(&self, text: &str) -> bool;

    fn is_available(&self) -> bool;

    fn preferred_tool(&self) -> Option<String>;
}

pub trait TrayAdapter: Send + Sync {
    /// Builds the icon and menu and runs the event loop on a background thread.
    fn create_tray_icon(&self, menu_items: Vec<MenuItem>) -> bool;

    fn is_supported(&self) -> bool;

    /// Removes the icon. Safe to call repeatedly or before `create_tray_icon`.
    fn stop(&self);
}

pub trait ResourceAdapter: Send + Sync {
    /// First existing file among `icon_names`, searched across all icon roots.
    fn icon_path(&self, icon_names: &[&str]) -> Option<PathBuf>;

    fn resource_path(&self, resource_name: &str) -> Option<PathBuf>;

    /// Decodes an image file into RGBA pixels.
    fn load_image(&self, path: &Path) -> Option<IconImage>;

    fn app_data_dir(&self) -> Option<PathBuf>;
}

pub trait NotificationAdapter: Send + Sync {
    /// Plays the bundled sound, falling back to a system beep and then to the
    /// terminal bell.
    fn play_notification_sound(&self) -> bool;

    fn is_supported(&self) -> bool;
}

// ---------------------------------------------------------------------------
// Construction context
// ---------------------------------------------------------------------------

/// Immutable tunables handed to every adapter at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct AdapterSettings {
    pub app_name: String,
    /// Timeout for a single key-press invocation.
    pub key_timeout: Duration,
    /// Timeout for typing a whole string.
    pub text_timeout: Duration,
    /// Gap between the two Scroll Lock taps of `keep_alive`.
    pub keep_alive_gap: Duration,
    /// Delay after a successful copy before a paste may be sent.
    pub clipboard_settle: Duration,
    /// Custom notification sound; relative paths go through the resource adapter.
    pub sound_file: PathBuf,
}

impl Default for AdapterSettings {
    fn default() -> Self {
        Self {
            app_name: "PasteBridge".into(),
            key_timeout: Duration::from_secs(1),
            text_timeout: Duration::from_secs(5),
            keep_alive_gap: Duration::from_millis(100),
            clipboard_settle: Duration::from_millis(100),
            sound_file: PathBuf::from("assets/notification.wav"),
        }
    }
}

/// Side-effecting backends the adapters drive.
#[derive(Clone)]
pub struct Backends {
    pub runner: Arc<dyn CommandRunner>,
    pub automation: Arc<dyn Automation>,
    pub clipboard: Arc<dyn ClipboardLibrary>,
}

impl Default for Backends {
    fn default() -> Self {
        Self {
            runner: Arc::new(SystemRunner),
            automation: Arc::new(automation::EnigoAutomation),
            clipboard: Arc::new(clipboard::ArboardClipboard),
        }
    }
}

impl fmt::Debug for Backends {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Backends").finish_non_exhaustive()
    }
}

/// Everything a bundle constructor needs besides the descriptor.
#[derive(Debug, Clone, Default)]
pub struct AdapterContext {
    pub backends: Backends,
    pub settings: AdapterSettings,
}

// ---------------------------------------------------------------------------
// Adapter bundle
// ---------------------------------------------------------------------------

/// Which constructor produced a bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BundleKind {
    Linux,
    Windows,
    MacOs,
    Generic,
}

impl fmt::Display for BundleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BundleKind::Linux => "linux",
            BundleKind::Windows => "windows",
            BundleKind::MacOs => "macos",
            BundleKind::Generic => "generic",
        })
    }
}

/// One platform's implementation of all five capabilities.
pub struct AdapterBundle {
    pub kind: BundleKind,
    pub descriptor: PlatformDescriptor,
    pub keyboard: Box<dyn KeyboardAdapter>,
    pub clipboard: Box<dyn ClipboardAdapter>,
    pub system_tray: Box<dyn TrayAdapter>,
    pub resources: Box<dyn ResourceAdapter>,
    pub notifications: Box<dyn NotificationAdapter>,
}

impl AdapterBundle {
    /// One-time setup run by the factory before the bundle is shared.
    pub fn initialize(&mut self) {
        self.clipboard.setup();
        log::debug!(
            "factory: {} bundle ready (keyboard: [{}], clipboard: {:?})",
            self.kind,
            self.keyboard.available_methods().join(", "),
            self.clipboard.preferred_tool()
        );
    }
}

impl fmt::Debug for AdapterBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdapterBundle")
            .field("kind", &self.kind)
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}
