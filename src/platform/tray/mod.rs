//! System tray icon.
//!
//! `SystemTray` decides support from the capability model and, when built
//! with the `tray` feature, hands the menu to `host`, which owns the icon and
//! its event loop on a single toolkit thread shared by every create.

#[cfg(any(feature = "tray", test))]
mod dispatch;
#[cfg(feature = "tray")]
mod host;

use std::fmt;
use std::sync::{Arc, Mutex};

use super::capability::{Capabilities, Feature};
use super::detect::PlatformDescriptor;
use super::resources::{IconImage, ResourceLocator};
use super::TrayAdapter;

/// Icon used when no `icon.png` is bundled.
const FALLBACK_ICON_RGBA: [u8; 4] = [0x00, 0x7A, 0xFF, 0xFF];
const FALLBACK_ICON_SIZE: u32 = 64;
const ICON_NAMES: &[&str] = &["icon.png", "assets/icon.png"];

// ---------------------------------------------------------------------------
// Menu items
// ---------------------------------------------------------------------------

pub type MenuAction = Arc<dyn Fn() + Send + Sync>;

#[derive(Clone)]
pub struct MenuItem {
    pub label: String,
    pub action: MenuAction,
    pub enabled: bool,
}

impl MenuItem {
    pub fn new(label: impl Into<String>, action: impl Fn() + Send + Sync + 'static) -> Self {
        Self {
            label: label.into(),
            action: Arc::new(action),
            enabled: true,
        }
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

impl fmt::Debug for MenuItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MenuItem")
            .field("label", &self.label)
            .field("enabled", &self.enabled)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Adapter
// ---------------------------------------------------------------------------

#[cfg_attr(not(feature = "tray"), allow(dead_code))]
pub(crate) struct SystemTray {
    supported: bool,
    tooltip: String,
    locator: ResourceLocator,
    active: Mutex<bool>,
}

impl SystemTray {
    pub(crate) fn new(descriptor: &PlatformDescriptor, app_name: &str, locator: ResourceLocator) -> Self {
        Self {
            supported: Capabilities::new(descriptor).supports(Feature::SystemTray),
            tooltip: format!("{app_name} - Remote Input"),
            locator,
            active: Mutex::new(false),
        }
    }

    /// Records whether an icon is shown and returns the previous state.
    fn set_active(&self, value: bool) -> bool {
        let mut guard = self.active.lock().unwrap_or_else(|e| e.into_inner());
        std::mem::replace(&mut *guard, value)
    }

    #[cfg_attr(not(feature = "tray"), allow(dead_code))]
    fn icon(&self) -> IconImage {
        self.locator
            .find_icon(ICON_NAMES)
            .and_then(|path| match IconImage::open(&path) {
                Ok(img) => Some(img),
                Err(e) => {
                    log::debug!("tray: cannot decode {}: {e}", path.display());
                    None
                }
            })
            .unwrap_or_else(|| IconImage::solid(FALLBACK_ICON_SIZE, FALLBACK_ICON_RGBA))
    }
}

impl TrayAdapter for SystemTray {
    fn create_tray_icon(&self, menu_items: Vec<MenuItem>) -> bool {
        if !self.supported {
            log::debug!("tray: not supported on this platform");
            return false;
        }
        self.spawn(menu_items)
    }

    fn is_supported(&self) -> bool {
        self.supported
    }

    fn stop(&self) {
        if !self.set_active(false) {
            return;
        }
        #[cfg(feature = "tray")]
        match host::hide() {
            Ok(()) => log::info!("tray: stopped"),
            Err(e) => log::warn!("tray: cannot remove icon: {e}"),
        }
    }
}

#[cfg(feature = "tray")]
impl SystemTray {
    fn spawn(&self, menu_items: Vec<MenuItem>) -> bool {
        // `show` replaces any icon already up.
        match host::show(self.tooltip.clone(), self.icon(), menu_items) {
            Ok(()) => {
                self.set_active(true);
                log::info!("tray: icon created");
                true
            }
            Err(e) => {
                log::warn!("tray: {e}");
                false
            }
        }
    }
}

#[cfg(not(feature = "tray"))]
impl SystemTray {
    fn spawn(&self, _menu_items: Vec<MenuItem>) -> bool {
        log::warn!("tray: built without the tray feature");
        false
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
