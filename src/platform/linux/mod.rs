//! Linux bundle.
//!
//! Keyboard: an X11, Wayland or headless strategy chosen from the display
//! protocol (see `keyboard`). Clipboard: `wl-copy` / `xclip` / `xsel`, then
//! arboard. Sound: `aplay`, `paplay`; no system beep.
//!
//! Session detection (WSL, display server, desktop) lives in `detect` and is
//! called by the platform detector.

pub(crate) mod clipboard;
pub(crate) mod detect;
pub(crate) mod keyboard;
pub(crate) mod keycodes;

use clipboard::LinuxClipboard;
use keyboard::LinuxKeyboard;

use crate::platform::detect::{PlatformDescriptor, LINUX_AUDIO_PLAYERS};
use crate::platform::notification::SoundNotifier;
use crate::platform::resources::{BundledResources, ResourceLocator};
use crate::platform::tray::SystemTray;
use crate::platform::{AdapterBundle, AdapterContext, BundleKind};

pub(crate) fn create_bundle(descriptor: &PlatformDescriptor, ctx: &AdapterContext) -> AdapterBundle {
    let locator = ResourceLocator::for_platform(descriptor, &ctx.settings.app_name);

    AdapterBundle {
        kind: BundleKind::Linux,
        descriptor: descriptor.clone(),
        keyboard: Box::new(LinuxKeyboard::new(descriptor, ctx)),
        clipboard: Box::new(LinuxClipboard::new(descriptor, ctx)),
        system_tray: Box::new(SystemTray::new(descriptor, &ctx.settings.app_name, locator.clone())),
        notifications: Box::new(SoundNotifier::new(
            descriptor,
            ctx,
            LINUX_AUDIO_PLAYERS,
            locator.clone(),
        )),
        resources: Box::new(BundledResources::new(locator)),
    }
}
