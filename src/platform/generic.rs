//! Bundle for operating systems without a dedicated one.
//!
//! Only the in-process libraries are used for keyboard and clipboard. Paste
//! tries Shift+Insert, then Ctrl+V. The tray is never offered.

use super::clipboard::LibraryFirstClipboard;
use super::detect::{PlatformDescriptor, GENERIC_AUDIO_PLAYERS};
use super::keyboard::{KeyChain, KeyMechanism};
use super::keys::Chord;
use super::notification::SoundNotifier;
use super::resources::{BundledResources, ResourceLocator};
use super::{AdapterBundle, AdapterContext, BundleKind, MenuItem, TrayAdapter};

pub(crate) fn create_bundle(descriptor: &PlatformDescriptor, ctx: &AdapterContext) -> AdapterBundle {
    let locator = ResourceLocator::for_platform(descriptor, &ctx.settings.app_name);
    let mechanisms = if descriptor.tool_inventory.libraries.automation {
        vec![KeyMechanism::Automation]
    } else {
        Vec::new()
    };

    AdapterBundle {
        kind: BundleKind::Generic,
        descriptor: descriptor.clone(),
        keyboard: Box::new(KeyChain::new(
            mechanisms,
            &[Chord::SHIFT_INSERT, Chord::CTRL_V],
            ctx,
        )),
        clipboard: Box::new(LibraryFirstClipboard::new(descriptor, ctx, None)),
        system_tray: Box::new(NoTray),
        notifications: Box::new(SoundNotifier::new(
            descriptor,
            ctx,
            GENERIC_AUDIO_PLAYERS,
            locator.clone(),
        )),
        resources: Box::new(BundledResources::new(locator)),
    }
}

struct NoTray;

impl TrayAdapter for NoTray {
    fn create_tray_icon(&self, _menu_items: Vec<MenuItem>) -> bool {
        false
    }

    fn is_supported(&self) -> bool {
        false
    }

    fn stop(&self) {}
}
