//! macOS bundle.
//!
//! Keyboard: enigo, then AppleScript through `osascript`. Paste is Cmd+V.
//! Clipboard: arboard, then `pbcopy`.
//! Sound: `afplay`, then `NSBeep`.
//!
//! Both keyboard mechanisms need the Accessibility permission. Guide the
//! user to: System Settings > Privacy & Security > Accessibility

pub(crate) mod applescript;

use crate::platform::clipboard::{ClipboardTool, LibraryFirstClipboard};
use crate::platform::detect::{PlatformDescriptor, ToolInventory, MACOS_AUDIO_PLAYERS};
use crate::platform::keyboard::{KeyChain, KeyMechanism};
use crate::platform::keys::Chord;
use crate::platform::notification::SoundNotifier;
use crate::platform::resources::{BundledResources, ResourceLocator};
use crate::platform::tray::SystemTray;
use crate::platform::{AdapterBundle, AdapterContext, BundleKind};

pub(crate) fn create_bundle(descriptor: &PlatformDescriptor, ctx: &AdapterContext) -> AdapterBundle {
    let locator = ResourceLocator::for_platform(descriptor, &ctx.settings.app_name);

    AdapterBundle {
        kind: BundleKind::MacOs,
        descriptor: descriptor.clone(),
        keyboard: Box::new(KeyChain::new(
            keyboard_mechanisms(&descriptor.tool_inventory),
            &[Chord::CMD_V],
            ctx,
        )),
        clipboard: Box::new(LibraryFirstClipboard::new(
            descriptor,
            ctx,
            Some(ClipboardTool::Pbcopy),
        )),
        system_tray: Box::new(SystemTray::new(descriptor, &ctx.settings.app_name, locator.clone())),
        notifications: Box::new(SoundNotifier::new(
            descriptor,
            ctx,
            MACOS_AUDIO_PLAYERS,
            locator.clone(),
        )),
        resources: Box::new(BundledResources::new(locator)),
    }
}

fn keyboard_mechanisms(inventory: &ToolInventory) -> Vec<KeyMechanism> {
    let mut mechanisms = Vec::new();
    if inventory.libraries.automation {
        mechanisms.push(KeyMechanism::Automation);
    }
    if inventory.has_keyboard_tool("osascript") {
        mechanisms.push(KeyMechanism::AppleScript);
    }
    mechanisms
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
