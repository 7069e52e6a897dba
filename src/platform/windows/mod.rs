//! Windows bundle.
//!
//! Keyboard: enigo, then `SendInput`. Paste is Shift+Insert.
//! Clipboard: arboard, then `clip.exe`.
//! Sound: `powershell` driving `Media.SoundPlayer`, then `MessageBeep`.

pub(crate) mod keycodes;
pub(crate) mod send_input;

use crate::platform::clipboard::{ClipboardTool, LibraryFirstClipboard};
use crate::platform::detect::{PlatformDescriptor, ToolInventory, WINDOWS_AUDIO_PLAYERS};
use crate::platform::keyboard::{KeyChain, KeyMechanism};
use crate::platform::keys::Chord;
use crate::platform::notification::SoundNotifier;
use crate::platform::resources::{BundledResources, ResourceLocator};
use crate::platform::tray::SystemTray;
use crate::platform::{AdapterBundle, AdapterContext, BundleKind};

pub(crate) fn create_bundle(descriptor: &PlatformDescriptor, ctx: &AdapterContext) -> AdapterBundle {
    let locator = ResourceLocator::for_platform(descriptor, &ctx.settings.app_name);
    let inventory = &descriptor.tool_inventory;

    AdapterBundle {
        kind: BundleKind::Windows,
        descriptor: descriptor.clone(),
        keyboard: Box::new(KeyChain::new(
            keyboard_mechanisms(inventory),
            &[Chord::SHIFT_INSERT],
            ctx,
        )),
        clipboard: Box::new(LibraryFirstClipboard::new(
            descriptor,
            ctx,
            Some(ClipboardTool::Clip),
        )),
        system_tray: Box::new(SystemTray::new(descriptor, &ctx.settings.app_name, locator.clone())),
        notifications: Box::new(SoundNotifier::new(
            descriptor,
            ctx,
            WINDOWS_AUDIO_PLAYERS,
            locator.clone(),
        )),
        resources: Box::new(BundledResources::new(locator)),
    }
}

fn keyboard_mechanisms(inventory: &ToolInventory) -> Vec<KeyMechanism> {
    let libraries = inventory.libraries;
    let mut mechanisms = Vec::new();
    if libraries.automation {
        mechanisms.push(KeyMechanism::Automation);
    }
    if libraries.native_input {
        mechanisms.push(KeyMechanism::SendInput);
    }
    mechanisms
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
