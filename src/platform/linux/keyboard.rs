//! Linux keyboard strategies.
//!
//! The strategy is picked once from the descriptor's display protocol:
//!
//! - X11: `xdotool` → `xte` → `xvkbd`; the automation library only when
//!   none of the tools is installed.
//! - Wayland: `xdotool` (KDE only, through XWayland) → `wtype` → `ydotool` →
//!   automation library.
//! - Headless (no display, WSL): automation library only.
//!
//! Paste is Shift+Insert, which terminals and GUI toolkits both honour.

use crate::platform::detect::{DisplayProtocol, PlatformDescriptor, ToolInventory};
use crate::platform::keyboard::{KeyChain, KeyMechanism, KeyTool};
use crate::platform::keys::Chord;
use crate::platform::{AdapterContext, KeyboardAdapter};

const X11_TOOLS: &[KeyTool] = &[KeyTool::Xdotool, KeyTool::Xte, KeyTool::Xvkbd];

pub(crate) enum LinuxKeyboard {
    X11(KeyChain),
    Wayland(KeyChain),
    Headless(KeyChain),
}

impl LinuxKeyboard {
    pub(crate) fn new(descriptor: &PlatformDescriptor, ctx: &AdapterContext) -> Self {
        let inventory = &descriptor.tool_inventory;
        let chain = |mechanisms| KeyChain::new(mechanisms, &[Chord::SHIFT_INSERT], ctx);

        let keyboard = match descriptor.display_protocol {
            Some(DisplayProtocol::X11) => LinuxKeyboard::X11(chain(x11_mechanisms(inventory))),
            Some(DisplayProtocol::Wayland) => {
                LinuxKeyboard::Wayland(chain(wayland_mechanisms(inventory, descriptor.is_kde())))
            }
            _ => LinuxKeyboard::Headless(chain(automation_only(inventory))),
        };
        log::debug!(
            "keyboard: {} strategy with [{}]",
            keyboard.strategy(),
            keyboard.available_methods().join(", ")
        );
        keyboard
    }

    pub(crate) fn strategy(&self) -> &'static str {
        match self {
            LinuxKeyboard::X11(_) => "x11",
            LinuxKeyboard::Wayland(_) => "wayland",
            LinuxKeyboard::Headless(_) => "headless",
        }
    }

    fn chain(&self) -> &KeyChain {
        match self {
            LinuxKeyboard::X11(c) | LinuxKeyboard::Wayland(c) | LinuxKeyboard::Headless(c) => c,
        }
    }
}

fn x11_mechanisms(inventory: &ToolInventory) -> Vec<KeyMechanism> {
    let tools: Vec<_> = X11_TOOLS
        .iter()
        .filter(|t| inventory.has_keyboard_tool(t.name()))
        .map(|&t| KeyMechanism::Tool(t))
        .collect();
    if tools.is_empty() {
        automation_only(inventory)
    } else {
        tools
    }
}

fn wayland_mechanisms(inventory: &ToolInventory, kde: bool) -> Vec<KeyMechanism> {
    let mut mechanisms = Vec::new();
    if kde && inventory.has_keyboard_tool(KeyTool::Xdotool.name()) {
        mechanisms.push(KeyMechanism::Tool(KeyTool::Xdotool));
    }
    for tool in [KeyTool::Wtype, KeyTool::Ydotool] {
        if inventory.has_keyboard_tool(tool.name()) {
            mechanisms.push(KeyMechanism::Tool(tool));
        }
    }
    mechanisms.extend(automation_only(inventory));
    mechanisms
}

fn automation_only(inventory: &ToolInventory) -> Vec<KeyMechanism> {
    if inventory.libraries.automation {
        vec![KeyMechanism::Automation]
    } else {
        Vec::new()
    }
}

impl KeyboardAdapter for LinuxKeyboard {
    fn send_paste_command(&self) -> bool {
        self.chain().send_paste_command()
    }

    fn send_ctrl_enter(&self) -> bool {
        self.chain().send_ctrl_enter()
    }

    fn send_text(&self, text: &str) -> bool {
        self.chain().send_text(text)
    }

    fn keep_alive(&self) -> bool {
        self.chain().keep_alive()
    }

    fn is_available(&self) -> bool {
        self.chain().is_available()
    }

    fn available_methods(&self) -> Vec<String> {
        self.chain().available_methods()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
