//! Linux clipboard: preferred tool first, clipboard library second.

use crate::platform::clipboard::{
    join, ClipboardMechanism, ClipboardTool, ClipboardWriter, LIBRARY_NAME,
};
use crate::platform::detect::{PlatformDescriptor, ToolInventory};
use crate::platform::{AdapterContext, ClipboardAdapter};

const WAYLAND_TOOLS: &[ClipboardTool] = &[ClipboardTool::WlCopy];
const X11_TOOLS: &[ClipboardTool] = &[ClipboardTool::Xclip, ClipboardTool::Xsel];

pub(crate) struct LinuxClipboard {
    writer: ClipboardWriter,
    inventory: ToolInventory,
    wayland: bool,
    preferred: Option<ClipboardTool>,
}

impl LinuxClipboard {
    pub(crate) fn new(descriptor: &PlatformDescriptor, ctx: &AdapterContext) -> Self {
        Self {
            writer: ClipboardWriter::new(ctx),
            inventory: descriptor.tool_inventory.clone(),
            wayland: descriptor.is_wayland(),
            preferred: None,
        }
    }

    fn chain(&self) -> Vec<ClipboardMechanism> {
        let mut chain: Vec<_> = self.preferred.map(ClipboardMechanism::Tool).into_iter().collect();
        if self.inventory.libraries.clipboard {
            chain.push(ClipboardMechanism::Library);
        }
        chain
    }
}

/// Wayland-native writers first (on Wayland only), then X11 writers.
fn select_tool(inventory: &ToolInventory, wayland: bool) -> Option<ClipboardTool> {
    let wayland_tools = if wayland { WAYLAND_TOOLS } else { &[] };
    wayland_tools
        .iter()
        .chain(X11_TOOLS)
        .copied()
        .find(|tool| inventory.has_clipboard_tool(tool.name()))
}

impl ClipboardAdapter for LinuxClipboard {
    fn setup(&mut self) {
        self.preferred = select_tool(&self.inventory, self.wayland);
        log::debug!("clipboard: chain [{}]", join(&self.chain()));
    }

    fn copy_text(&self, text: &str) -> bool {
        self.writer.write(&self.chain(), text)
    }

    fn is_available(&self) -> bool {
        select_tool(&self.inventory, self.wayland).is_some() || self.inventory.libraries.clipboard
    }

    fn preferred_tool(&self) -> Option<String> {
        match self.preferred {
            Some(tool) => Some(tool.name().to_owned()),
            None if self.inventory.libraries.clipboard => Some(LIBRARY_NAME.to_owned()),
            None => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::detect::{DisplayProtocol, Libraries, OsFamily};
    use crate::platform::testing::{FakeAutomation, FakeClipboard, Harness, RecordingRunner};

    fn linux(protocol: DisplayProtocol, tools: &[&str], library: bool) -> PlatformDescriptor {
        PlatformDescriptor::new(OsFamily::Linux)
            .with_display_protocol(protocol)
            .with_clipboard_tools(tools)
            .with_libraries(Libraries {
                clipboard: library,
                ..Libraries::default()
            })
    }

    fn ready(d: &PlatformDescriptor, h: &Harness) -> LinuxClipboard {
        let mut cb = LinuxClipboard::new(d, &h.context());
        cb.setup();
        cb
    }

    #[test]
    fn xclip_on_x11() {
        let h = Harness::new();
        let cb = ready(&linux(DisplayProtocol::X11, &["xclip"], false), &h);
        assert_eq!(cb.preferred_tool().as_deref(), Some("xclip"));
        assert!(cb.copy_text("hi"));
        let runs = h.runner.runs();
        assert_eq!(runs[0].program, "xclip");
        assert_eq!(runs[0].args, vec!["-selection", "clipboard"]);
        assert_eq!(runs[0].stdin.as_deref(), Some("hi"));
    }

    #[test]
    fn wayland_prefers_wl_copy() {
        let h = Harness::new();
        let cb = ready(&linux(DisplayProtocol::Wayland, &["xclip", "wl-copy"], false), &h);
        assert_eq!(cb.preferred_tool().as_deref(), Some("wl-copy"));
    }

    #[test]
    fn x11_skips_wayland_tools() {
        let h = Harness::new();
        let cb = ready(&linux(DisplayProtocol::X11, &["wl-copy", "xsel"], false), &h);
        assert_eq!(cb.preferred_tool().as_deref(), Some("xsel"));
    }

    #[test]
    fn wl_paste_alone_cannot_write() {
        let h = Harness::new();
        let cb = ready(&linux(DisplayProtocol::Wayland, &["wl-paste"], true), &h);
        assert_eq!(cb.preferred_tool().as_deref(), Some("arboard"));
        assert!(cb.copy_text("x"));
        assert!(h.runner.runs().is_empty());
        assert_eq!(h.clipboard.copies(), vec!["x"]);
    }

    #[test]
    fn failing_tool_falls_back_to_library() {
        let h = Harness::with(RecordingRunner::failing(&["xsel"]), FakeAutomation::new(), FakeClipboard::new());
        let cb = ready(&linux(DisplayProtocol::X11, &["xsel"], true), &h);
        assert!(cb.copy_text("text"));
        assert_eq!(h.runner.programs(), vec!["xsel"]);
        assert_eq!(h.clipboard.copies(), vec!["text"]);
    }

    #[test]
    fn read_only_or_foreign_tools_are_not_available() {
        let h = Harness::new();
        let wl_paste = ready(&linux(DisplayProtocol::Wayland, &["wl-paste"], false), &h);
        assert!(!wl_paste.is_available());
        let wl_copy_on_x11 = ready(&linux(DisplayProtocol::X11, &["wl-copy"], false), &h);
        assert!(!wl_copy_on_x11.is_available());
        assert_eq!(wl_copy_on_x11.preferred_tool(), None);
    }

    #[test]
    fn nothing_available() {
        let h = Harness::new();
        let cb = ready(&linux(DisplayProtocol::X11, &[], false), &h);
        assert!(!cb.is_available());
        assert_eq!(cb.preferred_tool(), None);
        assert!(!cb.copy_text("text"));
    }

    #[test]
    fn before_setup_only_library_is_used() {
        let h = Harness::new();
        let cb = LinuxClipboard::new(&linux(DisplayProtocol::X11, &["xclip"], true), &h.context());
        assert!(cb.copy_text("early"));
        assert!(h.runner.runs().is_empty());
    }
}
