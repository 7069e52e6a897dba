//! Clipboard mechanisms shared by every bundle.
//!
//! Two kinds of mechanism exist: an external tool fed the text on stdin, and
//! the in-process clipboard library (`arboard`). Bundles differ only in which
//! tools they consider and whether the tool or the library goes first; the
//! Linux ordering lives in `linux::clipboard`, the library-first ordering used
//! on Windows, macOS and unknown hosts lives here.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use super::fallback::first_success;
use super::process::{CommandRunner, Invocation};
use super::{AdapterContext, ClipboardAdapter, PlatformDescriptor, PlatformError};

/// Name reported by `preferred_tool` when only the library is in use.
pub const LIBRARY_NAME: &str = "arboard";

// ---------------------------------------------------------------------------
// Library seam
// ---------------------------------------------------------------------------

pub trait ClipboardLibrary: Send + Sync {
    fn set_text(&self, text: &str) -> Result<(), PlatformError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ArboardClipboard;

#[cfg(feature = "clipboard-lib")]
impl ClipboardLibrary for ArboardClipboard {
    fn set_text(&self, text: &str) -> Result<(), PlatformError> {
        let mut clipboard = arboard::Clipboard::new()
            .map_err(|e| PlatformError::Unavailable(format!("arboard: {e}")))?;
        clipboard
            .set_text(text)
            .map_err(|e| PlatformError::Other(format!("arboard: {e}")))
    }
}

#[cfg(not(feature = "clipboard-lib"))]
impl ClipboardLibrary for ArboardClipboard {
    fn set_text(&self, _text: &str) -> Result<(), PlatformError> {
        Err(PlatformError::Unavailable(
            "built without the clipboard-lib feature".into(),
        ))
    }
}

// ---------------------------------------------------------------------------
// Tools
// ---------------------------------------------------------------------------

/// External clipboard writers. All of them read the text from stdin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipboardTool {
    WlCopy,
    Xclip,
    Xsel,
    Pbcopy,
    Clip,
}

impl ClipboardTool {
    pub fn name(self) -> &'static str {
        match self {
            ClipboardTool::WlCopy => "wl-copy",
            ClipboardTool::Xclip => "xclip",
            ClipboardTool::Xsel => "xsel",
            ClipboardTool::Pbcopy => "pbcopy",
            ClipboardTool::Clip => "clip",
        }
    }

    pub fn invocation(self, text: &str) -> Invocation {
        let args: &[&str] = match self {
            ClipboardTool::Xclip => &["-selection", "clipboard"],
            ClipboardTool::Xsel => &["--clipboard", "--input"],
            ClipboardTool::WlCopy | ClipboardTool::Pbcopy | ClipboardTool::Clip => &[],
        };
        Invocation::new(self.name(), args.iter().copied()).with_stdin(text)
    }
}

impl fmt::Display for ClipboardTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipboardMechanism {
    Tool(ClipboardTool),
    Library,
}

impl fmt::Display for ClipboardMechanism {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClipboardMechanism::Tool(tool) => tool.fmt(f),
            ClipboardMechanism::Library => f.write_str(LIBRARY_NAME),
        }
    }
}

// ---------------------------------------------------------------------------
// Writer
// ---------------------------------------------------------------------------

/// Runs a clipboard chain and waits out the settle delay on success.
pub(crate) struct ClipboardWriter {
    runner: Arc<dyn CommandRunner>,
    library: Arc<dyn ClipboardLibrary>,
    timeout: Duration,
    settle: Duration,
}

impl ClipboardWriter {
    pub(crate) fn new(ctx: &AdapterContext) -> Self {
        Self {
            runner: ctx.backends.runner.clone(),
            library: ctx.backends.clipboard.clone(),
            timeout: ctx.settings.text_timeout,
            settle: ctx.settings.clipboard_settle,
        }
    }

    pub(crate) fn write(&self, chain: &[ClipboardMechanism], text: &str) -> bool {
        let copied = first_success("clipboard: copy", chain, |mechanism| match mechanism {
            ClipboardMechanism::Tool(tool) => self.runner.run(&tool.invocation(text), self.timeout),
            ClipboardMechanism::Library => self.library.set_text(text),
        });
        if copied && !self.settle.is_zero() {
            // Clipboard owners negotiate asynchronously; a paste sent right
            // away can read the previous contents.
            std::thread::sleep(self.settle);
        }
        copied
    }
}

// ---------------------------------------------------------------------------
// Library-first adapter
// ---------------------------------------------------------------------------

/// Tries the clipboard library, then one OS tool (`clip`, `pbcopy`) if it was
/// detected.
pub(crate) struct LibraryFirstClipboard {
    writer: ClipboardWriter,
    chain: Vec<ClipboardMechanism>,
}

impl LibraryFirstClipboard {
    pub(crate) fn new(
        descriptor: &PlatformDescriptor,
        ctx: &AdapterContext,
        tool: Option<ClipboardTool>,
    ) -> Self {
        let inventory = &descriptor.tool_inventory;
        let mut chain = Vec::new();
        if inventory.libraries.clipboard {
            chain.push(ClipboardMechanism::Library);
        }
        if let Some(tool) = tool.filter(|t| inventory.has_clipboard_tool(t.name())) {
            chain.push(ClipboardMechanism::Tool(tool));
        }
        Self {
            writer: ClipboardWriter::new(ctx),
            chain,
        }
    }
}

impl ClipboardAdapter for LibraryFirstClipboard {
    fn setup(&mut self) {
        log::debug!("clipboard: chain [{}]", join(&self.chain));
    }

    fn copy_text(&self, text: &str) -> bool {
        self.writer.write(&self.chain, text)
    }

    fn is_available(&self) -> bool {
        !self.chain.is_empty()
    }

    fn preferred_tool(&self) -> Option<String> {
        self.chain.first().map(ToString::to_string)
    }
}

pub(crate) fn join<T: fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
