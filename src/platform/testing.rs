//! In-memory doubles for the host and the side-effecting backends.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::automation::Automation;
use super::clipboard::ClipboardLibrary;
use super::detect::SystemProbe;
use super::keys::Chord;
use super::process::{CommandRunner, Invocation};
use super::{AdapterContext, AdapterSettings, Backends, PlatformError};

// ---------------------------------------------------------------------------
// Host
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct FakeHost {
    os: String,
    env: HashMap<String, String>,
    files: HashMap<PathBuf, String>,
    executables: HashSet<String>,
    commands: HashMap<String, String>,
}

impl FakeHost {
    pub fn new(os: &str) -> Self {
        Self {
            os: os.to_owned(),
            ..Self::default()
        }
    }

    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.env.insert(key.to_owned(), value.to_owned());
        self
    }

    pub fn file(mut self, path: &str, contents: &str) -> Self {
        self.files.insert(PathBuf::from(path), contents.to_owned());
        self
    }

    pub fn executables(mut self, names: &[&str]) -> Self {
        self.executables.extend(names.iter().map(|n| n.to_string()));
        self
    }

    /// Canned stdout for `program`, whatever its arguments.
    pub fn command(mut self, program: &str, output: &str) -> Self {
        self.commands.insert(program.to_owned(), output.to_owned());
        self
    }
}

impl SystemProbe for FakeHost {
    fn os_name(&self) -> String {
        self.os.clone()
    }

    fn var(&self, key: &str) -> Option<String> {
        self.env.get(key).filter(|v| !v.is_empty()).cloned()
    }

    fn read_to_string(&self, path: &Path) -> Option<String> {
        self.files.get(path).cloned()
    }

    fn has_executable(&self, name: &str) -> bool {
        self.executables.contains(name)
    }

    fn command_output(&self, program: &str, _args: &[&str]) -> Option<String> {
        self.commands
            .get(program)
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty())
    }
}

// ---------------------------------------------------------------------------
// Command runner
// ---------------------------------------------------------------------------

/// Records every invocation. Programs listed with `failing` exit non-zero.
#[derive(Debug, Default)]
pub struct RecordingRunner {
    failing: HashSet<String>,
    runs: Mutex<Vec<Invocation>>,
    detached: Mutex<Vec<Invocation>>,
}

impl RecordingRunner {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing(programs: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            failing: programs.iter().map(|p| p.to_string()).collect(),
            ..Self::default()
        })
    }

    pub fn runs(&self) -> Vec<Invocation> {
        self.runs.lock().unwrap().clone()
    }

    pub fn programs(&self) -> Vec<String> {
        self.runs().into_iter().map(|i| i.program).collect()
    }

    pub fn detached(&self) -> Vec<Invocation> {
        self.detached.lock().unwrap().clone()
    }

    fn outcome(&self, invocation: &Invocation) -> Result<(), PlatformError> {
        if self.failing.contains(&invocation.program) {
            Err(PlatformError::Other(format!("{} failed", invocation.program)))
        } else {
            Ok(())
        }
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&self, invocation: &Invocation, _timeout: Duration) -> Result<(), PlatformError> {
        self.runs.lock().unwrap().push(invocation.clone());
        self.outcome(invocation)
    }

    fn spawn_detached(&self, invocation: &Invocation) -> Result<(), PlatformError> {
        self.detached.lock().unwrap().push(invocation.clone());
        self.outcome(invocation)
    }
}

// ---------------------------------------------------------------------------
// Libraries
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct FakeAutomation {
    fail: bool,
    chords: Mutex<Vec<Chord>>,
    texts: Mutex<Vec<String>>,
}

impl FakeAutomation {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn broken() -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            ..Self::default()
        })
    }

    pub fn chords(&self) -> Vec<Chord> {
        self.chords.lock().unwrap().clone()
    }

    pub fn texts(&self) -> Vec<String> {
        self.texts.lock().unwrap().clone()
    }
}

impl Automation for FakeAutomation {
    fn press_chord(&self, chord: Chord) -> Result<(), PlatformError> {
        self.chords.lock().unwrap().push(chord);
        if self.fail {
            return Err(PlatformError::Unavailable("no display".into()));
        }
        Ok(())
    }

    fn type_text(&self, text: &str) -> Result<(), PlatformError> {
        self.texts.lock().unwrap().push(text.to_owned());
        if self.fail {
            return Err(PlatformError::Unavailable("no display".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct FakeClipboard {
    fail: bool,
    copies: Mutex<Vec<String>>,
}

impl FakeClipboard {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn broken() -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            ..Self::default()
        })
    }

    pub fn copies(&self) -> Vec<String> {
        self.copies.lock().unwrap().clone()
    }
}

impl ClipboardLibrary for FakeClipboard {
    fn set_text(&self, text: &str) -> Result<(), PlatformError> {
        self.copies.lock().unwrap().push(text.to_owned());
        if self.fail {
            return Err(PlatformError::Unavailable("no clipboard owner".into()));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Context
// ---------------------------------------------------------------------------

/// Doubles wired into an `AdapterContext` with all delays set to zero.
pub struct Harness {
    pub runner: Arc<RecordingRunner>,
    pub automation: Arc<FakeAutomation>,
    pub clipboard: Arc<FakeClipboard>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with(RecordingRunner::new(), FakeAutomation::new(), FakeClipboard::new())
    }

    pub fn with(
        runner: Arc<RecordingRunner>,
        automation: Arc<FakeAutomation>,
        clipboard: Arc<FakeClipboard>,
    ) -> Self {
        Self {
            runner,
            automation,
            clipboard,
        }
    }

    pub fn context(&self) -> AdapterContext {
        AdapterContext {
            backends: Backends {
                runner: self.runner.clone(),
                automation: self.automation.clone(),
                clipboard: self.clipboard.clone(),
            },
            settings: AdapterSettings {
                keep_alive_gap: Duration::ZERO,
                clipboard_settle: Duration::ZERO,
                ..AdapterSettings::default()
            },
        }
    }
}
