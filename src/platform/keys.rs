//! Canonical keys and chords.
//!
//! Only the handful of keys the adapters emit are modelled. Each mechanism
//! renders a `Chord` through its own keycode table (`linux::keycodes`,
//! `windows::keycodes`, `automation`).

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Shift,
    Control,
    /// Command on macOS, Super/Windows elsewhere.
    Meta,
    Insert,
    Return,
    ScrollLock,
    V,
}

/// A single key, optionally held together with one modifier.
///
/// Pressed as: modifier down, key down, key up, modifier up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Chord {
    pub modifier: Option<Key>,
    pub key: Key,
}

impl Chord {
    pub const SHIFT_INSERT: Chord = Chord::with(Key::Shift, Key::Insert);
    pub const CTRL_RETURN: Chord = Chord::with(Key::Control, Key::Return);
    pub const CTRL_V: Chord = Chord::with(Key::Control, Key::V);
    pub const CMD_V: Chord = Chord::with(Key::Meta, Key::V);
    pub const SCROLL_LOCK: Chord = Chord::single(Key::ScrollLock);

    pub const fn single(key: Key) -> Self {
        Self {
            modifier: None,
            key,
        }
    }

    pub const fn with(modifier: Key, key: Key) -> Self {
        Self {
            modifier: Some(modifier),
            key,
        }
    }

    /// Press order: modifier first.
    pub fn press_order(&self) -> impl Iterator<Item = Key> {
        self.modifier.into_iter().chain(std::iter::once(self.key))
    }

    /// Release order: reverse of press order.
    pub fn release_order(&self) -> impl Iterator<Item = Key> {
        std::iter::once(self.key).chain(self.modifier)
    }
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(m) = self.modifier {
            write!(f, "{m:?}+")?;
        }
        write!(f, "{:?}", self.key)
    }
}
