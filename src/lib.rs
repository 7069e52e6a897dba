//! PasteBridge desktop side.
//!
//! Detects the host platform and drives its keyboard, clipboard, tray and
//! notification facilities through one uniform, non-failing adapter surface.

pub mod config;
pub mod delivery;
pub mod platform;
