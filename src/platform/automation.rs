//! Generic keyboard automation library.
//!
//! `EnigoAutomation` is the last-resort keyboard mechanism on Linux and the
//! first choice on Windows and macOS. A fresh `Enigo` connection is opened per
//! operation: the bundle is shared across request threads and `Enigo` is not
//! `Sync`.

use super::keys::Chord;
use super::PlatformError;

pub trait Automation: Send + Sync {
    fn press_chord(&self, chord: Chord) -> Result<(), PlatformError>;

    fn type_text(&self, text: &str) -> Result<(), PlatformError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EnigoAutomation;

#[cfg(feature = "automation")]
mod enigo_impl {
    use enigo::{Direction, Enigo, Key as EnigoKey, Keyboard, Settings};

    use super::{Automation, EnigoAutomation};
    use crate::platform::keys::{Chord, Key};
    use crate::platform::PlatformError;

    const MECHANISM: &str = "automation";

    fn connect() -> Result<Enigo, PlatformError> {
        Enigo::new(&Settings::default())
            .map_err(|e| PlatformError::Unavailable(format!("enigo: {e}")))
    }

    fn enigo_key(key: Key) -> Option<EnigoKey> {
        match key {
            Key::Shift => Some(EnigoKey::Shift),
            Key::Control => Some(EnigoKey::Control),
            Key::Meta => Some(EnigoKey::Meta),
            Key::Return => Some(EnigoKey::Return),
            Key::V => Some(EnigoKey::Unicode('v')),
            #[cfg(not(target_os = "macos"))]
            Key::Insert => Some(EnigoKey::Insert),
            #[cfg(not(target_os = "macos"))]
            Key::ScrollLock => Some(EnigoKey::ScrollLock),
            // Mac keyboards have neither key.
            #[cfg(target_os = "macos")]
            Key::Insert | Key::ScrollLock => None,
        }
    }

    fn io_error(e: enigo::InputError) -> PlatformError {
        PlatformError::Other(format!("enigo: {e}"))
    }

    impl Automation for EnigoAutomation {
        fn press_chord(&self, chord: Chord) -> Result<(), PlatformError> {
            let keys = chord
                .press_order()
                .map(enigo_key)
                .collect::<Option<Vec<_>>>()
                .ok_or(PlatformError::Unsupported {
                    mechanism: MECHANISM,
                    action: "this key",
                })?;

            let mut enigo = connect()?;
            let (modifier, key) = match keys.as_slice() {
                [m, k] => (Some(*m), *k),
                [k] => (None, *k),
                _ => return Err(PlatformError::Other("empty chord".into())),
            };

            if let Some(m) = modifier {
                enigo.key(m, Direction::Press).map_err(io_error)?;
            }
            let clicked = enigo.key(key, Direction::Click).map_err(io_error);
            // Release the modifier even when the click failed.
            if let Some(m) = modifier {
                enigo.key(m, Direction::Release).map_err(io_error)?;
            }
            clicked
        }

        fn type_text(&self, text: &str) -> Result<(), PlatformError> {
            connect()?.text(text).map_err(io_error)
        }
    }
}

#[cfg(not(feature = "automation"))]
impl Automation for EnigoAutomation {
    fn press_chord(&self, _chord: Chord) -> Result<(), PlatformError> {
        Err(PlatformError::Unavailable(
            "built without the automation feature".into(),
        ))
    }

    fn type_text(&self, _text: &str) -> Result<(), PlatformError> {
        Err(PlatformError::Unavailable(
            "built without the automation feature".into(),
        ))
    }
}
