//! Descriptor → adapter bundle, with a per-signature cache.
//!
//! Bundles are keyed by `osFamily_displayProtocol_desktopEnvironment`. The
//! lock is not held while a bundle is built, so two threads asking for the
//! same new key may both construct one; the first insert wins and the other
//! copy is dropped. Construction only reads the descriptor, so the duplicate
//! is harmless.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use super::capability::Capabilities;
use super::detect::{self, OsFamily, PlatformDescriptor};
use super::{generic, linux, macos, windows, AdapterBundle, AdapterContext};

/// OS families with a dedicated bundle.
pub const SUPPORTED_PLATFORMS: &[&str] = &["Linux", "Windows", "macOS"];

#[derive(Debug, Default)]
pub struct AdapterFactory {
    context: AdapterContext,
    cache: Mutex<HashMap<String, Arc<AdapterBundle>>>,
}

impl AdapterFactory {
    pub fn new(context: AdapterContext) -> Self {
        Self {
            context,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn context(&self) -> &AdapterContext {
        &self.context
    }

    /// Returns the bundle for `descriptor`, detecting the host when `None`.
    pub fn create_adapters(&self, descriptor: Option<&PlatformDescriptor>) -> Arc<AdapterBundle> {
        let detected;
        let descriptor = match descriptor {
            Some(d) => d,
            None => {
                detected = detect::detect();
                &detected
            }
        };

        let key = descriptor.cache_key();
        if let Some(bundle) = self.lock().get(&key) {
            log::trace!("factory: cache hit for {key}");
            return bundle.clone();
        }

        let mut bundle = build(descriptor, &self.context);
        bundle.initialize();
        log::info!("factory: created {} bundle for {key}", bundle.kind);

        self.lock()
            .entry(key)
            .or_insert_with(|| Arc::new(bundle))
            .clone()
    }

    pub fn clear_cache(&self) {
        self.lock().clear();
        log::debug!("factory: cache cleared");
    }

    /// Number of cached bundles.
    pub fn cached(&self) -> usize {
        self.lock().len()
    }

    /// True when a dedicated (non-generic) bundle exists for the descriptor.
    pub fn is_platform_supported(descriptor: &PlatformDescriptor) -> bool {
        !matches!(descriptor.os_family, OsFamily::Other(_))
    }

    pub fn capabilities(descriptor: &PlatformDescriptor) -> Capabilities<'_> {
        Capabilities::new(descriptor)
    }

    pub fn supported_platforms() -> &'static [&'static str] {
        SUPPORTED_PLATFORMS
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Arc<AdapterBundle>>> {
        // Bundles are immutable once inserted; a panic elsewhere cannot leave
        // the map half-updated.
        self.cache.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn build(descriptor: &PlatformDescriptor, ctx: &AdapterContext) -> AdapterBundle {
    match descriptor.os_family {
        OsFamily::Linux => linux::create_bundle(descriptor, ctx),
        OsFamily::Windows => windows::create_bundle(descriptor, ctx),
        OsFamily::MacOs => macos::create_bundle(descriptor, ctx),
        OsFamily::Other(_) => generic::create_bundle(descriptor, ctx),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::capability::{Feature, SupportLevel};
    use crate::platform::detect::{DesktopEnvironment, DisplayProtocol};
    use crate::platform::testing::Harness;
    use crate::platform::BundleKind;

    fn gnome_wayland() -> PlatformDescriptor {
        PlatformDescriptor::new(OsFamily::Linux)
            .with_display_protocol(DisplayProtocol::Wayland)
            .with_desktop(DesktopEnvironment::Gnome)
            .with_clipboard_tools(&["wl-copy"])
    }

    #[test]
    fn same_signature_returns_cached_bundle() {
        let h = Harness::new();
        let factory = AdapterFactory::new(h.context());
        let d = gnome_wayland();

        let first = factory.create_adapters(Some(&d));
        let second = factory.create_adapters(Some(&d));
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(factory.cached(), 1);

        factory.clear_cache();
        let third = factory.create_adapters(Some(&d));
        assert!(!Arc::ptr_eq(&first, &third));
    }

    #[test]
    fn signature_ignores_tool_inventory() {
        let h = Harness::new();
        let factory = AdapterFactory::new(h.context());
        let first = factory.create_adapters(Some(&gnome_wayland()));
        let more_tools = gnome_wayland().with_keyboard_tools(&["wtype"]);
        let second = factory.create_adapters(Some(&more_tools));
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn distinct_signatures_get_distinct_bundles() {
        let h = Harness::new();
        let factory = AdapterFactory::new(h.context());
        let linux = factory.create_adapters(Some(&gnome_wayland()));
        let windows = factory.create_adapters(Some(&PlatformDescriptor::new(OsFamily::Windows)));
        let other = factory.create_adapters(Some(&PlatformDescriptor::new(OsFamily::Other("aix".into()))));
        assert_eq!(linux.kind, BundleKind::Linux);
        assert_eq!(windows.kind, BundleKind::Windows);
        assert_eq!(other.kind, BundleKind::Generic);
        assert_eq!(factory.cached(), 3);
    }

    #[test]
    fn bundles_are_initialized() {
        let h = Harness::new();
        let factory = AdapterFactory::new(h.context());
        let d = PlatformDescriptor::new(OsFamily::Linux)
            .with_display_protocol(DisplayProtocol::X11)
            .with_clipboard_tools(&["xclip"]);
        let bundle = factory.create_adapters(Some(&d));
        assert_eq!(bundle.clipboard.preferred_tool().as_deref(), Some("xclip"));
    }

    #[test]
    fn platform_support() {
        assert!(AdapterFactory::is_platform_supported(&PlatformDescriptor::new(OsFamily::MacOs)));
        assert!(!AdapterFactory::is_platform_supported(&PlatformDescriptor::new(OsFamily::Other(
            "sunos".into()
        ))));
        assert_eq!(AdapterFactory::supported_platforms(), ["Linux", "Windows", "macOS"]);
    }

    #[test]
    fn gnome_wayland_end_to_end() {
        let h = Harness::new();
        let factory = AdapterFactory::new(h.context());
        let d = gnome_wayland();

        let report = AdapterFactory::capabilities(&d).report();
        assert_eq!(report[&Feature::KeyboardSimulation], SupportLevel::NotSupported);
        assert_eq!(report[&Feature::Clipboard], SupportLevel::Supported);

        let bundle = factory.create_adapters(Some(&d));
        assert!(!bundle.keyboard.send_paste_command());
        assert!(h.runner.runs().is_empty());

        assert!(bundle.clipboard.copy_text("hi"));
        let runs = h.runner.runs();
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].program, "wl-copy");
        assert!(runs[0].args.is_empty());
        assert_eq!(runs[0].stdin.as_deref(), Some("hi"));
    }

    #[test]
    fn concurrent_first_access_yields_one_cached_bundle() {
        let h = Harness::new();
        let factory = Arc::new(AdapterFactory::new(h.context()));
        let d = gnome_wayland();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let factory = factory.clone();
                let d = d.clone();
                std::thread::spawn(move || factory.create_adapters(Some(&d)))
            })
            .collect();
        let bundles: Vec<_> = handles.into_iter().map(|t| t.join().unwrap()).collect();

        assert_eq!(factory.cached(), 1);
        let cached = factory.create_adapters(Some(&d));
        assert!(bundles.iter().all(|b| Arc::ptr_eq(b, &cached)));
    }
}
