//! Resource lookup and image decoding.
//!
//! Files are searched in the directory of the running executable first, then
//! the current directory, then (for icons) the per-OS icon directories.

use std::path::{Path, PathBuf};

use super::detect::{OsFamily, PlatformDescriptor};
use super::ResourceAdapter;

/// Decoded RGBA8 pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconImage {
    pub rgba: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl IconImage {
    /// A square filled with one colour.
    pub fn solid(size: u32, [r, g, b, a]: [u8; 4]) -> Self {
        let pixels = (size * size) as usize;
        let rgba = [r, g, b, a].repeat(pixels);
        Self {
            rgba,
            width: size,
            height: size,
        }
    }

    pub fn open(path: &Path) -> Result<Self, image::ImageError> {
        let img = image::open(path)?.into_rgba8();
        let (width, height) = img.dimensions();
        Ok(Self {
            rgba: img.into_raw(),
            width,
            height,
        })
    }
}

// ---------------------------------------------------------------------------
// Locator
// ---------------------------------------------------------------------------

/// Search roots for one platform.
#[derive(Debug, Clone, Default)]
pub struct ResourceLocator {
    /// Roots for every resource, in search order.
    pub bundle_dirs: Vec<PathBuf>,
    /// Extra roots searched for icons only.
    pub icon_dirs: Vec<PathBuf>,
    pub app_data_dir: Option<PathBuf>,
}

impl ResourceLocator {
    pub fn for_platform(descriptor: &PlatformDescriptor, app_name: &str) -> Self {
        let mut bundle_dirs = Vec::new();
        if let Some(dir) = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
        {
            bundle_dirs.push(dir);
        }
        if let Ok(cwd) = std::env::current_dir() {
            bundle_dirs.push(cwd);
        }

        let app_data_dir = app_data_dir(&descriptor.os_family, app_name);
        let icon_dirs = match descriptor.os_family {
            OsFamily::Linux => linux_icon_dirs(),
            OsFamily::Windows | OsFamily::MacOs => {
                app_data_dir.iter().map(|d| d.join("icons")).collect()
            }
            OsFamily::Other(_) => Vec::new(),
        };

        Self {
            bundle_dirs,
            icon_dirs,
            app_data_dir,
        }
    }

    /// Resolves `name` against the bundle roots. Absolute paths are checked
    /// as-is.
    pub fn resolve(&self, name: impl AsRef<Path>) -> Option<PathBuf> {
        let name = name.as_ref();
        if name.is_absolute() {
            return name.is_file().then(|| name.to_path_buf());
        }
        self.bundle_dirs
            .iter()
            .map(|dir| dir.join(name))
            .find(|p| p.is_file())
    }

    pub fn find_icon(&self, names: &[&str]) -> Option<PathBuf> {
        names.iter().find_map(|n| self.resolve(n)).or_else(|| {
            self.icon_dirs
                .iter()
                .flat_map(|dir| names.iter().map(move |n| dir.join(n)))
                .find(|p| p.is_file())
        })
    }
}

fn linux_icon_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![
        PathBuf::from("/usr/share/icons/hicolor/256x256/apps"),
        PathBuf::from("/usr/share/pixmaps"),
    ];
    if let Some(home) = dirs::home_dir() {
        dirs.push(home.join(".local/share/icons"));
        dirs.push(home.join(".icons"));
    }
    dirs
}

/// Per-user data directory: `$XDG_DATA_HOME/<app>` (lowercase) on Linux,
/// `%APPDATA%\<App>` on Windows, `~/Library/Application Support/<App>` on
/// macOS.
fn app_data_dir(os: &OsFamily, app_name: &str) -> Option<PathBuf> {
    match os {
        OsFamily::Linux => dirs::data_dir().map(|d| d.join(app_name.to_lowercase())),
        OsFamily::Windows => std::env::var_os("APPDATA")
            .map(PathBuf::from)
            .or_else(dirs::config_dir)
            .map(|d| d.join(app_name)),
        OsFamily::MacOs => dirs::home_dir()
            .map(|h| h.join("Library").join("Application Support").join(app_name)),
        OsFamily::Other(_) => None,
    }
}

// ---------------------------------------------------------------------------
// Adapter
// ---------------------------------------------------------------------------

pub(crate) struct BundledResources {
    locator: ResourceLocator,
}

impl BundledResources {
    pub(crate) fn new(locator: ResourceLocator) -> Self {
        Self { locator }
    }
}

impl ResourceAdapter for BundledResources {
    fn icon_path(&self, icon_names: &[&str]) -> Option<PathBuf> {
        self.locator.find_icon(icon_names)
    }

    fn resource_path(&self, resource_name: &str) -> Option<PathBuf> {
        self.locator.resolve(resource_name)
    }

    fn load_image(&self, path: &Path) -> Option<IconImage> {
        match IconImage::open(path) {
            Ok(img) => Some(img),
            Err(e) => {
                log::debug!("resources: cannot decode {}: {e}", path.display());
                None
            }
        }
    }

    fn app_data_dir(&self) -> Option<PathBuf> {
        self.locator.app_data_dir.clone()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
