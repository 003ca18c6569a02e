//! Build description.
//!
//! Describes the ISO image being built: identity, volume ids, live ISO
//! flavour and boot menu preferences. Loaded from TOML.
//!
//! # Example
//!
//! ```rust
//! use isolinux_config::config::{BuildType, Terminal};
//!
//! let build: BuildType = toml::from_str(r#"
//!     image_name = "LimeJeOS"
//!     volid = "LIVE123"
//!     initrd_system = "dracut"
//!     bootloader_console = "serial"
//! "#).unwrap();
//!
//! assert_eq!(build.volid.as_deref(), Some("LIVE123"));
//! assert_eq!(build.bootloader_console, Some(Terminal::Serial));
//! ```

use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

/// Console the boot menu is displayed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Terminal {
    /// Plain text console
    Console,
    /// Graphical console, required for gfxboot themes
    Gfxterm,
    /// Serial line
    Serial,
}

impl fmt::Display for Terminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Terminal::Console => write!(f, "console"),
            Terminal::Gfxterm => write!(f, "gfxterm"),
            Terminal::Serial => write!(f, "serial"),
        }
    }
}

/// Build-type descriptor of an ISO image.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildType {
    /// Image name, used as menu title when no display name is set
    pub image_name: String,
    pub displayname: Option<String>,
    /// ISO9660 volume id for both live and install media
    pub volid: Option<String>,
    /// Volume id of install media, overriding `volid`
    pub install_volid: Option<String>,
    /// Live ISO type (overlay, dmsquash, ...)
    pub flags: Option<String>,
    #[serde(default)]
    pub hybridpersistent: bool,
    pub hybridpersistent_filesystem: Option<String>,
    /// Initrd system, `dracut` adds the install root to the cmdline
    pub initrd_system: Option<String>,
    pub bootloader_console: Option<Terminal>,
    /// VESA mode number such as `0x303`
    pub vga: Option<String>,
    /// Boot menu timeout in seconds
    pub boottimeout: Option<u32>,
    pub kernelcmdline: Option<String>,
    /// Offer a failsafe menu entry, on unless explicitly disabled
    pub installprovidefailsafe: Option<bool>,
    /// Default install menu entry: `install`, `failsafe-install` or `harddisk`
    pub installboot: Option<String>,
    #[serde(default)]
    pub mediacheck: bool,
    /// Xen dom0 image, booted through multiboot
    #[serde(default)]
    pub xen_server: bool,
    /// gfxboot theme name under `etc/bootsplash/themes`
    pub bootloader_theme: Option<String>,
}

impl BuildType {
    /// Create a minimal build description for the given image name.
    pub fn new(image_name: impl Into<String>) -> Self {
        Self {
            image_name: image_name.into(),
            ..Default::default()
        }
    }

    /// Load a build description from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Description(format!("{}: {}", path.display(), e)))?;
        Self::from_toml(&content)
            .map_err(|e| Error::Description(format!("{}: {}", path.display(), e)))
    }

    /// Parse a build description from TOML text.
    pub fn parse(content: &str) -> Result<Self> {
        Self::from_toml(content).map_err(Error::Description)
    }

    fn from_toml(content: &str) -> std::result::Result<Self, String> {
        let build: BuildType = toml::from_str(content).map_err(|e| e.to_string())?;
        if build.image_name.trim().is_empty() {
            return Err("image_name must not be empty".to_string());
        }
        Ok(build)
    }

    /// Menu title: display name if set, image name otherwise.
    pub fn title(&self) -> &str {
        self.displayname
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.image_name)
    }

    pub fn failsafe_requested(&self) -> bool {
        self.installprovidefailsafe != Some(false)
    }

    pub fn is_dracut(&self) -> bool {
        self.initrd_system.as_deref() == Some("dracut")
    }
}
