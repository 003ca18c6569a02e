//! Bootloader configuration for ISO images.
//!
//! - `options` - Boot options derived once from the build description
//! - `isolinux` - isolinux.cfg / isolinux.msg rendering and writing
//! - `loader` - syslinux binary and theme staging

pub mod isolinux;
pub mod loader;
pub mod options;

pub use isolinux::IsolinuxConfig;
pub use options::BuildConfiguration;

use std::path::Path;

use crate::error::Result;

/// Files a boot menu entry refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFiles {
    /// Hypervisor loaded by multiboot entries
    pub hypervisor: String,
    pub kernel: String,
    pub initrd: String,
}

impl Default for ImageFiles {
    fn default() -> Self {
        Self {
            hypervisor: "xen.gz".to_string(),
            kernel: "linux".to_string(),
            initrd: "initrd".to_string(),
        }
    }
}

/// Operations every ISO bootloader config provides.
pub trait BootLoaderConfig {
    /// Render the installer boot menu into memory.
    fn setup_install_image_config(&mut self, files: &ImageFiles) -> Result<()>;

    /// Render the live system boot menu into memory.
    fn setup_live_image_config(&mut self, files: &ImageFiles) -> Result<()>;

    /// Provide loader binaries for an install ISO.
    ///
    /// `lookup_path` is the tree holding the loader files, the image root
    /// when `None`.
    fn setup_install_boot_images(&self, lookup_path: Option<&Path>) -> Result<()>;

    /// Provide loader binaries for a live ISO.
    fn setup_live_boot_images(&self, lookup_path: Option<&Path>) -> Result<()>;

    /// Write the rendered config to the image.
    fn write(&self) -> Result<()>;
}
