//! isolinux bootloader configuration for ISO images.
//!
//! Renders `isolinux.cfg` and `isolinux.msg` from a build description and
//! stages the syslinux loader files the ISO needs to boot on BIOS machines.

pub mod arch;
pub mod bootloader;
pub mod config;
pub mod defaults;
pub mod error;
pub mod preflight;
pub mod process;
pub mod sync;
pub mod template;

pub use error::{Error, Result};
