//! Static boot policy shared by all bootloader configurations.
//!
//! These values are passed around as a [`BootPolicy`] instead of living in
//! globals, so tests can swap in alternate policies.

/// Default volume id of a live ISO.
pub const VOLUME_ID: &str = "CDROM";

/// Default volume id of an install ISO.
pub const INSTALL_VOLUME_ID: &str = "INSTALL";

/// Live ISO type used when the build description names none.
pub const LIVE_ISO_TYPE: &str = "overlay";

/// Boot menu timeout used when the build description names none.
pub const BOOT_TIMEOUT_SECONDS: u32 = 10;

/// Kernel options appended to the failsafe menu entry.
pub const FAILSAFE_KERNEL_OPTIONS: &[&str] =
    &["ide=nodma", "apm=off", "noresume", "edd=off", "nomodeset", "3"];

/// Default VESA mode (800x600).
pub const DEFAULT_VIDEO_MODE: &str = "0x303";

/// VESA mode numbers and the resolution isolinux expects for each.
pub const VIDEO_MODES: &[(&str, &str)] = &[
    ("0x301", "640 480"),
    ("0x310", "640 480"),
    ("0x311", "640 480"),
    ("0x312", "640 480"),
    ("0x303", "800 600"),
    ("0x313", "800 600"),
    ("0x314", "800 600"),
    ("0x315", "800 600"),
    ("0x305", "1024 768"),
    ("0x316", "1024 768"),
    ("0x317", "1024 768"),
    ("0x318", "1024 768"),
    ("0x307", "1280 1024"),
    ("0x319", "1280 1024"),
    ("0x31A", "1280 1024"),
    ("0x31B", "1280 1024"),
];

/// Resolution used when neither the requested nor the policy mode is known.
const FALLBACK_RESOLUTION: &str = "800 600";

/// Look up the isolinux resolution of a VESA mode number.
pub fn video_mode(vga: &str) -> Option<&'static str> {
    VIDEO_MODES
        .iter()
        .find(|(mode, _)| mode.eq_ignore_ascii_case(vga))
        .map(|(_, resolution)| *resolution)
}

/// Policy values the boot option assembler draws from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootPolicy {
    pub volume_id: String,
    pub install_volume_id: String,
    pub live_iso_type: String,
    pub boot_timeout_seconds: u32,
    /// Suffix appended to the cmdline for failsafe entries
    pub failsafe_kernel_options: String,
    /// Options enabling a persistent overlay on hybrid ISOs
    pub persistent_boot_options: Vec<String>,
    /// Option name carrying the copy-on-write filesystem, if any
    pub persistent_cowfs_option: String,
    pub video_mode: String,
}

impl Default for BootPolicy {
    fn default() -> Self {
        Self {
            volume_id: VOLUME_ID.to_string(),
            install_volume_id: INSTALL_VOLUME_ID.to_string(),
            live_iso_type: LIVE_ISO_TYPE.to_string(),
            boot_timeout_seconds: BOOT_TIMEOUT_SECONDS,
            failsafe_kernel_options: FAILSAFE_KERNEL_OPTIONS.join(" "),
            persistent_boot_options: vec!["rd.live.overlay.persistent".to_string()],
            persistent_cowfs_option: "rd.live.overlay.cowfs".to_string(),
            video_mode: DEFAULT_VIDEO_MODE.to_string(),
        }
    }
}

impl BootPolicy {
    /// Persistent-boot tokens for a hybrid ISO, keyed by the overlay filesystem.
    pub fn persistent_boot_options(&self, filesystem: Option<&str>) -> Vec<String> {
        let mut options = self.persistent_boot_options.clone();
        if let Some(fs) = filesystem.filter(|fs| !fs.is_empty()) {
            options.push(format!("{}={}", self.persistent_cowfs_option, fs));
        }
        options
    }

    /// isolinux resolution for a requested VESA mode, falling back to the
    /// policy default for unknown modes.
    pub fn isolinux_gfxmode(&self, vga: Option<&str>) -> String {
        vga.and_then(video_mode)
            .or_else(|| video_mode(&self.video_mode))
            .unwrap_or(FALLBACK_RESOLUTION)
            .to_string()
    }
}
