//! Boot option assembly.
//!
//! Everything the isolinux templates need that depends only on the build
//! description and policy is computed once here, when the bootloader config
//! is created, and never changes afterwards.

use crate::arch;
use crate::config::{BuildType, Terminal};
use crate::defaults::BootPolicy;
use crate::error::Result;

/// Label of the hard disk menu entry.
pub const HARDDISK_LABEL: &str = "Boot_from_Hard_Disk";

/// Immutable boot configuration derived from a build description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildConfiguration {
    /// Normalized architecture tag, `x86_64` or `ix86`
    pub arch: &'static str,
    pub volume_id: String,
    pub install_volume_id: String,
    pub live_type: String,
    pub hybrid_persistent: bool,
    pub hybrid_persistent_filesystem: Option<String>,
    pub terminal: Option<Terminal>,
    pub gfxmode: String,
    /// Boot menu timeout in tenths of a second
    pub timeout: u64,
    pub cmdline: String,
    pub cmdline_failsafe: String,
    pub live_boot_options: Vec<String>,
    pub install_boot_options: Vec<String>,
    pub failsafe_boot: bool,
    pub mediacheck_boot: bool,
    pub multiboot: bool,
    pub theme: Option<String>,
    /// Menu title, usable as an isolinux label
    pub title: String,
    /// Label selected by default in the install menu
    pub install_boot_default: String,
}

impl BuildConfiguration {
    /// Validate the host architecture and derive every boot option.
    pub fn assemble(build: &BuildType, policy: &BootPolicy, machine: &str) -> Result<Self> {
        let arch = arch::resolve(machine)?;

        let volume_id = build
            .volid
            .clone()
            .unwrap_or_else(|| policy.volume_id.clone());
        let install_volume_id = build
            .install_volid
            .clone()
            .or_else(|| build.volid.clone())
            .unwrap_or_else(|| policy.install_volume_id.clone());
        let live_type = build
            .flags
            .clone()
            .filter(|flags| !flags.is_empty())
            .unwrap_or_else(|| policy.live_iso_type.clone());

        let cmdline = boot_cmdline(build);
        let cmdline_failsafe =
            [cmdline.as_str(), policy.failsafe_kernel_options.as_str()].join(" ");

        let title = menu_label(build.title());
        let install_boot_default = install_boot_default(build.installboot.as_deref(), &title);

        // isolinux counts the timeout in units of 1/10 sec
        let seconds = build.boottimeout.unwrap_or(policy.boot_timeout_seconds);
        let timeout = u64::from(seconds) * 10;

        Ok(Self {
            arch,
            live_boot_options: live_boot_options(build, policy, &volume_id),
            install_boot_options: install_boot_options(build, &install_volume_id),
            volume_id,
            install_volume_id,
            live_type,
            hybrid_persistent: build.hybridpersistent,
            hybrid_persistent_filesystem: build.hybridpersistent_filesystem.clone(),
            terminal: build.bootloader_console,
            gfxmode: policy.isolinux_gfxmode(build.vga.as_deref()),
            timeout,
            cmdline,
            cmdline_failsafe,
            failsafe_boot: build.failsafe_requested(),
            mediacheck_boot: build.mediacheck,
            multiboot: build.xen_server,
            theme: build.bootloader_theme.clone().filter(|theme| !theme.is_empty()),
            title,
            install_boot_default,
        })
    }
}

/// Kernel command line shared by every menu entry.
pub fn boot_cmdline(build: &BuildType) -> String {
    build
        .kernelcmdline
        .as_deref()
        .map(str::trim)
        .unwrap_or_default()
        .to_string()
}

/// Options for booting the live system from the ISO.
pub fn live_boot_options(build: &BuildType, policy: &BootPolicy, volume_id: &str) -> Vec<String> {
    let mut options = vec![
        format!("root=live:CDLABEL={}", volume_id),
        "rd.live.image".to_string(),
    ];
    if build.hybridpersistent {
        options.extend(
            policy.persistent_boot_options(build.hybridpersistent_filesystem.as_deref()),
        );
    }
    options
}

/// Options for booting the installer from the ISO.
pub fn install_boot_options(build: &BuildType, install_volume_id: &str) -> Vec<String> {
    let mut options = vec!["loglevel=0".to_string()];
    if build.is_dracut() {
        options.push(format!("root=install:CDLABEL={}", install_volume_id));
    }
    options
}

/// isolinux labels cannot contain whitespace.
pub fn menu_label(title: &str) -> String {
    title.split_whitespace().collect::<Vec<_>>().join("_")
}

/// Label the install menu starts on.
pub fn install_boot_default(installboot: Option<&str>, label: &str) -> String {
    match installboot {
        Some("install") => label.to_string(),
        Some("failsafe-install") => format!("Failsafe_--_{}", label),
        _ => HARDDISK_LABEL.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn build() -> BuildType {
        BuildType {
            volid: Some("LIVE123".to_string()),
            kernelcmdline: Some("splash quiet".to_string()),
            ..BuildType::new("LimeJeOS")
        }
    }

    #[test]
    fn test_rejects_unsupported_arch() {
        let err = BuildConfiguration::assemble(&build(), &BootPolicy::default(), "aarch64")
            .unwrap_err();
        assert!(matches!(err, Error::Platform(arch) if arch == "aarch64"));
    }

    #[test]
    fn test_arch_tag() {
        let policy = BootPolicy::default();
        let config = BuildConfiguration::assemble(&build(), &policy, "i586").unwrap();
        assert_eq!(config.arch, "ix86");
    }

    #[test]
    fn test_timeout_in_deciseconds() {
        let policy = BootPolicy::default();
        for seconds in [0, 1, 7, 10, 3600, u32::MAX] {
            let build = BuildType { boottimeout: Some(seconds), ..build() };
            let config = BuildConfiguration::assemble(&build, &policy, "x86_64").unwrap();
            assert_eq!(config.timeout, u64::from(seconds) * 10);
        }

        let config = BuildConfiguration::assemble(&build(), &policy, "x86_64").unwrap();
        assert_eq!(config.timeout, 100);
    }

    #[test]
    fn test_failsafe_cmdline() {
        let policy = BootPolicy {
            failsafe_kernel_options: "nomodeset x11failsafe".to_string(),
            ..BootPolicy::default()
        };
        let config = BuildConfiguration::assemble(&build(), &policy, "x86_64").unwrap();
        assert_eq!(config.cmdline, "splash quiet");
        assert_eq!(config.cmdline_failsafe, "splash quiet nomodeset x11failsafe");
    }

    #[test]
    fn test_install_options_dracut() {
        let options = install_boot_options(&build(), "INSTALL1");
        assert_eq!(options, vec!["loglevel=0"]);

        let dracut = BuildType { initrd_system: Some("dracut".to_string()), ..build() };
        let options = install_boot_options(&dracut, "INSTALL1");
        assert_eq!(options, vec!["loglevel=0", "root=install:CDLABEL=INSTALL1"]);
    }

    #[test]
    fn test_live_options_persistent() {
        let policy = BootPolicy::default();
        let options = live_boot_options(&build(), &policy, "LIVE123");
        assert_eq!(options, vec!["root=live:CDLABEL=LIVE123", "rd.live.image"]);

        let persistent = BuildType {
            hybridpersistent: true,
            hybridpersistent_filesystem: Some("xfs".to_string()),
            ..build()
        };
        let options = live_boot_options(&persistent, &policy, "LIVE123");
        assert_eq!(
            options,
            vec![
                "root=live:CDLABEL=LIVE123",
                "rd.live.image",
                "rd.live.overlay.persistent",
                "rd.live.overlay.cowfs=xfs",
            ]
        );
    }

    #[test]
    fn test_volume_id_defaults() {
        let policy = BootPolicy::default();
        let build = BuildType::new("LimeJeOS");
        let config = BuildConfiguration::assemble(&build, &policy, "x86_64").unwrap();
        assert_eq!(config.volume_id, "CDROM");
        assert_eq!(config.install_volume_id, "INSTALL");

        let build = BuildType { volid: Some("LIVE123".to_string()), ..build };
        let config = BuildConfiguration::assemble(&build, &policy, "x86_64").unwrap();
        assert_eq!(config.install_volume_id, "LIVE123");

        let build = BuildType { install_volid: Some("INSTALL1".to_string()), ..build };
        let config = BuildConfiguration::assemble(&build, &policy, "x86_64").unwrap();
        assert_eq!(config.volume_id, "LIVE123");
        assert_eq!(config.install_volume_id, "INSTALL1");
        assert_eq!(config.live_type, "overlay");
        assert_eq!(config.cmdline, "");
        assert!(config.failsafe_boot);
        assert!(!config.multiboot);
    }

    #[test]
    fn test_install_boot_default() {
        assert_eq!(install_boot_default(None, "Leap"), HARDDISK_LABEL);
        assert_eq!(install_boot_default(Some("harddisk"), "Leap"), HARDDISK_LABEL);
        assert_eq!(install_boot_default(Some("install"), "Leap"), "Leap");
        assert_eq!(
            install_boot_default(Some("failsafe-install"), "Leap"),
            "Failsafe_--_Leap"
        );
    }

    #[test]
    fn test_menu_label() {
        assert_eq!(menu_label("openSUSE Leap 15.6"), "openSUSE_Leap_15.6");
        assert_eq!(menu_label("plain"), "plain");
    }
}
