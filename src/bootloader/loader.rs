//! Loader asset staging.
//!
//! Collects the syslinux binaries (and an optional gfxboot theme) into
//! `<lookup>/image/loader/`, then mirrors that directory into the ISO boot
//! path.
//!
//! # Staging Flow
//!
//! ```text
//! 1. Wipe and recreate the staging directory
//! 2. Copy required syslinux files from the candidate directories
//! 3. Copy a memtest kernel (best effort)
//! 4. Copy gfxboot theme data and patch gfxboot.cfg (if a theme is set)
//! 5. Copy the theme boot message (if the theme has one)
//! 6. Sync staging into boot/<arch>/loader
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::process::Cmd;
use crate::sync::{DataSync, SyncOptions};

/// Loader files isolinux needs, in copy order.
pub const SYSLINUX_FILES: &[&str] = &[
    "isolinux.bin",
    "ldlinux.c32",
    "libcom32.c32",
    "libutil.c32",
    "gfxboot.c32",
    "gfxboot.com",
    "menu.c32",
    "chain.c32",
    "mboot.c32",
];

/// Directories searched for [`SYSLINUX_FILES`], relative to the lookup path.
///
/// A file present in several directories is taken from the last one.
pub const SYSLINUX_DIRS: &[&str] = &["usr/share/syslinux", "usr/lib/syslinux/modules/bios"];

/// Where gfxboot themes are installed, relative to the lookup path.
pub const THEME_DIR: &str = "etc/bootsplash/themes";

/// Files and directories taking part in one staging run.
#[derive(Debug, Clone)]
pub struct LoaderAssetSet {
    pub files: &'static [&'static str],
    pub source_dirs: Vec<PathBuf>,
    pub theme_dir: Option<PathBuf>,
}

impl LoaderAssetSet {
    pub fn new(lookup_path: &Path, theme: Option<&str>) -> Self {
        Self {
            files: SYSLINUX_FILES,
            source_dirs: SYSLINUX_DIRS.iter().map(|dir| lookup_path.join(dir)).collect(),
            theme_dir: theme.map(|name| lookup_path.join(THEME_DIR).join(name)),
        }
    }
}

/// Stage loader data and sync it into `boot_path`.
///
/// Returns the staging directory, which is left in place.
pub fn copy_loader_data(
    lookup_path: &Path,
    boot_path: &Path,
    theme: Option<&str>,
) -> Result<PathBuf> {
    let assets = LoaderAssetSet::new(lookup_path, theme);
    let loader_data = lookup_path.join("image/loader");

    info!(staging = %loader_data.display(), "Staging isolinux loader data");
    wipe(&loader_data)
        .and_then(|_| fs::create_dir_all(&loader_data))
        .map_err(|e| staging_error("preparing", &loader_data, e))?;

    // Filenames outer, directories inner: later directories overwrite.
    for name in assets.files {
        for dir in &assets.source_dirs {
            let src = dir.join(name);
            if src.exists() {
                debug!(file = %src.display(), "copying loader file");
                fs::copy(&src, loader_data.join(name))
                    .map_err(|e| staging_error("copying", &src, e))?;
            }
        }
    }

    copy_memtest(lookup_path, &loader_data);

    if let Some(theme_path) = &assets.theme_dir {
        copy_theme(theme_path, &loader_data)?;
    }

    info!(dest = %boot_path.display(), "Syncing loader data");
    fs::create_dir_all(boot_path)
        .and_then(|_| DataSync::new(&loader_data, boot_path).sync_data(SyncOptions::mirror()))
        .map_err(|e| staging_error("syncing loader data into", boot_path, e))?;

    Ok(loader_data)
}

fn staging_error(action: &str, path: &Path, e: std::io::Error) -> Error {
    Error::Staging(format!("{} {}: {}", action, path.display(), e))
}

/// Copy `boot/memtest*` as `memtest`, ignoring any failure.
fn copy_memtest(lookup_path: &Path, loader_data: &Path) {
    let script = format!(
        "cp {}memtest* {}",
        shell_quote(&lookup_path.join("boot").join("")),
        shell_quote(&loader_data.join("memtest")),
    );
    let copied = Cmd::new("bash")
        .arg("-c")
        .arg(script)
        .allow_fail()
        .run()
        .map(|result| result.success())
        .unwrap_or(false);
    if !copied {
        debug!("no memtest kernel staged");
    }
}

fn copy_theme(theme_path: &Path, loader_data: &Path) -> Result<()> {
    let cdrom = theme_path.join("cdrom");
    if cdrom.join("gfxboot.cfg").exists() {
        info!(theme = %theme_path.display(), "Copying gfxboot theme");
        let script = format!("cp {}* {}", shell_quote(&cdrom.join("")), shell_quote(loader_data));
        Cmd::new("bash")
            .arg("-c")
            .arg(script)
            .error_msg("copying gfxboot theme failed")
            .run()
            .map_err(|e| Error::Staging(e.to_string()))?;

        // don't move down one menu entry the first time an F-key is used
        Cmd::new("gfxboot")
            .arg("--config-file")
            .arg_path(&loader_data.join("gfxboot.cfg"))
            .args(["--change-config", "install::autodown=0"])
            .error_msg("gfxboot config update failed")
            .run()
            .map_err(|e| Error::Staging(e.to_string()))?;
    }

    let message = theme_path.join("bootloader/message");
    if message.exists() {
        fs::copy(&message, loader_data.join("message"))
            .map_err(|e| staging_error("copying", &message, e))?;
    }

    Ok(())
}

/// Recursively remove a directory, if present.
pub fn wipe(path: &Path) -> std::io::Result<()> {
    if path.is_symlink() || path.is_file() {
        fs::remove_file(path)
    } else if path.exists() {
        fs::remove_dir_all(path)
    } else {
        Ok(())
    }
}

/// Single-quote a path for `bash -c`, keeping a trailing slash.
fn shell_quote(path: &Path) -> String {
    format!("'{}'", path.to_string_lossy().replace('\'', r"'\''"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::exists;
    use tempfile::tempdir;

    fn lookup_with(dir: &Path, files: &[(&str, &str)]) {
        for (path, content) in files {
            let path = dir.join(path);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        }
    }

    #[test]
    fn test_later_directory_wins() {
        let dir = tempdir().unwrap();
        let lookup = dir.path().join("root");
        let boot = dir.path().join("root/boot/x86_64/loader");
        lookup_with(
            &lookup,
            &[
                ("usr/share/syslinux/isolinux.bin", "share"),
                ("usr/lib/syslinux/modules/bios/isolinux.bin", "bios"),
                ("usr/share/syslinux/menu.c32", "menu from share"),
                ("usr/lib/syslinux/modules/bios/ldlinux.c32", "ldlinux from bios"),
            ],
        );

        let staging = copy_loader_data(&lookup, &boot, None).unwrap();

        assert_eq!(fs::read_to_string(staging.join("isolinux.bin")).unwrap(), "bios");
        assert_eq!(fs::read_to_string(boot.join("isolinux.bin")).unwrap(), "bios");
        assert_eq!(fs::read_to_string(boot.join("menu.c32")).unwrap(), "menu from share");
        assert_eq!(
            fs::read_to_string(boot.join("ldlinux.c32")).unwrap(),
            "ldlinux from bios"
        );
        assert!(!boot.join("chain.c32").exists());
    }

    #[test]
    fn test_staging_is_wiped() {
        let dir = tempdir().unwrap();
        let lookup = dir.path().join("root");
        let boot = dir.path().join("out/loader");
        lookup_with(
            &lookup,
            &[
                ("usr/share/syslinux/isolinux.bin", "bin"),
                ("image/loader/leftover", "stale"),
            ],
        );

        let staging = copy_loader_data(&lookup, &boot, None).unwrap();
        assert!(!staging.join("leftover").exists());
        assert!(staging.join("isolinux.bin").exists());
    }

    #[test]
    fn test_sync_mirrors_deletions() {
        let dir = tempdir().unwrap();
        let lookup = dir.path().join("root");
        let boot = dir.path().join("out/loader");
        lookup_with(&lookup, &[("usr/share/syslinux/isolinux.bin", "bin")]);
        fs::create_dir_all(&boot).unwrap();
        fs::write(boot.join("obsolete.c32"), "old").unwrap();

        copy_loader_data(&lookup, &boot, None).unwrap();
        assert!(!boot.join("obsolete.c32").exists());
        assert!(boot.join("isolinux.bin").exists());
    }

    #[test]
    fn test_memtest_copied() {
        let dir = tempdir().unwrap();
        let lookup = dir.path().join("root");
        let boot = dir.path().join("out/loader");
        lookup_with(&lookup, &[("boot/memtest86+.bin", "memtest")]);

        copy_loader_data(&lookup, &boot, None).unwrap();
        assert_eq!(fs::read_to_string(boot.join("memtest")).unwrap(), "memtest");
    }

    #[test]
    fn test_missing_memtest_is_ignored() {
        let dir = tempdir().unwrap();
        let lookup = dir.path().join("root");
        let boot = dir.path().join("out/loader");
        fs::create_dir_all(&lookup).unwrap();

        copy_loader_data(&lookup, &boot, None).unwrap();
        assert!(!boot.join("memtest").exists());
        assert!(boot.is_dir());
    }

    #[test]
    fn test_theme_message_without_gfxboot_cfg() {
        let dir = tempdir().unwrap();
        let lookup = dir.path().join("root");
        let boot = dir.path().join("out/loader");
        lookup_with(
            &lookup,
            &[
                ("etc/bootsplash/themes/Leap/bootloader/message", "splash"),
                ("etc/bootsplash/themes/Leap/cdrom/back.jpg", "jpg"),
            ],
        );

        copy_loader_data(&lookup, &boot, Some("Leap")).unwrap();
        assert_eq!(fs::read_to_string(boot.join("message")).unwrap(), "splash");
        // cdrom data is only taken together with a gfxboot.cfg
        assert!(!boot.join("back.jpg").exists());
    }

    #[test]
    fn test_unknown_theme_is_skipped() {
        let dir = tempdir().unwrap();
        let lookup = dir.path().join("root");
        let boot = dir.path().join("out/loader");
        lookup_with(&lookup, &[("usr/share/syslinux/isolinux.bin", "bin")]);

        copy_loader_data(&lookup, &boot, Some("missing")).unwrap();
        assert!(boot.join("isolinux.bin").exists());
    }

    #[test]
    fn test_failed_theme_copy_aborts_staging() {
        let dir = tempdir().unwrap();
        let lookup = dir.path().join("root");
        let boot = dir.path().join("out/loader");
        lookup_with(
            &lookup,
            &[
                ("usr/share/syslinux/isolinux.bin", "bin"),
                ("etc/bootsplash/themes/Leap/cdrom/gfxboot.cfg", "[base]"),
            ],
        );
        // plain cp refuses directories and exits non-zero
        fs::create_dir_all(lookup.join("etc/bootsplash/themes/Leap/cdrom/fonts")).unwrap();

        let err = copy_loader_data(&lookup, &boot, Some("Leap")).unwrap_err();
        assert!(matches!(err, Error::Staging(_)), "unexpected error: {err}");
        assert!(!boot.exists());
    }

    #[test]
    fn test_missing_gfxboot_aborts_staging() {
        if exists("gfxboot") {
            return;
        }
        let dir = tempdir().unwrap();
        let lookup = dir.path().join("root");
        let boot = dir.path().join("out/loader");
        lookup_with(&lookup, &[("etc/bootsplash/themes/Leap/cdrom/gfxboot.cfg", "[base]")]);

        match copy_loader_data(&lookup, &boot, Some("Leap")) {
            Err(Error::Staging(message)) => assert!(message.contains("gfxboot")),
            other => panic!("expected staging error, got {other:?}"),
        }
        assert!(!boot.exists());
    }

    #[test]
    fn test_failed_message_copy_aborts_staging() {
        let dir = tempdir().unwrap();
        let lookup = dir.path().join("root");
        let boot = dir.path().join("out/loader");
        fs::create_dir_all(lookup.join("etc/bootsplash/themes/Leap/bootloader/message")).unwrap();

        let err = copy_loader_data(&lookup, &boot, Some("Leap")).unwrap_err();
        assert!(matches!(err, Error::Staging(_)), "unexpected error: {err}");
        assert!(!boot.exists());
    }

    #[test]
    fn test_sync_failure_is_staging_error() {
        let dir = tempdir().unwrap();
        let lookup = dir.path().join("root");
        lookup_with(&lookup, &[("usr/share/syslinux/isolinux.bin", "bin")]);
        fs::write(dir.path().join("blocker"), "not a directory").unwrap();
        let boot = dir.path().join("blocker/loader");

        match copy_loader_data(&lookup, &boot, None) {
            Err(Error::Staging(message)) => assert!(message.contains("blocker")),
            other => panic!("expected staging error, got {other:?}"),
        }
        assert!(lookup.join("image/loader/isolinux.bin").exists());
    }

    #[test]
    fn test_asset_set_order() {
        let assets = LoaderAssetSet::new(Path::new("/lookup"), Some("Leap"));
        assert_eq!(assets.files.first(), Some(&"isolinux.bin"));
        assert_eq!(assets.files.len(), 9);
        assert_eq!(
            assets.source_dirs,
            vec![
                PathBuf::from("/lookup/usr/share/syslinux"),
                PathBuf::from("/lookup/usr/lib/syslinux/modules/bios"),
            ]
        );
        assert_eq!(
            assets.theme_dir,
            Some(PathBuf::from("/lookup/etc/bootsplash/themes/Leap"))
        );
    }

    #[test]
    fn test_shell_quote() {
        assert_eq!(shell_quote(Path::new("/a b/")), "'/a b/'");
        assert_eq!(shell_quote(Path::new("/it's")), r"'/it'\''s'");
    }
}
