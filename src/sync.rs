//! Directory synchronization.
//!
//! Mirrors the contents of a source directory into a target directory, the
//! way `rsync -a --delete source/ target` would for regular files, symlinks
//! and directories. Ownership, device files and hard links are not carried
//! over.

use std::fs::{self, File};
use std::io;
use std::os::unix::fs::symlink;
use std::path::{Path, PathBuf};

use tracing::debug;

/// Sync behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncOptions {
    /// Preserve permissions, modification times and symlinks
    pub archive: bool,
    /// Remove target entries that are not in the source
    pub delete: bool,
}

impl SyncOptions {
    /// Archive mode with deletion mirroring.
    pub fn mirror() -> Self {
        Self {
            archive: true,
            delete: true,
        }
    }
}

/// A source/target directory pair.
#[derive(Debug, Clone)]
pub struct DataSync {
    source: PathBuf,
    target: PathBuf,
}

impl DataSync {
    pub fn new(source: impl Into<PathBuf>, target: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }

    /// Copy the source tree into the target.
    pub fn sync_data(&self, options: SyncOptions) -> io::Result<()> {
        debug!(
            source = %self.source.display(),
            target = %self.target.display(),
            ?options,
            "syncing"
        );
        sync_dir(&self.source, &self.target, options)
    }
}

fn sync_dir(src: &Path, dst: &Path, options: SyncOptions) -> io::Result<()> {
    if dst.is_symlink() || (dst.exists() && !dst.is_dir()) {
        fs::remove_file(dst)?;
    }
    fs::create_dir_all(dst)?;

    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());
        let file_type = entry.file_type()?;

        if file_type.is_symlink() && options.archive {
            remove_entry(&dst_path)?;
            symlink(fs::read_link(&src_path)?, &dst_path)?;
        } else if src_path.is_dir() {
            sync_dir(&src_path, &dst_path, options)?;
        } else {
            remove_entry(&dst_path)?;
            fs::copy(&src_path, &dst_path)?;
            if options.archive {
                let modified = fs::metadata(&src_path)?.modified()?;
                File::open(&dst_path)?.set_modified(modified)?;
            }
        }
    }

    if options.delete {
        for entry in fs::read_dir(dst)? {
            let entry = entry?;
            if fs::symlink_metadata(src.join(entry.file_name())).is_err() {
                debug!(path = %entry.path().display(), "deleting");
                remove_entry(&entry.path())?;
            }
        }
    }

    // after the last change to the directory contents
    if options.archive {
        let metadata = fs::metadata(src)?;
        File::open(dst)?.set_modified(metadata.modified()?)?;
        fs::set_permissions(dst, metadata.permissions())?;
    }

    Ok(())
}

fn remove_entry(path: &Path) -> io::Result<()> {
    if path.is_symlink() || path.is_file() {
        fs::remove_file(path)
    } else if path.is_dir() {
        fs::remove_dir_all(path)
    } else if fs::symlink_metadata(path).is_ok() {
        fs::remove_file(path)
    } else {
        Ok(())
    }
}
