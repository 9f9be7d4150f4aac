//! Configuration file access.
//!
//! ## Atomic write protocol
//!
//! 1. Resolve `<path>` through any symlink so the real file is replaced.
//! 2. Write the new contents to `<path>.prefixsync.tmp`, carrying over the
//!    permissions of the existing file, and fsync it.
//! 3. Rename the temp file over `<path>` (atomic on POSIX).
//! 4. Fsync the parent directory so the rename itself is durable.
//! 5. On any failure before the rename, remove the temp file and leave
//!    `<path>` untouched.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Read/write access to the daemon configuration file.
pub trait ConfigStore {
    fn exists(&self, path: &Path) -> bool;
    fn read(&self, path: &Path) -> io::Result<String>;
    /// Replace the full contents of `path`.
    fn write(&self, path: &Path, contents: &str) -> io::Result<()>;
}

/// The real filesystem, with atomic write-then-rename.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsStore;

impl ConfigStore for FsStore {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn read(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }

    fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
        atomic_write(path, contents)
    }
}

/// Sibling temp path used while writing `path`.
pub fn tmp_path(path: &Path) -> PathBuf {
    PathBuf::from(format!("{}.prefixsync.tmp", path.display()))
}

/// Atomically replace `path` with `contents`.
///
/// A symlinked `path` stays a symlink; its target is what gets replaced.
pub fn atomic_write(path: &Path, contents: &str) -> io::Result<()> {
    let target = resolve_target(path)?;
    atomic_write_with_tmp(&target, contents, &tmp_path(&target))
}

fn resolve_target(path: &Path) -> io::Result<PathBuf> {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.file_type().is_symlink() => fs::canonicalize(path),
        _ => Ok(path.to_path_buf()),
    }
}

fn atomic_write_with_tmp(path: &Path, contents: &str, tmp: &Path) -> io::Result<()> {
    let existing = fs::metadata(path).ok();
    if let Err(e) = write_synced(tmp, contents, existing.as_ref()) {
        let _ = fs::remove_file(tmp);
        return Err(e);
    }

    if let Err(e) = fs::rename(tmp, path) {
        let _ = fs::remove_file(tmp);
        return Err(e);
    }

    // The new contents are in place; a failed directory sync only weakens
    // durability of the rename.
    if let Err(e) = sync_parent(path) {
        tracing::warn!(path = %path.display(), error = %e, "failed to sync parent directory");
    }

    tracing::debug!("wrote: {}", path.display());
    Ok(())
}

fn write_synced(tmp: &Path, contents: &str, existing: Option<&fs::Metadata>) -> io::Result<()> {
    let mut file = fs::File::create(tmp)?;
    file.write_all(contents.as_bytes())?;
    if let Some(meta) = existing {
        file.set_permissions(meta.permissions())?;
    }
    file.sync_all()
}

#[cfg(unix)]
fn sync_parent(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => fs::File::open(dir)?.sync_all(),
        _ => fs::File::open(".")?.sync_all(),
    }
}

#[cfg(not(unix))]
fn sync_parent(_path: &Path) -> io::Result<()> {
    Ok(())
}
