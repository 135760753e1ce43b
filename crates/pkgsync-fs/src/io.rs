//! Atomic writes and directory copy/move helpers

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use walkdir::WalkDir;

use crate::{Error, NormalizedPath, Result};

/// Write content atomically to a file with locking.
///
/// Uses write-to-temp-then-rename so readers never observe a partially
/// written file. The temp file is locked exclusively while it is filled.
pub fn write_atomic(path: &NormalizedPath, content: &[u8]) -> Result<()> {
    let native_path = path.to_native();

    if let Some(parent) = native_path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    // Same directory keeps the rename on one filesystem
    let temp_name = format!(
        ".{}.{}.tmp",
        native_path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default(),
        std::process::id()
    );
    let temp_path = native_path.with_file_name(&temp_name);

    let mut temp_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&temp_path)
        .map_err(|e| Error::io(&temp_path, e))?;

    temp_file
        .lock_exclusive()
        .map_err(|_| Error::LockFailed {
            path: native_path.clone(),
        })?;

    let written = temp_file
        .write_all(content)
        .and_then(|_| temp_file.sync_all());
    if let Err(e) = written {
        let _ = fs::remove_file(&temp_path);
        return Err(Error::io(&temp_path, e));
    }

    temp_file.unlock().map_err(|_| Error::LockFailed {
        path: native_path.clone(),
    })?;
    drop(temp_file);

    if let Err(e) = fs::rename(&temp_path, &native_path) {
        let _ = fs::remove_file(&temp_path);
        return Err(Error::io(&native_path, e));
    }

    Ok(())
}

/// Exclusive advisory lock on `<path>.lock`, held until dropped.
///
/// [`write_atomic`] only guards a single write. A read-modify-write cycle
/// across processes holds this lock around the whole cycle instead.
#[derive(Debug)]
pub struct FileLock {
    file: File,
    lock_path: PathBuf,
}

impl FileLock {
    /// Block until the sidecar lock of `path` is held, creating it if needed.
    pub fn acquire(path: &NormalizedPath) -> Result<Self> {
        let native_path = path.to_native();
        let mut lock_name = native_path.file_name().unwrap_or_default().to_os_string();
        lock_name.push(".lock");
        let lock_path = native_path.with_file_name(lock_name);

        if let Some(parent) = lock_path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(|e| Error::io(&lock_path, e))?;
        file.lock_exclusive().map_err(|_| Error::LockFailed {
            path: native_path.clone(),
        })?;

        tracing::trace!(lock = %lock_path.display(), "Acquired file lock");
        Ok(Self { file, lock_path })
    }

    pub fn lock_path(&self) -> &Path {
        &self.lock_path
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            tracing::warn!(lock = %self.lock_path.display(), "Failed to release file lock: {}", e);
        }
    }
}

/// Read text content from a file.
pub fn read_text(path: &NormalizedPath) -> Result<String> {
    let native_path = path.to_native();
    fs::read_to_string(&native_path).map_err(|e| Error::io(&native_path, e))
}

/// Create `path` and any missing parents.
pub fn create_dir_all(path: &NormalizedPath) -> Result<()> {
    let native_path = path.to_native();
    fs::create_dir_all(&native_path).map_err(|e| Error::io(&native_path, e))
}

/// Delete the directory `path` with everything beneath it. A missing path is not an error.
pub fn remove_dir_all(path: &NormalizedPath) -> Result<()> {
    let native_path = path.to_native();
    match fs::remove_dir_all(&native_path) {
        Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(Error::io(&native_path, e)),
        _ => Ok(()),
    }
}

/// Copy a file or a whole directory tree from `src` into `dst`.
///
/// A file source is copied to exactly `dst`. A directory source has its
/// contents mirrored beneath `dst`, creating directories as needed.
/// Existing files at the destination are overwritten.
pub fn copy_tree(src: &NormalizedPath, dst: &NormalizedPath) -> Result<u64> {
    let src_native = src.to_native();
    let dst_native = dst.to_native();

    if src_native.is_file() {
        if let Some(parent) = dst_native.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
        fs::copy(&src_native, &dst_native).map_err(|e| Error::io(&dst_native, e))?;
        return Ok(1);
    }

    if !src_native.is_dir() {
        return Err(Error::SourceMissing { path: src_native });
    }

    let mut copied = 0;
    for entry in WalkDir::new(&src_native) {
        let entry = entry.map_err(|e| {
            let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| src_native.clone());
            Error::io(path, e.into())
        })?;
        let relative = entry
            .path()
            .strip_prefix(&src_native)
            .unwrap_or_else(|_| entry.path());
        let target = dst_native.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(|e| Error::io(&target, e))?;
        } else {
            fs::copy(entry.path(), &target).map_err(|e| Error::io(&target, e))?;
            copied += 1;
        }
    }

    tracing::debug!(src = %src, dst = %dst, files = copied, "Copied tree");
    Ok(copied)
}

/// Move the directory `src` to `dst`, replacing any existing destination.
///
/// The destination's parent is created when missing.
pub fn move_dir(src: &NormalizedPath, dst: &NormalizedPath) -> Result<()> {
    let src_native = src.to_native();
    let dst_native = dst.to_native();

    if !src_native.is_dir() {
        return Err(Error::SourceMissing { path: src_native });
    }

    if dst_native.exists() {
        fs::remove_dir_all(&dst_native).map_err(|e| Error::io(&dst_native, e))?;
    } else if let Some(parent) = dst_native.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    match fs::rename(&src_native, &dst_native) {
        Ok(()) => Ok(()),
        Err(_) => {
            // rename fails across devices; fall back to copy + delete
            copy_tree(src, dst)?;
            fs::remove_dir_all(&src_native).map_err(|e| Error::io(&src_native, e))
        }
    }
}

/// Find directories under `root` that directly contain `file_name`.
///
/// Results are sorted. Once a directory matches, its descendants are not
/// searched, so nested matches are never reported separately from their
/// enclosing directory. A missing `root` yields no matches.
pub fn find_dirs_containing(root: &NormalizedPath, file_name: &str) -> Result<Vec<NormalizedPath>> {
    let root_native = root.to_native();
    if !root_native.is_dir() {
        return Ok(Vec::new());
    }

    let mut found = Vec::new();
    let mut walker = WalkDir::new(&root_native)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter();
    while let Some(entry) = walker.next() {
        let entry = entry.map_err(|e| {
            let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| root_native.clone());
            Error::io(path, e.into())
        })?;
        if entry.file_type().is_dir() && entry.path().join(file_name).is_file() {
            found.push(NormalizedPath::new(entry.path()));
            walker.skip_current_dir();
        }
    }
    Ok(found)
}
