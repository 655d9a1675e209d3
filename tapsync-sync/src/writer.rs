//! Atomic manifest writer.
//!
//! ## `atomic_write` protocol
//!
//! 1. Compare the new text with what is on disk → skip if identical.
//! 2. Write to `<path>.tapsync.tmp` in the same directory.
//! 3. Rename over the final path (atomic on POSIX).
//!
//! Content is written byte-for-byte; line endings are never normalised.
//! A symlinked manifest is written through to its target, so the link
//! survives and the target is what changes.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tapsync_core::ChangeSet;

use crate::error::{io_err, SyncError};

/// Outcome of an individual file write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteResult {
    /// File was written.
    Written { path: PathBuf },
    /// File already held exactly this content.
    Unchanged { path: PathBuf },
    /// `--dry-run` mode: the file *would* have been written.
    WouldWrite { path: PathBuf },
}

impl WriteResult {
    /// The file that was (or would be) written.
    pub fn path(&self) -> &Path {
        match self {
            WriteResult::Written { path }
            | WriteResult::Unchanged { path }
            | WriteResult::WouldWrite { path } => path,
        }
    }
}

pub(crate) fn atomic_write(
    path: &Path,
    content: &str,
    dry_run: bool,
) -> Result<WriteResult, SyncError> {
    let target = resolve_link(path)?;
    let tmp = PathBuf::from(format!("{}.tapsync.tmp", target.display()));
    atomic_write_with_tmp(&target, content, dry_run, &tmp)
}

/// `path` itself, or the file it links to.
fn resolve_link(path: &Path) -> Result<PathBuf, SyncError> {
    match std::fs::symlink_metadata(path) {
        Ok(meta) if meta.file_type().is_symlink() => {
            std::fs::canonicalize(path).map_err(|e| io_err(path, e))
        }
        Ok(_) => Ok(path.to_path_buf()),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(path.to_path_buf()),
        Err(err) => Err(io_err(path, err)),
    }
}

fn atomic_write_with_tmp(
    path: &Path,
    content: &str,
    dry_run: bool,
    tmp: &Path,
) -> Result<WriteResult, SyncError> {
    match std::fs::read(path) {
        Ok(existing) if existing == content.as_bytes() => {
            tracing::debug!("unchanged: {}", path.display());
            return Ok(WriteResult::Unchanged {
                path: path.to_path_buf(),
            });
        }
        Ok(_) => {}
        Err(err) if err.kind() == ErrorKind::NotFound => {}
        Err(err) => return Err(io_err(path, err)),
    }

    if dry_run {
        tracing::info!("[dry-run] would write: {}", path.display());
        return Ok(WriteResult::WouldWrite {
            path: path.to_path_buf(),
        });
    }

    std::fs::write(tmp, content).map_err(|e| io_err(tmp, e))?;

    if let Err(e) = std::fs::rename(tmp, path) {
        let _ = std::fs::remove_file(tmp);
        return Err(io_err(path, e));
    }

    tracing::info!("wrote: {}", path.display());
    Ok(WriteResult::Written {
        path: path.to_path_buf(),
    })
}

/// Write every change in discovery order. Stops at the first failure.
pub fn apply(changes: &ChangeSet, dry_run: bool) -> Result<Vec<WriteResult>, SyncError> {
    changes
        .iter()
        .map(|change| atomic_write(&change.path, &change.new_raw_text, dry_run))
        .collect()
}
