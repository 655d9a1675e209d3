//! Manifest discovery.
//!
//! Lists `*.rb` regular files in the tracked directory, sorted by file name,
//! and parses each one. A file that does not parse aborts discovery.

use std::path::Path;

use tapsync_core::{codec, Manifest};

use crate::error::{io_err, malformed, SyncError};

/// Read and parse every formula under `dir`.
pub fn discover(dir: &Path) -> Result<Vec<Manifest>, SyncError> {
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(|e| io_err(dir, e))? {
        let path = entry.map_err(|e| io_err(dir, e))?.path();
        if path.extension().and_then(|x| x.to_str()) != Some("rb") {
            continue;
        }
        // Follows symlinks: a linked formula is tracked like any other.
        let metadata = std::fs::metadata(&path).map_err(|e| io_err(&path, e))?;
        if metadata.is_file() {
            paths.push(path);
        }
    }
    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    let mut manifests = Vec::with_capacity(paths.len());
    for path in paths {
        let raw_text = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
        let fields = codec::parse(&raw_text).map_err(|e| malformed(&path, e))?;
        let name = fields.name.unwrap_or_else(|| {
            path.file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default()
        });
        tracing::debug!("{name}: pinned at {}", fields.pinned_tag);
        manifests.push(Manifest {
            path,
            name,
            source_url: fields.source_url,
            pinned_tag: fields.pinned_tag,
            pinned_revision: fields.pinned_revision,
            raw_text,
        });
    }
    tracing::info!("discovered {} manifest(s) in {}", manifests.len(), dir.display());
    Ok(manifests)
}
