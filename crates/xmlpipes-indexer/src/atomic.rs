//! All-or-nothing file writes.
//!
//! The indexer binary may read a document-set while a new one is being
//! written, so exports are rendered into a temporary file next to the
//! destination and renamed into place only after the whole render
//! succeeded. If the destination already existed, its permission bits (and,
//! on Unix, its owner) carry over to the replacement.

use std::fs;
use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;
use xmlpipes_core::{Error, Result};

/// Mode given to newly created destinations.
#[cfg(unix)]
const NEW_FILE_MODE: u32 = 0o644;

/// Write `path` atomically with whatever `render` writes.
///
/// # Errors
///
/// Any error from `render` is returned unchanged and leaves the destination
/// untouched. Filesystem failures surface as [`Error::Io`].
pub fn atomic_write<F>(path: &Path, render: F) -> Result<()>
where
    F: FnOnce(&mut dyn Write) -> Result<()>,
{
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(|e| Error::io_with_path(e, dir))?;

    let mut temp = NamedTempFile::new_in(dir).map_err(|e| Error::io_with_path(e, dir))?;
    render(temp.as_file_mut())?;
    temp.as_file_mut()
        .flush()
        .map_err(|e| Error::io_with_path(e, temp.path()))?;

    let previous = fs::metadata(path).ok();
    carry_over_metadata(&temp, previous.as_ref())?;

    temp.persist(path)
        .map_err(|e| Error::io_with_path(e.error, path))?;
    log::debug!("Wrote {}", path.display());
    Ok(())
}

#[cfg(unix)]
fn carry_over_metadata(temp: &NamedTempFile, previous: Option<&fs::Metadata>) -> Result<()> {
    use std::os::unix::fs::{MetadataExt, PermissionsExt};

    let permissions = match previous {
        Some(meta) => meta.permissions(),
        None => fs::Permissions::from_mode(NEW_FILE_MODE),
    };
    fs::set_permissions(temp.path(), permissions)
        .map_err(|e| Error::io_with_path(e, temp.path()))?;

    if let Some(meta) = previous
        && let Err(e) = std::os::unix::fs::chown(temp.path(), Some(meta.uid()), Some(meta.gid()))
    {
        // Only root may give files away; keep the writer as owner otherwise.
        log::debug!("Could not carry over owner of replaced file: {e}");
    }
    Ok(())
}

#[cfg(not(unix))]
fn carry_over_metadata(temp: &NamedTempFile, previous: Option<&fs::Metadata>) -> Result<()> {
    if let Some(meta) = previous {
        fs::set_permissions(temp.path(), meta.permissions())
            .map_err(|e| Error::io_with_path(e, temp.path()))?;
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
