use rayon::prelude::*;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Extension shared by every written card image.
pub const IMAGE_EXTENSION: &str = ".full.jpg";

/// Why a retroactive rename did not happen.
#[derive(Error, Debug)]
pub enum ReconcileError {
    #[error("no file named {0} to rename")]
    Missing(PathBuf),
    #[error("rename failed: {0}")]
    Io(#[from] io::Error),
}

/// Ensure the output directory exists
pub fn ensure_directory(path: &Path) -> io::Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)?;
        info!("Created directory: {}", path.display());
    }
    Ok(())
}

/// File name for an image stem, e.g. `Island2` -> `Island2.full.jpg`.
pub fn image_file_name(stem: &str) -> String {
    format!("{}{}", stem, IMAGE_EXTENSION)
}

/// Rename `dir/old_name` to `dir/new_name` if the old file exists.
///
/// Best effort: a missing file or a filesystem error is returned to the
/// caller, never retried.
pub fn reconcile(dir: &Path, old_name: &str, new_name: &str) -> Result<PathBuf, ReconcileError> {
    let old_file = dir.join(old_name);
    let new_file = dir.join(new_name);

    if !old_file.is_file() {
        return Err(ReconcileError::Missing(old_file));
    }

    fs::rename(&old_file, &new_file)?;
    Ok(new_file)
}

/// Write a payload to `path`, replacing any existing file.
///
/// With no payload the file is only created or truncated.
pub fn write_file(path: &Path, payload: Option<&[u8]>) -> io::Result<u64> {
    let bytes = payload.unwrap_or_default();
    fs::write(path, bytes)?;
    Ok(bytes.len() as u64)
}

/// Count card images in every set directory under the output root.
pub fn count_set_images(output_root: &Path) -> io::Result<Vec<(String, usize)>> {
    if !output_root.exists() {
        return Ok(Vec::new());
    }

    let set_dirs: Vec<PathBuf> = fs::read_dir(output_root)?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().map(|t| t.is_dir()).unwrap_or(false))
        .map(|entry| entry.path())
        .collect();

    let mut counts: Vec<(String, usize)> = set_dirs
        .par_iter()
        .map(|dir| {
            let images = fs::read_dir(dir)
                .map(|entries| {
                    entries
                        .filter_map(|entry| entry.ok())
                        .filter(|entry| {
                            entry.file_name().to_string_lossy().ends_with(IMAGE_EXTENSION)
                        })
                        .count()
                })
                .unwrap_or(0);
            let name = dir
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            (name, images)
        })
        .collect();

    counts.sort();
    Ok(counts)
}
