//! File helpers shared by the vault store, export and config code.

use std::fs;
use std::io::Write;
use std::path::Path;

use crate::error::{Result, VaultError};

/// Maximum file size that can be read into memory (10 MB).
///
/// A vault document or export file of this size would hold far more moves
/// than anyone practises; anything larger is treated as a wrong path.
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Read a file into a string, refusing files larger than `MAX_FILE_SIZE`.
pub fn read_to_string_limited(path: &Path) -> Result<String> {
    read_to_string_with_limit(path, MAX_FILE_SIZE)
}

/// Read a file into a string with a custom size limit.
///
/// # Errors
///
/// Returns an error if the file cannot be read or exceeds `max_size`.
pub fn read_to_string_with_limit(path: &Path, max_size: u64) -> Result<String> {
    let metadata = fs::metadata(path).map_err(|e| VaultError::storage(path, e))?;

    let size = metadata.len();
    if size > max_size {
        return Err(VaultError::transfer(format!(
            "file {} is too large ({} bytes, max {} bytes)",
            path.display(),
            size,
            max_size
        )));
    }

    fs::read_to_string(path).map_err(|e| VaultError::storage(path, e))
}

/// Write `content` to `path` atomically.
///
/// The content goes to a hidden temp file next to the target, is synced, and
/// is then renamed over the target. Missing parent directories are created.
pub fn atomic_write(path: &Path, content: &str) -> Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => std::env::current_dir().map_err(|e| VaultError::storage(path, e))?,
    };

    if !parent.exists() {
        fs::create_dir_all(&parent).map_err(|e| VaultError::storage(&parent, e))?;
    }

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .ok_or_else(|| VaultError::transfer(format!("{} is not a file path", path.display())))?;
    let temp_path = parent.join(format!(".{}.tmp", file_name));

    {
        let mut file =
            fs::File::create(&temp_path).map_err(|e| VaultError::storage(&temp_path, e))?;
        file.write_all(content.as_bytes())
            .map_err(|e| VaultError::storage(&temp_path, e))?;
        file.sync_all()
            .map_err(|e| VaultError::storage(&temp_path, e))?;
    }

    // Rename is atomic on POSIX
    fs::rename(&temp_path, path).map_err(|e| VaultError::storage(path, e))?;

    Ok(())
}
