//! Output directory lifecycle.
//!
//! Every run starts from an empty output directory: whatever the previous
//! run left behind is removed once, before extraction begins. Files are
//! otherwise never deleted.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::VidshotError;

/// Default output directory, relative to the working directory.
pub const DEFAULT_OUTPUT_DIR: &str = "screenshots";

/// Remove `directory` (if present) and create it again, empty.
pub fn reset_directory(directory: &Path) -> Result<(), VidshotError> {
    match fs::remove_dir_all(directory) {
        Ok(()) => log::debug!("Cleared {}", directory.display()),
        Err(error) if error.kind() == ErrorKind::NotFound => {}
        Err(error) => return Err(error.into()),
    }
    fs::create_dir_all(directory)?;
    Ok(())
}

/// Size of `path` in kilobytes (1 KB = 1024 bytes).
pub fn file_size_kb(path: &Path) -> Result<f64, VidshotError> {
    Ok(fs::metadata(path)?.len() as f64 / 1024.0)
}

/// Regular files of `directory`, in directory listing order.
pub fn list_files(directory: &Path) -> Result<Vec<PathBuf>, VidshotError> {
    let mut files = Vec::new();
    for entry in fs::read_dir(directory)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            files.push(entry.path());
        }
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_creates_missing_directory() {
        let scratch = tempfile::tempdir().unwrap();
        let output = scratch.path().join("screenshots");
        reset_directory(&output).unwrap();
        assert!(output.is_dir());
    }

    #[test]
    fn reset_empties_existing_directory() {
        let scratch = tempfile::tempdir().unwrap();
        let output = scratch.path().join("screenshots");
        fs::create_dir_all(output.join("nested")).unwrap();
        fs::write(output.join("screenshot_001.png"), b"old").unwrap();

        reset_directory(&output).unwrap();
        assert_eq!(fs::read_dir(&output).unwrap().count(), 0);
    }

    #[test]
    fn size_is_reported_in_kilobytes() {
        let scratch = tempfile::tempdir().unwrap();
        let file = scratch.path().join("a.png");
        fs::write(&file, vec![0_u8; 2048]).unwrap();
        assert_eq!(file_size_kb(&file).unwrap(), 2.0);
    }

    #[test]
    fn listing_skips_directories() {
        let scratch = tempfile::tempdir().unwrap();
        fs::create_dir(scratch.path().join("sub")).unwrap();
        fs::write(scratch.path().join("a.png"), b"x").unwrap();
        let files = list_files(scratch.path()).unwrap();
        assert_eq!(files, vec![scratch.path().join("a.png")]);
    }
}
