//! The most recently shown directory, kept as a single path string in the
//! user's config directory.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use tracing::debug;

use crate::error::Error;

const FILE_NAME: &str = "last_dir";

/// Location of the last-directory file, if the platform has a config dir.
pub fn default_path() -> Option<PathBuf> {
    ProjectDirs::from("org", "rust-slideshow", "rust-slideshow").map(|dirs| dirs.config_dir().join(FILE_NAME))
}

/// Read the remembered directory. Missing, empty, or unreadable files and
/// directories that no longer exist all give `None`.
pub fn load_from(file: &Path) -> Option<PathBuf> {
    let contents = std::fs::read_to_string(file).ok()?;
    let trimmed = contents.trim();
    if trimmed.is_empty() {
        return None;
    }
    let dir = PathBuf::from(trimmed);
    if dir.is_dir() {
        Some(dir)
    } else {
        debug!(dir = %dir.display(), "remembered directory is gone");
        None
    }
}

/// Remember `dir`, creating parent directories as needed.
pub fn store_to(file: &Path, dir: &Path) -> Result<(), Error> {
    if let Some(parent) = file.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(file, dir.to_string_lossy().as_bytes())?;
    debug!(file = %file.display(), dir = %dir.display(), "stored last directory");
    Ok(())
}

pub fn load() -> Option<PathBuf> {
    default_path().and_then(|file| load_from(&file))
}

pub fn store(dir: &Path) -> Result<(), Error> {
    match default_path() {
        Some(file) => store_to(&file, dir),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_only_file_is_ignored() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("last_dir");
        std::fs::write(&file, "  \n").unwrap();
        assert_eq!(load_from(&file), None);
    }

    #[test]
    fn vanished_directory_is_ignored() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("last_dir");
        std::fs::write(&file, tmp.path().join("gone").to_string_lossy().as_bytes()).unwrap();
        assert_eq!(load_from(&file), None);
    }
}
