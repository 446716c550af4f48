//! Blocking filesystem helpers for package extraction and directory moves.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use zip::ZipArchive;

use crate::descriptor::DESCRIPTOR_FILE;

use super::error::InstallError;

/// Maximum number of entries accepted in one package.
pub const MAX_ZIP_ENTRIES: usize = 10_000;

/// How many folder levels below the extraction root are searched for the
/// descriptor.
const DESCRIPTOR_SEARCH_DEPTH: usize = 2;

/// Extracts `zip_path` into `extract_to`.
///
/// Entries whose path would land outside `extract_to` reject the package.
pub fn extract(zip_path: &Path, extract_to: &Path) -> Result<(), InstallError> {
    let file = File::open(zip_path).map_err(|e| InstallError::io("Failed to open package", e))?;
    let mut archive = ZipArchive::new(file)?;

    if archive.len() > MAX_ZIP_ENTRIES {
        return Err(InstallError::InvalidInput(format!(
            "package contains {} entries, limit is {MAX_ZIP_ENTRIES}",
            archive.len()
        )));
    }

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        let relative = match entry.enclosed_name() {
            Some(path) => path.to_path_buf(),
            None => {
                return Err(InstallError::InvalidInput(format!(
                    "entry '{}' escapes the package root",
                    entry.name()
                )));
            }
        };
        let out_path = extract_to.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&out_path)
                .map_err(|e| InstallError::io("Failed to create directory from package", e))?;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| InstallError::io("Failed to create directory from package", e))?;
        }
        let mut outfile = File::create(&out_path)
            .map_err(|e| InstallError::io("Failed to create file from package", e))?;
        io::copy(&mut entry, &mut outfile)
            .map_err(|e| InstallError::io("Failed to extract package entry", e))?;
    }

    Ok(())
}

/// Finds the directory holding the descriptor: the root first, then each
/// level of subdirectories in name order.
pub fn find_descriptor_root(root: &Path) -> Option<PathBuf> {
    let mut level = vec![root.to_path_buf()];

    for depth in 0..=DESCRIPTOR_SEARCH_DEPTH {
        if let Some(found) = level.iter().find(|dir| dir.join(DESCRIPTOR_FILE).is_file()) {
            return Some(found.clone());
        }
        if depth == DESCRIPTOR_SEARCH_DEPTH {
            break;
        }
        level = level.iter().flat_map(|dir| sorted_subdirs(dir)).collect();
    }

    None
}

fn sorted_subdirs(dir: &Path) -> Vec<PathBuf> {
    let Ok(reader) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut dirs: Vec<PathBuf> = reader
        .filter_map(Result::ok)
        .filter(|e| e.file_type().map(|t| t.is_dir()).unwrap_or(false))
        .map(|e| e.path())
        .collect();
    dirs.sort();
    dirs
}

/// Recursively copies `src` into `dst`, creating `dst`.
pub fn copy_tree(src: &Path, dst: &Path) -> io::Result<()> {
    fs::create_dir_all(dst)?;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let target = dst.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_tree(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

/// Moves a directory, falling back to copy and delete when a rename
/// crosses filesystems.
pub async fn move_dir(src: &Path, dst: &Path) -> io::Result<()> {
    match tokio::fs::rename(src, dst).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices || e.raw_os_error() == Some(18) => {
            let (from, to) = (src.to_path_buf(), dst.to_path_buf());
            tokio::task::spawn_blocking(move || {
                copy_tree(&from, &to)?;
                fs::remove_dir_all(&from)
            })
            .await
            .map_err(|e| io::Error::other(e.to_string()))?
        }
        Err(e) => Err(e),
    }
}
