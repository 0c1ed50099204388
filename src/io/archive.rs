use crate::types::{BrdfError, BrdfResult};
use std::path::{Path, PathBuf};

/// Compressed raw BRDF file extension
pub const COMPRESSED_EXTENSION: &str = ".hdf.gz";

/// Uncompressed raw BRDF file extension
pub const RAW_EXTENSION: &str = ".hdf";

/// Raw BRDF files found under one epoch directory
pub struct ArchiveListing;

impl ArchiveListing {
    /// Recursively collect `.hdf` and `.hdf.gz` files, sorted by path
    pub fn scan<P: AsRef<Path>>(epoch_dir: P) -> BrdfResult<Vec<PathBuf>> {
        let epoch_dir = epoch_dir.as_ref();
        if !epoch_dir.is_dir() {
            return Err(BrdfError::Configuration(format!(
                "BRDF epoch directory does not exist: {}",
                epoch_dir.display()
            )));
        }

        let mut files = Vec::new();
        Self::walk(epoch_dir, &mut files)?;
        files.sort();

        log::debug!(
            "Found {} raw BRDF files in {}",
            files.len(),
            epoch_dir.display()
        );
        Ok(files)
    }

    fn walk(dir: &Path, files: &mut Vec<PathBuf>) -> BrdfResult<()> {
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            // Directory symlinks are not followed
            if entry.file_type()?.is_dir() {
                Self::walk(&path, files)?;
            } else if is_raw_brdf_file(&path) {
                files.push(path);
            }
        }
        Ok(())
    }
}

pub fn is_raw_brdf_file(path: &Path) -> bool {
    file_name(path)
        .map(|name| name.ends_with(RAW_EXTENSION) || name.ends_with(COMPRESSED_EXTENSION))
        .unwrap_or(false)
}

pub fn is_compressed(path: &Path) -> bool {
    file_name(path)
        .map(|name| name.ends_with(COMPRESSED_EXTENSION))
        .unwrap_or(false)
}

pub(crate) fn file_name(path: &Path) -> Option<&str> {
    path.file_name().and_then(|name| name.to_str())
}
