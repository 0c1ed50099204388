use crate::io::archive::{file_name, is_compressed, COMPRESSED_EXTENSION, RAW_EXTENSION};
use crate::types::{BrdfError, BrdfResult};
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// The raw file a pipeline run reads from
///
/// A decompressed copy is removed when dropped, so early returns on error
/// never leave it behind. The original archive file is never touched.
#[derive(Debug)]
pub enum WorkingCopy {
    Original(PathBuf),
    Decompressed(NamedTempFile),
}

impl WorkingCopy {
    /// Use `source` directly, or gunzip it into `work_dir` when compressed
    pub fn prepare(source: &Path, work_dir: &Path) -> BrdfResult<Self> {
        if !is_compressed(source) {
            return Ok(WorkingCopy::Original(source.to_path_buf()));
        }

        let stem = file_name(source)
            .and_then(|name| name.strip_suffix(COMPRESSED_EXTENSION))
            .unwrap_or("brdf");
        let prefix = format!("{}_", stem);

        log::debug!("Decompressing {} into {}", source.display(), work_dir.display());

        // Concatenated members are decoded in sequence, as `gunzip -c` does
        let input = File::open(source)?;
        let mut decoder = MultiGzDecoder::new(input);
        let mut temp_file = tempfile::Builder::new()
            .prefix(&prefix)
            .suffix(RAW_EXTENSION)
            .tempfile_in(work_dir)?;

        let written = std::io::copy(&mut decoder, &mut temp_file).map_err(|e| {
            BrdfError::Decompression(format!("{}: {}", source.display(), e))
        })?;

        if written == 0 {
            return Err(BrdfError::Decompression(format!(
                "Decompressed BRDF file is empty: {}",
                source.display()
            )));
        }

        log::debug!("Decompressed {} bytes to {}", written, temp_file.path().display());
        Ok(WorkingCopy::Decompressed(temp_file))
    }

    pub fn path(&self) -> &Path {
        match self {
            WorkingCopy::Original(path) => path,
            WorkingCopy::Decompressed(temp_file) => temp_file.path(),
        }
    }

    pub fn is_temporary(&self) -> bool {
        matches!(self, WorkingCopy::Decompressed(_))
    }

    /// Remove the decompressed copy if it lives under `work_dir`
    pub fn cleanup(self, work_dir: &Path) -> BrdfResult<()> {
        match self {
            WorkingCopy::Original(_) => Ok(()),
            WorkingCopy::Decompressed(temp_file) => {
                if temp_file.path().starts_with(work_dir) {
                    log::debug!("Removing temporary file {}", temp_file.path().display());
                    temp_file.close()?;
                } else {
                    log::warn!(
                        "Not removing {} outside work directory {}",
                        temp_file.path().display(),
                        work_dir.display()
                    );
                    temp_file.keep().map_err(std::io::Error::from)?;
                }
                Ok(())
            }
        }
    }
}
