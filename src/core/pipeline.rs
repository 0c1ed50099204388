//! Per band/factor processing of one matched archive file

use crate::config::ProbePolicy;
use crate::io::decompress::WorkingCopy;
use crate::io::raster::RasterBackend;
use crate::types::{
    ArtifactRecord, BrdfError, BrdfFactor, BrdfResult, BrdfTier, GeographicEnvelope, SceneExtent,
};
use std::fs::File;
use std::path::{Path, PathBuf};

/// Provenance tag stored on every record
pub const DATA_SOURCE: &str = "BRDF";

/// One matched archive file to process
#[derive(Debug, Clone, Copy)]
pub struct ArtifactRequest<'a> {
    pub band: u8,
    pub wavelength: &'a str,
    pub factor: BrdfFactor,
    pub source: &'a Path,
}

impl ArtifactRequest<'_> {
    /// `Band_<band>_<wavelength>_<factor>`
    pub fn output_name(&self) -> String {
        format!("Band_{}_{}_{}", self.band, self.wavelength, self.factor.token())
    }
}

/// Runs decompression, conversion, subsetting and averaging for one file
pub struct ArtifactPipeline<'a> {
    backend: RasterBackend<'a>,
    work_dir: &'a Path,
    probe: ProbePolicy,
    tier: BrdfTier,
}

impl<'a> ArtifactPipeline<'a> {
    pub fn new(
        backend: RasterBackend<'a>,
        work_dir: &'a Path,
        probe: ProbePolicy,
        tier: BrdfTier,
    ) -> Self {
        Self {
            backend,
            work_dir,
            probe,
            tier,
        }
    }

    pub fn converted_path(&self, request: &ArtifactRequest<'_>) -> PathBuf {
        self.work_dir.join(request.output_name())
    }

    pub fn subset_path(&self, request: &ArtifactRequest<'_>) -> PathBuf {
        self.work_dir.join(format!("{}_subset", request.output_name()))
    }

    pub fn run(
        &self,
        request: &ArtifactRequest<'_>,
        extent: &SceneExtent,
        envelope: &GeographicEnvelope,
    ) -> BrdfResult<ArtifactRecord> {
        self.probe_source(request.source)?;

        let working_copy = WorkingCopy::prepare(request.source, self.work_dir)?;
        if working_copy.is_temporary() {
            log::debug!(
                "Reading {} from decompressed copy {}",
                request.source.display(),
                working_copy.path().display()
            );
        }

        let converted = self.converted_path(request);
        let raster = self.backend.codec.load(working_copy.path(), envelope)?;
        raster.convert(&converted)?;

        let subset = self
            .backend
            .reader
            .extract(&converted, extent.ul, extent.ur, extent.lr, extent.ll)?;

        let value = raster.mean(&subset)?;

        self.backend.writer.write(&subset, &self.subset_path(request))?;

        // Release the codec handle before removing the file it reads
        drop(raster);
        working_copy.cleanup(self.work_dir)?;

        log::info!(
            "BRDF band {} {} ({}): {:.6}",
            request.band,
            request.factor,
            request.wavelength,
            value
        );

        Ok(ArtifactRecord {
            data_source: DATA_SOURCE.to_string(),
            data_file: request.source.to_path_buf(),
            value,
            tier: self.tier,
        })
    }

    fn probe_source(&self, source: &Path) -> BrdfResult<()> {
        match File::open(source) {
            Ok(_) => Ok(()),
            Err(e) => match self.probe {
                ProbePolicy::Fail => Err(BrdfError::Unreadable {
                    path: source.to_path_buf(),
                    source: e,
                }),
                ProbePolicy::Warn => {
                    log::warn!("Unable to open file {}: {}", source.display(), e);
                    Ok(())
                }
            },
        }
    }
}
