//! Band x factor orchestration for one scene

use crate::config::{BrdfConfig, UserCoefficients};
use crate::core::envelope::EnvelopeConvention;
use crate::core::epoch::EpochSelector;
use crate::core::locator::find_artifact;
use crate::core::pipeline::{ArtifactPipeline, ArtifactRequest, DATA_SOURCE};
use crate::io::archive::ArchiveListing;
use crate::io::raster::RasterBackend;
use crate::sensor::{BandTable, Sensor};
use crate::types::{
    ArchiveSelection, ArtifactRecord, BandFactorKey, BrdfError, BrdfFactor, BrdfResult, BrdfTier,
    GeographicEnvelope, SceneExtent,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Scene inputs needed to resolve BRDF coefficients
#[derive(Debug, Clone)]
pub struct SceneDescription {
    pub extent: SceneExtent,
    pub bands: BandTable,
    pub acquisition_date: NaiveDate,
}

impl SceneDescription {
    pub fn new(extent: SceneExtent, sensor: Sensor, acquisition_date: NaiveDate) -> Self {
        Self {
            extent,
            bands: sensor.brdf_lut(),
            acquisition_date,
        }
    }

    /// Use a custom band -> wavelength token table
    pub fn with_bands(mut self, bands: BandTable) -> Self {
        self.bands = bands;
        self
    }
}

/// Resolves the BRDF coefficients of a scene from the archives
pub struct BrdfResolver<'a> {
    config: BrdfConfig,
    backend: RasterBackend<'a>,
}

impl<'a> BrdfResolver<'a> {
    pub fn new(config: BrdfConfig, backend: RasterBackend<'a>) -> Self {
        Self { config, backend }
    }

    pub fn config(&self) -> &BrdfConfig {
        &self.config
    }

    /// Mean BRDF value for every (band, factor) of the scene.
    ///
    /// Any missing or failing pair aborts the whole call.
    pub fn resolve(&self, scene: &SceneDescription) -> BrdfResult<BrdfResults> {
        self.config.validate()?;
        if scene.bands.is_empty() {
            return Err(BrdfError::Configuration("Sensor band table is empty".to_string()));
        }

        if let Some(user) = &self.config.user {
            return user_results(scene, user);
        }

        log::info!(
            "Resolving BRDF for scene dated {} ({} bands)",
            scene.acquisition_date,
            scene.bands.len()
        );

        let envelope = GeographicEnvelope::with_convention(&scene.extent, self.config.envelope);
        let corners = scene.extent.corners();
        if self.config.envelope == EnvelopeConvention::SouthernHemisphere
            && corners.iter().any(|c| c.lat > 0.0)
        {
            log::warn!(
                "Southern hemisphere envelope convention used for a scene with positive latitudes"
            );
        }
        if !corners.iter().all(|c| envelope.contains(c)) {
            log::warn!("Scene corners fall outside the BRDF envelope {:?}", envelope);
        }
        log::debug!(
            "Scene envelope: {:?} ({:.4} x {:.4} degrees)",
            envelope,
            envelope.width(),
            envelope.height()
        );

        let selection = EpochSelector::new(&self.config.primary_path, &self.config.fallback_path)
            .with_definitive_start(self.config.definitive_start)
            .select(scene.acquisition_date)?;
        let candidates = ArchiveListing::scan(selection.epoch_path())?;

        let run_id = self
            .config
            .run_id
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        let work_dir = self.config.run_dir(&run_id);
        std::fs::create_dir_all(&work_dir)?;
        log::info!("BRDF intermediates directory: {}", work_dir.display());

        let pipeline =
            ArtifactPipeline::new(self.backend, &work_dir, self.config.probe, selection.tier);
        let mut records = BTreeMap::new();

        for (band, wavelength) in scene.bands.bands() {
            for factor in BrdfFactor::ALL {
                let source =
                    find_artifact(&candidates, wavelength, factor.token(), self.config.ambiguity)?;
                let request = ArtifactRequest {
                    band,
                    wavelength,
                    factor,
                    source,
                };
                let record = pipeline.run(&request, &scene.extent, &envelope)?;
                records.insert(BandFactorKey::new(band, factor), record);
            }
        }

        Ok(BrdfResults {
            selection,
            work_dir,
            records,
        })
    }
}

/// Records built from a caller-supplied coefficient table, without archives
fn user_results(
    scene: &SceneDescription,
    user: &BTreeMap<u8, UserCoefficients>,
) -> BrdfResult<BrdfResults> {
    log::info!("Using user supplied BRDF coefficients for {} bands", scene.bands.len());

    let mut records = BTreeMap::new();
    for key in scene.bands.keys() {
        let coefficients = user.get(&key.band).ok_or_else(|| {
            BrdfError::Configuration(format!("No user BRDF coefficients for band {}", key.band))
        })?;
        records.insert(
            key,
            ArtifactRecord {
                data_source: DATA_SOURCE.to_string(),
                data_file: PathBuf::new(),
                value: coefficients.value(key.factor),
                tier: BrdfTier::User,
            },
        );
    }

    Ok(BrdfResults {
        selection: ArchiveSelection {
            root: PathBuf::new(),
            tier: BrdfTier::User,
            epoch: String::new(),
        },
        work_dir: PathBuf::new(),
        records,
    })
}

/// Complete BRDF result for one scene
#[derive(Debug, Clone, PartialEq)]
pub struct BrdfResults {
    pub selection: ArchiveSelection,
    pub work_dir: PathBuf,
    records: BTreeMap<BandFactorKey, ArtifactRecord>,
}

/// Directional BRDF parameters of a band, normalised by the isotropic term
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DirectionalParameters {
    /// volumetric / isotropic
    pub alpha_1: f64,
    /// geometric / isotropic
    pub alpha_2: f64,
}

/// Flat provenance entry for serialisation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvenanceEntry {
    pub band: u8,
    pub factor: BrdfFactor,
    #[serde(flatten)]
    pub record: ArtifactRecord,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvenanceSummary {
    pub selection: ArchiveSelection,
    pub work_dir: PathBuf,
    pub entries: Vec<ProvenanceEntry>,
}

impl BrdfResults {
    pub fn get(&self, band: u8, factor: BrdfFactor) -> Option<&ArtifactRecord> {
        self.records.get(&BandFactorKey::new(band, factor))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn tier(&self) -> BrdfTier {
        self.selection.tier
    }

    pub fn iter(&self) -> impl Iterator<Item = (&BandFactorKey, &ArtifactRecord)> {
        self.records.iter()
    }

    pub fn records(&self) -> &BTreeMap<BandFactorKey, ArtifactRecord> {
        &self.records
    }

    /// `alpha_1 = vol / iso`, `alpha_2 = geo / iso`; a zero isotropic term
    /// (e.g. over water) yields a Lambertian surface with both set to zero.
    pub fn directional_parameters(&self, band: u8) -> Option<DirectionalParameters> {
        let iso = self.get(band, BrdfFactor::Isotropic)?.value;
        let vol = self.get(band, BrdfFactor::Volumetric)?.value;
        let geo = self.get(band, BrdfFactor::Geometric)?.value;

        if iso == 0.0 {
            return Some(DirectionalParameters {
                alpha_1: 0.0,
                alpha_2: 0.0,
            });
        }

        Some(DirectionalParameters {
            alpha_1: vol / iso,
            alpha_2: geo / iso,
        })
    }

    pub fn provenance(&self) -> ProvenanceSummary {
        ProvenanceSummary {
            selection: self.selection.clone(),
            work_dir: self.work_dir.clone(),
            entries: self
                .records
                .iter()
                .map(|(key, record)| ProvenanceEntry {
                    band: key.band,
                    factor: key.factor,
                    record: record.clone(),
                })
                .collect(),
        }
    }

    pub fn to_json(&self) -> BrdfResult<String> {
        Ok(serde_json::to_string_pretty(&self.provenance())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn results_with(values: &[(BrdfFactor, f64)]) -> BrdfResults {
        let records = values
            .iter()
            .map(|(factor, value)| {
                (
                    BandFactorKey::new(1, *factor),
                    ArtifactRecord {
                        data_source: "BRDF".to_string(),
                        data_file: PathBuf::from(format!("/brdf/b1_{}.hdf", factor)),
                        value: *value,
                        tier: BrdfTier::Definitive,
                    },
                )
            })
            .collect();

        BrdfResults {
            selection: ArchiveSelection {
                root: PathBuf::from("/brdf"),
                tier: BrdfTier::Definitive,
                epoch: "2005.06.10".to_string(),
            },
            work_dir: PathBuf::from("/tmp/work"),
            records,
        }
    }

    #[test]
    fn test_directional_parameters() {
        let results = results_with(&[
            (BrdfFactor::Geometric, 0.01),
            (BrdfFactor::Isotropic, 0.2),
            (BrdfFactor::Volumetric, 0.05),
        ]);
        let params = results.directional_parameters(1).unwrap();
        assert!((params.alpha_1 - 0.25).abs() < 1e-12);
        assert!((params.alpha_2 - 0.05).abs() < 1e-12);
        assert!(results.directional_parameters(2).is_none());
    }

    #[test]
    fn test_zero_isotropic_is_lambertian() {
        let results = results_with(&[
            (BrdfFactor::Geometric, 0.0),
            (BrdfFactor::Isotropic, 0.0),
            (BrdfFactor::Volumetric, 0.0),
        ]);
        let params = results.directional_parameters(1).unwrap();
        assert_eq!(params.alpha_1, 0.0);
        assert_eq!(params.alpha_2, 0.0);
    }

    #[test]
    fn test_provenance_json() {
        let results = results_with(&[(BrdfFactor::Isotropic, 0.2)]);
        let json = results.to_json().unwrap();
        let summary: ProvenanceSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(summary.entries.len(), 1);
        assert_eq!(summary.entries[0].record.data_source, "BRDF");
        assert_eq!(summary.entries[0].factor, BrdfFactor::Isotropic);
        assert_eq!(summary.selection.epoch, "2005.06.10");
    }
}
