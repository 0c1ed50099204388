//! Resolver configuration

use crate::core::envelope::EnvelopeConvention;
use crate::core::locator::AmbiguityPolicy;
use crate::types::{BrdfError, BrdfFactor, BrdfResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Name of the intermediate directory created under `work_path`
pub const INTERMEDIATES_DIR: &str = "brdf_intermediates";

/// What to do when a matched archive file cannot be opened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ProbePolicy {
    /// Abort with [`BrdfError::Unreadable`]
    #[default]
    Fail,
    /// Log a warning and carry on
    Warn,
}

/// Caller-supplied BRDF coefficients of one band
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UserCoefficients {
    pub geo: f64,
    pub iso: f64,
    pub vol: f64,
}

impl UserCoefficients {
    pub fn value(&self, factor: BrdfFactor) -> f64 {
        match factor {
            BrdfFactor::Geometric => self.geo,
            BrdfFactor::Isotropic => self.iso,
            BrdfFactor::Volumetric => self.vol,
        }
    }
}

/// BRDF resolver configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrdfConfig {
    /// Contemporary archive root with `YYYY.MM.DD` epoch directories
    pub primary_path: PathBuf,
    /// Historical Jupp-Li archive root with day-of-year directories
    pub fallback_path: PathBuf,
    /// Working directory; intermediates go under `brdf_intermediates/<run_id>`
    pub work_path: PathBuf,
    /// Earliest date contemporary data is used for, if later than the archive
    pub definitive_start: Option<NaiveDate>,
    pub envelope: EnvelopeConvention,
    pub probe: ProbePolicy,
    pub ambiguity: AmbiguityPolicy,
    /// Invocation identifier; a random UUID when unset
    pub run_id: Option<String>,
    /// Per-band override; when set the archives are not read at all
    pub user: Option<BTreeMap<u8, UserCoefficients>>,
}

impl Default for BrdfConfig {
    fn default() -> Self {
        Self {
            primary_path: PathBuf::new(),
            fallback_path: PathBuf::new(),
            work_path: PathBuf::new(),
            definitive_start: None,
            envelope: EnvelopeConvention::default(),
            probe: ProbePolicy::default(),
            ambiguity: AmbiguityPolicy::default(),
            run_id: None,
            user: None,
        }
    }
}

impl BrdfConfig {
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>, R: AsRef<Path>>(
        primary_path: P,
        fallback_path: Q,
        work_path: R,
    ) -> Self {
        Self {
            primary_path: primary_path.as_ref().to_path_buf(),
            fallback_path: fallback_path.as_ref().to_path_buf(),
            work_path: work_path.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    pub fn from_json_str(json: &str) -> BrdfResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> BrdfResult<Self> {
        log::debug!("Reading BRDF configuration from {}", path.as_ref().display());
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn validate(&self) -> BrdfResult<()> {
        if let Some(user) = &self.user {
            return validate_user(user);
        }

        let paths = [
            ("primary_path", &self.primary_path),
            ("fallback_path", &self.fallback_path),
            ("work_path", &self.work_path),
        ];
        for (name, path) in paths {
            if path.as_os_str().is_empty() {
                return Err(BrdfError::Configuration(format!("{} is not set", name)));
            }
        }

        if let Some(run_id) = &self.run_id {
            let separator = run_id.contains(|c: char| c == '/' || c == '\\');
            if run_id.is_empty() || separator || run_id == "." || run_id == ".." {
                return Err(BrdfError::Configuration(format!(
                    "run_id must be a single path component: {:?}",
                    run_id
                )));
            }
        }

        Ok(())
    }

    /// Invocation work directory for `run_id`
    pub fn run_dir(&self, run_id: &str) -> PathBuf {
        self.work_path.join(INTERMEDIATES_DIR).join(run_id)
    }
}

fn validate_user(user: &BTreeMap<u8, UserCoefficients>) -> BrdfResult<()> {
    if user.is_empty() {
        return Err(BrdfError::Configuration(
            "User BRDF coefficient table is empty".to_string(),
        ));
    }
    for (band, coefficients) in user {
        for factor in BrdfFactor::ALL {
            if !coefficients.value(factor).is_finite() {
                return Err(BrdfError::Configuration(format!(
                    "User BRDF {} coefficient of band {} is not finite",
                    factor, band
                )));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_strict() {
        let config = BrdfConfig::default();
        assert_eq!(config.probe, ProbePolicy::Fail);
        assert_eq!(config.ambiguity, AmbiguityPolicy::Error);
        assert_eq!(config.envelope, EnvelopeConvention::AllCorners);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_json_with_partial_fields() {
        let config = BrdfConfig::from_json_str(
            r#"{
                "primary_path": "/g/data/brdf/modis",
                "fallback_path": "/g/data/brdf/jupp_li",
                "work_path": "/tmp/nbar",
                "definitive_start": "2002-07-01",
                "probe": "Warn"
            }"#,
        )
        .unwrap();
        assert_eq!(config.probe, ProbePolicy::Warn);
        assert_eq!(config.definitive_start, NaiveDate::from_ymd_opt(2002, 7, 1));
        assert_eq!(config.ambiguity, AmbiguityPolicy::Error);
        assert_eq!(
            config.run_dir("abc"),
            PathBuf::from("/tmp/nbar/brdf_intermediates/abc")
        );
    }

    #[test]
    fn test_run_id_must_be_one_component() {
        let mut config = BrdfConfig::new("/a", "/b", "/c");
        config.run_id = Some("../escape".to_string());
        assert!(matches!(config.validate(), Err(BrdfError::Configuration(_))));
        config.run_id = Some("scene-042".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_user_table_needs_no_archive_paths() {
        let config = BrdfConfig::from_json_str(
            r#"{
                "user": {
                    "1": { "geo": 0.01, "iso": 0.2, "vol": 0.05 },
                    "2": { "geo": 0.02, "iso": 0.3, "vol": 0.06 }
                }
            }"#,
        )
        .unwrap();
        let user = config.user.unwrap();
        assert_eq!(user.len(), 2);
        assert_eq!(user[&2].value(BrdfFactor::Isotropic), 0.3);
        assert_eq!(user[&1].value(BrdfFactor::Geometric), 0.01);
    }

    #[test]
    fn test_user_table_rejects_non_finite_values() {
        let mut config = BrdfConfig::default();
        let mut user = BTreeMap::new();
        user.insert(
            3,
            UserCoefficients {
                geo: 0.0,
                iso: f64::NAN,
                vol: 0.0,
            },
        );
        config.user = Some(user);
        assert!(matches!(config.validate(), Err(BrdfError::Configuration(_))));

        config.user = Some(BTreeMap::new());
        assert!(config.validate().is_err());
    }
}
