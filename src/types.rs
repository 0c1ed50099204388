use chrono::NaiveDate;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Pixel data of an extracted BRDF subset (rows x cols)
pub type BrdfImage = Array2<f32>;

/// Geographic coordinate in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lon: f64,
    pub lat: f64,
}

impl Coordinate {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from((lon, lat): (f64, f64)) -> Self {
        Self { lon, lat }
    }
}

/// Four corner footprint of a scene
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SceneExtent {
    pub ul: Coordinate,
    pub ur: Coordinate,
    pub lr: Coordinate,
    pub ll: Coordinate,
}

impl SceneExtent {
    pub fn new(ul: Coordinate, ur: Coordinate, lr: Coordinate, ll: Coordinate) -> Self {
        Self { ul, ur, lr, ll }
    }

    /// Corners in UL, UR, LR, LL order
    pub fn corners(&self) -> [Coordinate; 4] {
        [self.ul, self.ur, self.lr, self.ll]
    }
}

/// Axis-aligned geographic box covering a scene extent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeographicEnvelope {
    pub northwest: Coordinate,
    pub southeast: Coordinate,
}

/// BRDF model components, one archive file per band
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BrdfFactor {
    Geometric,
    Isotropic,
    Volumetric,
}

impl BrdfFactor {
    /// All factors in archive processing order
    pub const ALL: [BrdfFactor; 3] = [
        BrdfFactor::Geometric,
        BrdfFactor::Isotropic,
        BrdfFactor::Volumetric,
    ];

    /// Token used in archive filenames
    pub fn token(&self) -> &'static str {
        match self {
            BrdfFactor::Geometric => "geo",
            BrdfFactor::Isotropic => "iso",
            BrdfFactor::Volumetric => "vol",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        match token.to_lowercase().as_str() {
            "geo" | "geometric" => Some(BrdfFactor::Geometric),
            "iso" | "isotropic" => Some(BrdfFactor::Isotropic),
            "vol" | "volumetric" => Some(BrdfFactor::Volumetric),
            _ => None,
        }
    }
}

impl std::fmt::Display for BrdfFactor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.token())
    }
}

/// Result key: sensor band and BRDF factor
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BandFactorKey {
    pub band: u8,
    pub factor: BrdfFactor,
}

impl BandFactorKey {
    pub fn new(band: u8, factor: BrdfFactor) -> Self {
        Self { band, factor }
    }
}

/// Which archive the coefficients came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BrdfTier {
    /// Contemporary MODIS composite
    Definitive,
    /// Historical Jupp-Li dataset
    Fallback,
    /// Coefficients supplied by the caller
    User,
}

impl std::fmt::Display for BrdfTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BrdfTier::Definitive => write!(f, "DEFINITIVE"),
            BrdfTier::Fallback => write!(f, "FALLBACK_DATASET"),
            BrdfTier::User => write!(f, "USER"),
        }
    }
}

/// Archive root and epoch directory chosen for one invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchiveSelection {
    pub root: PathBuf,
    pub tier: BrdfTier,
    pub epoch: String,
}

impl ArchiveSelection {
    pub fn epoch_path(&self) -> PathBuf {
        self.root.join(&self.epoch)
    }
}

/// Covered date range of the contemporary archive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpochRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl EpochRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

/// Provenance and areal mean for one band/factor pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactRecord {
    pub data_source: String,
    pub data_file: PathBuf,
    pub value: f64,
    pub tier: BrdfTier,
}

/// Geospatial transformation parameters (GDAL ordering)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoTransform {
    pub top_left_x: f64,
    pub pixel_width: f64,
    pub rotation_x: f64,
    pub top_left_y: f64,
    pub rotation_y: f64,
    pub pixel_height: f64,
}

impl GeoTransform {
    pub fn from_gdal(gt: [f64; 6]) -> Self {
        Self {
            top_left_x: gt[0],
            pixel_width: gt[1],
            rotation_x: gt[2],
            top_left_y: gt[3],
            rotation_y: gt[4],
            pixel_height: gt[5],
        }
    }

    pub fn to_gdal(&self) -> [f64; 6] {
        [
            self.top_left_x,
            self.pixel_width,
            self.rotation_x,
            self.top_left_y,
            self.rotation_y,
            self.pixel_height,
        ]
    }
}

/// Pixel window extracted for a scene, with its own georeferencing
#[derive(Debug, Clone, PartialEq)]
pub struct RasterSubset {
    pub data: BrdfImage,
    pub geo_transform: GeoTransform,
    pub projection: String,
}

/// Error types for BRDF ancillary resolution
#[derive(Debug, thiserror::Error)]
pub enum BrdfError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Could not find BRDF file for: {wavelength}, {factor}")]
    ArtifactNotFound { wavelength: String, factor: String },

    #[error("Ambiguous BRDF files for: {wavelength}, {factor}: {candidates:?}")]
    AmbiguousArtifact {
        wavelength: String,
        factor: String,
        candidates: Vec<PathBuf>,
    },

    #[error("Unable to open file {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Decompression failed: {0}")]
    Decompression(String),

    #[error("Unknown sensor: {0}")]
    UnknownSensor(String),

    #[error("Processing error: {0}")]
    Processing(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[cfg(feature = "gdal")]
    #[error("GDAL error: {0}")]
    Gdal(#[from] gdal::errors::GdalError),
}

/// Result type for BRDF operations
pub type BrdfResult<T> = Result<T, BrdfError>;
