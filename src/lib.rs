//! brdf-ancillary: BRDF ancillary coefficients for optical scene correction
//!
//! Given a scene's four corner footprint, its sensor and acquisition date,
//! this library selects the contemporary MODIS BRDF composite or the
//! historical Jupp-Li dataset, finds the raw file for every band and BRDF
//! factor, and reduces each to an areal mean with provenance.

pub mod config;
pub mod core;
pub mod io;
pub mod sensor;
pub mod types;

#[cfg(feature = "python")]
mod python;

// Re-export main types and functions for easier access
pub use config::{BrdfConfig, ProbePolicy, UserCoefficients};
pub use core::{
    AmbiguityPolicy, BrdfResolver, BrdfResults, DirectionalParameters, EnvelopeConvention,
    SceneDescription,
};
pub use io::{BrdfCodec, BrdfRaster, RasterBackend, SubsetReader, SubsetWriter};
pub use sensor::{BandTable, Sensor};
pub use types::{
    ArchiveSelection, ArtifactRecord, BandFactorKey, BrdfError, BrdfFactor, BrdfResult, BrdfTier,
    Coordinate, GeoTransform, GeographicEnvelope, RasterSubset, SceneExtent,
};
