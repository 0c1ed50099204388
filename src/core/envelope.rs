//! Axis-aligned geographic envelope of a scene footprint

use crate::types::{Coordinate, GeographicEnvelope, SceneExtent};
use serde::{Deserialize, Serialize};

/// How the envelope is derived from the four scene corners
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EnvelopeConvention {
    /// Min/max over all corners, valid in either hemisphere
    #[default]
    AllCorners,
    /// West/north corners for the northwest point, east/south for the
    /// southeast point. Only valid for negative latitudes.
    SouthernHemisphere,
}

impl GeographicEnvelope {
    /// Envelope enclosing all four corners
    pub fn from_extent(extent: &SceneExtent) -> Self {
        let corners = extent.corners();
        let lons = corners.iter().map(|c| c.lon);
        let lats = corners.iter().map(|c| c.lat);

        Self {
            northwest: Coordinate::new(
                lons.clone().fold(f64::INFINITY, f64::min),
                lats.clone().fold(f64::NEG_INFINITY, f64::max),
            ),
            southeast: Coordinate::new(
                lons.fold(f64::NEG_INFINITY, f64::max),
                lats.fold(f64::INFINITY, f64::min),
            ),
        }
    }

    /// Legacy envelope using only the side corners
    ///
    /// The latitude min/max logic is correct for the southern hemisphere
    /// only; northern scenes must use [`GeographicEnvelope::from_extent`].
    pub fn southern_hemisphere(extent: &SceneExtent) -> Self {
        Self {
            northwest: Coordinate::new(
                extent.ul.lon.min(extent.ll.lon),
                extent.ul.lat.max(extent.ur.lat),
            ),
            southeast: Coordinate::new(
                extent.lr.lon.max(extent.ur.lon),
                extent.ll.lat.min(extent.lr.lat),
            ),
        }
    }

    pub fn with_convention(extent: &SceneExtent, convention: EnvelopeConvention) -> Self {
        match convention {
            EnvelopeConvention::AllCorners => Self::from_extent(extent),
            EnvelopeConvention::SouthernHemisphere => Self::southern_hemisphere(extent),
        }
    }

    pub fn width(&self) -> f64 {
        self.southeast.lon - self.northwest.lon
    }

    pub fn height(&self) -> f64 {
        self.northwest.lat - self.southeast.lat
    }

    pub fn contains(&self, point: &Coordinate) -> bool {
        point.lon >= self.northwest.lon
            && point.lon <= self.southeast.lon
            && point.lat <= self.northwest.lat
            && point.lat >= self.southeast.lat
    }
}
