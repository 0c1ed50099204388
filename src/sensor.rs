//! Per-sensor BRDF band lookup tables
//!
//! Each reflective band is mapped to the MODIS band wavelength range whose
//! BRDF parameters stand in for it. The wavelength string is also the token
//! that appears in the archive filenames.

use crate::types::{BandFactorKey, BrdfError, BrdfFactor, BrdfResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const MODIS_BAND_3: &str = "0459_0479nm";
const MODIS_BAND_4: &str = "0545_0565nm";
const MODIS_BAND_1: &str = "0620_0670nm";
const MODIS_BAND_2: &str = "0841_0876nm";
const MODIS_BAND_6: &str = "1628_1652nm";
const MODIS_BAND_7: &str = "2105_2155nm";

/// Sensors with a built-in BRDF lookup table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sensor {
    /// Landsat 5 Thematic Mapper
    Landsat5Tm,
    /// Landsat 7 Enhanced Thematic Mapper Plus
    Landsat7Etm,
    /// Landsat 8 Operational Land Imager
    Landsat8Oli,
}

impl Sensor {
    /// Resolve a sensor from satellite and sensor names, e.g. `LANDSAT_5` / `TM`
    pub fn from_names(satellite: &str, sensor: &str) -> BrdfResult<Self> {
        let sat = satellite.to_uppercase().replace(|c: char| c == '-' || c == ' ', "_");
        let sen = sensor.to_uppercase().replace('+', "");

        match (sat.as_str(), sen.as_str()) {
            ("LANDSAT_5" | "LANDSAT5" | "LS5", "TM") => Ok(Sensor::Landsat5Tm),
            ("LANDSAT_7" | "LANDSAT7" | "LS7", "ETM") => Ok(Sensor::Landsat7Etm),
            ("LANDSAT_8" | "LANDSAT8" | "LS8", "OLI" | "OLI_TIRS") => Ok(Sensor::Landsat8Oli),
            _ => Err(BrdfError::UnknownSensor(format!("{} {}", satellite, sensor))),
        }
    }

    /// Band number -> wavelength token
    pub fn brdf_lut(&self) -> BandTable {
        let entries: &[(u8, &str)] = match self {
            Sensor::Landsat5Tm | Sensor::Landsat7Etm => &[
                (1, MODIS_BAND_3),
                (2, MODIS_BAND_4),
                (3, MODIS_BAND_1),
                (4, MODIS_BAND_2),
                (5, MODIS_BAND_6),
                (7, MODIS_BAND_7),
            ],
            Sensor::Landsat8Oli => &[
                (1, MODIS_BAND_3),
                (2, MODIS_BAND_3),
                (3, MODIS_BAND_4),
                (4, MODIS_BAND_1),
                (5, MODIS_BAND_2),
                (6, MODIS_BAND_6),
                (7, MODIS_BAND_7),
            ],
        };

        BandTable::new(entries.iter().map(|(band, wl)| (*band, wl.to_string())))
    }
}

impl std::fmt::Display for Sensor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Sensor::Landsat5Tm => write!(f, "LANDSAT_5 TM"),
            Sensor::Landsat7Etm => write!(f, "LANDSAT_7 ETM+"),
            Sensor::Landsat8Oli => write!(f, "LANDSAT_8 OLI"),
        }
    }
}

/// Ordered band -> wavelength token table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BandTable {
    bands: BTreeMap<u8, String>,
}

impl BandTable {
    pub fn new<I: IntoIterator<Item = (u8, String)>>(entries: I) -> Self {
        Self {
            bands: entries.into_iter().collect(),
        }
    }

    pub fn wavelength(&self, band: u8) -> Option<&str> {
        self.bands.get(&band).map(String::as_str)
    }

    pub fn bands(&self) -> impl Iterator<Item = (u8, &str)> {
        self.bands.iter().map(|(band, wl)| (*band, wl.as_str()))
    }

    pub fn len(&self) -> usize {
        self.bands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }

    /// Every (band, factor) pair in processing order
    pub fn keys(&self) -> Vec<BandFactorKey> {
        self.bands
            .keys()
            .flat_map(|band| BrdfFactor::ALL.iter().map(move |f| BandFactorKey::new(*band, *f)))
            .collect()
    }
}
