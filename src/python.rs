//! Python bindings

use crate::config::{BrdfConfig, UserCoefficients};
use crate::core::{BrdfResolver, SceneDescription};
use crate::io::{GdalCodec, GdalSubsetReader, GdalSubsetWriter, RasterBackend};
use crate::sensor::Sensor;
use crate::types::{BrdfError, Coordinate, SceneExtent};
use chrono::NaiveDate;
use pyo3::prelude::*;
use pyo3::types::PyDict;
use std::collections::{BTreeMap, HashMap};

fn to_py_err(e: BrdfError) -> PyErr {
    match e {
        BrdfError::Configuration(_) | BrdfError::UnknownSensor(_) => {
            PyErr::new::<pyo3::exceptions::PyValueError, _>(format!("{}", e))
        }
        BrdfError::ArtifactNotFound { .. } | BrdfError::AmbiguousArtifact { .. } => {
            PyErr::new::<pyo3::exceptions::PyLookupError, _>(format!("{}", e))
        }
        _ => PyErr::new::<pyo3::exceptions::PyRuntimeError, _>(format!("{}", e)),
    }
}

fn corner(extents: &HashMap<String, (f64, f64)>, key: &str) -> PyResult<Coordinate> {
    extents
        .get(key)
        .map(|&(lon, lat)| Coordinate::new(lon, lat))
        .ok_or_else(|| {
            PyErr::new::<pyo3::exceptions::PyKeyError, _>(format!("Missing extent corner: {}", key))
        })
}

fn user_table(
    user: HashMap<u8, HashMap<String, f64>>,
) -> PyResult<BTreeMap<u8, UserCoefficients>> {
    user.into_iter()
        .map(|(band, factors)| {
            let get = |key: &str| {
                factors.get(key).copied().ok_or_else(|| {
                    PyErr::new::<pyo3::exceptions::PyKeyError, _>(format!(
                        "Missing user BRDF {} coefficient for band {}",
                        key, band
                    ))
                })
            };
            Ok((
                band,
                UserCoefficients {
                    geo: get("geo")?,
                    iso: get("iso")?,
                    vol: get("vol")?,
                },
            ))
        })
        .collect()
}

/// Mean BRDF value for each band and factor covering the scene extents.
///
/// Returns a dict keyed by `(band, factor)` with `data_source`,
/// `data_file`, `value` and `tier` entries. When `user` maps bands to
/// `{"geo", "iso", "vol"}` values those are returned with tier `USER`.
#[pyfunction]
#[pyo3(signature = (
    extents, satellite, sensor, date, brdf_primary_path, brdf_secondary_path, work_path,
    user = None
))]
#[allow(clippy::too_many_arguments)]
fn get_brdf_data(
    py: Python<'_>,
    extents: HashMap<String, (f64, f64)>,
    satellite: &str,
    sensor: &str,
    date: &str,
    brdf_primary_path: &str,
    brdf_secondary_path: &str,
    work_path: &str,
    user: Option<HashMap<u8, HashMap<String, f64>>>,
) -> PyResult<PyObject> {
    let extent = SceneExtent::new(
        corner(&extents, "UL")?,
        corner(&extents, "UR")?,
        corner(&extents, "LR")?,
        corner(&extents, "LL")?,
    );
    let acquisition_date = NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|e| {
        PyErr::new::<pyo3::exceptions::PyValueError, _>(format!("Invalid date {}: {}", date, e))
    })?;
    let sensor = Sensor::from_names(satellite, sensor).map_err(to_py_err)?;

    let mut config = BrdfConfig::new(brdf_primary_path, brdf_secondary_path, work_path);
    config.user = user.map(user_table).transpose()?;
    let (codec, reader, writer) = (GdalCodec, GdalSubsetReader, GdalSubsetWriter);
    let backend = RasterBackend {
        codec: &codec,
        reader: &reader,
        writer: &writer,
    };

    let scene = SceneDescription::new(extent, sensor, acquisition_date);
    let results = BrdfResolver::new(config, backend)
        .resolve(&scene)
        .map_err(to_py_err)?;

    let out = PyDict::new(py);
    for (key, record) in results.iter() {
        let entry = PyDict::new(py);
        entry.set_item("data_source", &record.data_source)?;
        entry.set_item("data_file", record.data_file.to_string_lossy().to_string())?;
        entry.set_item("value", record.value)?;
        entry.set_item("tier", record.tier.to_string())?;
        out.set_item((key.band, key.factor.token()), entry)?;
    }

    Ok(out.into_py(py))
}

/// Python module definition
#[pymodule]
fn _core(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(get_brdf_data, m)?)?;
    Ok(())
}
