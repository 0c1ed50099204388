#![allow(dead_code)]

use brdf_ancillary::io::ScaleOffset;
use brdf_ancillary::{
    BrdfCodec, BrdfError, BrdfFactor, BrdfRaster, BrdfResult, Coordinate, GeoTransform,
    GeographicEnvelope, RasterBackend, RasterSubset, SceneExtent, Sensor, SubsetReader,
    SubsetWriter,
};
use flate2::write::GzEncoder;
use flate2::Compression;
use ndarray::Array2;
use std::cell::RefCell;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Raw test files are text: `scale offset v1 v2 v3 v4`
pub fn raw_content(scale: f64, offset: f64, values: [f32; 4]) -> String {
    format!(
        "{} {} {} {} {} {}",
        scale, offset, values[0], values[1], values[2], values[3]
    )
}

pub fn write_gzip(path: &Path, content: &[u8]) {
    let mut encoder = GzEncoder::new(File::create(path).unwrap(), Compression::default());
    encoder.write_all(content).unwrap();
    encoder.finish().unwrap();
}

/// Write all band/factor files of a sensor into `epoch_dir`.
///
/// Isotropic files of every band are stored gzip-compressed in a `tiles`
/// sub-directory when `compress_iso` is set.
pub fn populate_epoch(epoch_dir: &Path, sensor: Sensor, base: f32, compress_iso: bool) {
    std::fs::create_dir_all(epoch_dir.join("tiles")).unwrap();

    for (band, wavelength) in sensor.brdf_lut().bands() {
        for (i, factor) in BrdfFactor::ALL.iter().enumerate() {
            let v = base + band as f32 * 10.0 + i as f32;
            let content = raw_content(0.001, 0.0, [v, v + 1.0, v + 2.0, v + 3.0]);
            let name = format!("MCD43_{}_{}", wavelength, factor.token());

            if compress_iso && *factor == BrdfFactor::Isotropic {
                let path = epoch_dir.join("tiles").join(format!("{}.hdf.gz", name));
                if !path.exists() {
                    write_gzip(&path, content.as_bytes());
                }
            } else {
                let path = epoch_dir.join(format!("{}.hdf", name));
                if !path.exists() {
                    std::fs::write(path, content).unwrap();
                }
            }
        }
    }
    std::fs::write(epoch_dir.join("README.txt"), "not a BRDF file").unwrap();
}

/// Contemporary archive spanning 2000-02-18 .. 2013-01-09 and a historical
/// archive with three day-of-year epochs.
pub fn build_archives(root: &Path, sensor: Sensor) -> (PathBuf, PathBuf) {
    let primary = root.join("modis");
    let fallback = root.join("jupp_li");

    for (epoch, base) in [("2000.02.18", 100.0), ("2005.06.10", 200.0), ("2013.01.09", 300.0)] {
        populate_epoch(&primary.join(epoch), sensor, base, true);
    }
    std::fs::create_dir_all(primary.join("scratch")).unwrap();

    for (epoch, base) in [("17", 400.0), ("113", 500.0), ("337", 600.0)] {
        populate_epoch(&fallback.join(epoch), sensor, base, false);
    }

    (primary, fallback)
}

/// Southern hemisphere Landsat-like footprint
pub fn canberra_extent() -> SceneExtent {
    SceneExtent::new(
        Coordinate::new(149.08, -34.98),
        Coordinate::new(151.70, -35.37),
        Coordinate::new(151.20, -37.24),
        Coordinate::new(148.53, -36.85),
    )
}

pub struct FakeRaster {
    scaling: ScaleOffset,
    values: [f32; 4],
}

impl BrdfRaster for FakeRaster {
    fn convert(&self, out_path: &Path) -> BrdfResult<()> {
        let text: Vec<String> = self.values.iter().map(|v| v.to_string()).collect();
        std::fs::write(out_path, text.join(" "))?;
        Ok(())
    }

    fn mean(&self, subset: &RasterSubset) -> BrdfResult<f64> {
        self.scaling.scaled_mean(subset.data.view())
    }
}

/// Parses the text raw format and records every path and envelope it loads
#[derive(Default)]
pub struct FakeCodec {
    pub loaded: RefCell<Vec<PathBuf>>,
    pub envelopes: RefCell<Vec<GeographicEnvelope>>,
}

impl BrdfCodec for FakeCodec {
    fn load(&self, path: &Path, envelope: &GeographicEnvelope) -> BrdfResult<Box<dyn BrdfRaster>> {
        self.loaded.borrow_mut().push(path.to_path_buf());
        self.envelopes.borrow_mut().push(*envelope);

        let content = std::fs::read_to_string(path)?;
        let numbers: Vec<f64> = content
            .split_whitespace()
            .map(|t| t.parse::<f64>())
            .collect::<Result<_, _>>()
            .map_err(|e| BrdfError::Processing(format!("bad raw file {}: {}", path.display(), e)))?;
        if numbers.len() != 6 {
            return Err(BrdfError::Processing(format!("bad raw file {}", path.display())));
        }

        Ok(Box::new(FakeRaster {
            scaling: ScaleOffset {
                scale: numbers[0],
                offset: numbers[1],
                fill_value: None,
            },
            values: [
                numbers[2] as f32,
                numbers[3] as f32,
                numbers[4] as f32,
                numbers[5] as f32,
            ],
        }))
    }
}

/// Reads the converted file back as a 2x2 subset anchored at the UL corner
#[derive(Default)]
pub struct FakeReader;

impl SubsetReader for FakeReader {
    fn extract(
        &self,
        path: &Path,
        ul: Coordinate,
        _ur: Coordinate,
        _lr: Coordinate,
        _ll: Coordinate,
    ) -> BrdfResult<RasterSubset> {
        let content = std::fs::read_to_string(path)?;
        let values: Vec<f32> = content
            .split_whitespace()
            .filter_map(|t| t.parse().ok())
            .collect();
        let data = Array2::from_shape_vec((2, 2), values)
            .map_err(|e| BrdfError::Processing(e.to_string()))?;

        Ok(RasterSubset {
            data,
            geo_transform: GeoTransform::from_gdal([ul.lon, 0.01, 0.0, ul.lat, 0.0, -0.01]),
            projection: "EPSG:4326".to_string(),
        })
    }
}

/// Fails on converted files whose name contains `token`
pub struct FailingReader {
    pub token: &'static str,
}

impl SubsetReader for FailingReader {
    fn extract(
        &self,
        path: &Path,
        ul: Coordinate,
        ur: Coordinate,
        lr: Coordinate,
        ll: Coordinate,
    ) -> BrdfResult<RasterSubset> {
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        if name.contains(self.token) {
            return Err(BrdfError::Processing(format!("cannot subset {}", path.display())));
        }
        FakeReader.extract(path, ul, ur, lr, ll)
    }
}

#[derive(Default)]
pub struct FakeWriter;

impl SubsetWriter for FakeWriter {
    fn write(&self, subset: &RasterSubset, path: &Path) -> BrdfResult<()> {
        let text: Vec<String> = subset.data.iter().map(|v| v.to_string()).collect();
        std::fs::write(path, format!("{}\n{}", subset.projection, text.join(" ")))?;
        Ok(())
    }
}

pub struct FakeBackend {
    pub codec: FakeCodec,
    pub reader: FakeReader,
    pub writer: FakeWriter,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self {
            codec: FakeCodec::default(),
            reader: FakeReader,
            writer: FakeWriter,
        }
    }

    pub fn backend(&self) -> RasterBackend<'_> {
        RasterBackend {
            codec: &self.codec,
            reader: &self.reader,
            writer: &self.writer,
        }
    }
}
