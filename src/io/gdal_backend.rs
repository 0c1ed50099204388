use crate::io::raster::{
    BrdfCodec, BrdfRaster, PixelWindow, ScaleOffset, SubsetReader, SubsetWriter,
};
use crate::types::{
    BrdfError, BrdfResult, Coordinate, GeoTransform, GeographicEnvelope, RasterSubset,
};
use gdal::raster::Buffer;
use gdal::{Dataset, DriverManager, Metadata};
use ndarray::Array2;
use std::path::{Path, PathBuf};

/// Working raster format for converted and subset BRDF files
const WORKING_DRIVER: &str = "ENVI";

/// GDAL reader for raw MODIS / Jupp-Li BRDF files
#[derive(Debug, Default, Clone, Copy)]
pub struct GdalCodec;

impl BrdfCodec for GdalCodec {
    fn load(&self, path: &Path, envelope: &GeographicEnvelope) -> BrdfResult<Box<dyn BrdfRaster>> {
        log::info!("Loading BRDF file: {}", path.display());

        let dataset = open_raster(path)?;
        let scaling = read_scale_offset(&dataset)?;
        log::debug!("BRDF scaling for {}: {:?}", path.display(), scaling);

        // Corner coordinates are in degrees, so only geographic grids can be checked
        let projection = dataset.projection();
        if projection.starts_with("GEOGCS") || projection.starts_with("GEOGCRS") {
            let gt = GeoTransform::from_gdal(dataset.geo_transform()?);
            check_coverage(&gt, dataset.raster_size(), envelope, path)?;
        }

        Ok(Box::new(GdalBrdfRaster {
            path: path.to_path_buf(),
            dataset,
            scaling,
        }))
    }
}

struct GdalBrdfRaster {
    path: PathBuf,
    dataset: Dataset,
    scaling: ScaleOffset,
}

impl BrdfRaster for GdalBrdfRaster {
    fn convert(&self, out_path: &Path) -> BrdfResult<()> {
        log::debug!("Converting {} to {}", self.path.display(), out_path.display());
        let driver = DriverManager::get_driver_by_name(WORKING_DRIVER)?;
        self.dataset.create_copy(&driver, out_path, &[])?;
        Ok(())
    }

    fn mean(&self, subset: &RasterSubset) -> BrdfResult<f64> {
        self.scaling.scaled_mean(subset.data.view())
    }
}

/// Reads the pixel window covering the scene corners
#[derive(Debug, Default, Clone, Copy)]
pub struct GdalSubsetReader;

impl SubsetReader for GdalSubsetReader {
    fn extract(
        &self,
        path: &Path,
        ul: Coordinate,
        ur: Coordinate,
        lr: Coordinate,
        ll: Coordinate,
    ) -> BrdfResult<RasterSubset> {
        let dataset = Dataset::open(path)?;
        let geo_transform = GeoTransform::from_gdal(dataset.geo_transform()?);
        let window =
            PixelWindow::from_corners(&geo_transform, dataset.raster_size(), &[ul, ur, lr, ll])?;

        let rasterband = dataset.rasterband(1)?;
        let band_data = rasterband.read_as::<f32>(
            (window.x_off as isize, window.y_off as isize),
            (window.width, window.height),
            (window.width, window.height),
            None,
        )?;

        let data = Array2::from_shape_vec((window.height, window.width), band_data.data)
            .map_err(|e| BrdfError::Processing(format!("Failed to reshape BRDF subset: {}", e)))?;

        Ok(RasterSubset {
            data,
            geo_transform: window.geo_transform(&geo_transform),
            projection: dataset.projection(),
        })
    }
}

/// Writes subsets as single band float32 rasters
#[derive(Debug, Default, Clone, Copy)]
pub struct GdalSubsetWriter;

impl SubsetWriter for GdalSubsetWriter {
    fn write(&self, subset: &RasterSubset, path: &Path) -> BrdfResult<()> {
        let (height, width) = subset.data.dim();
        log::debug!("Writing {}x{} BRDF subset to {}", width, height, path.display());

        let driver = DriverManager::get_driver_by_name(WORKING_DRIVER)?;
        let mut dataset =
            driver.create_with_band_type::<f32, _>(path, width as isize, height as isize, 1)?;
        dataset.set_geo_transform(&subset.geo_transform.to_gdal())?;
        dataset.set_projection(&subset.projection)?;

        let buffer = Buffer::new((width, height), subset.data.iter().copied().collect());
        let mut rasterband = dataset.rasterband(1)?;
        rasterband.write((0, 0), (width, height), &buffer)?;
        Ok(())
    }
}

/// Open a raw file, descending into the first sub-dataset of HDF containers
fn open_raster(path: &Path) -> BrdfResult<Dataset> {
    let dataset = Dataset::open(path)?;
    if dataset.raster_count() > 0 {
        return Ok(dataset);
    }

    match dataset.metadata_item("SUBDATASET_1_NAME", "SUBDATASETS") {
        Some(name) => {
            log::debug!("Opening sub-dataset {}", name);
            Ok(Dataset::open(Path::new(&name))?)
        }
        None => Err(BrdfError::Processing(format!(
            "No raster data in BRDF file: {}",
            path.display()
        ))),
    }
}

fn read_scale_offset(dataset: &Dataset) -> BrdfResult<ScaleOffset> {
    let rasterband = dataset.rasterband(1)?;
    let lookup = |key: &str| -> BrdfResult<Option<f64>> {
        let value = rasterband
            .metadata_item(key, "")
            .or_else(|| dataset.metadata_item(key, ""));
        match value {
            Some(text) => text.trim().parse::<f64>().map(Some).map_err(|e| {
                BrdfError::Processing(format!("Invalid {} metadata '{}': {}", key, text, e))
            }),
            None => Ok(None),
        }
    };

    let defaults = ScaleOffset::default();
    Ok(ScaleOffset {
        scale: lookup("scale_factor")?.unwrap_or(defaults.scale),
        offset: lookup("add_offset")?.unwrap_or(defaults.offset),
        fill_value: lookup("_FillValue")?.or_else(|| rasterband.no_data_value()),
    })
}

fn check_coverage(
    geo_transform: &GeoTransform,
    raster_size: (usize, usize),
    envelope: &GeographicEnvelope,
    path: &Path,
) -> BrdfResult<()> {
    let corners = [envelope.northwest, envelope.southeast];
    PixelWindow::from_corners(geo_transform, raster_size, &corners)
        .map(|_| ())
        .map_err(|_| {
            BrdfError::Processing(format!(
                "BRDF file {} does not cover scene envelope {:?}",
                path.display(),
                envelope
            ))
        })
}
