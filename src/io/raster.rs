//! Raster collaborators consumed by the BRDF pipeline
//!
//! The pipeline never parses raw BRDF files itself. It goes through these
//! traits, implemented by [`crate::io::gdal_backend`] when the `gdal` feature
//! is enabled, or by any other codec the caller provides.

use crate::types::{
    BrdfError, BrdfResult, Coordinate, GeoTransform, GeographicEnvelope, RasterSubset,
};
use ndarray::ArrayView2;
use num_traits::Float;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A loaded raw BRDF file
pub trait BrdfRaster {
    /// Rewrite the raw file into the working raster format at `out_path`
    fn convert(&self, out_path: &Path) -> BrdfResult<()>;

    /// Areal mean of `subset`, using this file's scale/offset metadata
    fn mean(&self, subset: &RasterSubset) -> BrdfResult<f64>;
}

/// Loads raw BRDF files
pub trait BrdfCodec {
    fn load(&self, path: &Path, envelope: &GeographicEnvelope) -> BrdfResult<Box<dyn BrdfRaster>>;
}

/// Extracts the pixel window covering four scene corners
pub trait SubsetReader {
    fn extract(
        &self,
        path: &Path,
        ul: Coordinate,
        ur: Coordinate,
        lr: Coordinate,
        ll: Coordinate,
    ) -> BrdfResult<RasterSubset>;
}

/// Persists an extracted subset with its projection and geotransform
pub trait SubsetWriter {
    fn write(&self, subset: &RasterSubset, path: &Path) -> BrdfResult<()>;
}

/// The three collaborators one resolver run needs
#[derive(Clone, Copy)]
pub struct RasterBackend<'a> {
    pub codec: &'a dyn BrdfCodec,
    pub reader: &'a dyn SubsetReader,
    pub writer: &'a dyn SubsetWriter,
}

/// Linear scaling stored with each raw BRDF dataset
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaleOffset {
    pub scale: f64,
    pub offset: f64,
    pub fill_value: Option<f64>,
}

impl Default for ScaleOffset {
    fn default() -> Self {
        Self {
            scale: 1.0,
            offset: 0.0,
            fill_value: None,
        }
    }
}

impl ScaleOffset {
    /// Mean of `scale * (value - offset)` over finite, non-fill pixels
    pub fn scaled_mean<T: Float>(&self, data: ArrayView2<T>) -> BrdfResult<f64> {
        let mut sum = 0.0f64;
        let mut count = 0usize;

        for value in data.iter().filter_map(|v| v.to_f64()) {
            if !value.is_finite() || Some(value) == self.fill_value {
                continue;
            }
            sum += self.scale * (value - self.offset);
            count += 1;
        }

        if count == 0 {
            return Err(BrdfError::Processing(format!(
                "No valid BRDF pixels in {}x{} subset",
                data.nrows(),
                data.ncols()
            )));
        }

        Ok(sum / count as f64)
    }
}

/// Pixel window of a north-up raster
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelWindow {
    pub x_off: usize,
    pub y_off: usize,
    pub width: usize,
    pub height: usize,
}

impl PixelWindow {
    /// Window covering `corners` in a raster of `raster_size` (width, height)
    pub fn from_corners(
        geo_transform: &GeoTransform,
        raster_size: (usize, usize),
        corners: &[Coordinate],
    ) -> BrdfResult<Self> {
        if geo_transform.rotation_x != 0.0 || geo_transform.rotation_y != 0.0 {
            return Err(BrdfError::Processing(
                "Rotated BRDF rasters are not supported".to_string(),
            ));
        }
        if geo_transform.pixel_width == 0.0 || geo_transform.pixel_height == 0.0 {
            return Err(BrdfError::Processing(
                "BRDF raster has a zero pixel size".to_string(),
            ));
        }

        let (raster_width, raster_height) = raster_size;
        let (mut min_col, mut max_col) = (f64::INFINITY, f64::NEG_INFINITY);
        let (mut min_row, mut max_row) = (f64::INFINITY, f64::NEG_INFINITY);

        for corner in corners {
            let col =
                ((corner.lon - geo_transform.top_left_x) / geo_transform.pixel_width).floor();
            let row =
                ((corner.lat - geo_transform.top_left_y) / geo_transform.pixel_height).floor();
            min_col = min_col.min(col);
            max_col = max_col.max(col);
            min_row = min_row.min(row);
            max_row = max_row.max(row);
        }

        if max_col < 0.0
            || max_row < 0.0
            || min_col >= raster_width as f64
            || min_row >= raster_height as f64
        {
            return Err(BrdfError::Processing(format!(
                "Scene corners fall outside the {}x{} BRDF raster",
                raster_width, raster_height
            )));
        }

        let x_start = min_col.max(0.0) as usize;
        let y_start = min_row.max(0.0) as usize;
        let x_end = (max_col as usize).min(raster_width - 1);
        let y_end = (max_row as usize).min(raster_height - 1);

        let window = Self {
            x_off: x_start,
            y_off: y_start,
            width: x_end - x_start + 1,
            height: y_end - y_start + 1,
        };
        log::debug!("BRDF subset window: {:?}", window);
        Ok(window)
    }

    /// Geotransform of the subset starting at this window's origin
    pub fn geo_transform(&self, parent: &GeoTransform) -> GeoTransform {
        GeoTransform {
            top_left_x: parent.top_left_x + self.x_off as f64 * parent.pixel_width,
            top_left_y: parent.top_left_y + self.y_off as f64 * parent.pixel_height,
            ..*parent
        }
    }
}
