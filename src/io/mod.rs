//! I/O modules for BRDF archives, decompression and raster collaborators

pub mod archive;
pub mod decompress;
pub mod raster;
#[cfg(feature = "gdal")]
pub mod gdal_backend;

pub use archive::ArchiveListing;
pub use decompress::WorkingCopy;
pub use raster::{
    BrdfCodec, BrdfRaster, PixelWindow, RasterBackend, ScaleOffset, SubsetReader, SubsetWriter,
};
#[cfg(feature = "gdal")]
pub use gdal_backend::{GdalCodec, GdalSubsetReader, GdalSubsetWriter};
