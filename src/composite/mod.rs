/// Applies one frame descriptor to one raster.
pub mod border;
