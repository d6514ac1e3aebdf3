pub(crate) mod backend;
pub(crate) mod cpu;
pub(crate) mod params;
pub(crate) mod raster;
pub(crate) mod surface;
