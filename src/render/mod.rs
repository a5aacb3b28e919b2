/// Backend capability traits and shared value types.
pub mod backend;
/// `vello_cpu` raster backend.
pub mod cpu;
/// Headless recording backend.
pub mod recording;
