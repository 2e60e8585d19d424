pub mod coordinate;
pub mod stats;
pub mod watermark;

pub use coordinate::*;
pub use stats::*;
pub use watermark::*;
