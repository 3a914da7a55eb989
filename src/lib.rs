pub mod bitmap;
pub mod classifier;
pub mod dataset;
pub mod distance;
pub mod error;
pub mod evaluation;
pub mod ranker;
pub mod report;

pub use error::{KnnError, Result};

// Class labels as read from the label files
pub type Label = usize;
// Pixel codes: 0 = blank, 1 = partial mark, 2 = full mark
pub type Pixel = u8;
