use std::io;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, KnnError>;

#[derive(Debug, Error)]
pub enum KnnError {
    #[error("dimension mismatch: expected vectors of length {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("k = {k} exceeds the {available} available training examples")]
    InsufficientNeighbors { k: usize, available: usize },

    #[error("{0} dataset is empty")]
    EmptyDataset(&'static str),

    #[error("k values must be positive and at least one must be given")]
    InvalidK,

    #[error("predictions for k = {got:?} do not match the tracked k = {expected:?}")]
    CandidateMismatch {
        expected: Vec<usize>,
        got: Vec<usize>,
    },

    #[error("pixel value {value} is not one of 0, 1, 2")]
    InvalidPixel { value: u8 },

    #[error("sampling percent must be in (0, 100], got {0}")]
    InvalidPercent(f64),

    #[error("found {images} images but only {labels} labels")]
    LabelCountMismatch { images: usize, labels: usize },

    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
