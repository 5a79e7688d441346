use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LinearizationError {
    #[error("Invalid frame dimensions: width={0}, height={1}")]
    InvalidDimensions(usize, usize),

    #[error("Frame shape mismatch: expected {expected:?}, found {found:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },

    #[error("Invalid exposure time: {0}")]
    InvalidExposureTime(f64),

    #[error("Insufficient calibration data: {distinct} distinct exposure time(s), need at least 2")]
    InsufficientCalibrationData { distinct: usize },

    #[error("Calibration length mismatch: {exposures} exposure time(s) for {frames} frame(s)")]
    LengthMismatch { exposures: usize, frames: usize },

    #[error("Invalid sub-range: {frames} frame(s), need at least 2 with one exposure time each")]
    InvalidSubRange { frames: usize },

    #[error("Calibration response is flat (global slope {slope}), cannot rescale")]
    FlatResponse { slope: f64 },

    #[error("Pixel ({x}, {y}) has zero dynamic range in its calibration data")]
    DegenerateRange { x: usize, y: usize },

    #[error("Pixel ({x}, {y}) does not respond monotonically to exposure time")]
    NonMonotonicResponse { x: usize, y: usize },

    #[error("Pixel ({x}, {y}) has non-finite calibration counts")]
    NonFiniteCalibration { x: usize, y: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Calibration source failed: {0}")]
    Source(String),

    #[error("Frame sink failed: {0}")]
    Sink(String),
}

pub type Result<T> = std::result::Result<T, LinearizationError>;
