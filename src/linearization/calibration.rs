//! Calibration data module
//!
//! Frames, the exposure-indexed calibration stack, and the trait through which
//! external readers hand calibration data to the corrector.

mod frame;
mod dataset;
mod source;

pub use frame::Frame;
pub use dataset::CalibrationDataset;
pub use source::{CalibrationSource, InMemorySource};
