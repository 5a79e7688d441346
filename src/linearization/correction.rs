//! Response correction module
//!
//! Builds per-pixel inverse response tables from a calibration dataset and
//! applies them to captured frames.

mod config;
mod types;
mod segment;
mod sub_corrector;
mod corrector;


pub use config::{CorrectorConfig, CorrectorConfigBuilder, PixelPolicy};
pub use types::{CorrectionReport, PixelDescription, PixelStatus, SubCorrectorKind, UncorrectablePixel};
pub use segment::{SubRange, segment_exposures};
pub use sub_corrector::SubCorrector;
pub use corrector::Corrector;
