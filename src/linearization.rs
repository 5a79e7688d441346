//! Sensor response linearization
//!
//! This module turns a stack of flatfield calibration frames taken at
//! increasing exposure times into a per-pixel inverse response, and applies it
//! to captured frames so that their counts scale linearly with exposure.
//! Reading and writing image files is left to implementations of
//! [`CalibrationSource`] and [`FrameSink`].

pub mod calibration;
pub mod common;
pub mod correction;
pub mod pipeline;

#[cfg(test)]
pub(crate) mod test_utils;

pub use common::{
    LinearFit,
    LinearizationError,
    Result,
};

pub use calibration::{
    CalibrationDataset,
    CalibrationSource,
    Frame,
    InMemorySource,
};

pub use correction::{
    CorrectionReport,
    Corrector,
    CorrectorConfig,
    CorrectorConfigBuilder,
    PixelDescription,
    PixelPolicy,
    PixelStatus,
    SubCorrector,
    SubCorrectorKind,
    UncorrectablePixel,
};

pub use pipeline::{
    FrameSink,
    LinearizationPipeline,
    MemorySink,
    PipelineTimings,
};
