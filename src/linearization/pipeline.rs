//! Pipeline module
//!
//! Orchestrates calibration loading, corrector construction and per-frame
//! correction between a [`CalibrationSource`](crate::linearization::CalibrationSource)
//! and a [`FrameSink`].

mod linearize;
mod sink;
mod timing;


pub use linearize::LinearizationPipeline;
pub use sink::{FrameSink, MemorySink};
pub use timing::{PipelineTimings, StepTiming, Timer};
