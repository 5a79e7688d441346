//! Common utilities module
//!
//! This module contains the error type and numeric helpers shared by the
//! calibration, correction and pipeline modules.

pub mod error;
pub mod math;

pub use error::{LinearizationError, Result};
pub use math::LinearFit;
