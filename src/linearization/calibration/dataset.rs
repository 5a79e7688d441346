//! Calibration stack: flatfield frames indexed by exposure time

use tracing::{debug, warn};

use crate::linearization::calibration::frame::Frame;
use crate::linearization::common::error::{LinearizationError, Result};

/// Flatfield frames sorted by strictly increasing exposure time.
///
/// Construction is the only way in, so every dataset holds at least two
/// distinct exposures and every frame has the same shape.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationDataset {
    exposure_times: Vec<f64>,
    frames: Vec<Frame<f64>>,
}

impl CalibrationDataset {
    /// Build a dataset from parallel lists of exposure times and frames.
    pub fn new<T: Copy + Into<f64>>(exposure_times: Vec<f64>, frames: Vec<Frame<T>>) -> Result<Self> {
        if exposure_times.len() != frames.len() {
            return Err(LinearizationError::LengthMismatch {
                exposures: exposure_times.len(),
                frames: frames.len(),
            });
        }
        Self::from_pairs(exposure_times.into_iter().zip(frames))
    }

    /// Build a dataset from `(exposure time, frame)` pairs in any order.
    ///
    /// Pairs are sorted by exposure time. When the same exposure time occurs
    /// more than once the later pair replaces the earlier one.
    pub fn from_pairs<T, I>(pairs: I) -> Result<Self>
    where
        T: Copy + Into<f64>,
        I: IntoIterator<Item = (f64, Frame<T>)>,
    {
        let mut shape = None;
        let mut sorted: Vec<(f64, Frame<f64>)> = Vec::new();

        for (exposure, frame) in pairs {
            if !exposure.is_finite() {
                return Err(LinearizationError::InvalidExposureTime(exposure));
            }
            match shape {
                None => shape = Some(frame.shape()),
                Some(expected) => frame.ensure_shape(expected)?,
            }
            sorted.push((exposure, frame.to_f64()));
        }

        // Stable sort keeps insertion order among equal exposures, so the
        // last duplicate ends up last in its run.
        sorted.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut exposure_times: Vec<f64> = Vec::with_capacity(sorted.len());
        let mut frames: Vec<Frame<f64>> = Vec::with_capacity(sorted.len());
        for (exposure, frame) in sorted {
            if exposure_times.last() == Some(&exposure) {
                warn!("Duplicate exposure time {}, keeping the later frame", exposure);
                if let Some(slot) = frames.last_mut() {
                    *slot = frame;
                }
                continue;
            }
            exposure_times.push(exposure);
            frames.push(frame);
        }

        if exposure_times.len() < 2 {
            return Err(LinearizationError::InsufficientCalibrationData {
                distinct: exposure_times.len(),
            });
        }

        for (exposure, frame) in exposure_times.iter().zip(&frames) {
            debug!("Calibration exposure {:.3}: mean count {:.2}", exposure, frame.mean());
        }

        Ok(Self {
            exposure_times,
            frames,
        })
    }

    pub fn exposure_times(&self) -> &[f64] {
        &self.exposure_times
    }

    pub fn frames(&self) -> &[Frame<f64>] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// `(width, height)` shared by every frame.
    pub fn shape(&self) -> (usize, usize) {
        self.frames[0].shape()
    }

    pub fn mean_counts(&self) -> Vec<f64> {
        self.frames.iter().map(Frame::mean).collect()
    }
}
