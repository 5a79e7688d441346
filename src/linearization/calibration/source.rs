use tracing::debug;

use crate::linearization::calibration::dataset::CalibrationDataset;
use crate::linearization::calibration::frame::Frame;
use crate::linearization::common::error::Result;

/// Supplier of calibration stacks, typically a reader for some on-disk format.
pub trait CalibrationSource {
    fn load(&self) -> Result<CalibrationDataset>;
}

/// Calibration pairs already held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    pairs: Vec<(f64, Frame<f64>)>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_frame<T: Copy + Into<f64>>(mut self, exposure: f64, frame: &Frame<T>) -> Self {
        self.pairs.push((exposure, frame.to_f64()));
        self
    }
}

impl<T: Copy + Into<f64>> FromIterator<(f64, Frame<T>)> for InMemorySource {
    fn from_iter<I: IntoIterator<Item = (f64, Frame<T>)>>(iter: I) -> Self {
        Self {
            pairs: iter
                .into_iter()
                .map(|(exposure, frame)| (exposure, frame.to_f64()))
                .collect(),
        }
    }
}

impl CalibrationSource for InMemorySource {
    fn load(&self) -> Result<CalibrationDataset> {
        debug!("Loading {} in-memory calibration frames", self.pairs.len());
        CalibrationDataset::from_pairs(self.pairs.iter().cloned())
    }
}
