//! Per-pixel inversion of the count-vs-exposure response over one sub-range.
//!
//! The response is inverted by resampling each pixel's calibration curve onto a
//! uniform grid of counts spanning `[min, max]`. A count then maps to a
//! fractional grid index in constant time, and the virtual exposure is read off
//! by linear interpolation between the two neighbouring grid entries.

use std::fmt;

use rayon::prelude::*;
use tracing::debug;

use crate::linearization::calibration::Frame;
use crate::linearization::common::error::{LinearizationError, Result};
use crate::linearization::common::math::{interp, linspace_into, median};
use crate::linearization::correction::config::{CorrectorConfig, PixelPolicy};
use crate::linearization::correction::types::{PixelDescription, PixelStatus, SubCorrectorKind};

#[derive(Debug, Clone, Copy)]
struct PixelSummary {
    min: f64,
    max: f64,
    status: PixelStatus,
}

/// Lookup tables mapping raw counts to virtual exposure for a contiguous set
/// of calibration exposures.
#[derive(Debug, Clone, PartialEq)]
pub struct SubCorrector {
    kind: SubCorrectorKind,
    exposure_times: Vec<f64>,
    width: usize,
    height: usize,
    supersampling: usize,
    num_samples: usize,
    min: Vec<f64>,
    max: Vec<f64>,
    status: Vec<PixelStatus>,
    /// `num_samples` virtual exposures per pixel, pixel-major
    exposures: Vec<f64>,
}

impl SubCorrector {
    /// Build with the default pixel checks.
    pub fn new(
        kind: SubCorrectorKind,
        exposure_times: &[f64],
        frames: &[Frame<f64>],
        supersampling: usize,
    ) -> Result<Self> {
        Self::build(kind, exposure_times, frames, supersampling, &CorrectorConfig::default())
    }

    /// Build the lookup tables.
    ///
    /// `exposure_times` must be strictly increasing and pair one-to-one with
    /// `frames`, which must all share a shape. Only `check_monotonic` and
    /// `pixel_policy` are read from `config`.
    pub fn build(
        kind: SubCorrectorKind,
        exposure_times: &[f64],
        frames: &[Frame<f64>],
        supersampling: usize,
        config: &CorrectorConfig,
    ) -> Result<Self> {
        if frames.len() < 2 || frames.len() != exposure_times.len() {
            return Err(LinearizationError::InvalidSubRange {
                frames: frames.len(),
            });
        }
        if supersampling == 0 {
            return Err(LinearizationError::InvalidConfig(
                "supersampling must be at least 1".to_string(),
            ));
        }

        let shape = frames[0].shape();
        for frame in &frames[1..] {
            frame.ensure_shape(shape)?;
        }
        let (width, height) = shape;
        let num_samples = frames.len() * supersampling;

        let mut exposures = vec![0.0; width * height * num_samples];
        let summaries: Vec<PixelSummary> = exposures
            .par_chunks_mut(num_samples)
            .enumerate()
            .map(|(pixel, table)| {
                build_pixel_table(pixel, table, exposure_times, frames, config.check_monotonic)
            })
            .collect();

        if config.pixel_policy == PixelPolicy::Reject {
            if let Some((pixel, summary)) = summaries
                .iter()
                .enumerate()
                .find(|(_, s)| s.status != PixelStatus::Mapped)
            {
                let (x, y) = (pixel % width, pixel / width);
                return Err(match summary.status {
                    PixelStatus::Degenerate => LinearizationError::DegenerateRange { x, y },
                    PixelStatus::NonMonotonic => LinearizationError::NonMonotonicResponse { x, y },
                    _ => LinearizationError::NonFiniteCalibration { x, y },
                });
            }
        }

        let unmapped = summaries
            .iter()
            .filter(|s| s.status != PixelStatus::Mapped)
            .count();

        let corrector = Self {
            kind,
            exposure_times: exposure_times.to_vec(),
            width,
            height,
            supersampling,
            num_samples,
            min: summaries.iter().map(|s| s.min).collect(),
            max: summaries.iter().map(|s| s.max).collect(),
            status: summaries.iter().map(|s| s.status).collect(),
            exposures,
        };

        debug!("Built {} ({} samples, {} unmapped pixels)", corrector, num_samples, unmapped);
        Ok(corrector)
    }

    /// Virtual exposure of `value` at flat pixel index `pixel`, or `None` when
    /// the value lies outside this pixel's calibrated count range.
    pub fn lookup(&self, pixel: usize, value: f64) -> Option<f64> {
        if self.status.get(pixel)? != &PixelStatus::Mapped {
            return None;
        }

        let (min, max) = (self.min[pixel], self.max[pixel]);
        let last = (self.num_samples - 1) as f64;
        let idx = last * (value - min) / (max - min);
        // Also rejects NaN.
        if !(0.0..=last).contains(&idx) {
            return None;
        }

        let table = &self.exposures[pixel * self.num_samples..(pixel + 1) * self.num_samples];
        let lower = idx.floor() as usize;
        if lower + 1 >= self.num_samples {
            return Some(table[self.num_samples - 1]);
        }
        let frac = idx - lower as f64;
        Some(table[lower] + frac * (table[lower + 1] - table[lower]))
    }

    /// Map every pixel of `image` to virtual exposure; `None` marks pixels this
    /// SubCorrector cannot handle.
    pub fn correct<T>(&self, image: &Frame<T>) -> Result<Frame<Option<f64>>>
    where
        T: Copy + Into<f64> + Sync,
    {
        image.ensure_shape(self.shape())?;

        let mapped: Vec<Option<f64>> = image
            .data()
            .par_iter()
            .enumerate()
            .map(|(pixel, &value)| self.lookup(pixel, value.into()))
            .collect();

        Frame::new(self.width, self.height, mapped)
    }

    /// Calibrated endpoints of pixel `(x, y)`.
    pub fn describe(&self, x: usize, y: usize) -> Option<PixelDescription> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.describe_index(y * self.width + x))
    }

    pub(crate) fn describe_index(&self, pixel: usize) -> PixelDescription {
        PixelDescription {
            min_count: self.min[pixel],
            first_exposure: self.exposure_times[0],
            max_count: self.max[pixel],
            last_exposure: self.exposure_times[self.exposure_times.len() - 1],
            status: self.status[pixel],
        }
    }

    pub fn kind(&self) -> SubCorrectorKind {
        self.kind
    }

    pub fn exposure_times(&self) -> &[f64] {
        &self.exposure_times
    }

    pub fn supersampling(&self) -> usize {
        self.supersampling
    }

    pub fn num_samples(&self) -> usize {
        self.num_samples
    }

    /// `(width, height)`
    pub fn shape(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn pixel_status(&self, x: usize, y: usize) -> Option<PixelStatus> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.status[y * self.width + x])
    }

    pub fn unmapped_pixels(&self) -> usize {
        self.status
            .iter()
            .filter(|&&s| s != PixelStatus::Mapped)
            .count()
    }
}

impl fmt::Display for SubCorrector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let first = self.exposure_times[0];
        let last = self.exposure_times[self.exposure_times.len() - 1];
        write!(
            f,
            "{} sub-corrector with range ({:.2} @ {:.2}, {:.2} @ {:.2})",
            self.kind,
            median(&self.min).unwrap_or(f64::NAN),
            first,
            median(&self.max).unwrap_or(f64::NAN),
            last,
        )
    }
}

fn build_pixel_table(
    pixel: usize,
    table: &mut [f64],
    exposure_times: &[f64],
    frames: &[Frame<f64>],
    check_monotonic: bool,
) -> PixelSummary {
    let counts: Vec<f64> = frames.iter().map(|frame| frame.data()[pixel]).collect();

    let (min, max) = counts
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &c| (lo.min(c), hi.max(c)));

    let status = if counts.iter().any(|c| !c.is_finite()) {
        PixelStatus::NonFinite
    } else if min == max {
        PixelStatus::Degenerate
    } else if check_monotonic && counts.windows(2).any(|w| w[1] < w[0]) {
        PixelStatus::NonMonotonic
    } else {
        PixelStatus::Mapped
    };

    if status != PixelStatus::Mapped {
        return PixelSummary { min, max, status };
    }

    let mut order: Vec<usize> = (0..counts.len()).collect();
    order.sort_by(|&a, &b| {
        counts[a]
            .total_cmp(&counts[b])
            .then(exposure_times[a].total_cmp(&exposure_times[b]))
    });
    let xp: Vec<f64> = order.iter().map(|&i| counts[i]).collect();
    let fp: Vec<f64> = order.iter().map(|&i| exposure_times[i]).collect();

    linspace_into(min, max, table);
    for slot in table.iter_mut() {
        *slot = interp(*slot, &xp, &fp);
    }

    PixelSummary { min, max, status }
}
