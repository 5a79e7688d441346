//! Full-range response correction assembled from sub-correctors.
//!
//! Calibration stacks are usually dense where the sensor is nonlinear and
//! sparse elsewhere. Uniformly resampling the whole response at the density of
//! the dense regions would be prohibitively large, so the stack is split into
//! clusters at large exposure gaps. Each cluster gets its own
//! [`SubCorrector`]; each gap gets a two-frame bridge; and the two ends of the
//! dataset are extended by linear extrapolation so that counts slightly
//! outside the calibrated range still correct.
//!
//! # Priority
//!
//! Sub-correctors are kept in one list and applied in order. A pixel is
//! committed by the first sub-corrector that can map it and never overwritten:
//!
//! 1. primary clusters and gap bridges, interleaved in exposure order, so a
//!    bridge outranks the cluster after it at the shared boundary exposure;
//! 2. the low extrapolation bridge;
//! 3. the high extrapolation bridge.
//!
//! Pixels nobody maps keep their raw value and are reported as uncorrectable.

use rayon::prelude::*;
use tracing::{debug, info, instrument, warn};

use crate::linearization::calibration::{CalibrationDataset, Frame};
use crate::linearization::common::error::{LinearizationError, Result};
use crate::linearization::common::math::{LinearFit, median};
use crate::linearization::correction::config::CorrectorConfig;
use crate::linearization::correction::segment::{SubRange, segment_exposures};
use crate::linearization::correction::sub_corrector::SubCorrector;
use crate::linearization::correction::types::{
    CorrectionReport, PixelDescription, SubCorrectorKind, UncorrectablePixel,
};

/// Immutable count linearizer built from a calibration dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct Corrector {
    shape: (usize, usize),
    global_fit: LinearFit,
    median_spacing: f64,
    sub_correctors: Vec<SubCorrector>,
    max_logged_failures: usize,
}

impl Corrector {
    pub fn new(dataset: &CalibrationDataset) -> Result<Self> {
        Self::with_config(dataset, &CorrectorConfig::default())
    }

    pub fn with_config(dataset: &CalibrationDataset, config: &CorrectorConfig) -> Result<Self> {
        config.validate()?;

        let times = dataset.exposure_times();
        let insufficient = LinearizationError::InsufficientCalibrationData {
            distinct: times.len(),
        };

        let global_fit = LinearFit::fit(times, &dataset.mean_counts()).ok_or_else(|| insufficient.clone())?;
        if !global_fit.slope.is_finite() || global_fit.slope == 0.0 {
            return Err(LinearizationError::FlatResponse {
                slope: global_fit.slope,
            });
        }
        info!(
            "Global fit: count = {:.4} * exposure + {:.4}",
            global_fit.slope, global_fit.intercept
        );

        let spacings: Vec<f64> = times.windows(2).map(|w| w[1] - w[0]).collect();
        let median_spacing = median(&spacings).ok_or(insufficient)?;
        info!("Median exposure spacing: {:.4}", median_spacing);

        let ranges = segment_exposures(times, config.gap_factor * median_spacing);
        let mut sub_correctors = Vec::with_capacity(ranges.len() + 2);
        for range in &ranges {
            let supersampling = match range.kind {
                SubCorrectorKind::Primary => config.cluster_supersampling,
                _ => config.bridge_supersampling,
            };
            sub_correctors.push(SubCorrector::build(
                range.kind,
                &times[range.indices.clone()],
                &dataset.frames()[range.indices.clone()],
                supersampling,
                config,
            )?);
        }

        let boundaries = [
            (ranges.first(), SubCorrectorKind::LowExtrapolation),
            (ranges.last(), SubCorrectorKind::HighExtrapolation),
        ];
        for (range, kind) in boundaries {
            let Some(range) = range else { continue };
            if let Some(sub) = extrapolate(dataset, range, kind, &global_fit, config)? {
                sub_correctors.push(sub);
            }
        }

        for (priority, sub) in sub_correctors.iter().enumerate() {
            debug!("Sub-corrector {}: {}", priority, sub);
        }
        info!(
            "Corrector ready: {} sub-correctors over {} exposures",
            sub_correctors.len(),
            times.len()
        );

        Ok(Self {
            shape: dataset.shape(),
            global_fit,
            median_spacing,
            sub_correctors,
            max_logged_failures: config.max_logged_failures,
        })
    }

    /// Linearize `image`, returning counts on the calibration's global scale.
    ///
    /// Only the pixels that get logged are described; use
    /// [`Corrector::correct_with_report`] for the full list of failures.
    #[instrument(level = "debug", skip(self, image), fields(width = image.width(), height = image.height()))]
    pub fn correct<T>(&self, image: &Frame<T>) -> Result<Frame<f64>>
    where
        T: Copy + Into<f64> + Sync,
    {
        image.ensure_shape(self.shape)?;

        let raw: Vec<f64> = image.data().iter().map(|&v| v.into()).collect();
        let (mapped, _, remaining) = self.merge(&raw);

        if remaining > 0 {
            let logged: Vec<UncorrectablePixel> = unmapped_indices(&mapped)
                .take(self.max_logged_failures)
                .map(|pixel| self.uncorrectable_pixel(image, &raw, pixel))
                .collect();
            self.log_failures(&logged, remaining);
        }

        Frame::new(image.width(), image.height(), self.rescale(&mapped, &raw))
    }

    /// Linearize `image` and report which sub-corrector handled how many
    /// pixels, along with any pixels that fell back to their raw value.
    #[instrument(level = "debug", skip(self, image), fields(width = image.width(), height = image.height()))]
    pub fn correct_with_report<T>(&self, image: &Frame<T>) -> Result<CorrectionReport>
    where
        T: Copy + Into<f64> + Sync,
    {
        image.ensure_shape(self.shape)?;

        let raw: Vec<f64> = image.data().iter().map(|&v| v.into()).collect();
        let (mapped, claims, remaining) = self.merge(&raw);

        let uncorrectable: Vec<UncorrectablePixel> = unmapped_indices(&mapped)
            .map(|pixel| self.uncorrectable_pixel(image, &raw, pixel))
            .collect();
        if remaining > 0 {
            self.log_failures(&uncorrectable, remaining);
        }

        Ok(CorrectionReport {
            image: Frame::new(image.width(), image.height(), self.rescale(&mapped, &raw))?,
            claims,
            uncorrectable,
        })
    }

    /// Correct a stack of frames in parallel, preserving order.
    pub fn correct_batch<T>(&self, images: &[Frame<T>]) -> Result<Vec<Frame<f64>>>
    where
        T: Copy + Into<f64> + Sync,
    {
        images.par_iter().map(|image| self.correct(image)).collect()
    }

    /// First-writer-wins pass over the sub-correctors. Returns the mapped
    /// exposures, the number of pixels each sub-corrector claimed, and the
    /// number left unmapped.
    fn merge(&self, raw: &[f64]) -> (Vec<Option<f64>>, Vec<usize>, usize) {
        let mut mapped: Vec<Option<f64>> = vec![None; raw.len()];
        let mut claims = vec![0; self.sub_correctors.len()];
        let mut remaining = raw.len();

        for (priority, sub) in self.sub_correctors.iter().enumerate() {
            if remaining == 0 {
                break;
            }
            let claimed: usize = mapped
                .par_iter_mut()
                .zip(raw.par_iter())
                .enumerate()
                .map(|(pixel, (slot, &value))| -> usize {
                    if slot.is_some() {
                        return 0;
                    }
                    match sub.lookup(pixel, value) {
                        Some(exposure) => {
                            *slot = Some(exposure);
                            1
                        }
                        None => 0,
                    }
                })
                .sum();
            claims[priority] = claimed;
            remaining -= claimed;
        }

        (mapped, claims, remaining)
    }

    fn rescale(&self, mapped: &[Option<f64>], raw: &[f64]) -> Vec<f64> {
        let LinearFit { slope, intercept } = self.global_fit;
        mapped
            .iter()
            .zip(raw)
            .map(|(slot, &value)| match slot {
                Some(exposure) => exposure * slope + intercept,
                None => value,
            })
            .collect()
    }

    fn uncorrectable_pixel<T>(&self, image: &Frame<T>, raw: &[f64], pixel: usize) -> UncorrectablePixel {
        let (x, y) = image.coords(pixel);
        UncorrectablePixel {
            x,
            y,
            raw: raw[pixel],
            descriptions: self
                .sub_correctors
                .iter()
                .map(|sub| sub.describe_index(pixel))
                .collect(),
        }
    }

    fn log_failures(&self, failures: &[UncorrectablePixel], remaining: usize) {
        warn!("Failed to correct {} pixels", remaining);

        for failure in failures.iter().take(self.max_logged_failures) {
            warn!("Uncorrectable pixel {}", failure);
        }
        if remaining > self.max_logged_failures {
            warn!(
                "{} further uncorrectable pixels not logged",
                remaining - self.max_logged_failures
            );
        }
    }

    /// Endpoints of pixel `(x, y)` in every sub-corrector, in priority order.
    pub fn describe(&self, x: usize, y: usize) -> Vec<PixelDescription> {
        self.sub_correctors
            .iter()
            .filter_map(|sub| sub.describe(x, y))
            .collect()
    }

    /// `(width, height)` of the calibration frames
    pub fn shape(&self) -> (usize, usize) {
        self.shape
    }

    pub fn global_fit(&self) -> LinearFit {
        self.global_fit
    }

    pub fn median_spacing(&self) -> f64 {
        self.median_spacing
    }

    /// Sub-correctors in priority order
    pub fn sub_correctors(&self) -> &[SubCorrector] {
        &self.sub_correctors
    }
}

fn unmapped_indices(mapped: &[Option<f64>]) -> impl Iterator<Item = usize> + '_ {
    mapped
        .iter()
        .enumerate()
        .filter(|(_, slot)| slot.is_none())
        .map(|(pixel, _)| pixel)
}

/// Build the bridge from one end of the dataset out to the sensor's full-scale
/// count.
///
/// Each pixel's response over `range` is fitted with a line and evaluated at
/// the exposure where the global fit reaches `±extrapolation_limit`. Returns
/// `None` when that exposure does not lie beyond the dataset, which happens
/// when the calibration already exceeds the limit.
fn extrapolate(
    dataset: &CalibrationDataset,
    range: &SubRange,
    kind: SubCorrectorKind,
    global_fit: &LinearFit,
    config: &CorrectorConfig,
) -> Result<Option<SubCorrector>> {
    let times = &dataset.exposure_times()[range.indices.clone()];
    let frames = &dataset.frames()[range.indices.clone()];

    let low = kind == SubCorrectorKind::LowExtrapolation;
    let (target_count, boundary) = if low {
        (-config.extrapolation_limit, 0)
    } else {
        (config.extrapolation_limit, times.len() - 1)
    };
    let target_time = global_fit.invert(target_count);
    let boundary_time = times[boundary];

    let beyond = if low {
        target_time < boundary_time
    } else {
        target_time > boundary_time
    };
    if !beyond {
        warn!(
            "Skipping {} bridge: target exposure {:.3} does not extend past {:.3}",
            kind, target_time, boundary_time
        );
        return Ok(None);
    }

    let (width, height) = dataset.shape();
    let extrapolated: Vec<f64> = (0..width * height)
        .into_par_iter()
        .map(|pixel| {
            let counts: Vec<f64> = frames.iter().map(|frame| frame.data()[pixel]).collect();
            LinearFit::fit(times, &counts).map_or(f64::NAN, |fit| fit.eval(target_time))
        })
        .collect();
    let synthetic = Frame::new(width, height, extrapolated)?;

    debug!(
        "Extrapolated {} frame at exposure {:.3}, median count {:.2}",
        kind,
        target_time,
        median(synthetic.data()).unwrap_or(f64::NAN)
    );

    let boundary_frame = frames[boundary].clone();
    let (bridge_times, bridge_frames) = if low {
        ([target_time, boundary_time], [synthetic, boundary_frame])
    } else {
        ([boundary_time, target_time], [boundary_frame, synthetic])
    };

    SubCorrector::build(
        kind,
        &bridge_times,
        &bridge_frames,
        config.extrapolation_supersampling,
        config,
    )
    .map(Some)
}
