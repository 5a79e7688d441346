//! Synthetic calibration stacks for unit tests

use crate::linearization::calibration::{CalibrationDataset, Frame};

/// One frame per exposure with every pixel reading `gain * t + offset`.
pub(crate) fn linear_frames(
    times: &[f64],
    width: usize,
    height: usize,
    gain: f64,
    offset: f64,
) -> Vec<Frame<f64>> {
    times
        .iter()
        .map(|&t| Frame::new(width, height, vec![gain * t + offset; width * height]).unwrap())
        .collect()
}

pub(crate) fn linear_dataset(
    times: &[f64],
    width: usize,
    height: usize,
    gain: f64,
    offset: f64,
) -> CalibrationDataset {
    CalibrationDataset::new(times.to_vec(), linear_frames(times, width, height, gain, offset)).unwrap()
}

/// 1x1 frames holding `counts`, one per exposure.
pub(crate) fn single_pixel_frames(counts: &[f64]) -> Vec<Frame<f64>> {
    counts
        .iter()
        .map(|&c| Frame::new(1, 1, vec![c]).unwrap())
        .collect()
}

/// Frame of the given shape filled with `value`.
pub(crate) fn uniform_image<T: Clone>(width: usize, height: usize, value: T) -> Frame<T> {
    Frame::new(width, height, vec![value; width * height]).unwrap()
}
