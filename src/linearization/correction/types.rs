//! Types shared by the corrector and its sub-correctors

use std::fmt;

use crate::linearization::calibration::Frame;

/// Role of a SubCorrector in the corrector's priority list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubCorrectorKind {
    /// A densely sampled cluster of calibration exposures
    Primary,
    /// Two frames spanning a gap between clusters
    GapBridge,
    /// Extrapolated frame below the lowest calibration exposure
    LowExtrapolation,
    /// Extrapolated frame above the highest calibration exposure
    HighExtrapolation,
}

impl fmt::Display for SubCorrectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SubCorrectorKind::Primary => "primary",
            SubCorrectorKind::GapBridge => "gap bridge",
            SubCorrectorKind::LowExtrapolation => "low extrapolation",
            SubCorrectorKind::HighExtrapolation => "high extrapolation",
        };
        f.write_str(name)
    }
}

/// Per-pixel state of a lookup table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelStatus {
    Mapped,
    /// Observed min equals observed max
    Degenerate,
    /// Counts drop while exposure increases
    NonMonotonic,
    /// NaN or infinite counts in the calibration data
    NonFinite,
}

/// Calibrated endpoints of one pixel in one SubCorrector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelDescription {
    pub min_count: f64,
    pub first_exposure: f64,
    pub max_count: f64,
    pub last_exposure: f64,
    pub status: PixelStatus,
}

impl fmt::Display for PixelDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({:.2} @ {:.2}, {:.2} @ {:.2})",
            self.min_count, self.first_exposure, self.max_count, self.last_exposure
        )?;
        if self.status != PixelStatus::Mapped {
            write!(f, " {:?}", self.status)?;
        }
        Ok(())
    }
}

/// A pixel none of the SubCorrectors could map; its raw value was passed through.
#[derive(Debug, Clone, PartialEq)]
pub struct UncorrectablePixel {
    pub x: usize,
    pub y: usize,
    pub raw: f64,
    /// One entry per SubCorrector, in priority order
    pub descriptions: Vec<PixelDescription>,
}

impl fmt::Display for UncorrectablePixel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}): {}", self.x, self.y, self.raw)?;
        for (i, description) in self.descriptions.iter().enumerate() {
            let sep = if i == 0 { ": " } else { ", " };
            write!(f, "{sep}{description}")?;
        }
        Ok(())
    }
}

/// Corrected image plus diagnostics of how it was produced.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrectionReport {
    pub image: Frame<f64>,
    /// Number of pixels committed by each SubCorrector, in priority order
    pub claims: Vec<usize>,
    pub uncorrectable: Vec<UncorrectablePixel>,
}

impl CorrectionReport {
    pub fn is_complete(&self) -> bool {
        self.uncorrectable.is_empty()
    }
}
