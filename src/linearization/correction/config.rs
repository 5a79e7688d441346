//! Corrector configuration types

use crate::linearization::common::error::{LinearizationError, Result};

/// What a SubCorrector does with a pixel whose calibration data cannot be
/// inverted (zero range, non-monotonic, or non-finite counts).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelPolicy {
    /// Leave the pixel unmapped in that SubCorrector; later ones may still map it
    MarkUnmapped,
    /// Fail construction with the matching error
    Reject,
}

/// Configuration for building a [`Corrector`](super::Corrector)
#[derive(Debug, Clone)]
pub struct CorrectorConfig {
    /// A gap between consecutive exposures larger than this multiple of the
    /// median spacing splits the dataset into separate clusters
    pub gap_factor: f64,
    /// Supersampling of the lookup tables of primary clusters
    pub cluster_supersampling: usize,
    /// Supersampling of the 2-frame bridges inserted across gaps
    pub bridge_supersampling: usize,
    /// Supersampling of the boundary extrapolation bridges
    pub extrapolation_supersampling: usize,
    /// Count magnitude the boundary bridges extrapolate out to (sensor full scale)
    pub extrapolation_limit: f64,
    /// Require each pixel's counts to be non-decreasing with exposure time
    pub check_monotonic: bool,
    /// Handling of pixels that cannot be inverted
    pub pixel_policy: PixelPolicy,
    /// Uncorrectable pixels logged one by one before switching to a summary
    pub max_logged_failures: usize,
}

impl Default for CorrectorConfig {
    fn default() -> Self {
        Self {
            gap_factor: 10.0,
            cluster_supersampling: 2,
            bridge_supersampling: 2,
            extrapolation_supersampling: 1,
            extrapolation_limit: f64::from(u16::MAX),
            check_monotonic: true,
            pixel_policy: PixelPolicy::MarkUnmapped,
            max_logged_failures: 32,
        }
    }
}

impl CorrectorConfig {
    pub fn builder() -> CorrectorConfigBuilder {
        CorrectorConfigBuilder::default()
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.gap_factor.is_finite() && self.gap_factor > 0.0) {
            return Err(LinearizationError::InvalidConfig(format!(
                "gap_factor must be positive, got {}",
                self.gap_factor
            )));
        }

        for (name, factor) in [
            ("cluster_supersampling", self.cluster_supersampling),
            ("bridge_supersampling", self.bridge_supersampling),
            ("extrapolation_supersampling", self.extrapolation_supersampling),
        ] {
            if factor == 0 {
                return Err(LinearizationError::InvalidConfig(format!("{name} must be at least 1")));
            }
        }

        if !(self.extrapolation_limit.is_finite() && self.extrapolation_limit > 0.0) {
            return Err(LinearizationError::InvalidConfig(format!(
                "extrapolation_limit must be positive, got {}",
                self.extrapolation_limit
            )));
        }

        Ok(())
    }
}

/// Builder for CorrectorConfig
#[derive(Default)]
pub struct CorrectorConfigBuilder {
    gap_factor: Option<f64>,
    cluster_supersampling: Option<usize>,
    bridge_supersampling: Option<usize>,
    extrapolation_supersampling: Option<usize>,
    extrapolation_limit: Option<f64>,
    check_monotonic: Option<bool>,
    pixel_policy: Option<PixelPolicy>,
    max_logged_failures: Option<usize>,
}

impl CorrectorConfigBuilder {
    pub fn gap_factor(mut self, factor: f64) -> Self {
        self.gap_factor = Some(factor);
        self
    }

    pub fn cluster_supersampling(mut self, factor: usize) -> Self {
        self.cluster_supersampling = Some(factor);
        self
    }

    pub fn bridge_supersampling(mut self, factor: usize) -> Self {
        self.bridge_supersampling = Some(factor);
        self
    }

    pub fn extrapolation_supersampling(mut self, factor: usize) -> Self {
        self.extrapolation_supersampling = Some(factor);
        self
    }

    /// Full-scale count of the sensor, e.g. `4095.0` for a 12-bit readout.
    pub fn extrapolation_limit(mut self, limit: f64) -> Self {
        self.extrapolation_limit = Some(limit);
        self
    }

    pub fn check_monotonic(mut self, enable: bool) -> Self {
        self.check_monotonic = Some(enable);
        self
    }

    pub fn pixel_policy(mut self, policy: PixelPolicy) -> Self {
        self.pixel_policy = Some(policy);
        self
    }

    pub fn max_logged_failures(mut self, count: usize) -> Self {
        self.max_logged_failures = Some(count);
        self
    }

    pub fn build(self) -> CorrectorConfig {
        let default = CorrectorConfig::default();
        CorrectorConfig {
            gap_factor: self.gap_factor.unwrap_or(default.gap_factor),
            cluster_supersampling: self.cluster_supersampling.unwrap_or(default.cluster_supersampling),
            bridge_supersampling: self.bridge_supersampling.unwrap_or(default.bridge_supersampling),
            extrapolation_supersampling: self
                .extrapolation_supersampling
                .unwrap_or(default.extrapolation_supersampling),
            extrapolation_limit: self.extrapolation_limit.unwrap_or(default.extrapolation_limit),
            check_monotonic: self.check_monotonic.unwrap_or(default.check_monotonic),
            pixel_policy: self.pixel_policy.unwrap_or(default.pixel_policy),
            max_logged_failures: self.max_logged_failures.unwrap_or(default.max_logged_failures),
        }
    }
}
