use tracing::{info, instrument};

use crate::linearization::{
    calibration::{CalibrationSource, Frame},
    common::error::Result,
    correction::{Corrector, CorrectorConfig},
    pipeline::{FrameSink, PipelineTimings, Timer},
};

/// Calibrate once, then linearize any number of frames into a sink.
pub struct LinearizationPipeline {
    corrector: Corrector,
    config: CorrectorConfig,
    build_timings: PipelineTimings,
}

impl LinearizationPipeline {
    #[instrument(skip(source, config))]
    pub fn build<S: CalibrationSource>(source: &S, config: CorrectorConfig) -> Result<Self> {
        let mut build_timings = PipelineTimings::new();

        let timer = Timer::start("load_calibration");
        let dataset = source.load()?;
        build_timings.record(timer);

        let timer = Timer::start("build_corrector");
        let corrector = {
            let _span = tracing::info_span!("build_corrector", exposures = dataset.len()).entered();
            Corrector::with_config(&dataset, &config)?
        };
        build_timings.record(timer);

        info!(
            "Initialization took {:.3}ms",
            build_timings.total_duration().as_secs_f64() * 1000.0
        );

        Ok(Self {
            corrector,
            config,
            build_timings,
        })
    }

    pub fn process<T>(&self, image: &Frame<T>, sink: &mut dyn FrameSink) -> Result<()>
    where
        T: Copy + Into<f64> + Sync,
    {
        self.process_with_timings(0, image, sink).map(|_| ())
    }

    #[instrument(skip(self, image, sink), fields(width = image.width(), height = image.height()))]
    pub fn process_with_timings<T>(
        &self,
        index: usize,
        image: &Frame<T>,
        sink: &mut dyn FrameSink,
    ) -> Result<PipelineTimings>
    where
        T: Copy + Into<f64> + Sync,
    {
        let mut timings = PipelineTimings::new();

        let timer = Timer::start("correct_frame");
        let report = self.corrector.correct_with_report(image)?;
        timings.record(timer);

        if !report.is_complete() {
            info!(
                "Frame {}: {} pixel(s) passed through uncorrected",
                index,
                report.uncorrectable.len()
            );
        }

        let timer = Timer::start("write_frame");
        sink.write_frame(index, &report.image)?;
        timings.record(timer);

        Ok(timings)
    }

    /// Correct and write `images` in order, stopping at the first failure.
    pub fn process_batch<T>(&self, images: &[Frame<T>], sink: &mut dyn FrameSink) -> Result<PipelineTimings>
    where
        T: Copy + Into<f64> + Sync,
    {
        let mut timings = PipelineTimings::new();
        for (index, image) in images.iter().enumerate() {
            let frame_timings = self.process_with_timings(index, image, sink)?;
            timings.merge(&frame_timings);
        }

        if let Some(mean) = timings.mean_step("correct_frame") {
            info!(
                "Corrected {} frame(s), {:.3}ms on average",
                images.len(),
                mean.as_secs_f64() * 1000.0
            );
        }
        Ok(timings)
    }

    pub fn corrector(&self) -> &Corrector {
        &self.corrector
    }

    pub fn config(&self) -> &CorrectorConfig {
        &self.config
    }

    pub fn build_timings(&self) -> &PipelineTimings {
        &self.build_timings
    }
}
