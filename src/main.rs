use anyhow::Context;
use response_linearizer::linearization::{
    CorrectorConfig, Frame, InMemorySource, LinearizationPipeline, MemorySink,
};
use response_linearizer::logger;

use tracing::{error, info};

const WIDTH: usize = 64;
const HEIGHT: usize = 48;

/// Compressive sensor model with a per-pixel gain pattern and a 100 count pedestal.
fn sensor_counts(x: usize, y: usize, exposure_ms: f64) -> u16 {
    let gain = 1.0 + 0.002 * ((x * 7 + y * 13) % 50) as f64;
    let signal = 30000.0 * (1.0 - (-exposure_ms / 40.0).exp());
    (100.0 + gain * signal).round().clamp(0.0, f64::from(u16::MAX)) as u16
}

fn exposure_frame(exposure_ms: f64) -> anyhow::Result<Frame<u16>> {
    Frame::from_fn(WIDTH, HEIGHT, |x, y| sensor_counts(x, y, exposure_ms))
        .context("failed to synthesize frame")
}

fn main() -> anyhow::Result<()> {
    logger::init();

    info!("Starting response linearizer...");

    // Dense sampling at short exposures, a sparse tail after a large gap.
    let mut source = InMemorySource::new();
    let exposures = (1..=20)
        .map(|i| f64::from(i) * 0.5)
        .chain((0..=8).map(|i| 60.0 + f64::from(i) * 0.5));
    for exposure in exposures {
        source = source.with_frame(exposure, &exposure_frame(exposure)?);
    }

    let config = CorrectorConfig::builder().extrapolation_limit(f64::from(u16::MAX)).build();
    let pipeline = LinearizationPipeline::build(&source, config)?;

    info!(
        "Corrector initialized with {} sub-correctors",
        pipeline.corrector().sub_correctors().len()
    );
    for sub in pipeline.corrector().sub_correctors() {
        info!("  {}", sub);
    }

    let captures = [0.25, 3.3, 25.0, 62.0, 90.0]
        .iter()
        .map(|&exposure| exposure_frame(exposure))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let mut sink = MemorySink::new();
    match pipeline.process_batch(&captures, &mut sink) {
        Ok(timings) => {
            pipeline.build_timings().log_summary();
            timings.log_summary();
        }
        Err(e) => error!("Correction failed: {}", e),
    }

    let fit = pipeline.corrector().global_fit();
    for (index, frame) in sink.frames() {
        let mean = frame.mean();
        info!(
            "Frame {}: mean corrected count {:.1} (virtual exposure {:.3}ms)",
            index,
            mean,
            fit.invert(mean)
        );
    }

    Ok(())
}
