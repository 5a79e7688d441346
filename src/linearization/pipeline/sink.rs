use crate::linearization::calibration::Frame;
use crate::linearization::common::error::Result;

/// Consumer of corrected frames, typically a writer for some image format.
pub trait FrameSink {
    fn write_frame(&mut self, index: usize, frame: &Frame<f64>) -> Result<()>;
}

/// Keeps corrected frames in memory, in arrival order.
#[derive(Debug, Default)]
pub struct MemorySink {
    frames: Vec<(usize, Frame<f64>)>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> &[(usize, Frame<f64>)] {
        &self.frames
    }

    pub fn into_frames(self) -> Vec<Frame<f64>> {
        self.frames.into_iter().map(|(_, frame)| frame).collect()
    }
}

impl FrameSink for MemorySink {
    fn write_frame(&mut self, index: usize, frame: &Frame<f64>) -> Result<()> {
        self.frames.push((index, frame.clone()));
        Ok(())
    }
}
