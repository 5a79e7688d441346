use std::collections::HashMap;
use std::time::{Duration, Instant};

use tracing::info;

#[derive(Debug, Clone)]
pub struct StepTiming {
    pub name: String,
    pub duration: Duration,
}

/// Wall-clock durations of pipeline steps. A step name may repeat, e.g. once
/// per corrected frame.
#[derive(Debug, Clone, Default)]
pub struct PipelineTimings {
    steps: Vec<StepTiming>,
    totals: HashMap<String, (Duration, u32)>,
}

impl PipelineTimings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_step(&mut self, name: impl Into<String>, duration: Duration) {
        let name = name.into();
        let entry = self.totals.entry(name.clone()).or_insert((Duration::ZERO, 0));
        entry.0 += duration;
        entry.1 += 1;
        self.steps.push(StepTiming { name, duration });
    }

    pub fn record(&mut self, timer: Timer) {
        let (name, duration) = timer.stop();
        self.add_step(name, duration);
    }

    pub fn merge(&mut self, other: &PipelineTimings) {
        for step in &other.steps {
            self.add_step(step.name.clone(), step.duration);
        }
    }

    pub fn total_duration(&self) -> Duration {
        self.steps.iter().map(|s| s.duration).sum()
    }

    /// Summed duration of every occurrence of `name`.
    pub fn get_step(&self, name: &str) -> Option<Duration> {
        self.totals.get(name).map(|&(total, _)| total)
    }

    pub fn step_count(&self, name: &str) -> u32 {
        self.totals.get(name).map_or(0, |&(_, count)| count)
    }

    /// Average duration of `name` across its occurrences.
    pub fn mean_step(&self, name: &str) -> Option<Duration> {
        self.totals
            .get(name)
            .filter(|&&(_, count)| count > 0)
            .map(|&(total, count)| total / count)
    }

    pub fn steps(&self) -> &[StepTiming] {
        &self.steps
    }

    /// Log one line per distinct step, in first-seen order.
    pub fn log_summary(&self) {
        let total = self.total_duration().as_secs_f64();
        let mut seen: Vec<&str> = Vec::new();
        for step in &self.steps {
            if seen.contains(&step.name.as_str()) {
                continue;
            }
            seen.push(&step.name);

            let (sum, count) = self.totals[&step.name];
            let share = if total > 0.0 {
                sum.as_secs_f64() / total * 100.0
            } else {
                0.0
            };
            info!(
                "{:<24} {:>10.3}ms x{:<4} ({:>5.1}%)",
                step.name,
                sum.as_secs_f64() * 1000.0,
                count,
                share
            );
        }
        info!("{:<24} {:>10.3}ms", "total", total * 1000.0);
    }
}

pub struct Timer {
    start: Instant,
    name: String,
}

impl Timer {
    pub fn start(name: impl Into<String>) -> Self {
        Self {
            start: Instant::now(),
            name: name.into(),
        }
    }

    pub fn stop(self) -> (String, Duration) {
        (self.name, self.start.elapsed())
    }
}
