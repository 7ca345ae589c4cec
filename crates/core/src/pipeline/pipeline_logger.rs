use std::time::Instant;

use super::job::{JobId, JobState};

/// Cross-cutting logger for pipeline orchestration events.
///
/// Decouples the orchestrator from specific output mechanisms (terminal,
/// log crate) so each caller can observe a run without changing it. A run
/// reports to exactly one logger.
pub trait PipelineLogger: Send {
    /// Report encode progress as a whole percent, never decreasing within a job.
    fn progress(&mut self, job: JobId, percent: u8);

    /// Record a job state transition.
    fn state(&mut self, job: JobId, state: JobState);

    /// Log a human-readable status message.
    fn info(&mut self, message: &str);

    /// Emit an end-of-run summary. Default: no-op.
    fn summary(&self) {}
}

/// Silent logger that discards all events.
pub struct NullPipelineLogger;

impl PipelineLogger for NullPipelineLogger {
    fn progress(&mut self, _job: JobId, _percent: u8) {}
    fn state(&mut self, _job: JobId, _state: JobState) {}
    fn info(&mut self, _message: &str) {}
}

/// Forwards events to the `log` crate and tracks how long each phase took.
///
/// Progress output is throttled to every `throttle_percent` percent.
pub struct LogPipelineLogger {
    throttle_percent: u8,
    last_logged: Option<u8>,
    phases: Vec<(JobState, f64)>,
    phase_started: Option<(JobState, Instant)>,
    messages: Vec<String>,
}

impl LogPipelineLogger {
    pub fn new(throttle_percent: u8) -> Self {
        Self {
            throttle_percent: throttle_percent.max(1),
            last_logged: None,
            phases: Vec::new(),
            phase_started: None,
            messages: Vec::new(),
        }
    }

    /// Per-phase durations in milliseconds, in the order they finished.
    pub fn phases(&self) -> &[(JobState, f64)] {
        &self.phases
    }

    /// Returns the formatted summary string, or `None` if no phase finished.
    pub fn summary_string(&self) -> Option<String> {
        if self.phases.is_empty() {
            return None;
        }
        let total_ms: f64 = self.phases.iter().map(|(_, ms)| ms).sum();
        let mut lines = vec![format!("Run summary ({:.1}s total):", total_ms / 1000.0)];
        for (phase, ms) in &self.phases {
            let pct = if total_ms > 0.0 { ms / total_ms * 100.0 } else { 0.0 };
            lines.push(format!("  {:12}: {ms:8.0}ms  ({pct:4.1}%)", phase.to_string()));
        }
        Some(lines.join("\n"))
    }

    fn finish_phase(&mut self) {
        if let Some((phase, started)) = self.phase_started.take() {
            self.phases
                .push((phase, started.elapsed().as_secs_f64() * 1000.0));
        }
    }
}

impl Default for LogPipelineLogger {
    fn default() -> Self {
        Self::new(10)
    }
}

impl PipelineLogger for LogPipelineLogger {
    fn progress(&mut self, job: JobId, percent: u8) {
        let due = match self.last_logged {
            None => true,
            Some(last) => percent >= last.saturating_add(self.throttle_percent) || percent == 100,
        };
        if due && self.last_logged != Some(percent) {
            self.last_logged = Some(percent);
            log::info!("Job {job}: encoding {percent}%");
        }
    }

    fn state(&mut self, job: JobId, state: JobState) {
        self.finish_phase();
        if !state.is_terminal() {
            self.phase_started = Some((state, Instant::now()));
        }
        if state == JobState::Staging {
            self.last_logged = None;
        }
        log::info!("Job {job}: {state}");
    }

    fn info(&mut self, message: &str) {
        self.messages.push(message.to_string());
        log::info!("{message}");
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n\n{text}");
        }
    }
}

/// Maps completion ratios to whole percents that never go backwards.
#[derive(Debug, Default)]
pub struct PercentClamp {
    last: u8,
}

impl PercentClamp {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, ratio: f64) -> u8 {
        let percent = if ratio.is_finite() {
            (ratio.clamp(0.0, 1.0) * 100.0).round() as u8
        } else {
            0
        };
        self.last = self.last.max(percent);
        self.last
    }
}
