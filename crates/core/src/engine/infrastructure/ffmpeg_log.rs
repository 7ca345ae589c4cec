//! Parsing of ffmpeg's diagnostic (stderr) output.
//!
//! ffmpeg prints the input duration once (`Duration: 00:01:02.50, ...`) and
//! then status lines separated by carriage returns
//! (`frame=  100 fps= 25 ... time=00:00:04.00 bitrate=...`).

/// Splits a raw stderr byte stream into lines on `\n` or `\r`.
#[derive(Default)]
pub struct LineSplitter {
    pending: Vec<u8>,
}

impl LineSplitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds a chunk and returns every line it completed.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        let mut lines = Vec::new();
        for &byte in chunk {
            if byte == b'\n' || byte == b'\r' {
                if let Some(line) = self.take_line() {
                    lines.push(line);
                }
            } else {
                self.pending.push(byte);
            }
        }
        lines
    }

    /// Returns the trailing unterminated line, if any.
    pub fn finish(mut self) -> Option<String> {
        self.take_line()
    }

    fn take_line(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            return None;
        }
        let line = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        Some(line)
    }
}

/// Turns successive log lines into a completion ratio.
#[derive(Default)]
pub struct ProgressTracker {
    duration_secs: Option<f64>,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the completion ratio in `0.0..=1.0` when `line` reports one.
    pub fn feed(&mut self, line: &str) -> Option<f64> {
        if self.duration_secs.is_none() {
            if let Some(duration) = parse_duration(line).filter(|d| *d > 0.0) {
                self.duration_secs = Some(duration);
                return None;
            }
        }
        let duration = self.duration_secs?;
        let position = parse_time(line)?;
        Some((position / duration).clamp(0.0, 1.0))
    }
}

/// Extracts the `Duration:` field of an input description line, in seconds.
pub fn parse_duration(line: &str) -> Option<f64> {
    let marker = "Duration: ";
    let start = line.find(marker)? + marker.len();
    let value = line[start..].split(',').next()?.trim();
    parse_timestamp(value)
}

/// Extracts the `time=` field of a status line, in seconds.
pub fn parse_time(line: &str) -> Option<f64> {
    let marker = "time=";
    let start = line.find(marker)? + marker.len();
    let value = line[start..].split_whitespace().next()?;
    parse_timestamp(value)
}

/// Parses `HH:MM:SS(.frac)`. Returns `None` for `N/A` or negative stamps.
fn parse_timestamp(value: &str) -> Option<f64> {
    if value.starts_with('-') {
        return None;
    }
    let mut parts = value.split(':');
    let hours: f64 = parts.next()?.parse().ok()?;
    let minutes: f64 = parts.next()?.parse().ok()?;
    let seconds: f64 = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some(hours * 3600.0 + minutes * 60.0 + seconds)
}
