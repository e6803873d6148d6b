use crate::settings::TypingMode;
use crate::time_series::MetricSample;

pub const CHARS_PER_WORD: f64 = 5.0;

fn minutes(elapsed_secs: f64) -> Option<f64> {
    (elapsed_secs > 0.0).then_some(elapsed_secs / 60.0)
}

/// Words per minute from correct characters, five characters per word
pub fn wpm(correct_chars: usize, elapsed_secs: f64) -> u32 {
    minutes(elapsed_secs)
        .map(|m| ((correct_chars as f64 / CHARS_PER_WORD) / m).round() as u32)
        .unwrap_or(0)
}

/// Characters per minute from correct characters
pub fn cpm(correct_chars: usize, elapsed_secs: f64) -> u32 {
    minutes(elapsed_secs)
        .map(|m| (correct_chars as f64 / m).round() as u32)
        .unwrap_or(0)
}

/// Lines per minute, estimated from the overall completion ratio of
/// `target_text` rather than from counted line crossings.
pub fn lpm(target_text: &str, correct_chars: usize, elapsed_secs: f64) -> u32 {
    let target_len = target_text.chars().count();
    let Some(m) = minutes(elapsed_secs) else {
        return 0;
    };
    if target_len == 0 {
        return 0;
    }

    let total_lines = target_text.split('\n').count() as f64;
    let completed_lines = total_lines * (correct_chars as f64 / target_len as f64);
    (completed_lines / m).round() as u32
}

/// Live metrics shown while a session runs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub wpm: u32,
    pub cpm: u32,
    pub lpm: u32,
}

/// Inputs for one per-second metrics tick
#[derive(Debug, Clone, Copy)]
pub struct MetricsCollector<'a> {
    pub mode: TypingMode,
    pub target_text: &'a str,
    pub correct_chars: usize,
    /// Correct count observed by the previous tick
    pub last_correct_chars: usize,
    pub accuracy: u32,
}

impl MetricsCollector<'_> {
    /// Compute live metrics and the history sample for `elapsed_secs`.
    pub fn collect(&self, elapsed_secs: f64) -> (MetricsSnapshot, MetricSample) {
        let snapshot = MetricsSnapshot {
            wpm: match self.mode {
                TypingMode::English => wpm(self.correct_chars, elapsed_secs),
                _ => 0,
            },
            cpm: cpm(self.correct_chars, elapsed_secs),
            lpm: match self.mode {
                TypingMode::Coder => lpm(self.target_text, self.correct_chars, elapsed_secs),
                _ => 0,
            },
        };

        let delta = self.correct_chars as i64 - self.last_correct_chars as i64;
        let instant_cpm = (delta * 60).max(0) as u32;
        let time = if elapsed_secs > 0.0 {
            elapsed_secs.floor() as u64
        } else {
            0
        };

        (snapshot, MetricSample::new(time, instant_cpm, self.accuracy))
    }
}
