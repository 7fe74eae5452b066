use std::fmt;

use serde::{Deserialize, Serialize};

/// A span of time during which a line of emoji is shown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cue {
    pub text: String,
    pub start: f64,
    pub end: f64,
    /// Seconds taken to reveal every emoji of the cue; zero shows them all at
    /// `start`.
    #[serde(default)]
    pub typing_duration: f64,
}

impl Cue {
    pub fn new(text: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            text: text.into(),
            start,
            end,
            typing_duration: 0.0,
        }
    }

    pub fn with_typing(mut self, typing_duration: f64) -> Self {
        self.typing_duration = typing_duration;
        self
    }
}

/// Orders cues by start time. Equal starts keep their input order.
pub fn sort_by_start(cues: &mut [Cue]) {
    cues.sort_by(|a, b| a.start.total_cmp(&b.start));
}

/// Problem with the timing of a single cue within a sorted list.
#[derive(Debug, Clone, PartialEq)]
pub enum TimingIssue {
    InvalidRange { index: usize, start: f64, end: f64 },
    Overlap { index: usize },
}

impl fmt::Display for TimingIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidRange { index, start, end } => write!(
                f,
                "Cue #{index} has invalid time range: start={start}, end={end}"
            ),
            Self::Overlap { index } => {
                write!(f, "Cue #{index} overlaps with cue #{}", index - 1)
            }
        }
    }
}

/// Checks every cue against its own range and its immediate predecessor.
pub fn timing_issues(cues: &[Cue]) -> Vec<TimingIssue> {
    let mut issues = Vec::new();
    for (index, cue) in cues.iter().enumerate() {
        if cue.end <= cue.start {
            issues.push(TimingIssue::InvalidRange {
                index,
                start: cue.start,
                end: cue.end,
            });
        }
        if index > 0 && cue.start < cues[index - 1].end {
            issues.push(TimingIssue::Overlap { index });
        }
    }
    issues
}
