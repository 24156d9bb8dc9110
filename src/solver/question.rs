use chrono::{DateTime, Local, TimeDelta};

/// A submitted question. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    text: String,
    ordinal: usize,
    asked_at: DateTime<Local>,
}

impl Question {
    /// `None` for blank input; the caller decides how to re-prompt.
    pub fn new(text: &str, ordinal: usize) -> Option<Self> {
        Self::at(text, ordinal, Local::now())
    }

    pub fn at(text: &str, ordinal: usize, asked_at: DateTime<Local>) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        Some(Self {
            text: text.to_string(),
            ordinal,
            asked_at,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    pub fn asked_at(&self) -> DateTime<Local> {
        self.asked_at
    }

    /// Wall-clock time since the question was submitted.
    pub fn elapsed(&self) -> TimeDelta {
        Local::now() - self.asked_at
    }
}
