//! Submission feedback banner with its auto-clear timer.

use std::time::{Duration, Instant};

use crate::SubmitOutcome;

/// How long a banner stays up before reverting to idle.
pub const FEEDBACK_CLEAR_DELAY: Duration = Duration::from_millis(5000);

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FeedbackState {
    #[default]
    Idle,
    Success(String),
    Error(String),
}

impl FeedbackState {
    pub fn text(&self) -> &str {
        match self {
            FeedbackState::Idle => "",
            FeedbackState::Success(message) | FeedbackState::Error(message) => message,
        }
    }

    /// Presentation class for the banner, if any.
    pub fn state_class(&self) -> Option<&'static str> {
        match self {
            FeedbackState::Idle => None,
            FeedbackState::Success(_) => Some("success"),
            FeedbackState::Error(_) => Some("error"),
        }
    }
}

#[derive(Debug)]
pub struct SubmissionFeedback {
    state: FeedbackState,
    clear_at: Option<Instant>,
}

impl Default for SubmissionFeedback {
    fn default() -> Self {
        Self::new()
    }
}

impl SubmissionFeedback {
    pub fn new() -> Self {
        Self {
            state: FeedbackState::Idle,
            clear_at: None,
        }
    }

    pub fn state(&self) -> &FeedbackState {
        &self.state
    }

    /// Overlapping submissions overwrite freely; the latest completion wins
    /// and re-arms the clear timer.
    pub fn set_outcome(&mut self, outcome: &SubmitOutcome, now: Instant) {
        self.state = match outcome {
            SubmitOutcome::Success { message } => FeedbackState::Success(message.clone()),
            SubmitOutcome::Failure { message, .. } => FeedbackState::Error(message.clone()),
        };
        self.clear_at = Some(now + FEEDBACK_CLEAR_DELAY);
    }

    /// Advances the clock; at or past the deadline the banner reverts to
    /// idle. Returns true when a clear happened.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.clear_at {
            Some(deadline) if now >= deadline => {
                self.state = FeedbackState::Idle;
                self.clear_at = None;
                true
            }
            _ => false,
        }
    }

    /// Time left until the armed clear fires. Drives repaint scheduling.
    pub fn time_until_clear(&self, now: Instant) -> Option<Duration> {
        self.clear_at
            .map(|deadline| deadline.saturating_duration_since(now))
    }
}

#[cfg(test)]
#[path = "tests/feedback_tests.rs"]
mod tests;
