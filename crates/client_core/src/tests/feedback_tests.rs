use super::*;

use std::time::{Duration, Instant};

use crate::SubmitOutcome;

fn success(message: &str) -> SubmitOutcome {
    SubmitOutcome::Success {
        message: message.to_string(),
    }
}

fn failure(message: &str) -> SubmitOutcome {
    SubmitOutcome::Failure {
        message: message.to_string(),
        detail: None,
    }
}

#[test]
fn starts_idle() {
    let mut feedback = SubmissionFeedback::new();
    assert_eq!(feedback.state(), &FeedbackState::Idle);
    assert_eq!(feedback.state().text(), "");
    assert_eq!(feedback.state().state_class(), None);
    assert!(!feedback.tick(Instant::now()));
    assert_eq!(feedback.time_until_clear(Instant::now()), None);
}

#[test]
fn outcomes_map_to_banner_states() {
    let now = Instant::now();
    let mut feedback = SubmissionFeedback::new();

    feedback.set_outcome(&success("Added!"), now);
    assert_eq!(feedback.state(), &FeedbackState::Success("Added!".to_string()));
    assert_eq!(feedback.state().state_class(), Some("success"));

    feedback.set_outcome(&failure("Failed to add"), now);
    assert_eq!(
        feedback.state(),
        &FeedbackState::Error("Failed to add".to_string())
    );
    assert_eq!(feedback.state().state_class(), Some("error"));
}

#[test]
fn clears_exactly_at_the_deadline() {
    let start = Instant::now();
    let mut feedback = SubmissionFeedback::new();
    feedback.set_outcome(&success("Added!"), start);

    assert!(!feedback.tick(start + Duration::from_millis(4999)));
    assert_eq!(feedback.state().text(), "Added!");

    assert!(feedback.tick(start + Duration::from_millis(5000)));
    assert_eq!(feedback.state(), &FeedbackState::Idle);
    assert_eq!(feedback.state().state_class(), None);

    // The timer disarms after firing.
    assert!(!feedback.tick(start + Duration::from_millis(10000)));
}

#[test]
fn a_newer_outcome_overwrites_and_rearms_the_timer() {
    let start = Instant::now();
    let mut feedback = SubmissionFeedback::new();

    feedback.set_outcome(&success("Added!"), start);
    feedback.set_outcome(&failure("Failed to add"), start + Duration::from_millis(3000));

    // The first deadline passes without clearing the newer banner.
    assert!(!feedback.tick(start + Duration::from_millis(5000)));
    assert_eq!(feedback.state().text(), "Failed to add");

    assert!(feedback.tick(start + Duration::from_millis(8000)));
    assert_eq!(feedback.state(), &FeedbackState::Idle);
}

#[test]
fn time_until_clear_counts_down() {
    let start = Instant::now();
    let mut feedback = SubmissionFeedback::new();
    feedback.set_outcome(&success("Added!"), start);

    assert_eq!(
        feedback.time_until_clear(start),
        Some(Duration::from_millis(5000))
    );
    assert_eq!(
        feedback.time_until_clear(start + Duration::from_millis(3000)),
        Some(Duration::from_millis(2000))
    );
    assert_eq!(
        feedback.time_until_clear(start + Duration::from_millis(9000)),
        Some(Duration::ZERO)
    );

    feedback.tick(start + Duration::from_millis(5000));
    assert_eq!(feedback.time_until_clear(start + Duration::from_millis(5000)), None);
}
