use anyhow::{bail, Context, Result};
use reqwest::Client;
use shared::protocol::{AddNoteReply, AddNoteRequest};
use tracing::error;
use url::Url;

pub mod dropdown;
pub mod feedback;

pub use dropdown::{DropdownKey, DropdownOption, DropdownState};
pub use feedback::{FeedbackState, SubmissionFeedback, FEEDBACK_CLEAR_DELAY};

/// Success text shown when the server reply carries no message of its own.
const DEFAULT_SUCCESS_TEXT: &str = "Note added!";
/// Shown when the server answered with a failure status.
const HTTP_FAILURE_TEXT: &str = "Failed to add";
/// Shown when the request never produced a decodable reply.
const TRANSPORT_FAILURE_TEXT: &str = "Error submitting note";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Success {
        message: String,
    },
    Failure {
        message: String,
        detail: Option<String>,
    },
}

impl SubmitOutcome {
    pub fn message(&self) -> &str {
        match self {
            SubmitOutcome::Success { message } => message,
            SubmitOutcome::Failure { message, .. } => message,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, SubmitOutcome::Success { .. })
    }
}

#[derive(Clone)]
pub struct NoteClient {
    http: Client,
    server_url: String,
}

impl NoteClient {
    pub fn new(server_url: impl Into<String>) -> Result<Self> {
        let server_url = normalize_server_url(server_url.into())?;
        Ok(Self {
            http: Client::new(),
            server_url,
        })
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    /// Cheap reachability check against the health route.
    pub async fn probe(&self) -> Result<()> {
        self.http
            .get(format!("{}/healthz", self.server_url))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    /// One submission, one request: no retries, no cancellation. Overlapping
    /// calls race freely and the caller's feedback is last-writer-wins.
    pub async fn submit_note(&self, word: &str, dropdown_value: &str) -> SubmitOutcome {
        match self.post_add_note(word, dropdown_value).await {
            Ok(outcome) => outcome,
            Err(err) => {
                error!("note submission failed: {err:#}");
                SubmitOutcome::Failure {
                    message: TRANSPORT_FAILURE_TEXT.to_string(),
                    detail: Some(format!("{err:#}")),
                }
            }
        }
    }

    async fn post_add_note(&self, word: &str, dropdown_value: &str) -> Result<SubmitOutcome> {
        let request = AddNoteRequest {
            word: word.to_string(),
            dropdown_value: dropdown_value.to_string(),
        };
        let response = self
            .http
            .post(format!("{}/api/addnote", self.server_url))
            .json(&request)
            .send()
            .await?;
        let status = response.status();
        // Decode before branching on status: an undecodable body is a
        // transport failure even on an error status.
        let reply: AddNoteReply = response.json().await?;
        if !status.is_success() {
            match &reply.error {
                Some(detail) => error!("server rejected note ({status}): {detail}"),
                None => error!("server rejected note ({status})"),
            }
            return Ok(SubmitOutcome::Failure {
                message: HTTP_FAILURE_TEXT.to_string(),
                detail: reply.error,
            });
        }
        let message = reply
            .message
            .unwrap_or_else(|| DEFAULT_SUCCESS_TEXT.to_string());
        Ok(SubmitOutcome::Success { message })
    }
}

fn normalize_server_url(raw: String) -> Result<String> {
    let trimmed = raw.trim().trim_end_matches('/').to_string();
    let parsed =
        Url::parse(&trimmed).with_context(|| format!("invalid server url '{trimmed}'"))?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        bail!(
            "unsupported scheme '{}' in server url '{trimmed}'",
            parsed.scheme()
        );
    }
    Ok(trimmed)
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
