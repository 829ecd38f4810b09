use std::sync::Arc;

use anki_integration::{publish_note, AnkiConnector, NoteComposer};
use shared::{
    domain::{deck_name_for_token, Language},
    error::{ApiError, ErrorCode},
    protocol::AddNoteAccepted,
};
use tracing::info;

use crate::portainer::ContainerSupervisor;

/// Success text echoed to the form when a relay completes.
pub const ACCEPTED_MESSAGE: &str = "Note added successfully";
/// Failure text produced when the relay runs without an AnkiConnect URL.
pub const MISSING_ANKI_URL: &str = "ANKICONNECT_URL environment variable not set";

/// How the relay treats the dockerized Anki container before each attempt.
#[derive(Clone)]
pub enum ContainerPolicy {
    /// No supervision; AnkiConnect is assumed reachable.
    Disabled,
    Supervised(Arc<ContainerSupervisor>),
    /// Supervision was requested but the settings are incomplete.
    Misconfigured(String),
}

#[derive(Clone)]
pub struct ApiContext {
    pub anki: Option<Arc<dyn AnkiConnector>>,
    pub composer: Arc<dyn NoteComposer>,
    pub container: ContainerPolicy,
}

pub fn add_note_route() -> &'static str {
    "/api/addnote"
}

pub async fn add_note(
    ctx: &ApiContext,
    word: &str,
    dropdown_value: &str,
) -> Result<AddNoteAccepted, ApiError> {
    let Some(anki) = ctx.anki.as_deref() else {
        return Err(ApiError::new(ErrorCode::Internal, MISSING_ANKI_URL));
    };

    match &ctx.container {
        ContainerPolicy::Disabled => {}
        ContainerPolicy::Supervised(supervisor) => {
            supervisor.ensure_running().await.map_err(upstream)?;
        }
        ContainerPolicy::Misconfigured(reason) => {
            return Err(ApiError::new(
                ErrorCode::Internal,
                format!("container supervision enabled but not configured: {reason}"),
            ));
        }
    }

    let deck = deck_name_for_token(dropdown_value);
    let language = Language::from_token(dropdown_value);
    let note_id = publish_note(anki, ctx.composer.as_ref(), language, &deck, word)
        .await
        .map_err(upstream)?;
    info!(%deck, note_id, "note relayed");

    Ok(AddNoteAccepted {
        message: ACCEPTED_MESSAGE.to_string(),
        word: word.to_string(),
        value: dropdown_value.to_string(),
    })
}

fn upstream(err: anyhow::Error) -> ApiError {
    ApiError::new(ErrorCode::Upstream, err.to_string())
}

#[cfg(test)]
#[path = "tests/mod_tests.rs"]
mod tests;
