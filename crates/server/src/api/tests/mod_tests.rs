use super::*;

use std::sync::Mutex;

use anki_integration::{AnkiNote, ComposedNote, TemplateNoteComposer};
use anyhow::anyhow;
use axum::extract::Path;
use axum::routing::{get, post};
use axum::{Json, Router};
use tokio::net::TcpListener;

struct RecordingConnector {
    log: Mutex<Vec<String>>,
    fail_with: Option<String>,
}

impl RecordingConnector {
    fn ok() -> Arc<Self> {
        Arc::new(Self {
            log: Mutex::new(Vec::new()),
            fail_with: None,
        })
    }

    fn failing(detail: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            log: Mutex::new(Vec::new()),
            fail_with: Some(detail.into()),
        })
    }

    fn entries(&self) -> Vec<String> {
        self.log.lock().expect("log lock").clone()
    }
}

#[async_trait::async_trait]
impl AnkiConnector for RecordingConnector {
    async fn add_note(&self, note: &AnkiNote) -> anyhow::Result<i64> {
        if let Some(detail) = &self.fail_with {
            return Err(anyhow!(detail.clone()));
        }
        self.log.lock().expect("log lock").push(format!(
            "addNote:{}:{}",
            note.deck_name,
            note.tags.join(",")
        ));
        Ok(7)
    }

    async fn store_media_file(&self, filename: &str, _data: &[u8]) -> anyhow::Result<String> {
        self.log
            .lock()
            .expect("log lock")
            .push(format!("storeMediaFile:{filename}"));
        Ok(filename.to_string())
    }

    async fn sync(&self) -> anyhow::Result<()> {
        self.log.lock().expect("log lock").push("sync".to_string());
        Ok(())
    }
}

struct FailingComposer;

#[async_trait::async_trait]
impl NoteComposer for FailingComposer {
    async fn compose(&self, _language: Language, _word: &str) -> anyhow::Result<ComposedNote> {
        Err(anyhow!("composer backend offline"))
    }
}

fn context_with(connector: Arc<RecordingConnector>, container: ContainerPolicy) -> ApiContext {
    ApiContext {
        anki: Some(connector),
        composer: Arc::new(TemplateNoteComposer),
        container,
    }
}

async fn spawn_portainer_double(container_state: &'static str) -> String {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let app = Router::new()
        .route(
            "/api/auth",
            post(|| async { Json(serde_json::json!({ "jwt": "test-jwt" })) }),
        )
        .route(
            "/api/endpoints/:endpoint_id/docker/containers/:container_id/json",
            get(move |Path((_, _)): Path<(String, String)>| async move {
                Json(serde_json::json!({ "State": { "Status": container_state } }))
            }),
        );
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    format!("http://{addr}")
}

fn supervised_policy(url: String) -> ContainerPolicy {
    ContainerPolicy::Supervised(Arc::new(ContainerSupervisor::new(
        crate::portainer::PortainerConfig {
            url,
            username: "admin".to_string(),
            password: "hunter2".to_string(),
            endpoint_id: "1".to_string(),
            container_id: "anki-desktop".to_string(),
            start_wait: std::time::Duration::from_millis(0),
        },
    )))
}

#[tokio::test]
async fn rejects_when_no_ankiconnect_url_is_configured() {
    let ctx = ApiContext {
        anki: None,
        composer: Arc::new(TemplateNoteComposer),
        container: ContainerPolicy::Disabled,
    };

    let err = add_note(&ctx, "cat", "english").await.expect_err("rejected");

    assert_eq!(err.code, ErrorCode::Internal);
    assert_eq!(err.message, "ANKICONNECT_URL environment variable not set");
}

#[tokio::test]
async fn english_token_lands_in_the_english_deck() {
    let connector = RecordingConnector::ok();
    let ctx = context_with(connector.clone(), ContainerPolicy::Disabled);

    let accepted = add_note(&ctx, "Apple", "english").await.expect("accepted");

    assert_eq!(accepted.message, "Note added successfully");
    assert_eq!(accepted.word, "Apple");
    assert_eq!(accepted.value, "english");
    assert_eq!(
        connector.entries(),
        vec!["addNote:English:english_anki_generator", "sync"]
    );
}

#[tokio::test]
async fn japanese_token_lands_in_the_japanese_deck() {
    let connector = RecordingConnector::ok();
    let ctx = context_with(connector.clone(), ContainerPolicy::Disabled);

    let accepted = add_note(&ctx, "猫", "japanese").await.expect("accepted");

    assert_eq!(accepted.value, "japanese");
    assert_eq!(
        connector.entries(),
        vec!["addNote:Japanese:japanese_anki_generator", "sync"]
    );
}

#[tokio::test]
async fn unknown_tokens_fall_through_to_the_english_flow() {
    let connector = RecordingConnector::ok();
    let ctx = context_with(connector.clone(), ContainerPolicy::Disabled);

    let accepted = add_note(&ctx, "abc", "en").await.expect("accepted");

    // The deck still takes its name from the raw token.
    assert_eq!(accepted.value, "en");
    assert_eq!(
        connector.entries(),
        vec!["addNote:En:english_anki_generator", "sync"]
    );
}

#[tokio::test]
async fn upstream_failures_keep_their_detail() {
    let connector = RecordingConnector::failing("AnkiConnect error: db down");
    let ctx = context_with(connector, ContainerPolicy::Disabled);

    let err = add_note(&ctx, "cat", "english").await.expect_err("rejected");

    assert_eq!(err.code, ErrorCode::Upstream);
    assert_eq!(err.message, "AnkiConnect error: db down");
}

#[tokio::test]
async fn composer_failures_are_upstream_errors() {
    let connector = RecordingConnector::ok();
    let ctx = ApiContext {
        anki: Some(connector.clone()),
        composer: Arc::new(FailingComposer),
        container: ContainerPolicy::Disabled,
    };

    let err = add_note(&ctx, "cat", "english").await.expect_err("rejected");

    assert_eq!(err.code, ErrorCode::Upstream);
    assert_eq!(err.message, "composer backend offline");
    assert!(connector.entries().is_empty());
}

#[tokio::test]
async fn misconfigured_supervision_refuses_the_relay() {
    let connector = RecordingConnector::ok();
    let ctx = context_with(
        connector.clone(),
        ContainerPolicy::Misconfigured("PORTAINER_USERNAME is not set".to_string()),
    );

    let err = add_note(&ctx, "cat", "english").await.expect_err("rejected");

    assert_eq!(err.code, ErrorCode::Internal);
    assert_eq!(
        err.message,
        "container supervision enabled but not configured: PORTAINER_USERNAME is not set"
    );
    assert!(connector.entries().is_empty());
}

#[tokio::test]
async fn supervised_relay_passes_once_the_container_runs() {
    let url = spawn_portainer_double("running").await;
    let connector = RecordingConnector::ok();
    let ctx = context_with(connector.clone(), supervised_policy(url));

    let accepted = add_note(&ctx, "cat", "english").await.expect("accepted");

    assert_eq!(accepted.message, "Note added successfully");
    assert!(!connector.entries().is_empty());
}

#[tokio::test]
async fn supervised_relay_stops_on_unexpected_container_states() {
    let url = spawn_portainer_double("dead").await;
    let connector = RecordingConnector::ok();
    let ctx = context_with(connector.clone(), supervised_policy(url));

    let err = add_note(&ctx, "cat", "english").await.expect_err("rejected");

    assert_eq!(err.code, ErrorCode::Upstream);
    assert_eq!(err.message, "container is in an unexpected state: dead");
    assert!(connector.entries().is_empty());
}
