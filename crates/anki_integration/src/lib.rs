use anyhow::anyhow;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine as _;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use shared::domain::Language;
use thiserror::Error;
use tracing::{debug, info};

/// Protocol version pinned into every AnkiConnect envelope.
const ANKI_CONNECT_VERSION: u8 = 6;
/// Both decks use the stock two-field note model.
const BASIC_MODEL: &str = "Basic";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnkiConnectConfig {
    pub url: String,
}

#[derive(Debug, Error)]
pub enum AnkiConnectError {
    #[error("AnkiConnect request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// The envelope came back with a non-null `error` field.
    #[error("AnkiConnect error: {0}")]
    Protocol(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteFields {
    #[serde(rename = "Front")]
    pub front: String,
    #[serde(rename = "Back")]
    pub back: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteOptions {
    #[serde(rename = "allowDuplicate")]
    pub allow_duplicate: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnkiNote {
    #[serde(rename = "deckName")]
    pub deck_name: String,
    #[serde(rename = "modelName")]
    pub model_name: String,
    pub fields: NoteFields,
    pub options: NoteOptions,
    pub tags: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseEnvelope {
    #[serde(default)]
    result: serde_json::Value,
    #[serde(default)]
    error: Option<String>,
}

#[async_trait]
pub trait AnkiConnector: Send + Sync {
    async fn add_note(&self, note: &AnkiNote) -> anyhow::Result<i64>;
    async fn store_media_file(&self, filename: &str, data: &[u8]) -> anyhow::Result<String>;
    async fn sync(&self) -> anyhow::Result<()>;
}

pub struct AnkiConnectClient {
    http: Client,
    url: String,
}

impl AnkiConnectClient {
    pub fn new(config: AnkiConnectConfig) -> Self {
        Self {
            http: Client::new(),
            url: config.url,
        }
    }

    async fn invoke(
        &self,
        action: &str,
        params: Option<serde_json::Value>,
    ) -> Result<serde_json::Value, AnkiConnectError> {
        let mut payload = json!({ "action": action, "version": ANKI_CONNECT_VERSION });
        if let Some(params) = params {
            payload["params"] = params;
        }
        let envelope: ResponseEnvelope = self
            .http
            .post(&self.url)
            .json(&payload)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        if let Some(detail) = envelope.error {
            return Err(AnkiConnectError::Protocol(detail));
        }
        Ok(envelope.result)
    }
}

#[async_trait]
impl AnkiConnector for AnkiConnectClient {
    async fn add_note(&self, note: &AnkiNote) -> anyhow::Result<i64> {
        let result = self.invoke("addNote", Some(json!({ "note": note }))).await?;
        let note_id = result
            .as_i64()
            .ok_or_else(|| anyhow!("addNote returned a non-numeric note id: {result}"))?;
        info!(deck = %note.deck_name, note_id, "note added");
        Ok(note_id)
    }

    async fn store_media_file(&self, filename: &str, data: &[u8]) -> anyhow::Result<String> {
        let encoded = BASE64_STANDARD.encode(data);
        let result = self
            .invoke(
                "storeMediaFile",
                Some(json!({ "filename": filename, "data": encoded })),
            )
            .await?;
        let stored = result.as_str().unwrap_or(filename).to_string();
        debug!(filename = %stored, "media file stored");
        Ok(stored)
    }

    async fn sync(&self) -> anyhow::Result<()> {
        // The sync action travels without a params key.
        self.invoke("sync", None).await?;
        info!("collection sync requested");
        Ok(())
    }
}

/// Stand-in used when no AnkiConnect endpoint is configured.
pub struct MissingAnkiConnector;

#[async_trait]
impl AnkiConnector for MissingAnkiConnector {
    async fn add_note(&self, _note: &AnkiNote) -> anyhow::Result<i64> {
        Err(anyhow!("AnkiConnect backend unavailable"))
    }

    async fn store_media_file(&self, _filename: &str, _data: &[u8]) -> anyhow::Result<String> {
        Err(anyhow!("AnkiConnect backend unavailable"))
    }

    async fn sync(&self) -> anyhow::Result<()> {
        Err(anyhow!("AnkiConnect backend unavailable"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaAttachment {
    pub filename: String,
    pub data: Vec<u8>,
}

/// Card content ready for upload: rendered fields plus any media the
/// composer produced along the way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedNote {
    pub front_html: String,
    pub back_html: String,
    pub media: Vec<MediaAttachment>,
    pub tags: Vec<String>,
}

#[async_trait]
pub trait NoteComposer: Send + Sync {
    async fn compose(&self, language: Language, word: &str) -> anyhow::Result<ComposedNote>;
}

/// Deterministic composer: formats the word alone. Enrichment backends
/// (translation, definitions, TTS audio) plug in behind the same trait and
/// fill the back side and media list.
pub struct TemplateNoteComposer;

#[async_trait]
impl NoteComposer for TemplateNoteComposer {
    async fn compose(&self, language: Language, word: &str) -> anyhow::Result<ComposedNote> {
        let word = word.to_lowercase();
        Ok(ComposedNote {
            front_html: format!("<span style=\"font-size: 60px;\">{word}</span>"),
            back_html: String::new(),
            media: Vec::new(),
            tags: vec![language.generator_tag().to_string()],
        })
    }
}

/// Stand-in used when no composer backend is wired up.
pub struct MissingNoteComposer;

#[async_trait]
impl NoteComposer for MissingNoteComposer {
    async fn compose(&self, _language: Language, _word: &str) -> anyhow::Result<ComposedNote> {
        Err(anyhow!("note composer backend unavailable"))
    }
}

/// Full relay flow for one card: compose it, upload its media, add the note
/// to the deck, then request a collection sync.
pub async fn publish_note(
    connector: &dyn AnkiConnector,
    composer: &dyn NoteComposer,
    language: Language,
    deck: &str,
    word: &str,
) -> anyhow::Result<i64> {
    let composed = composer.compose(language, word).await?;
    for media in &composed.media {
        connector.store_media_file(&media.filename, &media.data).await?;
    }
    let note = AnkiNote {
        deck_name: deck.to_string(),
        model_name: BASIC_MODEL.to_string(),
        fields: NoteFields {
            front: composed.front_html,
            back: composed.back_html,
        },
        options: NoteOptions {
            allow_duplicate: false,
        },
        tags: composed.tags,
    };
    let note_id = connector.add_note(&note).await?;
    connector.sync().await?;
    Ok(note_id)
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
