use std::{net::SocketAddr, sync::Arc};

use anki_integration::{
    AnkiConnectClient, AnkiConnectConfig, AnkiConnector, NoteComposer, TemplateNoteComposer,
};
use axum::{
    extract::State,
    http::StatusCode,
    response::Html,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use shared::{
    error::{ApiError, ErrorCode},
    protocol::AddNoteAccepted,
};
use tracing::{error, info, warn};

mod api;
mod config;
mod pages;
mod portainer;

use api::{add_note_route, ApiContext, ContainerPolicy};
use config::{load_settings, Settings};
use portainer::ContainerSupervisor;

#[derive(Clone)]
struct AppState {
    api: ApiContext,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let settings = load_settings();
    let state = app_state_from_settings(&settings);
    let container = state.api.container.clone();
    let app = build_router(Arc::new(state));

    let addr: SocketAddr = settings.server_bind.parse()?;
    info!(%addr, "server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Supervised mode owns the container lifecycle through shutdown.
    if let ContainerPolicy::Supervised(supervisor) = &container {
        if let Err(err) = supervisor.stop().await {
            warn!("failed to stop supervised container: {err:#}");
        }
    }
    info!("server exited");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };
    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        if let Ok(mut stream) = signal(SignalKind::terminate()) {
            let _ = stream.recv().await;
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

fn app_state_from_settings(settings: &Settings) -> AppState {
    let anki: Option<Arc<dyn AnkiConnector>> = match &settings.ankiconnect_url {
        Some(url) => Some(Arc::new(AnkiConnectClient::new(AnkiConnectConfig {
            url: url.clone(),
        }))),
        None => {
            warn!("ANKICONNECT_URL is not set; addnote requests will be rejected");
            None
        }
    };

    let container = if settings.handle_container {
        match settings.portainer_config() {
            Ok(portainer) => {
                info!(container = %portainer.container_id, "container supervision enabled");
                ContainerPolicy::Supervised(Arc::new(ContainerSupervisor::new(portainer)))
            }
            Err(err) => {
                warn!("container supervision enabled but not configured: {err:#}");
                ContainerPolicy::Misconfigured(err.to_string())
            }
        }
    } else {
        ContainerPolicy::Disabled
    };

    let composer: Arc<dyn NoteComposer> = Arc::new(TemplateNoteComposer);

    AppState {
        api: ApiContext {
            anki,
            composer,
            container,
        },
    }
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/", get(home))
        .route(add_note_route(), post(http_add_note))
        .fallback(not_found)
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn home() -> Html<String> {
    pages::home_page()
}

async fn not_found() -> (StatusCode, Html<String>) {
    (StatusCode::NOT_FOUND, pages::not_found_page())
}

async fn http_add_note(
    State(state): State<Arc<AppState>>,
    payload: Option<Json<Value>>,
) -> Result<Json<AddNoteAccepted>, (StatusCode, Json<Value>)> {
    // The config check comes before any body validation.
    if state.api.anki.is_none() {
        return Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": api::MISSING_ANKI_URL })),
        ));
    }

    let Some(Json(data)) = payload else {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Missing JSON data" })),
        ));
    };
    let fields = match data.as_object() {
        Some(fields) if !fields.is_empty() => fields,
        _ => {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "Missing JSON data" })),
            ))
        }
    };

    let word = fields
        .get("word")
        .and_then(Value::as_str)
        .unwrap_or_default();
    if word.is_empty() {
        // This rejection travels under the "message" key, not "error".
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({ "message": "Missing 'word'" })),
        ));
    }
    let dropdown_value = fields
        .get("dropdownValue")
        .and_then(Value::as_str)
        .unwrap_or_default();

    let accepted = api::add_note(&state.api, word, dropdown_value)
        .await
        .map_err(rejection)?;
    Ok(Json(accepted))
}

fn rejection(err: ApiError) -> (StatusCode, Json<Value>) {
    let status = match err.code {
        ErrorCode::Validation => StatusCode::BAD_REQUEST,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Upstream | ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    };
    error!("addnote rejected ({:?}): {}", err.code, err.message);
    (status, Json(json!({ "error": err.message })))
}
