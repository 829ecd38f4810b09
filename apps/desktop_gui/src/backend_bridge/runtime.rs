//! Runtime bridge between the UI command queue and the relay client.

use std::thread;

use client_core::NoteClient;
use crossbeam_channel::{Receiver, Sender};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext, UiEvent};

pub fn launch(server_url: String, cmd_rx: Receiver<BackendCommand>, ui_tx: Sender<UiEvent>) {
    thread::spawn(move || {
        let _ = ui_tx.try_send(UiEvent::Info("Backend worker starting...".to_string()));
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                    UiErrorContext::BackendStartup,
                    format!("backend worker startup failure: failed to build runtime: {err}"),
                )));
                tracing::error!("failed to build backend runtime: {err}");
                return;
            }
        };

        runtime.block_on(async move {
            let client = match NoteClient::new(server_url) {
                Ok(client) => client,
                Err(err) => {
                    let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                        UiErrorContext::BackendStartup,
                        format!("backend worker startup failure: {err:#}"),
                    )));
                    tracing::error!("failed to build relay client: {err:#}");
                    return;
                }
            };
            let _ = ui_tx.try_send(UiEvent::Info("Backend worker ready".to_string()));

            while let Ok(cmd) = cmd_rx.recv() {
                match cmd {
                    BackendCommand::ProbeServer => {
                        let ok = match client.probe().await {
                            Ok(()) => true,
                            Err(err) => {
                                tracing::warn!("server probe failed: {err:#}");
                                false
                            }
                        };
                        let _ = ui_tx.try_send(UiEvent::ServerProbed { ok });
                    }
                    BackendCommand::SubmitNote {
                        word,
                        dropdown_value,
                    } => {
                        // Submissions run concurrently; overlapping requests
                        // race and the feedback takes the last completion.
                        let client = client.clone();
                        let ui_tx = ui_tx.clone();
                        tokio::spawn(async move {
                            let outcome = client.submit_note(&word, &dropdown_value).await;
                            let _ = ui_tx.try_send(UiEvent::SubmissionFinished(outcome));
                        });
                    }
                }
            }
        });
    });
}
