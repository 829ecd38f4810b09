//! Command orchestration helpers from UI actions to backend command queue.

use crossbeam_channel::{Sender, TrySendError};

use crate::backend_bridge::commands::BackendCommand;

pub fn dispatch_backend_command(
    cmd_tx: &Sender<BackendCommand>,
    cmd: BackendCommand,
    status: &mut String,
) {
    let cmd_name = match &cmd {
        BackendCommand::ProbeServer => "probe_server",
        BackendCommand::SubmitNote { .. } => "submit_note",
    };

    match cmd_tx.try_send(cmd) {
        Ok(()) => tracing::debug!(command = cmd_name, "queued ui->backend command"),
        Err(TrySendError::Full(_)) => {
            *status = "UI command queue is full; please retry".to_string();
        }
        Err(TrySendError::Disconnected(_)) => {
            *status =
                "Backend command processor disconnected (possible startup/runtime failure); restart the app"
                    .to_string();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::bounded;

    #[test]
    fn a_full_queue_surfaces_in_the_status_line() {
        let (cmd_tx, _cmd_rx) = bounded(1);
        let mut status = String::new();

        dispatch_backend_command(&cmd_tx, BackendCommand::ProbeServer, &mut status);
        assert!(status.is_empty());

        dispatch_backend_command(&cmd_tx, BackendCommand::ProbeServer, &mut status);
        assert_eq!(status, "UI command queue is full; please retry");
    }

    #[test]
    fn a_disconnected_worker_surfaces_in_the_status_line() {
        let (cmd_tx, cmd_rx) = bounded(1);
        drop(cmd_rx);
        let mut status = String::new();

        dispatch_backend_command(
            &cmd_tx,
            BackendCommand::SubmitNote {
                word: "cat".to_string(),
                dropdown_value: "english".to_string(),
            },
            &mut status,
        );

        assert!(status.contains("Backend command processor disconnected"));
    }
}
