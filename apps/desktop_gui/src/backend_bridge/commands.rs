//! Backend commands queued from UI to the backend worker.

pub enum BackendCommand {
    ProbeServer,
    SubmitNote {
        word: String,
        dropdown_value: String,
    },
}
