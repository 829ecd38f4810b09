//! Bridge between the egui thread and the tokio-backed worker.

pub mod commands;
pub mod runtime;
