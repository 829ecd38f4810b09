//! UI layer for the desktop app: the egui shell and the note form.

pub mod app;

pub use app::WordDeckApp;
