use std::time::{Duration, Instant};

use client_core::{DropdownKey, DropdownOption, DropdownState, FeedbackState, SubmissionFeedback};
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use serde::{Deserialize, Serialize};
use shared::domain::Language;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiErrorCategory, UiErrorContext, UiEvent};
use crate::controller::orchestration::dispatch_backend_command;

pub const SETTINGS_STORAGE_KEY: &str = "desktop_gui.settings";

const IDLE_REPAINT_INTERVAL: Duration = Duration::from_millis(250);
const SUCCESS_COLOR: egui::Color32 = egui::Color32::from_rgb(0x2e, 0x7d, 0x32);
const ERROR_COLOR: egui::Color32 = egui::Color32::from_rgb(0xc6, 0x28, 0x28);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ServerStatus {
    Unknown,
    Reachable,
    Unreachable,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistedSettings {
    pub last_language_value: Option<String>,
}

fn err_label(category: UiErrorCategory) -> &'static str {
    match category {
        UiErrorCategory::Transport => "Transport",
        UiErrorCategory::Validation => "Validation",
        UiErrorCategory::Unknown => "Unexpected",
    }
}

fn language_options() -> Vec<DropdownOption> {
    Language::ALL
        .iter()
        .map(|language| DropdownOption::new(language.display_label(), language.wire_token()))
        .collect()
}

pub struct WordDeckApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,

    server_url: String,
    word_input: String,
    dropdown: DropdownState,
    feedback: SubmissionFeedback,
    server_status: ServerStatus,
    status: String,
    probe_requested: bool,
}

impl WordDeckApp {
    pub fn new(
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
        server_url: String,
        persisted: Option<PersistedSettings>,
    ) -> Self {
        let mut dropdown = DropdownState::new("Select language", "", language_options());
        if let Some(value) = persisted.and_then(|settings| settings.last_language_value) {
            dropdown.select_value(&value);
        }
        Self {
            cmd_tx,
            ui_rx,
            server_url,
            word_input: String::new(),
            dropdown,
            feedback: SubmissionFeedback::new(),
            server_status: ServerStatus::Unknown,
            status: "Starting backend worker".to_string(),
            probe_requested: false,
        }
    }

    fn process_ui_events(&mut self) {
        let now = Instant::now();
        while let Ok(event) = self.ui_rx.try_recv() {
            match event {
                UiEvent::Info(message) => {
                    self.status = message;
                }
                UiEvent::Error(err) => {
                    if err.context() == UiErrorContext::BackendStartup {
                        self.server_status = ServerStatus::Unreachable;
                    }
                    self.status = format!("{} error: {}", err_label(err.category()), err.message());
                }
                UiEvent::ServerProbed { ok } => {
                    self.server_status = if ok {
                        ServerStatus::Reachable
                    } else {
                        ServerStatus::Unreachable
                    };
                    self.status = if ok {
                        "Connected to relay".to_string()
                    } else {
                        "Relay unreachable; submissions will fail until it is back".to_string()
                    };
                }
                UiEvent::SubmissionFinished(outcome) => {
                    self.feedback.set_outcome(&outcome, now);
                }
            }
        }
    }

    fn submit_current_form(&mut self) {
        dispatch_backend_command(
            &self.cmd_tx,
            BackendCommand::SubmitNote {
                word: self.word_input.clone(),
                dropdown_value: self.dropdown.hidden_value().to_string(),
            },
            &mut self.status,
        );
    }

    /// Word input; returns true when Enter submitted the form from here.
    fn word_field(&mut self, ui: &mut egui::Ui) -> bool {
        let response = ui.add(
            egui::TextEdit::singleline(&mut self.word_input)
                .hint_text("Word to add")
                .desired_width(f32::INFINITY),
        );
        let submitted = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
        if Language::detect(&self.word_input) == Language::Japanese {
            ui.weak("Japanese script detected");
        }
        submitted
    }

    /// Custom dropdown driven by `DropdownState`; egui's ComboBox closes on
    /// its own rules, this one keeps the toggle/select/outside-click/Escape
    /// behavior of the form widget.
    fn dropdown_ui(&mut self, ui: &mut egui::Ui) {
        let header = ui.add_sized(
            [ui.available_width(), 28.0],
            egui::Button::new(self.dropdown.selected_label()),
        );
        // Mouse clicks and Enter/Space on the focused header both land here.
        if header.clicked() {
            self.dropdown.toggle();
        }
        if self.dropdown.is_open() && ui.input(|i| i.key_pressed(egui::Key::Escape)) {
            self.dropdown.handle_key(DropdownKey::Escape);
        }

        if !self.dropdown.is_open() {
            return;
        }

        let mut clicked_index = None;
        let popup = ui.group(|ui| {
            for (index, option) in self.dropdown.options().iter().enumerate() {
                let selected = option.value == self.dropdown.selected_value();
                if ui.selectable_label(selected, &option.label).clicked() {
                    clicked_index = Some(index);
                }
            }
        });

        if let Some(index) = clicked_index {
            self.dropdown.select(index);
        } else if header.clicked_elsewhere() && popup.response.clicked_elsewhere() {
            self.dropdown.handle_click_outside();
        }
    }

    fn feedback_banner(&self, ui: &mut egui::Ui) {
        match self.feedback.state() {
            FeedbackState::Idle => {}
            FeedbackState::Success(text) => {
                ui.colored_label(SUCCESS_COLOR, text);
            }
            FeedbackState::Error(text) => {
                ui.colored_label(ERROR_COLOR, text);
            }
        }
    }

    fn status_footer(&self, ui: &mut egui::Ui) {
        ui.separator();
        ui.horizontal_wrapped(|ui| {
            let (badge, color) = match self.server_status {
                ServerStatus::Unknown => ("checking", egui::Color32::GRAY),
                ServerStatus::Reachable => ("online", egui::Color32::GREEN),
                ServerStatus::Unreachable => ("offline", egui::Color32::RED),
            };
            ui.colored_label(color, badge);
            ui.small(&self.server_url);
        });
        ui.small(&self.status);
    }
}

impl eframe::App for WordDeckApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if !self.probe_requested {
            self.probe_requested = true;
            dispatch_backend_command(
                &self.cmd_tx,
                BackendCommand::ProbeServer,
                &mut self.status,
            );
        }

        self.process_ui_events();
        let now = Instant::now();
        self.feedback.tick(now);

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("worddeck");
            ui.add_space(8.0);

            let submitted_from_field = self.word_field(ui);
            ui.add_space(6.0);
            self.dropdown_ui(ui);
            ui.add_space(8.0);

            let add_clicked = ui
                .add_sized([ui.available_width(), 32.0], egui::Button::new("Add"))
                .clicked();
            if submitted_from_field || add_clicked {
                self.submit_current_form();
            }

            ui.add_space(8.0);
            self.feedback_banner(ui);
            self.status_footer(ui);
        });

        // Keep repainting while a banner is armed so the clear lands on time.
        match self.feedback.time_until_clear(now) {
            Some(remaining) => ctx.request_repaint_after(remaining.min(IDLE_REPAINT_INTERVAL)),
            None => ctx.request_repaint_after(IDLE_REPAINT_INTERVAL),
        }
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        let settings = PersistedSettings {
            last_language_value: Some(self.dropdown.hidden_value().to_string())
                .filter(|value| !value.is_empty()),
        };
        if let Ok(serialized) = serde_json::to_string(&settings) {
            storage.set_string(SETTINGS_STORAGE_KEY, serialized);
        }
    }
}
