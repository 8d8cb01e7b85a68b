use eframe::egui;
use egui::Layout;
use std::sync::mpsc::{Receiver, Sender};
use std::sync::Arc;

use crate::engine::engine::Engine;
use crate::engine::narrative_service::NarrativeService;
use crate::engine::protocol::{EngineCommand, EngineResponse};
use crate::engine::session::SessionController;
use crate::model::game_state::Theme;
use crate::model::message::{Message, Role};
use crate::model::phase::GamePhase;
use crate::model::snapshot::SessionSnapshot;
use crate::ui::center_panel::draw_center_panel;
use crate::ui::left_panel::draw_left_panel;
use crate::ui::settings::UiSettings;
use crate::ui::settings_io::{load_settings, save_settings};
use crate::ui::setup_panel::{draw_setup_screen, draw_title_screen};

/* =========================
   UI State
   ========================= */

pub struct UiState {
    /// Latest state published by the engine. Never edited here.
    pub snapshot: SessionSnapshot,

    pub name_input: String,
    pub theme_input: Theme,
    pub action_input: String,

    /// Last command the engine refused.
    pub notice: Option<String>,

    pub should_auto_scroll: bool,
    pub show_settings: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            snapshot: SessionSnapshot::default(),
            name_input: String::new(),
            theme_input: Theme::default(),
            action_input: String::new(),
            notice: None,
            should_auto_scroll: true,
            show_settings: false,
        }
    }
}

/* =========================
   App
   ========================= */

pub struct AdventureApp {
    pub ui: UiState,
    pub settings: UiSettings,

    cmd_tx: Sender<EngineCommand>,
    resp_rx: Receiver<EngineResponse>,
}

impl AdventureApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        narrator: Arc<dyn NarrativeService>,
        history_limit: usize,
    ) -> Self {
        let ctx = cc.egui_ctx.clone();
        let (cmd_tx, resp_rx) = Engine::spawn(
            SessionController::new(history_limit),
            narrator,
            Some(Box::new(move || ctx.request_repaint())),
        );

        Self {
            ui: UiState::default(),
            settings: load_settings(),
            cmd_tx,
            resp_rx,
        }
    }

    pub fn send_command(&mut self, cmd: EngineCommand) {
        self.ui.notice = None;
        if self.cmd_tx.send(cmd).is_err() {
            self.ui.notice = Some("The story engine stopped.".into());
        }
    }

    pub fn draw_message(&self, ui: &mut egui::Ui, msg: &Message) {
        let bg = self.settings.color(msg.role);
        let text = match msg.role {
            Role::Player => format!("You: {}", msg.text),
            Role::Narrator => msg.text.clone(),
            Role::System => format!("⚠ {}", msg.text),
        };

        ui.add_space(6.0);

        if msg.role == Role::Player {
            ui.with_layout(Layout::right_to_left(egui::Align::TOP), |ui| {
                bubble(ui, bg, &text);
            });
        } else {
            bubble(ui, bg, &text);
        }
    }

    fn poll_engine(&mut self) {
        while let Ok(resp) = self.resp_rx.try_recv() {
            match resp {
                EngineResponse::Snapshot(snapshot) => {
                    if snapshot.messages.len() != self.ui.snapshot.messages.len() {
                        self.ui.should_auto_scroll = true;
                    }
                    self.ui.snapshot = snapshot;
                }
                EngineResponse::Rejected(reason) => {
                    self.ui.notice = Some(reason);
                }
            }
        }
    }

    fn draw_top_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("Adventure Forge");

                if let Some(player) = &self.ui.snapshot.player {
                    ui.label(
                        egui::RichText::new(format!("// {}", player.theme))
                            .monospace()
                            .color(egui::Color32::from_rgb(34, 197, 94)),
                    );
                }

                ui.with_layout(Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("Settings").clicked() {
                        self.ui.show_settings = !self.ui.show_settings;
                    }
                    if self.ui.snapshot.phase != GamePhase::NotStarted
                        && ui.button("Restart").clicked()
                    {
                        self.send_command(EngineCommand::Reset);
                    }
                });
            });
        });
    }

    fn draw_settings_window(&mut self, ctx: &egui::Context) {
        let mut open = self.ui.show_settings;
        let mut changed = false;

        egui::Window::new("Settings").open(&mut open).show(ctx, |ui| {
            ui.label("UI Scale");
            changed |= ui
                .add(egui::Slider::new(&mut self.settings.ui_scale, 0.75..=2.0))
                .changed();

            ui.separator();
            for role in [Role::Player, Role::Narrator, Role::System] {
                ui.horizontal(|ui| {
                    let mut color = self.settings.color(role);
                    if ui.color_edit_button_srgba(&mut color).changed() {
                        self.settings.set_color(role, color);
                        changed = true;
                    }
                    ui.label(role.key());
                });
            }

            ui.separator();
            if ui.button("Reset to defaults").clicked() {
                self.settings = UiSettings::default();
                changed = true;
            }
        });

        if changed {
            save_settings(&self.settings);
        }
        self.ui.show_settings = open;
    }
}

impl Drop for AdventureApp {
    fn drop(&mut self) {
        let _ = self.cmd_tx.send(EngineCommand::Shutdown);
    }
}

/* =========================
   egui App
   ========================= */

impl eframe::App for AdventureApp {
    fn update(&mut self, ctx: &egui::Context, _: &mut eframe::Frame) {
        ctx.set_pixels_per_point(self.settings.ui_scale);

        self.poll_engine();
        self.draw_top_bar(ctx);

        if self.ui.show_settings {
            self.draw_settings_window(ctx);
        }

        let phase = self.ui.snapshot.phase;
        let in_story = !self.ui.snapshot.messages.is_empty();

        match phase {
            GamePhase::NotStarted => draw_title_screen(ctx, self),
            GamePhase::AwaitingCharacterSetup => draw_setup_screen(ctx, self),
            GamePhase::AwaitingResponse if !in_story => draw_setup_screen(ctx, self),
            GamePhase::Playing | GamePhase::AwaitingResponse | GamePhase::Finished => {
                draw_left_panel(ctx, &self.ui.snapshot);
                draw_center_panel(ctx, self);
            }
        }

        self.ui.should_auto_scroll = false;
    }
}

/* =========================
   UI Helpers
   ========================= */

pub fn bubble(ui: &mut egui::Ui, color: egui::Color32, text: &str) {
    egui::Frame::new()
        .fill(color)
        .corner_radius(egui::CornerRadius::same(8))
        .inner_margin(egui::Margin::symmetric(10, 6))
        .show(ui, |ui| {
            ui.label(egui::RichText::new(text).color(egui::Color32::WHITE));
        });
}

pub fn error_label(ui: &mut egui::Ui, text: &str) {
    ui.label(egui::RichText::new(text).color(egui::Color32::from_rgb(248, 113, 113)));
}
