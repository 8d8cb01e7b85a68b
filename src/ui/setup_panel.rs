use eframe::egui;

use crate::engine::protocol::EngineCommand;
use crate::model::game_state::Theme;
use super::app::{error_label, AdventureApp};

pub fn draw_title_screen(ctx: &egui::Context, app: &mut AdventureApp) {
    egui::CentralPanel::default().show(ctx, |ui| {
        ui.vertical_centered(|ui| {
            ui.add_space(80.0);
            ui.label(egui::RichText::new("ADVENTURE FORGE").size(36.0).strong());
            ui.label("A procedurally generated odyssey, narrated by a language model.");
            ui.add_space(24.0);

            if let Some(err) = &app.ui.snapshot.last_error {
                error_label(ui, err);
                ui.add_space(12.0);
            }

            if ui.button("Create a character").clicked() {
                app.send_command(EngineCommand::OpenSetup);
            }
        });
    });
}

pub fn draw_setup_screen(ctx: &egui::Context, app: &mut AdventureApp) {
    let busy = app.ui.snapshot.phase.is_busy();

    egui::CentralPanel::default().show(ctx, |ui| {
        ui.vertical_centered(|ui| {
            ui.add_space(60.0);
            ui.heading("New Adventure");
            ui.add_space(16.0);

            ui.label("Hero Name");
            let name_box = ui.add_enabled(
                !busy,
                egui::TextEdit::singleline(&mut app.ui.name_input)
                    .hint_text("Enter your name...")
                    .desired_width(260.0),
            );

            ui.add_space(8.0);
            ui.label("Choose Universe");
            ui.add_enabled_ui(!busy, |ui| {
                egui::ComboBox::from_id_salt("theme_select")
                    .selected_text(app.ui.theme_input.title())
                    .width(260.0)
                    .show_ui(ui, |ui| {
                        for theme in Theme::ALL {
                            ui.selectable_value(&mut app.ui.theme_input, theme, theme.title());
                        }
                    });
            });

            ui.add_space(16.0);

            let can_start = !busy && !app.ui.name_input.trim().is_empty();
            let submitted = name_box.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
            let clicked = ui
                .add_enabled(can_start, egui::Button::new("Initialize Adventure"))
                .clicked();

            if can_start && (clicked || submitted) {
                let name = app.ui.name_input.trim().to_string();
                let theme = app.ui.theme_input;
                app.send_command(EngineCommand::StartSession { name, theme });
            }

            if busy {
                ui.add_space(12.0);
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label("Building your world...");
                });
            }

            if let Some(notice) = &app.ui.notice {
                error_label(ui, notice);
            }
        });
    });
}
