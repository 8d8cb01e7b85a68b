use eframe::egui;

use crate::engine::protocol::EngineCommand;
use crate::model::phase::GamePhase;
use crate::model::snapshot::SessionSnapshot;
use super::app::{error_label, AdventureApp};

const DEFAULT_ENDING: &str = "The story ends here.";

pub fn draw_center_panel(ctx: &egui::Context, app: &mut AdventureApp) {
    let input_id = egui::Id::new("action_input_box");
    let phase = app.ui.snapshot.phase;

    // ---------- Choices + input ----------
    if phase == GamePhase::Playing {
        egui::TopBottomPanel::bottom("action_bar").show(ctx, |ui| {
            ui.add_space(6.0);

            let mut chosen: Option<usize> = None;
            for (i, choice) in app.ui.snapshot.choices.iter().enumerate() {
                if ui.button(format!("{}. {choice}", i + 1)).clicked() {
                    chosen = Some(i);
                }
            }

            ui.add_space(6.0);
            let mut send_now = false;

            ui.horizontal(|ui| {
                let response = ui.add_sized(
                    [ui.available_width() - 60.0, 24.0],
                    egui::TextEdit::singleline(&mut app.ui.action_input)
                        .id(input_id)
                        .hint_text("Type a custom action..."),
                );

                if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                    send_now = true;
                }

                if ui.button("Send").clicked() {
                    send_now = true;
                }
            });

            if let Some(index) = chosen {
                app.send_command(EngineCommand::SubmitChoice(index));
            } else if send_now {
                let text = app.ui.action_input.trim().to_string();

                if !text.is_empty() {
                    app.send_command(EngineCommand::SubmitAction(text));
                    app.ui.action_input.clear();
                }

                ui.memory_mut(|m| m.request_focus(input_id));
            }

            if let Some(notice) = &app.ui.notice {
                error_label(ui, notice);
            }
            ui.add_space(6.0);
        });
    }

    if phase == GamePhase::Finished {
        egui::TopBottomPanel::bottom("ending_bar").show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(6.0);
                if ui.button("Return to menu").clicked() {
                    app.send_command(EngineCommand::Reset);
                }
                ui.add_space(6.0);
            });
        });
    }

    // ---------- Story feed ----------
    egui::CentralPanel::default().show(ctx, |ui| {
        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .stick_to_bottom(app.ui.should_auto_scroll)
            .show(ui, |ui| {
                for msg in &app.ui.snapshot.messages {
                    app.draw_message(ui, msg);
                }

                match phase {
                    GamePhase::AwaitingResponse => {
                        ui.add_space(8.0);
                        ui.horizontal(|ui| {
                            ui.spinner();
                            ui.label(egui::RichText::new("The narrator is thinking...").italics());
                        });
                    }
                    GamePhase::Finished => draw_ending(ui, &app.ui.snapshot),
                    _ => {}
                }
            });
    });
}

fn draw_ending(ui: &mut egui::Ui, snapshot: &SessionSnapshot) {
    let died = snapshot.player.as_ref().is_some_and(|p| p.health <= 0);
    let (title, color) = if died {
        ("DEATH", egui::Color32::from_rgb(239, 68, 68))
    } else {
        ("ADVENTURE COMPLETE", egui::Color32::from_rgb(234, 179, 8))
    };

    ui.add_space(16.0);
    ui.vertical_centered(|ui| {
        ui.label(egui::RichText::new(title).size(28.0).strong().color(color));
        ui.label(
            snapshot
                .game_over_reason
                .as_deref()
                .unwrap_or(DEFAULT_ENDING),
        );
        if let Some(player) = &snapshot.player {
            ui.label(format!("Final level: {}", player.level));
        }
    });
}
