use eframe::egui;

use crate::model::game_state::{PlayerState, MAX_HEALTH};
use crate::model::snapshot::SessionSnapshot;

const LOW_HEALTH: i32 = 30;

pub fn draw_left_panel(ctx: &egui::Context, snapshot: &SessionSnapshot) {
    egui::SidePanel::left("stats")
        .resizable(false)
        .default_width(240.0)
        .show(ctx, |ui| {
            let Some(player) = &snapshot.player else {
                return;
            };

            draw_header(ui, player);
            ui.separator();
            draw_bars(ui, player);
            ui.separator();
            draw_inventory(ui, &player.inventory);
        });
}

/* =========================
   Character
   ========================= */

fn draw_header(ui: &mut egui::Ui, player: &PlayerState) {
    ui.add_space(8.0);
    ui.heading(&player.name);
    ui.label(
        egui::RichText::new(format!("LEVEL {} HERO", player.level))
            .small()
            .strong()
            .color(egui::Color32::from_rgb(129, 140, 248)),
    );
    ui.add_space(8.0);
}

fn draw_bars(ui: &mut egui::Ui, player: &PlayerState) {
    let health_color = if player.health < LOW_HEALTH {
        egui::Color32::from_rgb(239, 68, 68)
    } else {
        egui::Color32::from_rgb(34, 197, 94)
    };

    ui.label("HP");
    ui.add(
        egui::ProgressBar::new(fraction(player.health.max(0) as u32, MAX_HEALTH as u32))
            .fill(health_color)
            .text(format!("{}/{}", player.health, MAX_HEALTH)),
    );

    ui.add_space(6.0);
    ui.label("XP");
    ui.add(
        egui::ProgressBar::new(fraction(player.xp, player.xp_threshold()))
            .fill(egui::Color32::from_rgb(59, 130, 246))
            .text(format!("{}/{}", player.xp, player.xp_threshold())),
    );
}

/* =========================
   Inventory
   ========================= */

fn draw_inventory(ui: &mut egui::Ui, items: &[String]) {
    ui.label(egui::RichText::new("INVENTORY").small().strong());
    ui.add_space(4.0);

    egui::ScrollArea::vertical().show(ui, |ui| {
        if items.is_empty() {
            ui.label(egui::RichText::new("Inventory is empty...").italics());
        } else {
            for item in items {
                ui.label(format!("• {item}"));
            }
        }
    });
}

/// Bar fill in `0.0..=1.0`; xp can sit above the threshold after a big reward.
fn fraction(value: u32, max: u32) -> f32 {
    if max == 0 {
        return 0.0;
    }
    (value as f32 / max as f32).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::fraction;

    #[test]
    fn fraction_is_clamped() {
        assert_eq!(fraction(50, 100), 0.5);
        assert_eq!(fraction(350, 200), 1.0);
        assert_eq!(fraction(5, 0), 0.0);
    }
}
