use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

pub const MAX_HEALTH: i32 = 100;
pub const STARTING_LEVEL: u32 = 1;
pub const XP_PER_LEVEL: u32 = 100;

/// Items every new character carries.
pub const SEED_INVENTORY: [&str; 2] = ["Rations", "Water Bottle"];

/// Narrative setting chosen once at character creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    Cyberpunk,
    Fantasy,
    SpaceHorror,
    Apocalypse,
}

impl Theme {
    pub const ALL: [Theme; 4] = [
        Theme::Cyberpunk,
        Theme::Fantasy,
        Theme::SpaceHorror,
        Theme::Apocalypse,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Theme::Cyberpunk => "Cyberpunk Neon-Noir",
            Theme::Fantasy => "High Fantasy Medieval",
            Theme::SpaceHorror => "Gothic Space Horror",
            Theme::Apocalypse => "Post-Apocalyptic Wasteland",
        }
    }

    /// Short label used in the system instruction's tone list.
    pub fn short_name(self) -> &'static str {
        match self {
            Theme::Cyberpunk => "Cyberpunk",
            Theme::Fantasy => "Fantasy",
            Theme::SpaceHorror => "Space Horror",
            Theme::Apocalypse => "Apocalypse",
        }
    }

    pub fn tone(self) -> &'static str {
        match self {
            Theme::Cyberpunk => "Gritty, neon, tech-heavy.",
            Theme::Fantasy => "Epic, magical, archaic.",
            Theme::SpaceHorror => "Claustrophobic, mysterious, terrifying.",
            Theme::Apocalypse => "Desolate, harsh, survival-focused.",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// The player's character for one session.
/// Only the turn resolver mutates it once play has started.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerState {
    pub name: String,
    pub health: i32,
    pub level: u32,
    pub xp: u32,
    /// Ordered, duplicates allowed.
    pub inventory: Vec<String>,
    pub theme: Theme,
}

impl PlayerState {
    pub fn new(name: &str, theme: Theme) -> Result<Self, ValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyName);
        }

        Ok(Self {
            name: name.to_string(),
            health: MAX_HEALTH,
            level: STARTING_LEVEL,
            xp: 0,
            inventory: SEED_INVENTORY.iter().map(|item| item.to_string()).collect(),
            theme,
        })
    }

    /// XP needed to leave the current level.
    pub fn xp_threshold(&self) -> u32 {
        self.level.saturating_mul(XP_PER_LEVEL)
    }

    pub fn inventory_line(&self) -> String {
        self.inventory.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_player_starts_with_seed_inventory() {
        let player = PlayerState::new("Ada", Theme::Fantasy).unwrap();

        assert_eq!(player.name, "Ada");
        assert_eq!(player.health, 100);
        assert_eq!(player.level, 1);
        assert_eq!(player.xp, 0);
        assert_eq!(player.inventory, vec!["Rations", "Water Bottle"]);
        assert_eq!(player.theme, Theme::Fantasy);
    }

    #[test]
    fn name_is_trimmed() {
        let player = PlayerState::new("  Vex \n", Theme::Cyberpunk).unwrap();
        assert_eq!(player.name, "Vex");
    }

    #[test]
    fn blank_name_is_rejected() {
        assert_eq!(
            PlayerState::new("   ", Theme::Cyberpunk),
            Err(ValidationError::EmptyName)
        );
        assert_eq!(
            PlayerState::new("", Theme::Apocalypse),
            Err(ValidationError::EmptyName)
        );
    }

    #[test]
    fn threshold_scales_with_level() {
        let mut player = PlayerState::new("Ada", Theme::Fantasy).unwrap();
        assert_eq!(player.xp_threshold(), 100);
        player.level = 3;
        assert_eq!(player.xp_threshold(), 300);
    }

    #[test]
    fn theme_titles_match_settings() {
        assert_eq!(Theme::SpaceHorror.to_string(), "Gothic Space Horror");
        assert_eq!(Theme::default(), Theme::Cyberpunk);
        assert_eq!(Theme::ALL.len(), 4);
    }
}
