use serde::{Deserialize, Serialize};

use crate::model::game_state::PlayerState;

/// Output returned by the narrator for one turn.
/// This does NOT mutate state directly; the turn resolver does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NarrativeResponse {
    pub narrative: String,
    pub choices: Vec<String>,
    #[serde(with = "crate::model::whole_number::signed")]
    pub health_change: i32,
    #[serde(with = "crate::model::whole_number::unsigned")]
    pub xp_reward: u32,
    pub inventory_update: InventoryUpdate,
    pub is_game_over: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_over_reason: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryUpdate {
    #[serde(default)]
    pub add: Vec<String>,
    #[serde(default)]
    pub remove: Vec<String>,
}

/// What the player asked the narrator to do this turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NarrativeIntent {
    Start,
    Action(String),
}

/// Everything a narrative backend needs to produce the next beat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NarrativeRequest {
    pub intent: NarrativeIntent,
    pub player: PlayerState,
    /// Recent actions, oldest first, not including the current one.
    pub history: Vec<String>,
}

impl NarrativeRequest {
    pub fn start(player: PlayerState) -> Self {
        Self {
            intent: NarrativeIntent::Start,
            player,
            history: Vec::new(),
        }
    }

    pub fn action(player: PlayerState, action: String, history: Vec<String>) -> Self {
        Self {
            intent: NarrativeIntent::Action(action),
            player,
            history,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_camel_case_payload() {
        let json = r#"{
            "narrative": "Rain hammers the alley.",
            "choices": ["Run", "Hide", "Fight"],
            "healthChange": -10,
            "xpReward": 15,
            "inventoryUpdate": { "add": ["Keycard"], "remove": [] },
            "isGameOver": false
        }"#;

        let response: NarrativeResponse = serde_json::from_str(json).unwrap();

        assert_eq!(response.health_change, -10);
        assert_eq!(response.xp_reward, 15);
        assert_eq!(response.inventory_update.add, vec!["Keycard"]);
        assert_eq!(response.game_over_reason, None);
    }

    #[test]
    fn integral_floats_are_accepted() {
        let json = r#"{
            "narrative": "n",
            "choices": ["a", "b", "c"],
            "healthChange": 5.0,
            "xpReward": 20.0,
            "inventoryUpdate": { "add": [] },
            "isGameOver": false
        }"#;

        let response: NarrativeResponse = serde_json::from_str(json).unwrap();

        assert_eq!(response.health_change, 5);
        assert_eq!(response.xp_reward, 20);
        assert!(response.inventory_update.remove.is_empty());
    }

    #[test]
    fn negative_xp_is_rejected() {
        let json = r#"{
            "narrative": "n",
            "choices": ["a", "b", "c"],
            "healthChange": 0,
            "xpReward": -3,
            "inventoryUpdate": { "add": [], "remove": [] },
            "isGameOver": false
        }"#;

        assert!(serde_json::from_str::<NarrativeResponse>(json).is_err());
    }

    #[test]
    fn missing_required_field_is_rejected() {
        let json = r#"{ "narrative": "n", "choices": [] }"#;
        assert!(serde_json::from_str::<NarrativeResponse>(json).is_err());
    }
}
