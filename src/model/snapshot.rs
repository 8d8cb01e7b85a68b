use serde::{Deserialize, Serialize};

use crate::model::game_state::PlayerState;
use crate::model::message::Message;
use crate::model::phase::GamePhase;

/// A full, read-only view of the session handed to the presentation layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// `None` until a character has been submitted.
    pub player: Option<PlayerState>,
    pub phase: GamePhase,
    pub messages: Vec<Message>,
    /// Empty unless the phase is `Playing`.
    pub choices: Vec<String>,
    pub game_over_reason: Option<String>,
    pub last_error: Option<String>,
}
