use std::fmt;

use serde::{Deserialize, Serialize};

/// Coarse game state of a session.
///
/// `NotStarted -> AwaitingCharacterSetup -> Playing <-> AwaitingResponse -> Finished`.
/// `Finished` only leaves through a reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    #[default]
    NotStarted,
    AwaitingCharacterSetup,
    Playing,
    AwaitingResponse,
    Finished,
}

impl GamePhase {
    /// Whether a character can be submitted from this phase.
    pub fn accepts_setup(self) -> bool {
        matches!(self, GamePhase::NotStarted | GamePhase::AwaitingCharacterSetup)
    }

    /// A narrative request is in flight; input is locked.
    pub fn is_busy(self) -> bool {
        self == GamePhase::AwaitingResponse
    }
}

impl fmt::Display for GamePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            GamePhase::NotStarted => "not started",
            GamePhase::AwaitingCharacterSetup => "character setup",
            GamePhase::Playing => "playing",
            GamePhase::AwaitingResponse => "awaiting response",
            GamePhase::Finished => "finished",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::GamePhase;

    #[test]
    fn only_awaiting_response_is_busy() {
        assert!(GamePhase::AwaitingResponse.is_busy());
        for phase in [
            GamePhase::NotStarted,
            GamePhase::AwaitingCharacterSetup,
            GamePhase::Playing,
            GamePhase::Finished,
        ] {
            assert!(!phase.is_busy(), "{phase} should accept input");
        }
    }
}
