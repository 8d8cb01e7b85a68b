use crate::model::game_state::{PlayerState, MAX_HEALTH};
use crate::model::narrative::{InventoryUpdate, NarrativeResponse};

/// Result of resolving one narrative response against the player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnOutcome {
    pub player: PlayerState,
    pub game_over: bool,
    pub leveled_up: bool,
}

/// Applies a narrative response to a player. Pure: no I/O, never fails.
///
/// Steps run in a fixed order because later ones read earlier results:
/// health, xp, a single level-up check, inventory, then the game-over test.
/// Stored health is clamped to `0..=MAX_HEALTH`, while the death test looks
/// at the unclamped sum so an overkill hit is still observed.
pub fn resolve_turn(state: &PlayerState, response: &NarrativeResponse) -> TurnOutcome {
    let raw_health = state.health.saturating_add(response.health_change);

    let mut xp = state.xp.saturating_add(response.xp_reward);
    let mut level = state.level;
    let threshold = state.xp_threshold();

    // Checked once per turn: a huge reward can leave xp above the next threshold.
    let leveled_up = xp >= threshold;
    if leveled_up {
        xp -= threshold;
        level += 1;
    }

    let mut inventory = state.inventory.clone();
    reconcile_inventory(&mut inventory, &response.inventory_update);

    let game_over = response.is_game_over || raw_health <= 0;

    TurnOutcome {
        player: PlayerState {
            name: state.name.clone(),
            health: raw_health.clamp(0, MAX_HEALTH),
            level,
            xp,
            inventory,
            theme: state.theme,
        },
        game_over,
        leveled_up,
    }
}

/// Appends every added item, then removes the first match of each removed one.
/// Removing an item that is not carried does nothing.
pub fn reconcile_inventory(inventory: &mut Vec<String>, update: &InventoryUpdate) {
    inventory.extend(update.add.iter().cloned());

    for item in &update.remove {
        if let Some(index) = inventory.iter().position(|held| held == item) {
            inventory.remove(index);
        }
    }
}
