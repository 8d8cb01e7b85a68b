use crate::model::game_state::{PlayerState, Theme};
use crate::model::narrative::{NarrativeIntent, NarrativeRequest};

/// A prompt split the way chat-style backends want it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

/// Builds the text sent to the narrator.
/// This struct only formats text. No parsing, no networking, no engine logic.
pub struct PromptBuilder;

impl PromptBuilder {
    pub fn build(request: &NarrativeRequest) -> Prompt {
        match &request.intent {
            NarrativeIntent::Start => Prompt {
                system: Self::game_master_instruction(),
                user: Self::opening_prompt(&request.player),
            },
            NarrativeIntent::Action(action) => Prompt {
                system: Self::continuation_instruction(),
                user: Self::action_prompt(&request.player, action, &request.history),
            },
        }
    }

    fn game_master_instruction() -> String {
        let mut prompt = String::new();

        prompt.push_str("You are an expert Game Master. Create immersive, atmospheric text adventures.\n");
        prompt.push_str("Tailor the tone to the chosen theme:\n");
        for theme in Theme::ALL {
            push_theme_tone(&mut prompt, theme);
        }
        prompt.push_str("Always maintain player stats and inventory logic.\n");
        push_format_reminder(&mut prompt);

        prompt
    }

    fn continuation_instruction() -> String {
        let mut prompt = String::new();

        prompt.push_str("Continue the adventure. Be creative and react logically to the player's choices.\n");
        prompt.push_str("If health drops to 0 or below, set isGameOver to true.\n");
        prompt.push_str("If they do something clever, reward XP or items.\n");
        push_format_reminder(&mut prompt);

        prompt
    }

    fn opening_prompt(player: &PlayerState) -> String {
        let mut prompt = String::new();

        prompt.push_str(&format!(
            "Start a new game for a player named {} in the theme of {}.\n",
            player.name, player.theme
        ));
        prompt.push_str("Describe the initial scene vividly and provide the first set of choices.\n");
        prompt.push_str(&format!(
            "The player starts with: Health {}, Inventory: {}.\n",
            player.health,
            player.inventory_line()
        ));

        prompt
    }

    fn action_prompt(player: &PlayerState, action: &str, history: &[String]) -> String {
        let mut prompt = String::new();

        prompt.push_str(&format!("The player decided to: \"{action}\".\n"));
        push_player_state(&mut prompt, player);
        push_history(&mut prompt, history);
        prompt.push_str("Generate the next narrative beat and consequences.\n");

        prompt
    }
}

fn push_theme_tone(prompt: &mut String, theme: Theme) {
    prompt.push_str(&format!("- {}: {}\n", theme.short_name(), theme.tone()));
}

fn push_player_state(prompt: &mut String, player: &PlayerState) {
    prompt.push_str("Current Player State:\n");
    prompt.push_str(&format!("- Health: {}\n", player.health));
    prompt.push_str(&format!("- Level: {}\n", player.level));
    prompt.push_str(&format!("- XP: {}\n", player.xp));
    prompt.push_str(&format!("- Inventory: {}\n", player.inventory_line()));
    prompt.push_str(&format!("- Theme: {}\n\n", player.theme));
}

fn push_history(prompt: &mut String, history: &[String]) {
    prompt.push_str("Recent history context: ");
    prompt.push_str(&history.join(" -> "));
    prompt.push_str("\n\n");
}

fn push_format_reminder(prompt: &mut String) {
    prompt.push_str(
        "Respond with a single JSON object with the fields narrative, choices (3 to 4 short options), \
         healthChange, xpReward, inventoryUpdate {add, remove}, isGameOver and optionally gameOverReason.\n",
    );
}
