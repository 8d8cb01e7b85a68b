use serde_json::error::Category;

use crate::error::RequestError;
use crate::model::narrative::NarrativeResponse;

pub const MIN_CHOICES: usize = 3;
pub const MAX_CHOICES: usize = 4;

/// Decode raw LLM text into a typed, schema-checked NarrativeResponse.
pub fn decode_narrative(raw: &str) -> Result<NarrativeResponse, RequestError> {
    let body = strip_code_fence(raw);
    if body.is_empty() {
        return Err(RequestError::EmptyCompletion);
    }

    let response: NarrativeResponse = serde_json::from_str(body).map_err(|e| match e.classify() {
        Category::Data => RequestError::Schema(e.to_string()),
        _ => RequestError::Parse(e.to_string()),
    })?;

    if !(MIN_CHOICES..=MAX_CHOICES).contains(&response.choices.len()) {
        return Err(RequestError::Schema(format!(
            "expected {MIN_CHOICES} to {MAX_CHOICES} choices, got {}",
            response.choices.len()
        )));
    }

    Ok(response)
}

/// Some models wrap JSON in a Markdown fence even when asked not to.
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    // Drop an optional language tag on the opening line.
    let rest = match rest.split_once('\n') {
        Some((_, body)) => body,
        None => rest,
    };

    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"{
        "narrative": "The reactor hums.",
        "choices": ["Open the hatch", "Wait", "Call for help"],
        "healthChange": 0,
        "xpReward": 5,
        "inventoryUpdate": { "add": [], "remove": [] },
        "isGameOver": false
    }"#;

    #[test]
    fn decodes_plain_json() {
        let response = decode_narrative(VALID).unwrap();
        assert_eq!(response.narrative, "The reactor hums.");
        assert_eq!(response.choices.len(), 3);
    }

    #[test]
    fn decodes_fenced_json() {
        let fenced = format!("```json\n{VALID}\n```");
        let response = decode_narrative(&fenced).unwrap();
        assert_eq!(response.xp_reward, 5);
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = decode_narrative("{ not json").unwrap_err();
        assert!(matches!(err, RequestError::Parse(_)), "{err:?}");
    }

    #[test]
    fn wrong_shape_is_a_schema_error() {
        let err = decode_narrative(r#"{"narrative": 12}"#).unwrap_err();
        assert!(matches!(err, RequestError::Schema(_)), "{err:?}");
    }

    #[test]
    fn choice_count_is_enforced() {
        let two = VALID.replace(r#", "Call for help""#, "");
        let err = decode_narrative(&two).unwrap_err();
        assert!(matches!(err, RequestError::Schema(_)), "{err:?}");

        let five = VALID.replace(
            r#""Call for help""#,
            r#""Call for help", "Pray", "Sleep""#,
        );
        assert!(decode_narrative(&five).is_err());
    }

    #[test]
    fn blank_completion_is_rejected() {
        assert!(matches!(
            decode_narrative("  \n"),
            Err(RequestError::EmptyCompletion)
        ));
    }
}
