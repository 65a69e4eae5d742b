//! Prompt and response schema sent to generative oracles.

use alchemy_rules::Element;
use serde_json::{json, Value};

/// Rules the model is asked to follow, in order.
pub const FUSION_RULES: [&str; 6] = [
    "Result must be a noun or specific concept.",
    "Result must have a relevant single emoji.",
    "Be creative but logical (e.g., Fire + Water = Steam).",
    "If the combination is extremely abstract, default to something funny or philosophical.",
    "'name' should be in the same language as the input (if mixed, default to Chinese).",
    "Keep the name short (max 2-3 words).",
];

/// Build the fusion prompt for two elements.
pub fn fusion_prompt(first: &Element, second: &Element) -> String {
    let mut prompt = String::new();

    prompt.push_str("User is playing an \"Infinite Craft\" style game.\n");
    prompt.push_str("Combine these two elements into a new, logical, and creative result:\n");
    prompt.push_str(&format!("Element 1: {} {}\n", first.emoji, first.name));
    prompt.push_str(&format!("Element 2: {} {}\n", second.emoji, second.name));

    prompt.push_str("\nRules:\n");
    for (i, rule) in FUSION_RULES.iter().enumerate() {
        prompt.push_str(&format!("{}. {}\n", i + 1, rule));
    }

    prompt
}

/// JSON schema the answer must conform to.
pub fn fusion_response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "name": {
                "type": "STRING",
                "description": "The name of the new element (e.g., 'Steam')"
            },
            "emoji": {
                "type": "STRING",
                "description": "A single emoji representing the new element"
            },
            "description": {
                "type": "STRING",
                "description": "A very short witty explanation of why this formed."
            }
        },
        "required": ["name", "emoji"]
    })
}
