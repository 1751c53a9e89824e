//! Prompt generation for relation inference
//!
//! Builds prompts asking the AI whether two detected entities stand in one
//! of the knowledge graph's valid relations.

use serde_json::Value;

/// Generate the system prompt for relation inference
pub fn system_prompt() -> String {
    r#"You are a forest pathology and entomology expert. Your task is to decide whether two entities observed together in a forest image stand in a known ecological relation.

## Rules

1. You will be given two entity names and a list of allowed relation labels.
2. Answer with EXACTLY ONE relation label from the list, reading as "<first entity> <relation> <second entity>".
3. If no listed relation plausibly holds in that direction, answer exactly: none
4. Return ONLY the relation label (or none). No explanations, no punctuation, no markdown."#
        .to_string()
}

/// Generate the user prompt for a single entity pair
pub fn user_prompt(head: &str, tail: &str, valid_relations: &[String]) -> String {
    let relation_list = valid_relations
        .iter()
        .map(|r| format!("- {}", r))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"## Entity pair

First entity: {head}
Second entity: {tail}

## Allowed relations

{relation_list}

## Task

Which single relation (if any) holds as "{head} <relation> {tail}"?
Answer with one relation label from the list, or none."#
    )
}

/// Build the messages array for the API call
pub fn build_messages(head: &str, tail: &str, valid_relations: &[String]) -> Vec<Value> {
    vec![serde_json::json!({
        "role": "user",
        "content": user_prompt(head, tail, valid_relations)
    })]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> Vec<String> {
        vec![
            "transmits".to_string(),
            "susceptible to".to_string(),
            "hosted by".to_string(),
        ]
    }

    #[test]
    fn test_system_prompt_demands_bare_answer() {
        let prompt = system_prompt();
        assert!(prompt.contains("EXACTLY ONE"));
        assert!(prompt.contains("none"));
    }

    #[test]
    fn test_user_prompt_includes_pair_and_relations() {
        let prompt = user_prompt("pine sawyer beetle", "masson pine", &valid());
        assert!(prompt.contains("pine sawyer beetle"));
        assert!(prompt.contains("masson pine"));
        assert!(prompt.contains("- hosted by"));
        assert!(prompt.contains("- susceptible to"));
    }

    #[test]
    fn test_build_messages_shape() {
        let messages = build_messages("a", "b", &valid());
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0]["role"], "user");
        assert!(messages[0]["content"].as_str().unwrap().contains("transmits"));
    }
}
