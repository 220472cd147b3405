//! Sort suggestions for a topic
//!
//! Keyword heuristics: the first rule whose keyword occurs in the topic
//! supplies all three suggestions, otherwise the defaults apply.

use crate::models::{ExpectedType, SortSuggestion};

type Suggestions = [SortSuggestion; 3];

const fn suggestion(
    label: &'static str,
    key: &'static str,
    expected_type: ExpectedType,
    rationale: &'static str,
) -> SortSuggestion {
    SortSuggestion {
        label,
        key,
        expected_type,
        rationale,
    }
}

const DEFAULT_SUGGESTIONS: Suggestions = [
    suggestion("alphabetical", "name", ExpectedType::Text, "Always available."),
    suggestion("year", "year", ExpectedType::Date, "Common across many topics."),
    suggestion("popularity", "popularity", ExpectedType::Number, "Fun proxy metric."),
];

/// Topic keywords → suggestions, checked in order
const TOPIC_RULES: &[(&[&str], Suggestions)] = &[
    (
        &["mountain"],
        [
            suggestion("height", "elevation_m", ExpectedType::Number, "Widely documented in infoboxes."),
            suggestion("prominence", "prominence_m", ExpectedType::Number, "Common secondary metric."),
            suggestion("climbing difficulty", "difficulty", ExpectedType::Text, "Playful estimate."),
        ],
    ),
    (
        &["actor", "cast"],
        [
            suggestion("birth year", "birth_year", ExpectedType::Date, "Biographical infobox."),
            suggestion("awards", "awards_count", ExpectedType::Number, "Often listed on Wikipedia."),
            suggestion("screen time", "screen_time", ExpectedType::Number, "Playful/estimated."),
        ],
    ),
    (
        &["lake"],
        [
            suggestion("area", "area_km2", ExpectedType::Number, "List tables / infobox."),
            suggestion("max depth", "max_depth_m", ExpectedType::Number, "Often available."),
            suggestion("clarity", "clarity", ExpectedType::Text, "Playful."),
        ],
    ),
];

/// Exactly three suggestions for `topic`
pub fn suggest_sort(topic: &str) -> Vec<SortSuggestion> {
    let topic = topic.to_lowercase();
    let chosen = TOPIC_RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| topic.contains(k)))
        .map(|(_, suggestions)| suggestions)
        .unwrap_or(&DEFAULT_SUGGESTIONS);

    chosen.to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_always_three() {
        for topic in ["", "mountains", "Cast of Alien", "lakes", "sandwiches"] {
            assert_eq!(suggest_sort(topic).len(), 3);
        }
    }

    #[test]
    fn test_topic_overrides() {
        assert_eq!(suggest_sort("Tallest Mountains")[0].key, "elevation_m");
        assert_eq!(suggest_sort("famous actors")[0].key, "birth_year");
        assert_eq!(suggest_sort("LAKES of Finland")[1].key, "max_depth_m");
    }

    #[test]
    fn test_defaults() {
        let suggestions = suggest_sort("sandwiches");
        assert_eq!(suggestions[0].label, "alphabetical");
        assert_eq!(suggestions[2].expected_type, ExpectedType::Number);
    }

    #[test]
    fn test_serialized_shape() {
        let value = serde_json::to_value(&suggest_sort("lake")[0]).unwrap();
        assert_eq!(value["expectedType"], "number");
        assert_eq!(value["key"], "area_km2");
        assert!(value["rationale"].is_string());
    }
}
