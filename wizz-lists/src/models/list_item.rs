//! List item and provenance tier

use serde::{Deserialize, Serialize};

/// Provenance quality of an attribute value
///
/// Ordered best to worst: observed > derived > imputed > fabricated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Read directly from a factual source
    Observed,
    /// Computed from observed values
    Derived,
    /// Estimated to fill a gap
    Imputed,
    /// Invented placeholder
    Fabricated,
}

impl Tier {
    /// Confidence used when a resolver supplies a tier but no confidence
    pub fn default_confidence(self) -> f64 {
        match self {
            Tier::Observed => 0.95,
            Tier::Derived => 0.75,
            Tier::Imputed => 0.5,
            Tier::Fabricated => 0.2,
        }
    }

    /// Parse a tier label leniently (case-insensitive, trimmed)
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "observed" => Some(Tier::Observed),
            "derived" => Some(Tier::Derived),
            "imputed" => Some(Tier::Imputed),
            "fabricated" => Some(Tier::Fabricated),
            _ => None,
        }
    }
}

/// One named entity in a ranked list
///
/// `attr`, `tier` and `confidence` are present together or absent together.
/// Absent fields are omitted from JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListItem {
    pub name: String,
    /// Human-readable formatted attribute value (e.g., "8848 m")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attr: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier: Option<Tier>,
    /// Confidence in the attribute value (0.0-1.0)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    /// External reference link
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl ListItem {
    /// Item carrying only a name
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attr: None,
            tier: None,
            confidence: None,
            url: None,
        }
    }

    /// Builder form of [`ListItem::set_attribute`]
    pub fn with_attribute(mut self, attr: impl Into<String>, tier: Tier, confidence: f64) -> Self {
        self.set_attribute(attr, tier, confidence);
        self
    }

    pub fn with_url(mut self, url: Option<String>) -> Self {
        self.url = url;
        self
    }

    /// Set the full attribute triple; confidence is clamped to 0.0-1.0
    pub fn set_attribute(&mut self, attr: impl Into<String>, tier: Tier, confidence: f64) {
        self.attr = Some(attr.into());
        self.tier = Some(tier);
        self.confidence = Some(clamp_confidence(confidence));
    }

    pub fn has_attribute(&self) -> bool {
        self.attr.is_some()
    }

    /// Remove the attribute triple, returning whether anything was removed
    pub fn clear_attribute(&mut self) -> bool {
        let had_any = self.attr.is_some() || self.tier.is_some() || self.confidence.is_some();
        self.attr = None;
        self.tier = None;
        self.confidence = None;
        had_any
    }

    /// Repair a partial attribute triple
    ///
    /// Without `attr` the triple is cleared. With `attr`, a missing tier
    /// becomes `fabricated` and a missing confidence takes the tier default.
    pub fn complete_attribute(&mut self) {
        match self.attr {
            None => {
                self.clear_attribute();
            }
            Some(_) => {
                let tier = self.tier.unwrap_or(Tier::Fabricated);
                self.tier = Some(tier);
                self.confidence = Some(clamp_confidence(
                    self.confidence.unwrap_or_else(|| tier.default_confidence()),
                ));
            }
        }
    }
}

fn clamp_confidence(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_named_item_serializes_name_only() {
        let value = serde_json::to_value(ListItem::named("dogs 1")).unwrap();
        assert_eq!(value, json!({"name": "dogs 1"}));
    }

    #[test]
    fn test_attribute_triple_serializes_lowercase_tier() {
        let item = ListItem::named("Everest").with_attribute("8849 m", Tier::Observed, 0.95);
        let value = serde_json::to_value(item).unwrap();
        assert_eq!(value["tier"], "observed");
        assert_eq!(value["attr"], "8849 m");
    }

    #[test]
    fn test_confidence_is_clamped() {
        let item = ListItem::named("x").with_attribute("1", Tier::Derived, 7.0);
        assert_eq!(item.confidence, Some(1.0));
        let item = ListItem::named("x").with_attribute("1", Tier::Derived, -1.0);
        assert_eq!(item.confidence, Some(0.0));
    }

    #[test]
    fn test_complete_attribute_fills_missing_parts() {
        let mut item = ListItem::named("x");
        item.attr = Some("12 cm".to_string());
        item.complete_attribute();
        assert_eq!(item.tier, Some(Tier::Fabricated));
        assert_eq!(item.confidence, Some(0.2));

        let mut orphan = ListItem::named("y");
        orphan.tier = Some(Tier::Observed);
        orphan.complete_attribute();
        assert!(orphan.tier.is_none());
        assert!(orphan.confidence.is_none());
    }

    #[test]
    fn test_clear_attribute_reports_removal() {
        let mut item = ListItem::named("x").with_attribute("1", Tier::Imputed, 0.5);
        assert!(item.clear_attribute());
        assert!(!item.clear_attribute());
    }

    #[test]
    fn test_tier_parse_is_lenient() {
        assert_eq!(Tier::parse(" Observed "), Some(Tier::Observed));
        assert_eq!(Tier::parse("FABRICATED"), Some(Tier::Fabricated));
        assert_eq!(Tier::parse("guessed"), None);
    }
}
