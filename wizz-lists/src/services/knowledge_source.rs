//! Structured knowledge source resolver
//!
//! Maps subject → entity class and sort key → property through
//! priority-ordered rule tables, runs one structured query for the top
//! candidates by that property, and formats the values.
//!
//! Adding a class or property is a table edit; the resolver logic does not
//! change.

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::UpstreamError;
use crate::models::{ListItem, SortKey, Tier};

/// Provenance name for this resolver
pub const STRUCTURED_SOURCE: &str = "structured";

/// Default public SPARQL endpoint
pub const WIKIDATA_SPARQL_URL: &str = "https://query.wikidata.org/sparql";

const USER_AGENT: &str = "WizzLists/0.1.0 (https://github.com/wizzlists/wizzlists)";

/// Hard cap on candidates requested in one query
const MAX_CANDIDATES: usize = 50;

/// Confidence for values read from the structured source
const OBSERVED_CONFIDENCE: f64 = 0.95;

// ============================================================================
// Rule tables
// ============================================================================

/// Value semantics of a property, used for query shape and formatting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    Elevation,
    Height,
    Length,
    Depth,
    Area,
    Volume,
    Population,
}

impl PropertyKind {
    /// Quantities with units are queried normalized to SI units
    pub fn has_unit(self) -> bool {
        !matches!(self, PropertyKind::Population)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Property {
    pub id: &'static str,
    pub kind: PropertyKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityClass {
    pub id: &'static str,
    pub name: &'static str,
    /// Ranking property when the sort key names none (basic keys)
    pub default_property: Property,
}

/// Resolved (class, property) pair for one request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubjectPropertyMapping {
    pub class: EntityClass,
    pub property: Property,
}

impl SubjectPropertyMapping {
    pub fn class_id(&self) -> &'static str {
        self.class.id
    }

    pub fn property_id(&self) -> &'static str {
        self.property.id
    }
}

pub const ELEVATION: Property = Property { id: "P2044", kind: PropertyKind::Elevation };
pub const HEIGHT: Property = Property { id: "P2048", kind: PropertyKind::Height };
pub const LENGTH: Property = Property { id: "P2043", kind: PropertyKind::Length };
pub const DEPTH: Property = Property { id: "P4511", kind: PropertyKind::Depth };
pub const AREA: Property = Property { id: "P2046", kind: PropertyKind::Area };
pub const VOLUME: Property = Property { id: "P2234", kind: PropertyKind::Volume };
pub const POPULATION: Property = Property { id: "P1082", kind: PropertyKind::Population };

pub const MOUNTAIN: EntityClass = EntityClass { id: "Q8502", name: "mountain", default_property: ELEVATION };
pub const VOLCANO: EntityClass = EntityClass { id: "Q8072", name: "volcano", default_property: ELEVATION };
pub const LAKE: EntityClass = EntityClass { id: "Q23397", name: "lake", default_property: AREA };
pub const RIVER: EntityClass = EntityClass { id: "Q4022", name: "river", default_property: LENGTH };
pub const ISLAND: EntityClass = EntityClass { id: "Q23442", name: "island", default_property: AREA };
pub const SKYSCRAPER: EntityClass = EntityClass { id: "Q11303", name: "skyscraper", default_property: HEIGHT };
pub const COUNTRY: EntityClass = EntityClass { id: "Q6256", name: "country", default_property: POPULATION };
pub const CITY: EntityClass = EntityClass { id: "Q515", name: "city", default_property: POPULATION };

/// Subject keywords → class; first rule whose keyword occurs in the subject wins
const CLASS_RULES: &[(&[&str], EntityClass)] = &[
    (&["volcano"], VOLCANO),
    (&["mountain", "peak", "summit"], MOUNTAIN),
    (&["lake"], LAKE),
    (&["river"], RIVER),
    (&["island"], ISLAND),
    (&["skyscraper", "building", "tower"], SKYSCRAPER),
    (&["country", "countries", "nation"], COUNTRY),
    (&["city", "cities"], CITY),
];

/// Class-specific sort key overrides, checked before [`PROPERTY_RULES`]
const CLASS_OVERRIDES: &[(&str, &[&str], Property)] = &[
    ("Q8502", &["height", "tall", "tallest", "high", "highest", "elevation", "altitude"], ELEVATION),
    ("Q8072", &["height", "tall", "tallest", "high", "highest", "elevation", "altitude"], ELEVATION),
    ("Q23397", &["volume", "capacity"], VOLUME),
    ("Q23397", &["depth", "deep", "deepest"], DEPTH),
    ("Q515", &["elevation", "altitude"], ELEVATION),
];

/// Sort key keywords → property for any class
const PROPERTY_RULES: &[(&[&str], Property)] = &[
    (&["elevation", "altitude"], ELEVATION),
    (&["height", "tall", "tallest", "high", "highest"], HEIGHT),
    (&["population", "populous", "inhabitants", "people"], POPULATION),
    (&["area", "size", "largest", "biggest"], AREA),
    (&["length", "long", "longest"], LENGTH),
    (&["depth", "deep", "deepest"], DEPTH),
];

/// Whole-word keyword match over lowercased text
///
/// Words split on anything but letters, digits and apostrophes, so
/// "elevation_m" yields "elevation" while "people's" stays one word. A word
/// matches a keyword exactly or as its plural ("lakes", "volcanoes",
/// "cities").
fn mentions(haystack: &str, keywords: &[&str]) -> bool {
    haystack
        .split(|c: char| !(c.is_alphanumeric() || c == '\'' || c == '\u{2019}'))
        .filter(|word| !word.is_empty())
        .any(|word| keywords.iter().any(|keyword| is_word_form(word, keyword)))
}

fn is_word_form(word: &str, keyword: &str) -> bool {
    word == keyword
        || word.strip_suffix('s') == Some(keyword)
        || word.strip_suffix("es") == Some(keyword)
        || matches!(
            (word.strip_suffix("ies"), keyword.strip_suffix('y')),
            (Some(stem), Some(root)) if stem == root
        )
}

/// Entity class for a subject, if any rule matches
pub fn resolve_class(subject: &str) -> Option<EntityClass> {
    let subject = subject.to_lowercase();
    CLASS_RULES
        .iter()
        .find(|(keywords, _)| mentions(&subject, keywords))
        .map(|(_, class)| *class)
}

/// Property for a sort key within a class
///
/// Basic keys rank by the class default property.
pub fn resolve_property(class: &EntityClass, sort_key: &SortKey) -> Option<Property> {
    let key = match sort_key {
        SortKey::Custom(key) => key.as_str(),
        _ => return Some(class.default_property),
    };

    CLASS_OVERRIDES
        .iter()
        .find(|(class_id, keywords, _)| *class_id == class.id && mentions(key, keywords))
        .map(|(_, _, property)| *property)
        .or_else(|| {
            PROPERTY_RULES
                .iter()
                .find(|(keywords, _)| mentions(key, keywords))
                .map(|(_, property)| *property)
        })
}

/// Full (class, property) mapping, or `None` when either side is unknown
pub fn resolve_mapping(subject: &str, sort_key: &SortKey) -> Option<SubjectPropertyMapping> {
    let class = resolve_class(subject)?;
    let property = resolve_property(&class, sort_key)?;
    Some(SubjectPropertyMapping { class, property })
}

/// Candidates requested for `n` items: `min(max(2n, n+3), 50)`
pub fn candidate_limit(n: usize) -> usize {
    (2 * n).max(n + 3).min(MAX_CANDIDATES)
}

// ============================================================================
// Value formatting
// ============================================================================

/// Short human string for a raw value, `None` if it is not numeric
pub fn format_value(kind: PropertyKind, raw: &str) -> Option<String> {
    let value = raw.trim().trim_start_matches('+').parse::<f64>().ok()?;
    if !value.is_finite() {
        return None;
    }
    let rounded = value.round() as i64;

    let formatted = match kind {
        PropertyKind::Elevation
        | PropertyKind::Height
        | PropertyKind::Length
        | PropertyKind::Depth => format!("{} m", rounded),
        PropertyKind::Area => format!("{} m²", rounded),
        PropertyKind::Volume => format!("{} m³", rounded),
        PropertyKind::Population => group_thousands(rounded),
    };
    Some(formatted)
}

/// 1234567 → "1,234,567"
pub fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if value < 0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

// ============================================================================
// Structured source seam
// ============================================================================

/// One structured query
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredQuery {
    pub class_id: String,
    pub property_id: String,
    /// Request SI-normalized quantity amounts
    pub normalized_units: bool,
    pub limit: usize,
}

/// One raw row returned by the structured source, best value first
#[derive(Debug, Clone, PartialEq)]
pub struct EntityRow {
    pub entity_id: String,
    pub label: String,
    pub value: Option<String>,
    pub url: Option<String>,
}

/// Structured knowledge source queried by class and property
#[async_trait]
pub trait StructuredSource: Send + Sync {
    /// Rows ordered descending by the property value
    async fn query(&self, query: &StructuredQuery) -> Result<Vec<EntityRow>, UpstreamError>;
}

// ============================================================================
// Wikidata client
// ============================================================================

#[derive(Debug, Deserialize)]
struct SparqlResponse {
    results: SparqlResults,
}

#[derive(Debug, Deserialize)]
struct SparqlResults {
    bindings: Vec<SparqlBinding>,
}

#[derive(Debug, Deserialize)]
struct SparqlBinding {
    item: SparqlTerm,
    #[serde(rename = "itemLabel")]
    item_label: Option<SparqlTerm>,
    value: Option<SparqlTerm>,
    article: Option<SparqlTerm>,
}

#[derive(Debug, Deserialize)]
struct SparqlTerm {
    value: String,
}

/// Wikidata SPARQL client
pub struct WikidataClient {
    http_client: reqwest::Client,
    endpoint: String,
}

impl WikidataClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, UpstreamError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| UpstreamError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            endpoint: endpoint.into(),
        })
    }

    /// SPARQL text for one query
    pub fn build_sparql(query: &StructuredQuery) -> String {
        let value_pattern = if query.normalized_units {
            format!(
                "?item p:{p}/psn:{p}/wikibase:quantityAmount ?value .",
                p = query.property_id
            )
        } else {
            format!("?item wdt:{} ?value .", query.property_id)
        };

        format!(
            "SELECT ?item ?itemLabel ?value ?article WHERE {{\n\
             \x20 ?item wdt:P31 wd:{class} .\n\
             \x20 {value_pattern}\n\
             \x20 OPTIONAL {{ ?article schema:about ?item ; schema:isPartOf <https://en.wikipedia.org/> . }}\n\
             \x20 SERVICE wikibase:label {{ bd:serviceParam wikibase:language \"en\". }}\n\
             }}\n\
             ORDER BY DESC(?value)\n\
             LIMIT {limit}",
            class = query.class_id,
            value_pattern = value_pattern,
            limit = query.limit,
        )
    }
}

#[async_trait]
impl StructuredSource for WikidataClient {
    async fn query(&self, query: &StructuredQuery) -> Result<Vec<EntityRow>, UpstreamError> {
        let sparql = Self::build_sparql(query);

        debug!(
            class = %query.class_id,
            property = %query.property_id,
            limit = query.limit,
            "Querying structured source"
        );

        let response = self
            .http_client
            .get(&self.endpoint)
            .query(&[("query", sparql.as_str()), ("format", "json")])
            .header(reqwest::header::ACCEPT, "application/sparql-results+json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Status(status.as_u16(), error_text));
        }

        let body: SparqlResponse = response
            .json()
            .await
            .map_err(|e| UpstreamError::Parse(e.to_string()))?;

        Ok(body
            .results
            .bindings
            .into_iter()
            .map(|binding| EntityRow {
                entity_id: binding
                    .item
                    .value
                    .rsplit('/')
                    .next()
                    .unwrap_or_default()
                    .to_string(),
                label: binding.item_label.map(|t| t.value).unwrap_or_default(),
                value: binding.value.map(|t| t.value),
                url: binding.article.map(|t| t.value),
            })
            .collect())
    }
}

// ============================================================================
// Resolver
// ============================================================================

/// Successful structured resolution
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredResolution {
    pub items: Vec<ListItem>,
    /// Names of items whose value could not be formatted
    pub needs_secondary: Vec<String>,
    pub source: &'static str,
    pub mapping: SubjectPropertyMapping,
}

/// Why the structured stage deferred to the next resolver
#[derive(Debug)]
pub enum Insufficient {
    /// No class or no property for this request; a normal outcome
    NoMapping,
    /// The query ran but produced no usable entities
    Empty,
    /// The query failed
    Failed(UpstreamError),
}

impl Insufficient {
    /// Diagnostic note for the response, if this outcome deserves one
    pub fn note(&self) -> Option<String> {
        match self {
            Insufficient::NoMapping => None,
            Insufficient::Empty => Some("Structured source returned no usable entities.".to_string()),
            Insufficient::Failed(err) => Some(format!("Structured source unavailable: {}", err)),
        }
    }
}

pub struct KnowledgeSourceResolver {
    source: Arc<dyn StructuredSource>,
}

impl KnowledgeSourceResolver {
    pub fn new(source: Arc<dyn StructuredSource>) -> Self {
        Self { source }
    }

    /// Resolve up to `n` items, or report why the next resolver should run
    pub async fn resolve(
        &self,
        subject: &str,
        sort_key: &SortKey,
        n: usize,
    ) -> Result<StructuredResolution, Insufficient> {
        let mapping = resolve_mapping(subject, sort_key).ok_or(Insufficient::NoMapping)?;

        info!(
            subject = %subject,
            class = mapping.class.name,
            class_id = mapping.class_id(),
            property_id = mapping.property_id(),
            "Structured mapping resolved"
        );

        let query = StructuredQuery {
            class_id: mapping.class_id().to_string(),
            property_id: mapping.property_id().to_string(),
            normalized_units: mapping.property.kind.has_unit(),
            limit: candidate_limit(n),
        };

        let rows = self.source.query(&query).await.map_err(|e| {
            warn!(error = %e, "Structured source query failed");
            Insufficient::Failed(e)
        })?;

        let resolution = shape_rows(rows, mapping, sort_key, n);
        if resolution.items.is_empty() {
            return Err(Insufficient::Empty);
        }

        info!(
            items = resolution.items.len(),
            needs_secondary = resolution.needs_secondary.len(),
            "Structured source resolved list"
        );

        Ok(resolution)
    }
}

/// Deduplicate, filter unlabeled entities, truncate and format
fn shape_rows(
    rows: Vec<EntityRow>,
    mapping: SubjectPropertyMapping,
    sort_key: &SortKey,
    n: usize,
) -> StructuredResolution {
    let mut seen = HashSet::new();
    let mut items = Vec::with_capacity(n);
    let mut needs_secondary = Vec::new();

    for row in rows {
        if items.len() == n {
            break;
        }
        let label = row.label.trim();
        if label.is_empty() || is_bare_entity_id(label) || !seen.insert(row.entity_id.clone()) {
            continue;
        }

        let mut item = ListItem::named(label).with_url(row.url);
        match row
            .value
            .as_deref()
            .and_then(|raw| format_value(mapping.property.kind, raw))
        {
            Some(formatted) => item.set_attribute(formatted, Tier::Observed, OBSERVED_CONFIDENCE),
            None if !sort_key.is_basic() => needs_secondary.push(item.name.clone()),
            None => {}
        }
        items.push(item);
    }

    StructuredResolution {
        items,
        needs_secondary,
        source: STRUCTURED_SOURCE,
        mapping,
    }
}

/// Labels the label service falls back to when an entity has none ("Q42")
fn is_bare_entity_id(label: &str) -> bool {
    let mut chars = label.chars();
    chars.next() == Some('Q') && {
        let rest = chars.as_str();
        !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct FakeSource {
        rows: Vec<EntityRow>,
        seen: Mutex<Vec<StructuredQuery>>,
    }

    #[async_trait]
    impl StructuredSource for FakeSource {
        async fn query(&self, query: &StructuredQuery) -> Result<Vec<EntityRow>, UpstreamError> {
            self.seen.lock().unwrap().push(query.clone());
            Ok(self.rows.clone())
        }
    }

    struct DownSource;

    #[async_trait]
    impl StructuredSource for DownSource {
        async fn query(&self, _query: &StructuredQuery) -> Result<Vec<EntityRow>, UpstreamError> {
            Err(UpstreamError::Status(503, "busy".to_string()))
        }
    }

    fn row(id: &str, label: &str, value: Option<&str>) -> EntityRow {
        EntityRow {
            entity_id: id.to_string(),
            label: label.to_string(),
            value: value.map(str::to_string),
            url: Some(format!("https://en.wikipedia.org/wiki/{}", label)),
        }
    }

    #[test]
    fn test_mountain_height_maps_to_elevation() {
        let mapping = resolve_mapping("mountains", &SortKey::Custom("height".into())).unwrap();
        assert_eq!(mapping.class_id(), "Q8502");
        assert_eq!(mapping.property_id(), "P2044");
    }

    #[test]
    fn test_lake_volume_override() {
        let mapping = resolve_mapping("Lakes of Europe", &SortKey::Custom("volume".into())).unwrap();
        assert_eq!(mapping.class, LAKE);
        assert_eq!(mapping.property, VOLUME);

        // Volume is not a general property
        assert!(resolve_mapping("rivers", &SortKey::Custom("volume".into())).is_none());
    }

    #[test]
    fn test_basic_key_uses_class_default() {
        let mapping = resolve_mapping("lakes", &SortKey::Alphabetical).unwrap();
        assert_eq!(mapping.property, AREA);
    }

    #[test]
    fn test_unknown_subject_or_key_is_unmapped() {
        assert!(resolve_mapping("dogs", &SortKey::Alphabetical).is_none());
        assert!(resolve_mapping("mountains", &SortKey::Custom("prominence_m".into())).is_none());
    }

    #[test]
    fn test_subject_keywords_match_whole_words_only() {
        for subject in [
            "F1 drivers",
            "bluetooth speakers",
            "electricity providers",
            "corn flakes",
            "donation sites",
            "skyscraping birds",
        ] {
            assert_eq!(resolve_class(subject), None, "subject {:?}", subject);
            assert!(resolve_mapping(subject, &SortKey::Alphabetical).is_none());
        }
    }

    #[test]
    fn test_subject_plurals_resolve() {
        assert_eq!(resolve_class("Tallest Mountains"), Some(MOUNTAIN));
        assert_eq!(resolve_class("active volcanoes"), Some(VOLCANO));
        assert_eq!(resolve_class("largest lakes"), Some(LAKE));
        assert_eq!(resolve_class("US cities"), Some(CITY));
        assert_eq!(resolve_class("Nations of Africa"), Some(COUNTRY));
        assert_eq!(resolve_class("lake-district walks"), Some(LAKE));
    }

    #[test]
    fn test_property_keywords_match_whole_words_only() {
        assert_eq!(resolve_property(&RIVER, &SortKey::Custom("longitude".into())), None);
        assert_eq!(resolve_property(&CITY, &SortKey::Custom("people's choice".into())), None);
        assert_eq!(resolve_property(&RIVER, &SortKey::Custom("longest".into())), Some(LENGTH));
        assert_eq!(resolve_property(&MOUNTAIN, &SortKey::Custom("highest".into())), Some(ELEVATION));
        assert_eq!(resolve_property(&LAKE, &SortKey::Custom("max_depth_m".into())), Some(DEPTH));
        assert_eq!(resolve_property(&MOUNTAIN, &SortKey::Custom("elevation_m".into())), Some(ELEVATION));
    }

    #[test]
    fn test_candidate_limit() {
        assert_eq!(candidate_limit(1), 4);
        assert_eq!(candidate_limit(3), 6);
        assert_eq!(candidate_limit(5), 10);
        assert_eq!(candidate_limit(25), 50);
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(PropertyKind::Elevation, "8848.86"), Some("8849 m".into()));
        assert_eq!(format_value(PropertyKind::Elevation, "+8848"), Some("8848 m".into()));
        assert_eq!(format_value(PropertyKind::Population, "1234567"), Some("1,234,567".into()));
        assert_eq!(format_value(PropertyKind::Area, "82100000000"), Some("82100000000 m²".into()));
        assert_eq!(format_value(PropertyKind::Volume, "1.2E4"), Some("12000 m³".into()));
        assert_eq!(format_value(PropertyKind::Height, "tall"), None);
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(-1234567), "-1,234,567");
    }

    #[test]
    fn test_bare_entity_id() {
        assert!(is_bare_entity_id("Q42"));
        assert!(!is_bare_entity_id("Q"));
        assert!(!is_bare_entity_id("Qinghai Lake"));
    }

    #[test]
    fn test_sparql_uses_normalized_amounts_for_units() {
        let query = StructuredQuery {
            class_id: "Q8502".into(),
            property_id: "P2044".into(),
            normalized_units: true,
            limit: 10,
        };
        let sparql = WikidataClient::build_sparql(&query);
        assert!(sparql.contains("wd:Q8502"));
        assert!(sparql.contains("psn:P2044"));
        assert!(sparql.contains("ORDER BY DESC(?value)"));
        assert!(sparql.ends_with("LIMIT 10"));
    }

    #[tokio::test]
    async fn test_resolve_filters_dedupes_and_truncates() {
        let source = Arc::new(FakeSource {
            rows: vec![
                row("Q513", "Mount Everest", Some("8848")),
                row("Q513", "Mount Everest", Some("8840")),
                row("Q99", "", Some("8700")),
                row("Q98", "Q98", Some("8650")),
                row("Q43512", "K2", Some("8611")),
                row("Q1", "Kangchenjunga", Some("8586")),
            ],
            seen: Mutex::new(vec![]),
        });
        let resolver = KnowledgeSourceResolver::new(source.clone());

        let result = resolver
            .resolve("mountains", &SortKey::Custom("height".into()), 2)
            .await
            .unwrap();

        let names: Vec<_> = result.items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Mount Everest", "K2"]);
        assert_eq!(result.items[0].attr.as_deref(), Some("8848 m"));
        assert_eq!(result.items[0].tier, Some(Tier::Observed));
        assert_eq!(result.source, "structured");
        assert!(result.needs_secondary.is_empty());

        let queries = source.seen.lock().unwrap();
        assert_eq!(queries.len(), 1);
        assert_eq!(queries[0].limit, 5);
        assert_eq!(queries[0].property_id, "P2044");
    }

    #[tokio::test]
    async fn test_unformattable_values_need_secondary() {
        let source = Arc::new(FakeSource {
            rows: vec![row("Q1", "Lake A", Some("big")), row("Q2", "Lake B", None)],
            seen: Mutex::new(vec![]),
        });
        let resolver = KnowledgeSourceResolver::new(source);

        let result = resolver
            .resolve("lakes", &SortKey::Custom("area".into()), 5)
            .await
            .unwrap();

        assert_eq!(result.needs_secondary, vec!["Lake A", "Lake B"]);
        assert!(result.items.iter().all(|i| !i.has_attribute()));
    }

    #[tokio::test]
    async fn test_no_mapping_is_insufficient_without_query() {
        let source = Arc::new(FakeSource {
            rows: vec![],
            seen: Mutex::new(vec![]),
        });
        let resolver = KnowledgeSourceResolver::new(source.clone());

        let outcome = resolver.resolve("dogs", &SortKey::Alphabetical, 3).await;

        assert!(matches!(outcome, Err(Insufficient::NoMapping)));
        assert!(source.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_query_is_insufficient_with_note() {
        let resolver = KnowledgeSourceResolver::new(Arc::new(DownSource));

        let outcome = resolver
            .resolve("cities", &SortKey::Custom("population".into()), 3)
            .await;

        match outcome {
            Err(insufficient @ Insufficient::Failed(_)) => {
                assert!(insufficient.note().unwrap().contains("503"));
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }
}
