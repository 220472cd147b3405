//! Sort phase: progressively rank caller-supplied items
//!
//! Every tick emits a full `rank` order and a `confidence` value. For an
//! attribute criterion each tick also resolves one more item's value and
//! emits it as `attr`. The stream ends with `done {}`.
//!
//! Values come from the item's own `attr` when it holds a number
//! (provenance `provided`); otherwise a seeded mock value is used
//! (provenance `mock`). The generator is seeded from the criterion and the
//! ids, so identical requests produce identical streams.

use serde::Serialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, info};
use wizz_common::sse::EventSink;

use super::ticker;
use crate::models::SortKey;
use crate::services::sort_engine::{extract_number, order_by, SeededRng};

/// Fixed pacing of the sort phase
pub const SORT_TICK: Duration = Duration::from_millis(350);

/// Fewest ticks a sort stream runs for
pub const MIN_TICKS: usize = 4;

/// Largest mock attribute value
const MOCK_VALUE_MAX: u32 = 1000;

const CONFIDENCE_CAP: u32 = 100;

/// One caller item that carries an id
#[derive(Debug, Clone, PartialEq)]
pub struct SortCandidate {
    pub id: String,
    pub name: Option<String>,
    pub attr: Option<String>,
}

impl SortCandidate {
    /// Read a caller item; `None` when it has no usable id
    ///
    /// Ids may be strings or numbers; numbers are rendered as strings.
    pub fn from_value(value: &Value) -> Option<Self> {
        let id = match value.get("id")? {
            Value::String(s) if !s.is_empty() => s.clone(),
            Value::Number(n) => n.to_string(),
            _ => return None,
        };
        let name = value.get("name").and_then(Value::as_str).map(str::to_string);
        let attr = match value.get("attr") {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        };
        Some(Self { id, name, attr })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SortParams {
    pub candidates: Vec<SortCandidate>,
    pub sort_key: SortKey,
}

impl SortParams {
    pub fn ids(&self) -> Vec<&str> {
        self.candidates.iter().map(|c| c.id.as_str()).collect()
    }

    pub fn tick_count(&self) -> usize {
        if self.sort_key.is_basic() {
            MIN_TICKS
        } else {
            self.candidates.len().max(MIN_TICKS)
        }
    }

    /// Seed string for the phase's generator and for random ordering
    pub fn seed(&self) -> String {
        format!("{}|{}", self.sort_key, self.ids().join(","))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
enum Provenance {
    Provided,
    Mock,
}

#[derive(Debug, Serialize)]
struct AttrEvent<'a> {
    id: &'a str,
    key: String,
    value: Value,
    provenance: Provenance,
}

/// Ranking slot: candidate index plus its resolved value, if any
struct Slot<'a> {
    candidate: &'a SortCandidate,
    value: Option<f64>,
}

impl Slot<'_> {
    fn label(&self) -> &str {
        self.candidate.name.as_deref().unwrap_or(&self.candidate.id)
    }
}

/// JSON number, integral when the value has no fractional part
fn number_value(value: f64) -> Value {
    if value.fract() == 0.0 && value.abs() < 9.0e15 {
        json!(value as i64)
    } else {
        json!(value)
    }
}

/// Body of a sort-phase connection task
pub async fn run_sort_phase(params: SortParams, mut sink: EventSink) {
    let seed = params.seed();
    let mut rng = SeededRng::from_seed_str(&seed);
    let ticks = params.tick_count();
    let criterion = params.sort_key.to_string();

    let mut slots: Vec<Slot<'_>> = params
        .candidates
        .iter()
        .map(|candidate| Slot {
            candidate,
            value: None,
        })
        .collect();

    info!(
        criterion = %criterion,
        items = slots.len(),
        ticks,
        "Streaming sort"
    );

    let mut confidence = 40 + rng.next_in_range(10);
    let mut ticker = ticker(SORT_TICK);

    for tick in 0..ticks {
        ticker.tick().await;

        if !params.sort_key.is_basic() {
            if let Some(slot) = slots.get_mut(tick) {
                let (value, provenance) = match slot.candidate.attr.as_deref().and_then(extract_number) {
                    Some(value) => (value, Provenance::Provided),
                    None => (f64::from(rng.next_in_range(MOCK_VALUE_MAX)), Provenance::Mock),
                };
                slot.value = Some(value);

                let event = AttrEvent {
                    id: &slot.candidate.id,
                    key: criterion.clone(),
                    value: number_value(value),
                    provenance,
                };
                if !sink.send("attr", &event).await {
                    return;
                }
            }
        }

        let mut ranked: Vec<&Slot<'_>> = slots.iter().collect();
        order_by(&mut ranked, &params.sort_key, &seed, |slot| slot.label(), |slot| slot.value);
        let order: Vec<&str> = ranked.iter().map(|slot| slot.candidate.id.as_str()).collect();
        if !sink.send("rank", &json!({ "order": order })).await {
            return;
        }

        confidence = if tick + 1 == ticks {
            CONFIDENCE_CAP
        } else {
            (confidence + 10 + rng.next_in_range(5)).min(CONFIDENCE_CAP)
        };
        debug!(tick, confidence, "Sort tick");
        if !sink.send("confidence", &json!({ "value": confidence })).await {
            return;
        }
    }

    sink.send("done", &json!({})).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use wizz_common::sse::{spawn_connection, StreamEvent};

    fn candidate(id: &str, name: Option<&str>, attr: Option<&str>) -> SortCandidate {
        SortCandidate {
            id: id.to_string(),
            name: name.map(str::to_string),
            attr: attr.map(str::to_string),
        }
    }

    async fn collect(params: SortParams) -> Vec<StreamEvent> {
        let stream = spawn_connection("test".to_string(), move |sink| run_sort_phase(params, sink));
        stream.collect().await
    }

    fn of_name<'a>(events: &'a [StreamEvent], name: &str) -> Vec<&'a StreamEvent> {
        events.iter().filter(|e| e.name == name).collect()
    }

    #[test]
    fn test_candidate_from_value() {
        let c = SortCandidate::from_value(&json!({"id": 7, "name": "K2", "attr": "8611 m"})).unwrap();
        assert_eq!(c.id, "7");
        assert_eq!(c.name.as_deref(), Some("K2"));
        assert_eq!(c.attr.as_deref(), Some("8611 m"));

        assert!(SortCandidate::from_value(&json!({"name": "no id"})).is_none());
        assert!(SortCandidate::from_value(&json!({"id": ""})).is_none());
        assert!(SortCandidate::from_value(&json!({"id": null})).is_none());
    }

    #[test]
    fn test_tick_count() {
        let few = SortParams {
            candidates: vec![candidate("a", None, None)],
            sort_key: SortKey::Custom("height".into()),
        };
        assert_eq!(few.tick_count(), 4);

        let many = SortParams {
            candidates: (0..6).map(|i| candidate(&i.to_string(), None, None)).collect(),
            sort_key: SortKey::Custom("height".into()),
        };
        assert_eq!(many.tick_count(), 6);

        let basic = SortParams {
            sort_key: SortKey::Alphabetical,
            ..many
        };
        assert_eq!(basic.tick_count(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_custom_key_resolves_values_and_ranks() {
        let params = SortParams {
            candidates: vec![
                candidate("a", Some("Mont Blanc"), Some("4,806 m")),
                candidate("b", Some("K2"), Some("8611 m")),
                candidate("c", Some("Everest"), Some("8848 m")),
            ],
            sort_key: SortKey::Custom("height".into()),
        };

        let events = collect(params).await;

        let attrs = of_name(&events, "attr");
        assert_eq!(attrs.len(), 3);
        assert_eq!(attrs[0].data["id"], "a");
        assert_eq!(attrs[0].data["value"], 4806);
        assert_eq!(attrs[0].data["provenance"], "provided");
        assert_eq!(attrs[0].data["key"], "height");

        let ranks = of_name(&events, "rank");
        assert_eq!(ranks.len(), 4);
        assert_eq!(ranks[0].data["order"], json!(["a", "b", "c"]));
        assert_eq!(ranks[1].data["order"], json!(["b", "a", "c"]));
        assert_eq!(ranks[3].data["order"], json!(["c", "b", "a"]));

        assert_eq!(events.last().map(|e| e.name.as_str()), Some("done"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_confidence_non_decreasing_and_ends_at_100() {
        let params = SortParams {
            candidates: (0..8).map(|i| candidate(&format!("id{}", i), None, None)).collect(),
            sort_key: SortKey::Custom("weight".into()),
        };

        let events = collect(params).await;
        let values: Vec<u64> = of_name(&events, "confidence")
            .iter()
            .map(|e| e.data["value"].as_u64().unwrap())
            .collect();

        assert_eq!(values.len(), 8);
        assert!(values[0] >= 50 && values[0] <= 65);
        assert!(values.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(values.last(), Some(&100));

        let attrs = of_name(&events, "attr");
        assert!(attrs.iter().all(|e| e.data["provenance"] == "mock"));
        assert!(attrs.iter().all(|e| e.data["value"].as_u64().unwrap() <= 1000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_basic_key_ranks_by_name_without_attrs() {
        let params = SortParams {
            candidates: vec![
                candidate("1", Some("zebra"), None),
                candidate("2", None, None),
                candidate("3", Some("Aardvark"), None),
            ],
            sort_key: SortKey::Alphabetical,
        };

        let events = collect(params).await;

        assert!(of_name(&events, "attr").is_empty());
        let ranks = of_name(&events, "rank");
        assert_eq!(ranks.len(), 4);
        // "2" has no name and ranks by its id
        assert_eq!(ranks[0].data["order"], json!(["2", "3", "1"]));
    }

    #[tokio::test(start_paused = true)]
    async fn test_identical_requests_identical_streams() {
        let params = SortParams {
            candidates: (0..5).map(|i| candidate(&format!("x{}", i), None, None)).collect(),
            sort_key: SortKey::Random,
        };

        let first = collect(params.clone()).await;
        let second = collect(params).await;

        assert_eq!(first, second);
    }
}
