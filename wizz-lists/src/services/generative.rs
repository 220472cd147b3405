//! Generative model resolver
//!
//! Prompts a chat completion model for a strict-JSON list. Malformed output
//! gets exactly one repair call (same model, temperature 0); a second
//! failure is returned to the caller, which falls through to the fallback
//! fabricator.
//!
//! Also exposes a secondary entry point that asks only for the missing
//! attribute values of named entities.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use wizz_common::text::truncate;

use crate::error::UpstreamError;
use crate::models::{ListItem, SortKey, Tier, PROTOCOL_VERSION};

/// Provenance name for this resolver
pub const GENERATIVE_SOURCE: &str = "generative";

pub const DEFAULT_OPENAI_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

const LIST_SYSTEM_PROMPT: &str = "You are a precise list generator. Output strict JSON only.";
const REPAIR_SYSTEM_PROMPT: &str = "Return ONLY valid JSON. No explanations.";
const LIST_TEMPERATURE: f32 = 0.4;
const REPAIR_TEMPERATURE: f32 = 0.0;
const MAX_TOKENS: u32 = 700;

/// Tier and confidence for values merged in by the secondary fill
const FILL_TIER: Tier = Tier::Imputed;

/// Upstream error bodies are cut to this length before logging or returning
const MAX_ERROR_BODY_CHARS: usize = 500;

// ============================================================================
// Model seam
// ============================================================================

/// One chat completion call
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system: String,
    pub user: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Generative text model
#[async_trait]
pub trait TextModel: Send + Sync {
    /// Raw text of the first completion choice
    async fn complete(&self, request: &CompletionRequest) -> Result<String, UpstreamError>;
}

// ============================================================================
// OpenAI-compatible client
// ============================================================================

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

/// Chat completions client for OpenAI-compatible endpoints
pub struct OpenAiClient {
    http_client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl OpenAiClient {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        endpoint: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, UpstreamError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| UpstreamError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            model: model.into(),
        })
    }
}

#[async_trait]
impl TextModel for OpenAiClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, UpstreamError> {
        let payload = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": request.system },
                { "role": "user", "content": request.user },
            ],
            "temperature": request.temperature,
            "max_tokens": request.max_tokens,
        });

        debug!(
            model = %self.model,
            temperature = request.temperature,
            "Calling generative model"
        );

        let response = self
            .http_client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Status(
                status.as_u16(),
                truncate(&error_text, MAX_ERROR_BODY_CHARS),
            ));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| UpstreamError::Parse(e.to_string()))?;

        Ok(body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default())
    }
}

// ============================================================================
// Model output shapes
// ============================================================================

#[derive(Debug, Deserialize)]
struct RawList {
    #[serde(default)]
    items: Vec<RawItem>,
    #[serde(default)]
    meta: Option<RawMeta>,
}

#[derive(Debug, Deserialize)]
struct RawItem {
    #[serde(default)]
    name: Option<Value>,
    #[serde(default)]
    attr: Option<Value>,
    #[serde(default)]
    tier: Option<String>,
    #[serde(default)]
    confidence: Option<Value>,
    #[serde(default)]
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawMeta {
    #[serde(default)]
    notes: Vec<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawFill {
    Wrapped { values: Vec<FilledValue> },
    Bare(Vec<FilledValue>),
}

/// Secondary fill answer for one entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilledValue {
    pub name: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub value: Option<String>,
}

/// Accept any JSON scalar where text is expected
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(scalar_text))
}

/// List produced by the model
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedList {
    pub items: Vec<ListItem>,
    /// Notes the model put in its own `meta.notes`
    pub notes: Vec<String>,
}

/// String form of a JSON scalar; `None` for blanks and non-scalars
fn scalar_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

impl RawItem {
    fn into_list_item(self, custom_key: bool) -> Option<ListItem> {
        let name = self.name.as_ref().and_then(scalar_text)?;
        let mut item = ListItem::named(name).with_url(self.url.filter(|u| !u.trim().is_empty()));

        if custom_key {
            item.attr = self.attr.as_ref().and_then(scalar_text);
            item.tier = self.tier.as_deref().and_then(Tier::parse);
            item.confidence = self.confidence.as_ref().and_then(|c| match c {
                Value::Number(n) => n.as_f64(),
                Value::String(s) => s.trim().parse().ok(),
                _ => None,
            });
            item.complete_attribute();
        }
        Some(item)
    }
}

// ============================================================================
// Resolver
// ============================================================================

pub struct GenerativeResolver {
    model: Arc<dyn TextModel>,
}

impl GenerativeResolver {
    pub fn new(model: Arc<dyn TextModel>) -> Self {
        Self { model }
    }

    /// Prompt for a full list
    pub fn build_prompt(subject: &str, sort_key: &SortKey, n: usize, seed: &str) -> String {
        let attribute_rule = if sort_key.is_basic() {
            "- This is a basic sort: each item has ONLY \"name\" (and optionally \"url\"). Omit attr, tier and confidence."
        } else {
            "- Every item MUST include name, attr, tier and confidence. attr is the value of the sort attribute.\n\
             - If the real value is unknown, fabricate a plausible one and set tier to \"fabricated\"."
        };

        format!(
            r#"Return ONLY valid JSON matching this schema (no backticks, no prose):
{{
  "items":[{{"name":string,"attr":string,"tier":"observed"|"derived"|"imputed"|"fabricated","confidence":number,"url":string}}],
  "meta":{{"subject":string,"sort_requested":string,"sort_used":string,"length":number,"sources":string[],"notes":string[],"version":"{version}"}}
}}
Rules:
{attribute_rule}
- Keep values short (e.g., "193 cm", "Blue").
- Confidence 0..1, strictly ordered by tier: observed > derived > imputed > fabricated.
- Exactly {n} items.
- Use a stable approach given seed={seed}.
Subject: "{subject}"
Sort by: "{sort_key}"
"#,
            version = PROTOCOL_VERSION,
            attribute_rule = attribute_rule,
            n = n,
            seed = seed,
            subject = subject,
            sort_key = sort_key,
        )
    }

    /// Prompt for the secondary fill
    pub fn build_fill_prompt(names: &[String], sort_key: &SortKey) -> String {
        let names_json = serde_json::to_string(names).unwrap_or_else(|_| "[]".to_string());
        format!(
            r#"Return ONLY valid JSON matching this schema (no backticks, no prose):
{{"values":[{{"name":string,"value":string|null}}]}}
Rules:
- One entry per entity, using the entity name exactly as given.
- value is the entity's "{sort_key}" as a short human-readable string (e.g., "8848 m", "1,200,000").
- Use null when the value is unknown. Do not guess.
Entities: {names_json}
"#,
            sort_key = sort_key,
            names_json = names_json,
        )
    }

    /// Ask the model for a full list
    pub async fn generate(
        &self,
        subject: &str,
        sort_key: &SortKey,
        n: usize,
        seed: &str,
    ) -> Result<GeneratedList, UpstreamError> {
        let request = CompletionRequest {
            system: LIST_SYSTEM_PROMPT.to_string(),
            user: Self::build_prompt(subject, sort_key, n, seed),
            temperature: LIST_TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        let raw: RawList = self.complete_json(&request).await?;

        let custom_key = !sort_key.is_basic();
        let items: Vec<ListItem> = raw
            .items
            .into_iter()
            .filter_map(|item| item.into_list_item(custom_key))
            .collect();

        if items.is_empty() {
            return Err(UpstreamError::Parse("model returned no named items".to_string()));
        }

        let notes = raw
            .meta
            .map(|meta| meta.notes.iter().filter_map(scalar_text).collect())
            .unwrap_or_default();

        info!(items = items.len(), "Generative model resolved list");
        Ok(GeneratedList { items, notes })
    }

    /// Ask the model for the missing `sort_key` values of `names`
    ///
    /// Only names that were asked about are returned; unknown values are
    /// `None`.
    pub async fn fill_missing(
        &self,
        names: &[String],
        sort_key: &SortKey,
    ) -> Result<Vec<FilledValue>, UpstreamError> {
        if names.is_empty() {
            return Ok(Vec::new());
        }

        let request = CompletionRequest {
            system: REPAIR_SYSTEM_PROMPT.to_string(),
            user: Self::build_fill_prompt(names, sort_key),
            temperature: REPAIR_TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        let values = match self.complete_json::<RawFill>(&request).await? {
            RawFill::Wrapped { values } | RawFill::Bare(values) => values,
        };

        Ok(names
            .iter()
            .map(|name| FilledValue {
                name: name.clone(),
                value: values
                    .iter()
                    .find(|v| names_match(&v.name, name))
                    .and_then(|v| v.value.as_deref())
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                    .map(str::to_string),
            })
            .collect())
    }

    /// One completion, parsed as JSON, with at most one repair call
    async fn complete_json<T: serde::de::DeserializeOwned>(
        &self,
        request: &CompletionRequest,
    ) -> Result<T, UpstreamError> {
        let text = self.model.complete(request).await?;

        match serde_json::from_str::<T>(&text) {
            Ok(parsed) => Ok(parsed),
            Err(first_error) => {
                warn!(error = %first_error, "Model output is not valid JSON, requesting repair");

                let repair = CompletionRequest {
                    system: REPAIR_SYSTEM_PROMPT.to_string(),
                    user: format!("Fix this to valid JSON only:\n{}", text),
                    temperature: REPAIR_TEMPERATURE,
                    max_tokens: request.max_tokens,
                };
                let fixed = self.model.complete(&repair).await?;

                serde_json::from_str::<T>(&fixed).map_err(|e| {
                    UpstreamError::Parse(format!("invalid JSON from model after repair: {}", e))
                })
            }
        }
    }
}

/// Name match used to merge fill results back: trimmed, case-insensitive
pub fn names_match(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

/// Merge fill results into items lacking an attribute
///
/// Returns how many items received a value.
pub fn merge_filled(items: &mut [ListItem], values: &[FilledValue]) -> usize {
    let mut merged = 0;
    for item in items.iter_mut().filter(|item| !item.has_attribute()) {
        let value = values
            .iter()
            .find(|v| names_match(&v.name, &item.name))
            .and_then(|v| v.value.as_deref());
        if let Some(value) = value {
            item.set_attribute(value, FILL_TIER, FILL_TIER.default_confidence());
            merged += 1;
        }
    }
    merged
}
