//! List resolution pipeline
//!
//! normalize key → seed → structured source → (secondary fill) →
//! generative model → fallback → sort → normalize.
//!
//! Never fails: every upstream problem degrades to the next stage and is
//! recorded in the response notes.

use std::sync::Arc;
use tracing::{info, warn};
use wizz_common::text::truncate;

use super::fallback::fabricate;
use super::generative::{merge_filled, GenerativeResolver, TextModel, GENERATIVE_SOURCE};
use super::knowledge_source::{KnowledgeSourceResolver, StructuredSource, STRUCTURED_SOURCE};
use super::response_normalizer::normalize_response;
use super::seed::compute_seed;
use super::sort_engine::apply_sort;
use super::sort_key::normalize_sort_key;
use crate::models::{ListItem, ListResult, SortKey, SortRequest, PROTOCOL_VERSION};

/// Longest upstream error text carried into a note
const MAX_NOTE_ERROR_CHARS: usize = 200;

/// Note used when no model credential is configured
pub const MODEL_NOT_CONFIGURED: &str = "generative model not configured";

pub struct ListPipeline {
    structured: KnowledgeSourceResolver,
    generative: Option<GenerativeResolver>,
}

impl ListPipeline {
    pub fn new(structured: Arc<dyn StructuredSource>, model: Option<Arc<dyn TextModel>>) -> Self {
        Self {
            structured: KnowledgeSourceResolver::new(structured),
            generative: model.map(GenerativeResolver::new),
        }
    }

    /// Generative resolver, when a model is configured
    pub fn generative(&self) -> Option<&GenerativeResolver> {
        self.generative.as_ref()
    }

    /// Resolve one request into the final payload
    pub async fn resolve(&self, request: &SortRequest) -> ListResult {
        let subject = request.subject.as_str();
        let n = request.length;
        let sort_key = normalize_sort_key(&request.sort_key_raw);
        let seed = compute_seed(subject, &sort_key, n, PROTOCOL_VERSION);

        info!(
            subject = %subject,
            sort_key = %sort_key,
            length = n,
            seed = %seed,
            "Resolving list"
        );

        let mut sources: Vec<String> = Vec::new();
        let mut notes: Vec<String> = Vec::new();

        let mut items = match self.structured.resolve(subject, &sort_key, n).await {
            Ok(resolution) => {
                sources.push(STRUCTURED_SOURCE.to_string());
                let mut items = resolution.items;
                if !resolution.needs_secondary.is_empty() {
                    self.fill_secondary(
                        &mut items,
                        &resolution.needs_secondary,
                        &sort_key,
                        &mut sources,
                        &mut notes,
                    )
                    .await;
                }
                items
            }
            Err(insufficient) => {
                info!(outcome = ?insufficient, "Structured source insufficient, deferring");
                if let Some(note) = insufficient.note() {
                    notes.push(truncate(&note, MAX_NOTE_ERROR_CHARS));
                }

                match self.generate(subject, &sort_key, n, &seed).await {
                    Ok((items, model_notes)) => {
                        sources.push(GENERATIVE_SOURCE.to_string());
                        notes.extend(model_notes);
                        items
                    }
                    Err(unavailable) => {
                        info!(reason = %unavailable, "Using fallback list");
                        let fabricated = fabricate(subject, &sort_key, n, &unavailable);
                        sources.clear();
                        notes.push(fabricated.note);
                        fabricated.items
                    }
                }
            }
        };

        apply_sort(&mut items, &sort_key, &seed, &mut notes);
        normalize_response(subject, &sort_key, n, items, sources, notes)
    }

    /// Generative stage; `Err` carries the reason for the fallback note
    async fn generate(
        &self,
        subject: &str,
        sort_key: &SortKey,
        n: usize,
        seed: &str,
    ) -> Result<(Vec<ListItem>, Vec<String>), String> {
        let resolver = self
            .generative
            .as_ref()
            .ok_or_else(|| MODEL_NOT_CONFIGURED.to_string())?;

        match resolver.generate(subject, sort_key, n, seed).await {
            Ok(list) => Ok((list.items, list.notes)),
            Err(e) => {
                warn!(error = %e, "Generative model failed");
                Err(format!(
                    "generative model unavailable ({})",
                    truncate(&e.to_string(), MAX_NOTE_ERROR_CHARS)
                ))
            }
        }
    }

    /// Ask the model for values the structured source could not format
    async fn fill_secondary(
        &self,
        items: &mut [ListItem],
        names: &[String],
        sort_key: &SortKey,
        sources: &mut Vec<String>,
        notes: &mut Vec<String>,
    ) {
        let Some(resolver) = self.generative.as_ref() else {
            notes.push(format!(
                "{} value(s) missing; {}.",
                names.len(),
                MODEL_NOT_CONFIGURED
            ));
            return;
        };

        match resolver.fill_missing(names, sort_key).await {
            Ok(values) => {
                let merged = merge_filled(items, &values);
                info!(requested = names.len(), merged, "Secondary fill merged");
                if merged > 0 {
                    sources.push(GENERATIVE_SOURCE.to_string());
                }
            }
            Err(e) => {
                warn!(error = %e, "Secondary fill failed");
                notes.push(format!(
                    "Secondary fill failed: {}",
                    truncate(&e.to_string(), MAX_NOTE_ERROR_CHARS)
                ));
            }
        }
    }
}
