//! List resolution services
//!
//! Leaves first: sort key normalization and seeding, the three resolvers
//! (structured source, generative model, fallback), the sort engine, the
//! response normalizer, and the pipeline that chains them.

pub mod fallback;
pub mod generative;
pub mod knowledge_source;
pub mod pipeline;
pub mod response_normalizer;
pub mod seed;
pub mod sort_engine;
pub mod sort_key;
pub mod suggest;

pub use fallback::fabricate;
pub use generative::{GenerativeResolver, OpenAiClient, TextModel};
pub use knowledge_source::{KnowledgeSourceResolver, StructuredSource, WikidataClient};
pub use pipeline::ListPipeline;
pub use response_normalizer::normalize_response;
pub use seed::compute_seed;
pub use sort_engine::{apply_sort, seeded_shuffle};
pub use sort_key::normalize_sort_key;
pub use suggest::suggest_sort;
