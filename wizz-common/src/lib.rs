//! # WizzLists Common Library
//!
//! Shared code for the WizzLists services including:
//! - Common error type
//! - TOML configuration file model and discovery
//! - Per-connection cancellable event streams (SSE)
//! - Text utilities

pub mod config;
pub mod error;
pub mod sse;
pub mod text;

pub use error::{Error, Result};
