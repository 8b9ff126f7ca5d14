//! llm-search library
//!
//! Exposes a web search tool backed by an LLM chat endpoint: the model is
//! prompted to act as a search engine and its answer is normalized, costed
//! and retried on transient failures.

pub mod cli;
pub mod config;
pub mod llm;
pub mod logging;
pub mod search;
pub mod tool;
