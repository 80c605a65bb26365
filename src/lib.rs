//! # Prioritizer - RICE feature prioritization with an LLM
//!
//! Prioritizer collects a list of product features, asks a chat-completion
//! model to score them with the RICE framework, parses the answer into a
//! table and exports it as CSV. It runs as a CLI or as a small JSON service.
//!
//! ## Quick Start
//!
//! ```bash
//! export OPENROUTER_API_KEY=sk-or-...
//!
//! # Score features given as arguments
//! prioritizer prioritize "Login flow" "Dark mode" --output
//!
//! # Score the "Feature" column of a CSV file
//! prioritizer prioritize --csv backlog.csv
//!
//! # Re-render an export
//! prioritizer show prioritized_features.csv
//!
//! # Serve the JSON API
//! prioritizer serve --port 8501
//! ```
//!
//! ## Modules
//!
//! - [`collector`]: Feature input from text or CSV
//! - [`prompt`]: Prompt construction
//! - [`client`]: Chat-completion client
//! - [`parser`]: Extraction of scores from the model's answer
//! - [`presenter`]: Sorting, table rendering and CSV export
//! - [`session`]: Trial flag, password lock and busy guard
//! - [`pipeline`]: The end-to-end prioritization action
//! - [`server`]: HTTP routes

/// Command-line interface definitions and handlers.
pub mod cli;

/// Chat-completion client.
///
/// Defines the `CompletionBackend` trait and the OpenRouter implementation.
pub mod client;

pub mod collector;

/// Configuration loading and management.
///
/// Handles `.prioritizer.yml` files and secrets from the environment.
pub mod config;

/// Error types and result aliases.
///
/// Defines `PrioritizerError` enum and `Result<T>` type alias.
pub mod error;

pub mod logging;

/// Data models: feature lists, frameworks and scored features.
pub mod model;

pub mod parser;
pub mod pipeline;
pub mod presenter;
pub mod prompt;
pub mod server;
pub mod session;
