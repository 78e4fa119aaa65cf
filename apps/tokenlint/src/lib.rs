//! tokenlint core library.
//!
//! Lints design tokens and the code that consumes them. Deterministic static
//! rules run first; LLM-backed rules then review the selected candidate
//! tokens. Both produce the same `Diagnostic` shape.
//!
//! High-level modules:
//! - `cli`: CLI argument parsing (binary uses this).
//! - `config`: Discovery and effective configuration resolution.
//! - `tokens`: Token file loading and flattening.
//! - `files`: Code file discovery by glob.
//! - `checks`: Static rules (`naming-convention`, `raw-color`, `raw-pixel`).
//! - `candidates`: Which tokens are forwarded to AI rules.
//! - `ai`: AI rule runner, built-in and custom AI rules.
//! - `llm`: Gemini and OpenAI providers behind one trait.
//! - `registry`: Static and AI rules known to a run.
//! - `lint`: The pipeline that ties the above together.
//! - `output`: Console, JSON and Markdown renderers.
//! - `models`: Tokens, diagnostics, and report structs.
pub mod ai;
pub mod candidates;
pub mod checks;
pub mod cli;
pub mod config;
pub mod error;
pub mod files;
pub mod lint;
pub mod llm;
pub mod models;
pub mod output;
pub mod registry;
pub mod tokens;
pub mod utils;
pub mod values;
