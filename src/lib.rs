//! # headergen
//!
//! Parses the SDL3 C headers into an API model, maps that model onto the SDL3pp C++ wrapper
//! API, and generates or incrementally updates the wrapper headers.
//!
//! ## Pipeline
//!
//! ```text
//!   header text ──lexer──▶ tokens ──parser──▶ Api (source)
//!                                                 │ transform
//!                                                 ▼
//!   header text ◀──generate / update──────── Api (target)
//! ```
//!
//! - [lexer]: classifies header lines into typed tokens with line spans.
//! - [parser]: two interchangeable strategies building an [model::ApiFile].
//! - [docs]: the doc-comment grammar, turning raw doc text into blocks.
//! - [transform]: the data-driven mapping from the C API to the wrapper API.
//! - [generate]: renders a model back to header text.
//! - [update]: patches an existing header with the minimal set of line replacements.
//! - [processor]: the verb pipelines the `headergen` binary runs.
//!
//! The [model] is serialized as JSON between stages.

pub mod config;
pub mod diagnostics;
pub mod docs;
pub mod error;
pub mod generate;
pub mod lexer;
pub mod model;
pub mod parser;
pub mod processor;
pub mod transform;
pub mod update;

pub use config::Config;
pub use diagnostics::Diagnostics;
pub use error::{Error, Result};
