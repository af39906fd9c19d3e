/*!
 * # tlgate - translation quality gate
 *
 * A Rust library that sits between a caller supplying Japanese text and an
 * LLM translation server, and decides what the caller gets back.
 *
 * ## Features
 *
 * - Skip snippets that need no translation (names, kanji compounds, symbols)
 * - Validate every candidate against Japanese-to-Chinese heuristics:
 *   echo, prompt leakage, refusals, leftover kana, degenerate repetition
 * - Retry with adjusted sampling parameters, within a fixed attempt budget
 * - Fall back to the last candidate when every attempt was rejected
 * - Restore `「」` brackets and terminal punctuation of the source
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `translation`: The quality-control engine:
 *   - `translation::core`: Translation service and retry driver
 *   - `translation::classifiers`: Text classifiers
 *   - `translation::validator`: Candidate validation
 *   - `translation::retry`: Retry state machine
 * - `providers`: Client implementations for generation servers:
 *   - `providers::openai`: OpenAI-compatible API client
 *   - `providers::mock`: Scripted provider for tests
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod errors;
pub mod providers;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::{Config, EngineConfig};
pub use errors::{ProviderError, TranslationError};
pub use translation::{FinalResult, TranslationService};
