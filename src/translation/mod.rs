/*!
 * Translation quality-control engine.
 *
 * This module contains everything between the caller's source text and the
 * generation provider. It is split into several submodules:
 *
 * - `core`: The translation service, skip gate and retry driver
 * - `classifiers`: Script and repetition heuristics over raw text
 * - `validator`: Ordered rule set deciding whether a candidate is acceptable
 * - `params`: Generation parameters and their per-failure adjustment
 * - `retry`: Pure state machine of the bounded retry loop
 * - `cleanup`: Removal of reasoning blocks and leaked template text
 * - `reconcile`: Quote and terminal punctuation restoration
 * - `source`: Source text preparation
 */

// Re-export main types for easier usage
pub use self::core::{FinalResult, TranslationService};
pub use self::params::{adjust_parameters, GenerationParameters};
pub use self::retry::{AttemptEvent, RetryPhase, RetryState};
pub use self::validator::{ValidationOutcome, ValidationReason, Validator};

// Submodules
pub mod classifiers;
pub mod cleanup;
pub mod core;
pub mod params;
pub mod reconcile;
pub mod retry;
pub mod source;
pub mod validator;
