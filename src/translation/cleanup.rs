/*!
 * Cleanup of raw model output before validation.
 *
 * Reasoning models may wrap their chain of thought in `<think>` tags, and
 * small translation models sometimes continue past the answer into
 * fragments of their training template. Both are removed here.
 */

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

/// Regex for a reasoning block, across line breaks
static THINK_BLOCK_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<think>.*?</think>").expect("Invalid think block regex")
});

/// Remove every `<think>…</think>` block and surrounding whitespace
pub fn strip_reasoning(raw: &str) -> String {
    THINK_BLOCK_REGEX.replace_all(raw, "").trim().to_string()
}

/// Cut the text at the first leakage marker found after its start
///
/// Markers are tried in order. A marker at offset zero is left alone since
/// cutting there would discard the whole answer.
pub fn truncate_leakage(text: &str, markers: &[String]) -> String {
    for marker in markers.iter().filter(|m| !m.is_empty()) {
        if let Some(index) = text.find(marker.as_str()) {
            if index > 0 {
                debug!("Truncating model output at leakage marker '{}'", marker);
                return text[..index].trim().to_string();
            }
        }
    }
    text.to_string()
}

/// Turn raw generated text into a candidate translation
pub fn clean_candidate(raw: &str, leakage_markers: &[String]) -> String {
    truncate_leakage(&strip_reasoning(raw), leakage_markers)
}
