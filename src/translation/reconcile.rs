/*!
 * Restores quote brackets and terminal punctuation on a translation.
 *
 * The model is sent dialogue without its `「」` pair and tends to drop or
 * swap the final punctuation mark. Reconciliation makes the translation end
 * the way the original does. Applying it twice gives the same result as
 * applying it once.
 */

use super::source::{is_quoted, CLOSE_QUOTE, OPEN_QUOTE};

/// Punctuation kept in sync between source and translation
const TERMINAL_PUNCTUATION: &[char] = &['，', '。', '？', '！'];

fn is_terminal(c: char) -> bool {
    TERMINAL_PUNCTUATION.contains(&c)
}

/// Reconcile a translation against the original source text
pub fn reconcile(original: &str, translation: &str) -> String {
    if translation.is_empty() {
        return String::new();
    }

    let mut text = translation.to_string();

    if is_quoted(original) {
        if !text.starts_with(OPEN_QUOTE) {
            text.insert(0, OPEN_QUOTE);
        }
        if !text.ends_with(CLOSE_QUOTE) {
            text.push(CLOSE_QUOTE);
        }
    }

    let original_end = original.chars().last();
    let translation_end = text.chars().last();

    match original_end.filter(|&c| is_terminal(c)) {
        Some(expected) => match translation_end {
            Some(actual) if is_terminal(actual) => {
                if actual != expected {
                    text.pop();
                    text.push(expected);
                }
            }
            _ => text.push(expected),
        },
        None => {
            let trimmed_len = text.trim_end_matches(TERMINAL_PUNCTUATION).len();
            text.truncate(trimmed_len);
        }
    }

    text
}
