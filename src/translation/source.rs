/*!
 * Source text handling before a request reaches the model.
 */

/// Opening corner bracket used for quoted dialogue
pub const OPEN_QUOTE: char = '「';

/// Closing corner bracket used for quoted dialogue
pub const CLOSE_QUOTE: char = '」';

/// The text as received plus the copy that is sent to the model
///
/// Dialogue wrapped in `「…」` is sent without the brackets; the original is
/// kept for bracket reconciliation and for the skip path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceText {
    original: String,
    working: String,
}

impl SourceText {
    pub fn new(text: impl Into<String>) -> Self {
        let original = text.into();
        let working = if is_quoted(&original) {
            let inner_start = OPEN_QUOTE.len_utf8();
            let inner_end = original.len() - CLOSE_QUOTE.len_utf8();
            original[inner_start..inner_end].to_string()
        } else {
            original.clone()
        };
        Self { original, working }
    }

    /// The text exactly as received
    pub fn original(&self) -> &str {
        &self.original
    }

    /// The text sent to the model
    pub fn working(&self) -> &str {
        &self.working
    }

    /// Number of characters in the working copy
    pub fn working_len(&self) -> usize {
        self.working.chars().count()
    }

    pub fn is_quoted(&self) -> bool {
        self.original.len() != self.working.len()
    }
}

/// Whether the text starts with `「` and ends with `」` as two distinct characters
pub fn is_quoted(text: &str) -> bool {
    text.chars().count() >= 2 && text.starts_with(OPEN_QUOTE) && text.ends_with(CLOSE_QUOTE)
}

/// Replace line breaks with a literal `\n` so the model sees a single line
pub fn escape_newlines(text: &str) -> String {
    text.replace('\n', "\\n")
}

/// Restore line breaks escaped by `escape_newlines`
pub fn unescape_newlines(text: &str) -> String {
    text.replace("\\n", "\n")
}
