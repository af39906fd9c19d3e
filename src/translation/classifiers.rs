/*!
 * Text classifiers for Japanese source text and Chinese candidate output.
 *
 * Pure predicates over a string:
 * - `contains_source_script`: kana left in the output
 * - `is_expressive_repetition`: the source repeats itself on purpose
 * - `is_mostly_untranslatable`: kanji/number/symbol text that maps to itself
 * - `has_excessive_repetition`: degenerate repetition in model output
 *
 * All lengths and counts are in Unicode scalar values, not bytes.
 */

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;

/// Matches any Hiragana or Katakana letter, including the prolonged sound mark
static SOURCE_SCRIPT_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\u{3040}-\u{3096}\u{309D}-\u{309F}\u{30A1}-\u{30FA}\u{30FC}-\u{30FE}]")
        .expect("Invalid source script regex")
});

/// Runs of ASCII or full-width whitespace separating segments
static SEGMENT_SEPARATOR_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\u{3000}\s]+").expect("Invalid segment separator regex")
});

/// Symbols that mark emotive speech
const DECORATIVE_MARKERS: &[&str] = &["♥", "♡", "❤", "★", "☆", "っ♥", "っ♪"];

const DASH_SEQUENCES: &[&str] = &["――", "——", "--"];

const ELLIPSIS_SEQUENCES: &[&str] = &["……", "..."];

/// Characters ignored by the repetition detector
const EXCLUDED_PUNCTUATION: &str = "，。？！、…「」『』（）(),.!?~～♥♡❤★☆・―—-";
const EXCLUDED_DIGITS: &str = "0123456789０１２３４５６７８９";
const EXCLUDED_WHITESPACE: &str = "　 \t\n";
const EXCLUDED_INTERJECTIONS: &str = "啊呀哦嗯呜哈唔噢嘿咦呵喂唤";

static EXCLUDED_CHARS: Lazy<HashSet<char>> = Lazy::new(|| {
    EXCLUDED_PUNCTUATION
        .chars()
        .chain(EXCLUDED_DIGITS.chars())
        .chain(EXCLUDED_WHITESPACE.chars())
        .chain(EXCLUDED_INTERJECTIONS.chars())
        .collect()
});

/// Short repeats that are normal in dialogue
static TOLERATED_REPEATS: Lazy<Vec<Vec<char>>> = Lazy::new(|| {
    ["……", "...", "~~", "♥♥", "！！", "??", "——", "――", "--"]
        .iter()
        .map(|pattern| pattern.chars().collect())
        .collect()
});

/// First code point of the CJK Unified Ideographs block
const CJK_START: u32 = 0x4E00;
const CJK_END: u32 = 0x9FFF;
const HIRAGANA_RANGE: (u32, u32) = (0x3040, 0x309F);
const KATAKANA_RANGE: (u32, u32) = (0x30A0, 0x30FF);

/// Below this kana share, text is treated as translation-neutral
const KANA_RATIO_THRESHOLD: f64 = 0.2;

/// Extra occurrences a CJK ideograph may have before it counts as repetition
pub const DEFAULT_CJK_REPEAT_TOLERANCE: usize = 3;

const MIN_WINDOW: usize = 3;
const MAX_WINDOW: usize = 8;

/// Script band of a single character
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptBand {
    Ideograph,
    Hiragana,
    Katakana,
    Other,
}

impl ScriptBand {
    /// Classify one character
    pub fn of(c: char) -> Self {
        let code = c as u32;
        if (CJK_START..=CJK_END).contains(&code) {
            Self::Ideograph
        } else if (HIRAGANA_RANGE.0..=HIRAGANA_RANGE.1).contains(&code) {
            Self::Hiragana
        } else if (KATAKANA_RANGE.0..=KATAKANA_RANGE.1).contains(&code) {
            Self::Katakana
        } else {
            Self::Other
        }
    }
}

/// Per-band character counts of a string
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScriptCounts {
    pub ideograph: usize,
    pub hiragana: usize,
    pub katakana: usize,
    pub other: usize,
}

impl ScriptCounts {
    /// Count the characters of `text` by script band
    pub fn of(text: &str) -> Self {
        let mut counts = Self::default();
        for c in text.chars() {
            match ScriptBand::of(c) {
                ScriptBand::Ideograph => counts.ideograph += 1,
                ScriptBand::Hiragana => counts.hiragana += 1,
                ScriptBand::Katakana => counts.katakana += 1,
                ScriptBand::Other => counts.other += 1,
            }
        }
        counts
    }

    pub fn kana(&self) -> usize {
        self.hiragana + self.katakana
    }

    pub fn total(&self) -> usize {
        self.ideograph + self.hiragana + self.katakana + self.other
    }

    /// Share of kana among all characters, 0.0 for empty text
    pub fn kana_ratio(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            self.kana() as f64 / total as f64
        }
    }
}

/// Check whether the text contains any Hiragana or Katakana
pub fn contains_source_script(text: &str) -> bool {
    SOURCE_SCRIPT_REGEX.is_match(text)
}

/// Check whether the text is intentionally repetitive emotive speech
///
/// Onomatopoeia and drawn-out lines such as `ふぅー……っ♥　ふぅー……っ♥`
/// translate into repetitive output, so repetition checks should be skipped
/// for them.
pub fn is_expressive_repetition(text: &str) -> bool {
    if text.is_empty() {
        return false;
    }

    if DECORATIVE_MARKERS.iter().any(|marker| text.contains(marker)) {
        return true;
    }

    let dash_count: usize = DASH_SEQUENCES.iter().map(|d| text.matches(d).count()).sum();
    let ellipsis_count: usize = ELLIPSIS_SEQUENCES
        .iter()
        .map(|e| text.matches(e).count())
        .sum();
    if dash_count >= 2 || ellipsis_count >= 2 || (dash_count >= 1 && ellipsis_count >= 1) {
        return true;
    }

    let segments: Vec<&str> = SEGMENT_SEPARATOR_REGEX.split(text.trim()).collect();
    if segments.len() < 2 {
        return false;
    }

    let mut segment_counts: HashMap<&str, usize> = HashMap::new();
    for segment in segments.into_iter().filter(|s| s.chars().count() > 1) {
        *segment_counts.entry(segment).or_insert(0) += 1;
    }
    segment_counts.values().any(|&count| count > 1)
}

/// Check whether the text is kanji, digits or symbols with little or no kana
///
/// Status labels and stat names like `新規` or `堕落度: 1` translate to
/// themselves, and sending them to the model tends to produce prompt echo.
pub fn is_mostly_untranslatable(text: &str) -> bool {
    if text.is_empty() {
        return false;
    }

    let counts = ScriptCounts::of(text);
    counts.kana() == 0 || counts.kana_ratio() < KANA_RATIO_THRESHOLD
}

/// Check for pathological repetition using the default CJK tolerance
pub fn has_excessive_repetition(text: &str, threshold: usize) -> bool {
    has_excessive_repetition_with(text, threshold, DEFAULT_CJK_REPEAT_TOLERANCE)
}

/// Check for pathological repetition of single characters or short phrases
///
/// Punctuation, digits, whitespace and common interjections never count.
/// A CJK ideograph needs `threshold + cjk_tolerance` occurrences to trip;
/// any other character needs `threshold`. Phrases of 3 to 7 characters trip
/// at `threshold` occurrences. A zero threshold disables the check.
pub fn has_excessive_repetition_with(text: &str, threshold: usize, cjk_tolerance: usize) -> bool {
    if threshold == 0 {
        return false;
    }

    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() || chars.len() < threshold {
        return false;
    }

    let mut char_counts: HashMap<char, usize> = HashMap::new();
    for &c in chars.iter().filter(|c| !EXCLUDED_CHARS.contains(c)) {
        *char_counts.entry(c).or_insert(0) += 1;
    }
    for (c, count) in char_counts {
        let limit = if c as u32 >= CJK_START {
            threshold + cjk_tolerance
        } else {
            threshold
        };
        if count >= limit {
            return true;
        }
    }

    let max_window = (chars.len() / threshold + 1).min(MAX_WINDOW);
    for size in MIN_WINDOW..max_window {
        let mut seen: HashMap<&[char], usize> = HashMap::new();
        for window in chars.windows(size) {
            if TOLERATED_REPEATS.iter().any(|p| p.as_slice() == window) {
                continue;
            }
            if window.iter().all(|c| EXCLUDED_CHARS.contains(c)) {
                continue;
            }
            let count = seen.entry(window).or_insert(0);
            *count += 1;
            if *count >= threshold {
                return true;
            }
        }
    }

    false
}
