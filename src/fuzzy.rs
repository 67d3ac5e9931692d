//! Approximate substring matching.
//!
//! A field matches a query when some substring of the field is within a
//! small edit distance of the whole query. The score is that distance
//! divided by the query length, so `0.0` is an exact occurrence and `1.0`
//! means nothing lines up. Where in the field the match sits does not
//! affect the score. Comparison is case-insensitive.
//!
//! A substring within `k` edits of an `m`-char query is between `m - k` and
//! `m + k` chars long, so only windows of those lengths are compared, each
//! with [`strsim::levenshtein`].

use crate::error::IndexBuildError;

/// A lowercased query, prepared once per search.
#[derive(Debug, Clone)]
pub struct Pattern {
    text: String,
    len: usize,
}

impl Pattern {
    pub fn new(query: &str) -> Self {
        let text = prepare(query);
        let len = text.chars().count();
        Self { text, len }
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Lowercase `text` into the form [`FuzzyMatcher::score`] expects.
pub fn prepare(text: &str) -> String {
    text.to_lowercase()
}

#[derive(Debug, Clone)]
pub struct FuzzyMatcher {
    threshold: f64,
    min_match_chars: usize,
}

impl FuzzyMatcher {
    pub fn new(threshold: f64, min_match_chars: usize) -> Result<Self, IndexBuildError> {
        if !threshold.is_finite() || !(0.0..=1.0).contains(&threshold) {
            return Err(IndexBuildError::InvalidConfig(format!(
                "threshold must be in [0.0, 1.0], got {}",
                threshold
            )));
        }
        if min_match_chars == 0 {
            return Err(IndexBuildError::InvalidConfig(
                "min_match_chars must be >= 1".to_string(),
            ));
        }
        Ok(Self {
            threshold,
            min_match_chars,
        })
    }

    /// Score `pattern` against prepared `text`, or `None` if it does not match.
    pub fn score(&self, pattern: &Pattern, text: &str) -> Option<f64> {
        if pattern.is_empty() {
            return None;
        }
        let max_errors = (self.threshold * pattern.len as f64).floor() as usize;
        let (distance, span) = best_alignment(pattern, text, max_errors)?;
        if span < self.min_match_chars {
            return None;
        }
        let score = distance as f64 / pattern.len as f64;
        (score <= self.threshold).then_some(score)
    }
}

/// Smallest edit distance (at most `max_errors`) from `pattern` to a
/// substring of `text`, with that substring's length in chars. Ties prefer
/// the longer span.
fn best_alignment(pattern: &Pattern, text: &str, max_errors: usize) -> Option<(usize, usize)> {
    // Byte offset of every char boundary, including the end.
    let bounds: Vec<usize> = text
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .collect();
    let text_len = bounds.len() - 1;

    let shortest = pattern.len.saturating_sub(max_errors).max(1);
    let longest = (pattern.len + max_errors).min(text_len);

    let mut best: Option<(usize, usize)> = None;
    for width in shortest..=longest {
        for start in 0..=(text_len - width) {
            let window = &text[bounds[start]..bounds[start + width]];
            let distance = strsim::levenshtein(&pattern.text, window);
            if distance > max_errors {
                continue;
            }
            let better = match best {
                None => true,
                Some((d, span)) => distance < d || (distance == d && width > span),
            };
            if better {
                best = Some((distance, width));
            }
        }
    }
    best
}
