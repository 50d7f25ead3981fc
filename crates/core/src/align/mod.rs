//! Maps word-level error entries back onto character offsets in the
//! transcript.
//!
//! For every distinct word all whole-word occurrences are located up front;
//! entries then consume occurrences in first-come order, so two entries for
//! the same word land on its first and second occurrence. Entries beyond the
//! available occurrences get the (-1, -1) sentinel; that miscount is logged,
//! never fatal.

use std::collections::HashMap;

use regex::Regex;
use tracing::warn;

use crate::report::SENTINEL_SPAN;

/// An error entry that carries a transcribed word and a fillable char span.
pub trait AlignTarget {
    fn word(&self) -> &str;
    fn set_span(&mut self, span: (i64, i64));
}

/// Whole-word byte spans of `word` in `text`, in transcript order.
fn word_spans(text: &str, word: &str) -> Vec<(i64, i64)> {
    // Case-insensitive: stress entries carry lowercased tokens while the
    // transcript capitalizes sentence starts.
    let pattern = format!(r"(?i)\b{}\b", regex::escape(word));
    match Regex::new(&pattern) {
        Ok(re) => re
            .find_iter(text)
            .map(|m| (m.start() as i64, m.end() as i64))
            .collect(),
        Err(_) => Vec::new(),
    }
}

/// Fill the char span of every entry from its word's occurrences in the
/// transcript. Preserves entry order; each occurrence is claimed at most
/// once per word.
pub fn assign_spans<T: AlignTarget>(transcript: &str, entries: &mut [T]) {
    let mut occurrences: HashMap<String, std::vec::IntoIter<(i64, i64)>> = HashMap::new();
    for entry in entries.iter() {
        let word = entry.word().to_owned();
        occurrences
            .entry(word.clone())
            .or_insert_with(|| word_spans(transcript, &word).into_iter());
    }

    for entry in entries.iter_mut() {
        let word = entry.word().to_owned();
        let span = occurrences
            .get_mut(&word)
            .and_then(|iter| iter.next())
            .unwrap_or_else(|| {
                warn!(word = %word, "more error entries than transcript occurrences");
                SENTINEL_SPAN
            });
        entry.set_span(span);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Entry {
        word: String,
        span: (i64, i64),
    }

    impl Entry {
        fn new(word: &str) -> Self {
            Self {
                word: word.to_owned(),
                span: SENTINEL_SPAN,
            }
        }
    }

    impl AlignTarget for Entry {
        fn word(&self) -> &str {
            &self.word
        }

        fn set_span(&mut self, span: (i64, i64)) {
            self.span = span;
        }
    }

    #[test]
    fn repeated_words_claim_occurrences_in_order() {
        let transcript = "I rarely find it rarely good";
        let mut entries = vec![Entry::new("rarely"), Entry::new("rarely"), Entry::new("rarely")];
        assign_spans(transcript, &mut entries);

        assert_eq!(entries[0].span, (2, 8));
        assert_eq!(entries[1].span, (17, 23));
        assert_eq!(entries[2].span, SENTINEL_SPAN);
    }

    #[test]
    fn distinct_words_are_independent() {
        let transcript = "the cat sat on the mat";
        let mut entries = vec![Entry::new("mat"), Entry::new("cat")];
        assign_spans(transcript, &mut entries);
        assert_eq!(entries[0].span, (19, 22));
        assert_eq!(entries[1].span, (4, 7));
    }

    #[test]
    fn partial_word_matches_are_ignored() {
        let transcript = "scattered cats";
        let mut entries = vec![Entry::new("cat")];
        assign_spans(transcript, &mut entries);
        assert_eq!(entries[0].span, SENTINEL_SPAN);
    }

    #[test]
    fn absent_word_gets_sentinel() {
        let mut entries = vec![Entry::new("zebra")];
        assign_spans("no stripes here", &mut entries);
        assert_eq!(entries[0].span, SENTINEL_SPAN);
    }
}
