//! Word -> syllabification -> expected-stress lookup table.
//!
//! Built once at process startup from a CMUdict-format pronunciation file
//! plus an optional hyphenation list; read-only and safely shared across
//! tasks afterwards. Rebuilding requires a restart, not a locking protocol.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::syllabify::heuristic_syllabify;

#[derive(thiserror::Error, Debug)]
pub enum LexiconError {
    #[error("failed to read lexicon file: {0}")]
    Io(#[from] std::io::Error),
}

/// Syllable breakdown and expected primary-stress index for one word.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SyllableProfile {
    pub word: String,
    pub syllables: Vec<String>,
    pub expected_stress: usize,
}

#[derive(Debug, Default)]
pub struct Lexicon {
    entries: HashMap<String, SyllableProfile>,
}

impl Lexicon {
    /// Parse dictionary text directly; `hyphenations` lines look like
    /// `rare-ly`, one word per line.
    pub fn from_strs(dictionary: &str, hyphenations: Option<&str>) -> Self {
        let hyphens = hyphenations.map(parse_hyphenations).unwrap_or_default();
        let pronunciations = parse_dictionary(dictionary);

        let mut entries = HashMap::with_capacity(pronunciations.len());
        for (word, variants) in pronunciations {
            // Last write wins on duplicate derivations.
            if let Some(profile) = build_profile(&word, &variants, hyphens.get(&word)) {
                entries.insert(word, profile);
            }
        }
        debug!(words = entries.len(), "syllable stress lexicon built");
        Lexicon { entries }
    }

    pub fn from_paths(
        dictionary: &Path,
        hyphenations: Option<&Path>,
    ) -> Result<Self, LexiconError> {
        let dict_text = std::fs::read_to_string(dictionary)?;
        let hyphen_text = match hyphenations {
            Some(path) => Some(std::fs::read_to_string(path)?),
            None => None,
        };
        Ok(Self::from_strs(&dict_text, hyphen_text.as_deref()))
    }

    pub fn lookup(&self, word: &str) -> Option<&SyllableProfile> {
        self.entries.get(&word.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// CMUdict format: `WORD  PH AH0 NEMZ`, variants as `WORD(1)`, comments
/// starting with `;;;`. Unparseable lines are skipped.
fn parse_dictionary(text: &str) -> HashMap<String, Vec<Vec<String>>> {
    let mut out: HashMap<String, Vec<Vec<String>>> = HashMap::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with(";;;") {
            continue;
        }
        let mut tokens = line.split_whitespace();
        let Some(head) = tokens.next() else {
            continue;
        };
        let phones: Vec<String> = tokens.map(str::to_owned).collect();
        if phones.is_empty() {
            continue;
        }
        let base = head
            .split_once('(')
            .map(|(base, _)| base)
            .unwrap_or(head)
            .to_lowercase();
        out.entry(base).or_default().push(phones);
    }
    out
}

fn parse_hyphenations(text: &str) -> HashMap<String, Vec<String>> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            let syllables: Vec<String> = line.split('-').map(str::to_owned).collect();
            (syllables.concat().to_lowercase(), syllables)
        })
        .collect()
}

fn is_nucleus(phone: &str) -> bool {
    phone.ends_with(|c: char| c.is_ascii_digit())
}

fn stress_level(phone: &str) -> u32 {
    phone
        .chars()
        .last()
        .and_then(|c| c.to_digit(10))
        .unwrap_or(0)
}

fn build_profile(
    word: &str,
    variants: &[Vec<String>],
    hyphenation: Option<&Vec<String>>,
) -> Option<SyllableProfile> {
    let first = variants.first()?;
    let expected_count = first.iter().filter(|p| is_nucleus(p)).count();
    if expected_count == 0 {
        return None;
    }

    // Dictionary hyphenation is preferred; resegment when its count
    // disagrees with the phonetic nucleus count.
    let syllables = match hyphenation {
        Some(h) if h.len() == expected_count => h.clone(),
        _ => heuristic_syllabify(word, expected_count),
    };

    // Highest stressed syllable index across variants whose nucleus count
    // matches the syllabification; earlier variants win ties.
    let mut expected_stress: Option<usize> = None;
    for pron in variants {
        let stresses: Vec<u32> = pron
            .iter()
            .filter(|p| is_nucleus(p))
            .map(|p| stress_level(p))
            .collect();
        if stresses.len() != syllables.len() {
            continue;
        }
        let variant_peak = stresses
            .iter()
            .enumerate()
            .filter(|(_, level)| **level > 0)
            .map(|(i, _)| i)
            .max()
            .unwrap_or(0);
        expected_stress = Some(match expected_stress {
            Some(best) if best >= variant_peak => best,
            _ => variant_peak,
        });
    }

    Some(SyllableProfile {
        word: word.to_owned(),
        syllables,
        expected_stress: expected_stress?,
    })
}
