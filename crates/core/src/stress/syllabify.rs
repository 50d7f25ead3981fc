//! Heuristic syllable splitter used when dictionary hyphenation disagrees
//! with the phonetic vowel-nucleus count.

/// Legal word-initial consonant clusters. A syllable boundary is placed so
/// that the consonants starting the next syllable form the longest member of
/// this set.
const VALID_ONSETS: [&str; 47] = [
    "b", "bl", "br", "c", "ch", "cl", "cr", "d", "dr", "f", "fl", "fr", "g", "gl", "gr", "h",
    "j", "k", "kl", "kr", "l", "m", "n", "p", "pl", "pr", "qu", "r", "s", "sc", "sh", "sk",
    "sl", "sm", "sn", "sp", "st", "str", "sw", "t", "th", "tr", "v", "w", "x", "y", "z",
];

const VOWELS: &str = "aeiouy";

/// Vowel clusters closer than this many characters merge into one nucleus.
const CLUSTER_THRESHOLD: usize = 2;

fn is_valid_onset(cluster: &str) -> bool {
    VALID_ONSETS.contains(&cluster)
}

/// Split `word` into `expected` syllables.
///
/// Vowel-cluster centers are located first, merging clusters within
/// [`CLUSTER_THRESHOLD`]; inter-vowel consonant runs are split at the point
/// leaving the longest valid onset for the following syllable. When the
/// nucleus count still disagrees with the expectation the word is sliced
/// into even lengths. ASCII input assumed (the pronunciation dictionary is).
pub fn heuristic_syllabify(word: &str, expected: usize) -> Vec<String> {
    let lower = word.to_lowercase();
    let vowel_positions: Vec<usize> = lower
        .char_indices()
        .filter(|(_, ch)| VOWELS.contains(*ch))
        .map(|(i, _)| i)
        .collect();
    if vowel_positions.is_empty() || expected == 0 {
        return vec![word.to_owned()];
    }

    let mut nuclei: Vec<usize> = Vec::new();
    for pos in vowel_positions {
        match nuclei.last() {
            Some(last) if pos - last <= CLUSTER_THRESHOLD => {}
            _ => nuclei.push(pos),
        }
    }

    if nuclei.len() != expected {
        return even_slices(word, expected);
    }

    let mut boundaries = Vec::new();
    for pair in nuclei.windows(2) {
        let (v_i, v_j) = (pair[0], pair[1]);
        let cluster = &lower[v_i + 1..v_j];
        let mut split = 0;
        for j in 0..=cluster.len() {
            let onset = &cluster[j..];
            if onset.is_empty() || is_valid_onset(onset) {
                split = j;
                break;
            }
        }
        boundaries.push(v_i + 1 + split);
    }

    let mut syllables = Vec::with_capacity(expected);
    let mut start = 0;
    for b in boundaries {
        syllables.push(word[start..b].to_owned());
        start = b;
    }
    syllables.push(word[start..].to_owned());
    syllables
}

fn even_slices(word: &str, n: usize) -> Vec<String> {
    let length = word.len();
    let mut cuts: Vec<usize> = (0..n)
        .map(|i| round_half_even((i * length) as f64 / n as f64))
        .collect();
    cuts.push(length);
    cuts.windows(2)
        .map(|w| word[w[0]..w[1]].to_owned())
        .collect()
}

// Ties round to the even neighbor.
fn round_half_even(x: f64) -> usize {
    let floor = x.floor();
    if x - floor == 0.5 {
        let f = floor as usize;
        if f % 2 == 0 {
            f
        } else {
            f + 1
        }
    } else {
        x.round() as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_syllable_word_splits_at_consonant_onset() {
        assert_eq!(heuristic_syllabify("rarely", 2), vec!["rare", "ly"]);
    }

    #[test]
    fn three_syllable_word_matches_nucleus_count() {
        let syllables = heuristic_syllabify("banana", 3);
        assert_eq!(syllables.len(), 3);
        assert_eq!(syllables.concat(), "banana");
    }

    #[test]
    fn mismatched_nucleus_count_falls_back_to_even_slices() {
        // One vowel cluster but two syllables expected.
        let syllables = heuristic_syllabify("blitz", 2);
        assert_eq!(syllables.len(), 2);
        assert_eq!(syllables.concat(), "blitz");
    }

    #[test]
    fn even_slice_ties_round_to_even() {
        // 5 chars over 2 slices puts the cut at 2.5, which rounds down to
        // the even neighbor rather than away from zero.
        assert_eq!(even_slices("blitz", 2), vec!["bl", "itz"]);
        // 3 over 2 puts the cut at 1.5, rounding up to 2.
        assert_eq!(even_slices("tsk", 2), vec!["ts", "k"]);
        assert_eq!(even_slices("abcd", 2), vec!["ab", "cd"]);
    }

    #[test]
    fn vowel_free_word_stays_whole() {
        assert_eq!(heuristic_syllabify("hmm", 2), vec!["hmm"]);
    }

    #[test]
    fn segments_always_reassemble_the_word() {
        for (word, n) in [("interesting", 4), ("evaluate", 4), ("speak", 1)] {
            assert_eq!(heuristic_syllabify(word, n).concat(), word);
        }
    }
}
