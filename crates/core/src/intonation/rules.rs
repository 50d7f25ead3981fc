//! Text pattern families for expected-intonation scoring.
//!
//! Three ordered families (question, statement, list). Family order matters:
//! score ties resolve to the earliest family.

use regex::Regex;

use super::IntonationError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Family {
    Question,
    Statement,
    List,
}

/// Score added per matching pattern, before family weighting.
pub const MATCH_SCORE: f64 = 0.3;

/// Weight applied to a family corroborated by the acoustic classifier.
pub const BOOSTED_WEIGHT: f64 = 1.5;

// Question patterns are matched case-insensitively, the rest as written.
const QUESTION_PATTERNS: [&str; 5] = [
    r"(?i)^(what|where|when|who|why|how|which|whose|whom)(?:\s+\w+){0,5}\b(?:\s+(?:do|does|did|is|are|was|were|have|has|had))?\b",
    r"(?i)^(?:(?:do|does|did|is|are|am|was|were|have|has|had|can|could|will|would|shall|should|may|might|must)|(?:isn't|aren't|wasn't|weren't|haven't|hasn't|hadn't|don't|doesn't|didn't))\b.*\??",
    r"(?i).*,\s*(?:isn't|aren't|wasn't|weren't|haven't|hasn't|hadn't|don't|doesn't|didn't)\s+(?:he|she|it|you|they|we|I)\b\??",
    r"(?i)\b(?:could|would|can|will)\s+you\s+(?:tell|explain|show|let\s+me\s+know)\s+(?:what|where|when|who|why|how)\b",
    r"(?i)^(?:would|do|does|did)\s+you\s+(?:prefer|want|like|need)(?:\s+to\s+\w+)?\s+(?:or)\s+",
];

const STATEMENT_PATTERNS: [&str; 5] = [
    r"^[A-Z][^.!?]*(?:because|although|though|since|when|if|unless|while|whereas)[^.!?]*(?:that|which|who)[^.!?]*\.",
    r"^[A-Z][^.!?]*(?:and|but|or|yet|so)[^.!?]*\.",
    r"\b(?:said|mentioned|explained|stated|suggested|believed|thought)\s+that\b.*\.",
    r"\b(?:is|are|am|was|were|have been|has been|had been)\s+(?:\w+ing|\w+ed)\b.*\.",
    r"^[A-Z][^.!?]*\b(?:the|a|an)\s+\w+\s+(?:is|are|was|were)\b.*\.",
];

const LIST_PATTERNS: [&str; 5] = [
    r".*(?::\s*(?:1\.|a\.|•|\*)\s*[^,;]+(?:;\s*(?:2\.|b\.|•|\*)\s*[^,;]+)+)",
    r"\b(?:both|either|neither)\b.*\b(?:and|or|nor)\b.*",
    r"\b(?:first(?:ly)?|initial(?:ly)?)[^,]*,\s*(?:second(?:ly)?|next|then)[^,]*,\s*(?:final(?:ly)?|lastly|ultimately)",
    r".*:\s*(?:[^,]+(?:\s+\([^)]+\))?(?:,\s*|$))+",
    r"\b(?:on\s+(?:the|one)\s+hand|in\s+contrast|similarly|likewise)\b.*\b(?:on\s+the\s+other\s+hand|however|whereas|while)\b",
];

#[derive(Debug)]
pub struct PatternFamily {
    pub family: Family,
    pub patterns: Vec<Regex>,
}

impl PatternFamily {
    fn compile(family: Family, sources: &[&str]) -> Result<Self, IntonationError> {
        let patterns = sources
            .iter()
            .map(|src| Regex::new(src))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { family, patterns })
    }

    /// Byte span of the first matching pattern, in declaration order.
    pub fn first_match_span(&self, text: &str) -> Option<(usize, usize)> {
        self.patterns
            .iter()
            .find_map(|re| re.find(text).map(|m| (m.start(), m.end())))
    }

    pub fn match_count(&self, text: &str) -> usize {
        self.patterns.iter().filter(|re| re.is_match(text)).count()
    }
}

pub fn compile_families() -> Result<Vec<PatternFamily>, IntonationError> {
    Ok(vec![
        PatternFamily::compile(Family::Question, &QUESTION_PATTERNS)?,
        PatternFamily::compile(Family::Statement, &STATEMENT_PATTERNS)?,
        PatternFamily::compile(Family::List, &LIST_PATTERNS)?,
    ])
}
