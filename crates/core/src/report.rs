//! Best-effort aggregate evaluation report.

use serde::{Deserialize, Serialize};

use crate::intonation::IntonationVerdict;
use crate::model::schema::{BandScore, PhonemeReport};
use crate::stress::StressError;

/// Span value meaning "position not found".
pub const SENTINEL_SPAN: (i64, i64) = (-1, -1);

/// Pipeline stage names used in diagnostics and tracing.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Stage {
    Transcribing,
    Analyzing,
    Scoring,
    Summarizing,
    Done,
    Failed,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Transcribing => "transcribing",
            Stage::Analyzing => "analyzing",
            Stage::Scoring => "scoring",
            Stage::Summarizing => "summarizing",
            Stage::Done => "done",
            Stage::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Names the sub-analysis a diagnostic belongs to.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum SubAnalysis {
    Pronunciation,
    WordStress,
    Intonation,
    Scoring,
    Advice,
}

/// Explicit absence marker for a failed sub-analysis.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StageDiagnostic {
    pub analysis: SubAnalysis,
    pub message: String,
}

/// Aggregate of everything the evaluation produced. Any sub-report may be
/// absent after a partial failure; `diagnostics` says which ones and why.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationReport {
    pub transcription: Option<String>,
    pub pronunciation: Option<PhonemeReport>,
    pub word_stress_errors: Option<Vec<StressError>>,
    pub intonation: Option<IntonationVerdict>,
    pub score: Option<BandScore>,
    pub advice: Option<Vec<String>>,
    pub diagnostics: Vec<StageDiagnostic>,
}

impl EvaluationReport {
    pub fn mark_missing(&mut self, analysis: SubAnalysis, message: impl Into<String>) {
        self.diagnostics.push(StageDiagnostic {
            analysis,
            message: message.into(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_serializes_absent_fields_as_null() {
        let mut report = EvaluationReport {
            transcription: Some("hello there".to_owned()),
            ..Default::default()
        };
        report.mark_missing(SubAnalysis::Intonation, "decode failed");
        let json = serde_json::to_value(&report).expect("serializable");
        assert_eq!(json["transcription"], "hello there");
        assert!(json["pronunciation"].is_null());
        assert_eq!(json["diagnostics"][0]["analysis"], "intonation");
    }
}
