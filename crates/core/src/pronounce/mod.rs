//! Phoneme-level pronunciation assessment.
//!
//! Transcripts of mispronounced speech tend to contain the words the
//! recognizer heard, not the ones the speaker meant. Assessment is therefore
//! two generation calls: first reconstruct the intended sentence from the
//! transcript, then compare actual against intended phoneme by phoneme.

use tracing::debug;

use crate::model::schema::PhonemeReport;
use crate::model::{decode_payload, GenerationRequest, ModelError, PromptKind, TextGenerator};

pub async fn assess<G: TextGenerator>(
    generator: &G,
    transcript: &str,
) -> Result<PhonemeReport, ModelError> {
    let intended = generator
        .generate(GenerationRequest::text(PromptKind::IntendedText, transcript))
        .await?;
    let intended = intended.trim();
    debug!(%intended, "reconstructed intended sentence");

    let comparison_input = format!(
        "Actual sentence (as transcribed): {transcript}\nIntended sentence: {intended}"
    );
    let raw = generator
        .generate(GenerationRequest::text(
            PromptKind::PhonemeComparison,
            comparison_input,
        ))
        .await?;
    decode_payload(&raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ScriptedGenerator;

    const COMPARISON_REPLY: &str = r#"{
        "actualPhoneticTranscription": "/aɪ ˈrɛrli laɪk ɪt/",
        "expectedPhoneticTranscription": "/aɪ ˈrɪli laɪk ɪt/",
        "phonemeErrorDetails": [{
            "transcribedWord": "rarely",
            "expectedWord": "really",
            "expectedPronunciation": "/ˈrɪli/",
            "actualPronunciation": "/ˈrɛrli/",
            "errorType": "substitution",
            "errorStartIndex": 2,
            "errorEndIndex": 3
        }]
    }"#;

    #[tokio::test]
    async fn runs_both_steps_in_order() {
        let generator = ScriptedGenerator::new()
            .respond(PromptKind::IntendedText, "I really like it")
            .respond(PromptKind::PhonemeComparison, COMPARISON_REPLY);

        let report = assess(&generator, "I rarely like it").await.expect("report");
        assert_eq!(report.phoneme_error_details.len(), 1);
        assert_eq!(report.phoneme_error_details[0].expected_word, "really");
        assert_eq!(
            generator.calls(),
            vec![PromptKind::IntendedText, PromptKind::PhonemeComparison]
        );
    }

    #[tokio::test]
    async fn intended_text_failure_skips_comparison() {
        let generator =
            ScriptedGenerator::new().fail(PromptKind::IntendedText, "service unavailable");

        let err = assess(&generator, "I rarely like it").await.unwrap_err();
        assert!(matches!(err, ModelError::Api { .. }));
        assert_eq!(generator.calls(), vec![PromptKind::IntendedText]);
    }

    #[tokio::test]
    async fn malformed_comparison_is_rejected() {
        let generator = ScriptedGenerator::new()
            .respond(PromptKind::IntendedText, "I really like it")
            .respond(PromptKind::PhonemeComparison, "sounds great overall!");

        let err = assess(&generator, "I rarely like it").await.unwrap_err();
        assert!(matches!(err, ModelError::InvalidResponse(_)));
    }
}
