//! Evaluation orchestrator.
//!
//! One recording goes through four stages: transcription (fatal on failure),
//! the three analyses fanned out concurrently, band scoring, and the advice
//! summary. Only transcription can fail the run; every later failure is
//! recorded as a diagnostic and leaves its slot in the report empty.

use std::path::Path;
use std::sync::Arc;

use tokio::task::JoinError;
use tracing::{info, warn};

use crate::align::assign_spans;
use crate::audio::decode_audio;
use crate::config::{ClassifierConfig, ConfigError, PitchConfig};
use crate::intonation::{IntonationClassifier, IntonationError};
use crate::model::schema::BandScore;
use crate::model::{
    decode_payload, AudioAttachment, GenerationRequest, PromptKind, TextGenerator,
};
use crate::pitch::{extract_contour, PitchContour};
use crate::pronounce;
use crate::report::{EvaluationReport, Stage, SubAnalysis};
use crate::stress::{Lexicon, SyllableStressResolver};
use crate::transcribe::{TranscribeError, Transcriber};

#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error("transcription failed: {0}")]
    Transcription(#[from] TranscribeError),

    #[error(transparent)]
    Intonation(#[from] IntonationError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("analysis task panicked: {0}")]
    Join(#[from] JoinError),
}

pub struct Evaluator<T, G> {
    transcriber: T,
    generator: G,
    classifier: IntonationClassifier,
    resolver: SyllableStressResolver,
    pitch: PitchConfig,
}

impl<T: Transcriber, G: TextGenerator> Evaluator<T, G> {
    pub fn new(
        transcriber: T,
        generator: G,
        lexicon: Arc<Lexicon>,
        classifier: ClassifierConfig,
        pitch: PitchConfig,
    ) -> Result<Self, PipelineError> {
        pitch.validate()?;
        Ok(Self {
            transcriber,
            generator,
            classifier: IntonationClassifier::new(classifier)?,
            resolver: SyllableStressResolver::new(lexicon),
            pitch,
        })
    }

    /// Evaluate one recording end to end.
    pub async fn evaluate(&self, audio_path: &Path) -> Result<EvaluationReport, PipelineError> {
        info!(stage = %Stage::Transcribing, path = %audio_path.display());
        let transcript = match self.transcriber.transcribe(audio_path.to_path_buf()).await {
            Ok(t) => t,
            Err(e) => {
                warn!(stage = %Stage::Failed, error = %e, "transcription failed");
                return Err(e.into());
            }
        };

        let mut report = EvaluationReport {
            transcription: Some(transcript.text.clone()),
            ..Default::default()
        };

        // Decoding and pitch tracking are CPU-bound.
        let contour: Result<PitchContour, String> = {
            let path = audio_path.to_path_buf();
            let cfg = self.pitch;
            tokio::task::spawn_blocking(move || {
                decode_audio(&path)
                    .map(|audio| extract_contour(&audio, &cfg))
                    .map_err(|e| e.to_string())
            })
            .await?
        };

        info!(stage = %Stage::Analyzing, words = transcript.words.len());
        let (pronunciation, stress, intonation) = tokio::join!(
            pronounce::assess(&self.generator, &transcript.text),
            async {
                contour
                    .as_ref()
                    .map(|c| self.resolver.resolve(&transcript.words, c))
                    .map_err(Clone::clone)
            },
            async {
                contour
                    .as_ref()
                    .map(|c| self.classifier.assess(&transcript.text, c))
                    .map_err(Clone::clone)
            },
        );

        match pronunciation {
            Ok(mut phonemes) => {
                assign_spans(&transcript.text, &mut phonemes.phoneme_error_details);
                report.pronunciation = Some(phonemes);
            }
            Err(e) => {
                warn!(error = %e, "pronunciation assessment failed");
                report.mark_missing(SubAnalysis::Pronunciation, e.to_string());
            }
        }
        match stress {
            Ok(mut errors) => {
                assign_spans(&transcript.text, &mut errors);
                report.word_stress_errors = Some(errors);
            }
            Err(message) => {
                warn!(error = %message, "word stress analysis skipped");
                report.mark_missing(SubAnalysis::WordStress, message);
            }
        }
        match intonation {
            Ok(verdict) => report.intonation = Some(verdict),
            Err(message) => {
                warn!(error = %message, "intonation analysis skipped");
                report.mark_missing(SubAnalysis::Intonation, message);
            }
        }

        info!(stage = %Stage::Scoring);
        let (score, advice) = tokio::join!(
            self.grade_recording(audio_path, &transcript.text),
            self.summarize_advice(&report),
        );
        match score {
            Ok(score) => report.score = Some(score),
            Err(message) => {
                warn!(error = %message, "band scoring failed");
                report.mark_missing(SubAnalysis::Scoring, message);
            }
        }
        match advice {
            Ok(advice) => report.advice = Some(advice),
            Err(message) => {
                warn!(error = %message, "advice summary failed");
                report.mark_missing(SubAnalysis::Advice, message);
            }
        }

        info!(stage = %Stage::Done, diagnostics = report.diagnostics.len());
        Ok(report)
    }

    async fn grade_recording(&self, audio_path: &Path, transcript: &str) -> Result<BandScore, String> {
        let bytes = tokio::fs::read(audio_path)
            .await
            .map_err(|e| format!("reading {}: {e}", audio_path.display()))?;
        let attachment = AudioAttachment::from_bytes(&bytes, audio_format(audio_path));
        let input = format!("Transcript of the attached recording: {transcript}");
        let raw = self
            .generator
            .generate(GenerationRequest::with_audio(
                PromptKind::BandScore,
                input,
                attachment,
            ))
            .await
            .map_err(|e| e.to_string())?;
        decode_payload(&raw).map_err(|e| e.to_string())
    }

    /// The summary prompt sees the report as it stands after the analyses,
    /// without the band score computed alongside it.
    async fn summarize_advice(&self, report: &EvaluationReport) -> Result<Vec<String>, String> {
        info!(stage = %Stage::Summarizing);
        let input = serde_json::to_string(report).map_err(|e| e.to_string())?;
        let raw = self
            .generator
            .generate(GenerationRequest::text(PromptKind::AdviceSummary, input))
            .await
            .map_err(|e| e.to_string())?;
        decode_payload(&raw).map_err(|e| e.to_string())
    }
}

fn audio_format(path: &Path) -> &str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("mp3") => "mp3",
        _ => "wav",
    }
}
