#![deny(warnings)]

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use speakeval_core::config::{
    resolve_api_key, resolve_optional_string, resolve_string_with_default, AppConfig,
    ClassifierConfig, Endpoints, PitchConfig, StdEnv, DEFAULT_GENERATION_MODEL,
    DEFAULT_SERVICE_URL, DEFAULT_TAU, DEFAULT_TRANSCRIPTION_MODEL, ENV_API_KEY, ENV_LEXICON_PATH,
    ENV_SERVICE_URL,
};
use speakeval_core::model::ChatGenerator;
use speakeval_core::pipeline::Evaluator;
use speakeval_core::stress::Lexicon;
use speakeval_core::transcribe::HttpTranscriber;

#[derive(Parser, Debug)]
#[command(name = "speakeval")]
#[command(about = "Spoken-English pronunciation, stress and intonation evaluation")]
struct Args {
    /// Recording to evaluate (wav or mp3).
    audio: PathBuf,

    /// Pronunciation dictionary in CMUdict format. Without it, word stress
    /// analysis finds no words and reports nothing.
    #[arg(long)]
    lexicon: Option<PathBuf>,

    /// Optional hyphenation list (`ex-am-ple`, one word per line).
    #[arg(long)]
    hyphenations: Option<PathBuf>,

    #[arg(long)]
    api_key: Option<String>,

    #[arg(long)]
    service_url: Option<String>,

    #[arg(long, default_value = DEFAULT_TRANSCRIPTION_MODEL)]
    transcription_model: String,

    #[arg(long, default_value = DEFAULT_GENERATION_MODEL)]
    generation_model: String,

    /// Slope threshold for the intonation contour labels.
    #[arg(long, default_value_t = DEFAULT_TAU)]
    tau: f64,

    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level)?;

    let env = StdEnv;
    let cfg = build_config(args, &env)?;

    tracing::info!(
        audio = %cfg.audio_path.display(),
        service_url = %cfg.endpoints.service_url,
        "config loaded"
    );

    run_evaluation(cfg).await
}

async fn run_evaluation(cfg: AppConfig) -> anyhow::Result<()> {
    let lexicon = match &cfg.lexicon_path {
        Some(path) => Lexicon::from_paths(path, cfg.hyphenation_path.as_deref())
            .with_context(|| format!("loading lexicon from {}", path.display()))?,
        None => {
            tracing::warn!("no lexicon given, word stress analysis will report nothing");
            Lexicon::from_strs("", None)
        }
    };

    let api_key = cfg.api_key.as_ref().map(|k| k.expose().to_owned());
    let transcriber = HttpTranscriber::new(
        cfg.endpoints.service_url.clone(),
        api_key.clone(),
        cfg.endpoints.transcription_model.clone(),
    );
    let generator = ChatGenerator::new(
        cfg.endpoints.service_url.clone(),
        api_key,
        cfg.endpoints.generation_model.clone(),
    );

    let evaluator = Evaluator::new(
        transcriber,
        generator,
        Arc::new(lexicon),
        cfg.classifier,
        cfg.pitch,
    )?;
    let report = evaluator.evaluate(&cfg.audio_path).await?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn init_tracing(level: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(
            level
                .parse()
                .with_context(|| format!("invalid --log-level: {level}"))?,
        )
        .from_env_lossy();

    tracing_subscriber::fmt().with_env_filter(filter).init();
    Ok(())
}

fn build_config(args: Args, env: &impl speakeval_core::config::Env) -> anyhow::Result<AppConfig> {
    anyhow::ensure!(
        args.audio.is_file(),
        "audio file not found: {}",
        args.audio.display()
    );

    let classifier = ClassifierConfig::with_tau(args.tau)?;
    let api_key = resolve_api_key(args.api_key, ENV_API_KEY, env)?;

    let endpoints = Endpoints {
        service_url: resolve_string_with_default(
            args.service_url,
            ENV_SERVICE_URL,
            env,
            DEFAULT_SERVICE_URL,
        ),
        transcription_model: args.transcription_model,
        generation_model: args.generation_model,
    };

    let lexicon_path = resolve_optional_string(
        args.lexicon.map(|p| p.to_string_lossy().into_owned()),
        ENV_LEXICON_PATH,
        env,
    )
    .map(PathBuf::from);

    Ok(AppConfig {
        audio_path: args.audio,
        endpoints,
        api_key,
        classifier,
        pitch: PitchConfig::default(),
        lexicon_path,
        hyphenation_path: args.hyphenations,
    })
}
