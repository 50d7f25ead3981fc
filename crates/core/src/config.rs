use serde::{Deserialize, Serialize};
use std::{fmt, path::PathBuf};

pub const DEFAULT_TAU: f64 = 0.15;
pub const DEFAULT_ACOUSTIC_GATE: f64 = 0.7;
pub const DEFAULT_FAMILY_GATE: f64 = 0.5;

pub const DEFAULT_SERVICE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_TRANSCRIPTION_MODEL: &str = "whisper-1";
pub const DEFAULT_GENERATION_MODEL: &str = "gpt-4o";

pub const ENV_API_KEY: &str = "SPEAKEVAL_API_KEY";
pub const ENV_SERVICE_URL: &str = "SPEAKEVAL_SERVICE_URL";
pub const ENV_LEXICON_PATH: &str = "SPEAKEVAL_LEXICON";

#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new<S: Into<String>>(value: S) -> Result<Self, ConfigError> {
        let v = value.into();
        if v.trim().is_empty() {
            return Err(ConfigError::EmptyApiKey);
        }
        Ok(Self(v))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(**redacted**)")
    }
}

/// Thresholds for the intonation classifier. The defaults are the
/// empirically chosen values; all of them are tunable.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct ClassifierConfig {
    /// Slope/range/variance threshold for the acoustic rule ladder.
    pub tau: f64,
    /// Acoustic confidence above which a family weight is boosted.
    pub acoustic_gate: f64,
    /// Minimum family score for a localized error span.
    pub family_gate: f64,
}

impl ClassifierConfig {
    pub fn with_tau(tau: f64) -> Result<Self, ConfigError> {
        if !(tau > 0.0) {
            return Err(ConfigError::NonPositiveTau);
        }
        Ok(Self {
            tau,
            ..Self::default()
        })
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            tau: DEFAULT_TAU,
            acoustic_gate: DEFAULT_ACOUSTIC_GATE,
            family_gate: DEFAULT_FAMILY_GATE,
        }
    }
}

/// Parameters for fundamental-frequency estimation.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct PitchConfig {
    /// Lowest analyzable frequency in Hz.
    pub fmin: f64,
    /// Highest analyzable frequency in Hz.
    pub fmax: f64,
    /// Analysis window in samples.
    pub frame_len: usize,
    /// Hop between frames in samples.
    pub hop_len: usize,
    /// Aperiodicity threshold; frames above it are reported unvoiced.
    pub threshold: f64,
}

impl PitchConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.fmin > 0.0) || self.fmax <= self.fmin {
            return Err(ConfigError::InvalidPitchRange {
                fmin: self.fmin,
                fmax: self.fmax,
            });
        }
        if self.frame_len == 0 || self.hop_len == 0 {
            return Err(ConfigError::ZeroFrame);
        }
        Ok(())
    }
}

impl Default for PitchConfig {
    fn default() -> Self {
        Self {
            fmin: 65.0,
            fmax: 2000.0,
            frame_len: 1024,
            hop_len: 256,
            threshold: 0.12,
        }
    }
}

/// Where the external collaborators live and which models they run.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Endpoints {
    pub service_url: String,
    pub transcription_model: String,
    pub generation_model: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            service_url: DEFAULT_SERVICE_URL.to_owned(),
            transcription_model: DEFAULT_TRANSCRIPTION_MODEL.to_owned(),
            generation_model: DEFAULT_GENERATION_MODEL.to_owned(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    pub audio_path: PathBuf,
    pub endpoints: Endpoints,
    pub api_key: Option<ApiKey>,
    pub classifier: ClassifierConfig,
    pub pitch: PitchConfig,
    pub lexicon_path: Option<PathBuf>,
    pub hyphenation_path: Option<PathBuf>,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("api key must not be empty")]
    EmptyApiKey,
    #[error("tau must be > 0")]
    NonPositiveTau,
    #[error("invalid pitch range {fmin}..{fmax} Hz")]
    InvalidPitchRange { fmin: f64, fmax: f64 },
    #[error("frame and hop lengths must be > 0")]
    ZeroFrame,
}

pub trait Env {
    fn var(&self, key: &str) -> Option<String>;
}

#[derive(Clone, Debug, Default)]
pub struct StdEnv;

impl Env for StdEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

#[derive(Clone, Debug, Default)]
pub struct MapEnv {
    vars: std::collections::BTreeMap<String, String>,
}

impl MapEnv {
    pub fn with_var(mut self, key: &str, value: &str) -> Self {
        self.vars.insert(key.to_owned(), value.to_owned());
        self
    }
}

impl Env for MapEnv {
    fn var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

pub fn resolve_api_key(
    cli_value: Option<String>,
    env_key: &str,
    env: &impl Env,
) -> Result<Option<ApiKey>, ConfigError> {
    match cli_value {
        Some(v) => Ok(Some(ApiKey::new(v)?)),
        None => match env.var(env_key) {
            Some(v) => Ok(Some(ApiKey::new(v)?)),
            None => Ok(None),
        },
    }
}

pub fn resolve_string_with_default(
    cli_value: Option<String>,
    env_key: &str,
    env: &impl Env,
    default: &str,
) -> String {
    match cli_value {
        Some(v) => v,
        None => env.var(env_key).unwrap_or_else(|| default.to_owned()),
    }
}

pub fn resolve_optional_string(
    cli_value: Option<String>,
    env_key: &str,
    env: &impl Env,
) -> Option<String> {
    match cli_value {
        Some(v) => Some(v),
        None => env.var(env_key),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_key_cli_takes_precedence_over_env() {
        let env = MapEnv::default().with_var(ENV_API_KEY, "env-key");
        let key = resolve_api_key(Some("cli-key".to_owned()), ENV_API_KEY, &env)
            .expect("valid key")
            .expect("present");
        assert_eq!(key.expose(), "cli-key");
    }

    #[test]
    fn api_key_env_used_when_cli_missing() {
        let env = MapEnv::default().with_var(ENV_API_KEY, "env-key");
        let key = resolve_api_key(None, ENV_API_KEY, &env)
            .expect("valid key")
            .expect("present");
        assert_eq!(key.expose(), "env-key");
    }

    #[test]
    fn api_key_debug_is_redacted() {
        let key = ApiKey::new("secret").expect("valid key");
        assert_eq!(format!("{key:?}"), "ApiKey(**redacted**)");
    }

    #[test]
    fn classifier_rejects_non_positive_tau() {
        assert_eq!(
            ClassifierConfig::with_tau(0.0),
            Err(ConfigError::NonPositiveTau)
        );
        let cfg = ClassifierConfig::with_tau(0.2).expect("valid tau");
        assert_eq!(cfg.tau, 0.2);
        assert_eq!(cfg.acoustic_gate, DEFAULT_ACOUSTIC_GATE);
    }

    #[test]
    fn pitch_config_validation() {
        assert!(PitchConfig::default().validate().is_ok());
        let bad = PitchConfig {
            fmin: 500.0,
            fmax: 100.0,
            ..PitchConfig::default()
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn resolve_string_with_default_env_used_when_cli_missing() {
        let env = MapEnv::default().with_var(ENV_SERVICE_URL, "http://env");
        let v = resolve_string_with_default(None, ENV_SERVICE_URL, &env, "http://def");
        assert_eq!(v, "http://env");
    }

    #[test]
    fn resolve_string_with_default_default_used_when_both_missing() {
        let env = MapEnv::default();
        let v = resolve_string_with_default(None, ENV_SERVICE_URL, &env, "http://def");
        assert_eq!(v, "http://def");
    }
}
