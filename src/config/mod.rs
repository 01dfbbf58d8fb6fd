//! Configuration module for the VoiceFlow Gateway
//!
//! Handles server configuration from .env files, YAML files and environment
//! variables. Priority: YAML > ENV vars > .env values > defaults.
//!
//! # Example
//! ```rust,no_run
//! use voiceflow_gateway::config::ServerConfig;
//! use std::path::PathBuf;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Load from environment variables only
//! let config = ServerConfig::from_env()?;
//!
//! // Load from YAML file with environment variable fallback
//! let config_path = PathBuf::from("config.yaml");
//! let config = ServerConfig::from_file(&config_path)?;
//!
//! println!("Server listening on {}", config.address());
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};
use std::str::FromStr;

use thiserror::Error;
use zeroize::Zeroize;

mod yaml;

pub use yaml::YamlConfig;

/// Default ElevenLabs API endpoint
pub const DEFAULT_ELEVENLABS_BASE_URL: &str = "https://api.elevenlabs.io";

/// Default voice used for synthesized replies
pub const DEFAULT_TTS_VOICE_ID: &str = "9BWtsMINqrJLrRacOk9x";

/// Default ElevenLabs model used for synthesized replies
pub const DEFAULT_TTS_MODEL_ID: &str = "eleven_multilingual_v2";

/// Errors raised while loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// TLS configuration for HTTPS and WSS
#[derive(Debug, Clone)]
pub struct TlsConfig {
    /// Path to the TLS certificate file (PEM format)
    pub cert_path: PathBuf,
    /// Path to the TLS private key file (PEM format)
    pub key_path: PathBuf,
}

/// Server configuration
///
/// Contains all configuration needed to run the VoiceFlow Gateway, including:
/// - Server settings (host, port, TLS)
/// - ElevenLabs credentials and synthesis settings
/// - Twilio account settings (incoming-call greeting, webhook provisioning)
/// - Audio log settings
/// - Security settings (CORS, rate limiting)
#[derive(Debug, Clone)]
pub struct ServerConfig {
    // Server settings
    pub host: String,
    pub port: u16,

    // TLS configuration (optional)
    pub tls: Option<TlsConfig>,

    /// ElevenLabs API key; sessions cannot synthesize audio without it
    pub elevenlabs_api_key: Option<String>,
    /// ElevenLabs API base URL, overridable for self-hosted proxies and tests
    pub elevenlabs_base_url: String,

    // Synthesis settings
    /// Voice used for every synthesized reply
    pub tts_voice_id: String,
    /// Model used for every synthesized reply
    pub tts_model_id: String,
    /// Acknowledgment text synthesized in place of transcribing inbound media
    pub media_reply_text: String,
    /// Upper bound on a single synthesis request, in seconds
    pub synthesis_timeout_seconds: u64,

    // Incoming-call greeting
    pub greeting_text: String,
    pub greeting_voice: String,
    pub greeting_language: String,

    // Twilio account settings (webhook provisioning only)
    pub twilio_account_sid: Option<String>,
    pub twilio_auth_token: Option<String>,
    pub twilio_phone_number: Option<String>,

    /// Maximum number of audio log entries retained in memory
    pub audio_log_capacity: usize,

    // Security configuration
    /// CORS allowed origins (comma-separated list or "*" for all)
    /// Default: None (CORS disabled, same-origin only)
    pub cors_allowed_origins: Option<String>,

    // Rate limiting configuration
    /// Maximum requests per second per IP address
    pub rate_limit_requests_per_second: u32,
    /// Maximum burst size for rate limiting
    pub rate_limit_burst_size: u32,
}

/// Zeroize secret fields when the config is dropped so credentials do not
/// linger in freed memory.
impl Drop for ServerConfig {
    fn drop(&mut self) {
        if let Some(key) = self.elevenlabs_api_key.as_mut() {
            key.zeroize();
        }
        if let Some(token) = self.twilio_auth_token.as_mut() {
            token.zeroize();
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            tls: None,
            elevenlabs_api_key: None,
            elevenlabs_base_url: DEFAULT_ELEVENLABS_BASE_URL.to_string(),
            tts_voice_id: DEFAULT_TTS_VOICE_ID.to_string(),
            tts_model_id: DEFAULT_TTS_MODEL_ID.to_string(),
            media_reply_text: "Message received".to_string(),
            synthesis_timeout_seconds: 30,
            greeting_text: "Welcome to the voice response system.".to_string(),
            greeting_voice: "alice".to_string(),
            greeting_language: "en-US".to_string(),
            twilio_account_sid: None,
            twilio_auth_token: None,
            twilio_phone_number: None,
            audio_log_capacity: 1000,
            cors_allowed_origins: None,
            rate_limit_requests_per_second: 60,
            rate_limit_burst_size: 10,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset. `.env` files are honored when the caller
    /// runs `dotenvy::dotenv()` beforehand (done in `main`).
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self::base_from_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file. Values present in the file
    /// override environment variables; anything absent falls back to the
    /// environment and then to defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let yaml: YamlConfig = serde_yaml::from_str(&contents)?;

        let mut config = Self::base_from_env()?;
        config.apply_yaml(yaml);
        config.validate()?;
        Ok(config)
    }

    /// Address the server binds to, as `host:port`.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Whether TLS is configured for this server.
    pub fn is_tls_enabled(&self) -> bool {
        self.tls.is_some()
    }

    fn base_from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let tls = match (env_opt("TLS_CERT_PATH"), env_opt("TLS_KEY_PATH")) {
            (Some(cert), Some(key)) => Some(TlsConfig {
                cert_path: PathBuf::from(cert),
                key_path: PathBuf::from(key),
            }),
            (None, None) => None,
            _ => {
                return Err(ConfigError::Invalid(
                    "TLS_CERT_PATH and TLS_KEY_PATH must be set together".to_string(),
                ));
            }
        };

        Ok(Self {
            host: env_opt("HOST").unwrap_or(defaults.host.clone()),
            port: env_parse("PORT")?.unwrap_or(defaults.port),
            tls,
            elevenlabs_api_key: env_opt("ELEVENLABS_API_KEY"),
            elevenlabs_base_url: env_opt("ELEVENLABS_BASE_URL")
                .unwrap_or(defaults.elevenlabs_base_url.clone()),
            tts_voice_id: env_opt("TTS_VOICE_ID").unwrap_or(defaults.tts_voice_id.clone()),
            tts_model_id: env_opt("TTS_MODEL_ID").unwrap_or(defaults.tts_model_id.clone()),
            media_reply_text: env_opt("MEDIA_REPLY_TEXT")
                .unwrap_or(defaults.media_reply_text.clone()),
            synthesis_timeout_seconds: env_parse("SYNTHESIS_TIMEOUT_SECONDS")?
                .unwrap_or(defaults.synthesis_timeout_seconds),
            greeting_text: env_opt("GREETING_TEXT").unwrap_or(defaults.greeting_text.clone()),
            greeting_voice: env_opt("GREETING_VOICE").unwrap_or(defaults.greeting_voice.clone()),
            greeting_language: env_opt("GREETING_LANGUAGE")
                .unwrap_or(defaults.greeting_language.clone()),
            twilio_account_sid: env_opt("TWILIO_ACCOUNT_SID"),
            twilio_auth_token: env_opt("TWILIO_AUTH_TOKEN"),
            twilio_phone_number: env_opt("TWILIO_PHONE_NUMBER"),
            audio_log_capacity: env_parse("AUDIO_LOG_CAPACITY")?
                .unwrap_or(defaults.audio_log_capacity),
            cors_allowed_origins: env_opt("CORS_ALLOWED_ORIGINS"),
            rate_limit_requests_per_second: env_parse("RATE_LIMIT_REQUESTS_PER_SECOND")?
                .unwrap_or(defaults.rate_limit_requests_per_second),
            rate_limit_burst_size: env_parse("RATE_LIMIT_BURST_SIZE")?
                .unwrap_or(defaults.rate_limit_burst_size),
        })
    }

    fn apply_yaml(&mut self, yaml: YamlConfig) {
        if let Some(server) = yaml.server {
            if let Some(host) = server.host {
                self.host = host;
            }
            if let Some(port) = server.port {
                self.port = port;
            }
        }
        if let Some(tls) = yaml.tls
            && let (Some(cert_path), Some(key_path)) = (tls.cert_path, tls.key_path)
        {
            self.tls = Some(TlsConfig {
                cert_path,
                key_path,
            });
        }
        if let Some(providers) = yaml.providers {
            if let Some(key) = providers.elevenlabs_api_key {
                self.elevenlabs_api_key = Some(key);
            }
            if let Some(base_url) = providers.elevenlabs_base_url {
                self.elevenlabs_base_url = base_url;
            }
        }
        if let Some(synthesis) = yaml.synthesis {
            if let Some(voice_id) = synthesis.voice_id {
                self.tts_voice_id = voice_id;
            }
            if let Some(model_id) = synthesis.model_id {
                self.tts_model_id = model_id;
            }
            if let Some(reply_text) = synthesis.reply_text {
                self.media_reply_text = reply_text;
            }
            if let Some(timeout) = synthesis.timeout_seconds {
                self.synthesis_timeout_seconds = timeout;
            }
        }
        if let Some(greeting) = yaml.greeting {
            if let Some(text) = greeting.text {
                self.greeting_text = text;
            }
            if let Some(voice) = greeting.voice {
                self.greeting_voice = voice;
            }
            if let Some(language) = greeting.language {
                self.greeting_language = language;
            }
        }
        if let Some(twilio) = yaml.twilio {
            if let Some(account_sid) = twilio.account_sid {
                self.twilio_account_sid = Some(account_sid);
            }
            if let Some(auth_token) = twilio.auth_token {
                self.twilio_auth_token = Some(auth_token);
            }
            if let Some(phone_number) = twilio.phone_number {
                self.twilio_phone_number = Some(phone_number);
            }
        }
        if let Some(audio_log) = yaml.audio_log
            && let Some(capacity) = audio_log.capacity
        {
            self.audio_log_capacity = capacity;
        }
        if let Some(security) = yaml.security {
            if let Some(origins) = security.cors_allowed_origins {
                self.cors_allowed_origins = Some(origins);
            }
            if let Some(rps) = security.rate_limit_requests_per_second {
                self.rate_limit_requests_per_second = rps;
            }
            if let Some(burst) = security.rate_limit_burst_size {
                self.rate_limit_burst_size = burst;
            }
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::Invalid("port must be non-zero".to_string()));
        }
        if self.synthesis_timeout_seconds == 0 {
            return Err(ConfigError::Invalid(
                "synthesis_timeout_seconds must be non-zero".to_string(),
            ));
        }
        if self.audio_log_capacity == 0 {
            return Err(ConfigError::Invalid(
                "audio_log_capacity must be non-zero".to_string(),
            ));
        }
        if self.tts_voice_id.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "tts_voice_id must not be empty".to_string(),
            ));
        }
        if self.tts_model_id.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "tts_model_id must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

fn env_opt(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.is_empty())
}

fn env_parse<T>(name: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env_opt(name) {
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|e| ConfigError::Invalid(format!("{name}: {e}"))),
        None => Ok(None),
    }
}
