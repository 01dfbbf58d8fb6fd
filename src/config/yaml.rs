use serde::Deserialize;
use std::path::PathBuf;

/// Complete YAML configuration structure
///
/// Represents the full configuration that can be loaded from a YAML file.
/// All fields are optional to allow partial configuration; anything left
/// unset falls back to the environment / defaults.
///
/// # Example YAML structure
/// ```yaml
/// server:
///   host: "0.0.0.0"
///   port: 8000
///
/// providers:
///   elevenlabs_api_key: "your-elevenlabs-key"
///
/// synthesis:
///   voice_id: "9BWtsMINqrJLrRacOk9x"
///   model_id: "eleven_multilingual_v2"
///   reply_text: "Message received"
///   timeout_seconds: 30
///
/// greeting:
///   text: "Welcome to the voice response system."
///   voice: "alice"
///   language: "en-US"
///
/// twilio:
///   account_sid: "ACxxxxxxxx"
///   auth_token: "your-auth-token"
///   phone_number: "+18125625570"
///
/// audio_log:
///   capacity: 1000
///
/// security:
///   cors_allowed_origins: "*"
///   rate_limit_requests_per_second: 60
///   rate_limit_burst_size: 10
/// ```
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct YamlConfig {
    pub server: Option<ServerYaml>,
    pub tls: Option<TlsYaml>,
    pub providers: Option<ProvidersYaml>,
    pub synthesis: Option<SynthesisYaml>,
    pub greeting: Option<GreetingYaml>,
    pub twilio: Option<TwilioYaml>,
    pub audio_log: Option<AudioLogYaml>,
    pub security: Option<SecurityYaml>,
}

/// Server configuration from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ServerYaml {
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// TLS configuration from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct TlsYaml {
    pub cert_path: Option<PathBuf>,
    pub key_path: Option<PathBuf>,
}

/// Provider credentials from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ProvidersYaml {
    pub elevenlabs_api_key: Option<String>,
    pub elevenlabs_base_url: Option<String>,
}

/// Speech synthesis settings from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct SynthesisYaml {
    pub voice_id: Option<String>,
    pub model_id: Option<String>,
    pub reply_text: Option<String>,
    pub timeout_seconds: Option<u64>,
}

/// Voice greeting settings from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct GreetingYaml {
    pub text: Option<String>,
    pub voice: Option<String>,
    pub language: Option<String>,
}

/// Twilio account settings from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct TwilioYaml {
    pub account_sid: Option<String>,
    pub auth_token: Option<String>,
    pub phone_number: Option<String>,
}

/// Audio log settings from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AudioLogYaml {
    pub capacity: Option<usize>,
}

/// Security settings from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct SecurityYaml {
    pub cors_allowed_origins: Option<String>,
    pub rate_limit_requests_per_second: Option<u32>,
    pub rate_limit_burst_size: Option<u32>,
}
