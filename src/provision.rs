//! Webhook provisioning for the telephony provider.
//!
//! Powers the `voiceflow-gateway set-webhook` CLI subcommand: given the
//! gateway's public URL (e.g. an ngrok tunnel), registers it as the voice
//! webhook on the configured Twilio phone number, and can list the
//! account's numbers with their current voice URLs. Creating the tunnel
//! itself stays external.
//!
//! Typical usage:
//!
//! ```text
//! $ voiceflow-gateway set-webhook --list
//! $ voiceflow-gateway set-webhook --url https://abc123.ngrok.io
//! ```

use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use crate::config::ServerConfig;

/// Route the telephony provider POSTs incoming calls to
pub const VOICE_ENDPOINT: &str = "/twilio/stream";

const TWILIO_API_BASE: &str = "https://api.twilio.com/2010-04-01";

/// Errors raised while provisioning the voice webhook
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("missing configuration: {0} must be set")]
    MissingConfig(&'static str),

    #[error("Twilio request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Twilio API error (status {status}): {body}")]
    Api { status: u16, body: String },

    #[error("phone number {0} not found on the account")]
    UnknownNumber(String),
}

/// One phone number on the Twilio account
#[derive(Debug, Clone, Deserialize)]
pub struct PhoneNumber {
    pub sid: String,
    pub phone_number: String,
    pub friendly_name: Option<String>,
    pub voice_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PhoneNumberPage {
    incoming_phone_numbers: Vec<PhoneNumber>,
}

struct Credentials<'a> {
    account_sid: &'a str,
    auth_token: &'a str,
}

fn credentials(config: &ServerConfig) -> Result<Credentials<'_>, ProvisionError> {
    let account_sid = config
        .twilio_account_sid
        .as_deref()
        .ok_or(ProvisionError::MissingConfig("TWILIO_ACCOUNT_SID"))?;
    let auth_token = config
        .twilio_auth_token
        .as_deref()
        .ok_or(ProvisionError::MissingConfig("TWILIO_AUTH_TOKEN"))?;
    Ok(Credentials {
        account_sid,
        auth_token,
    })
}

/// Full voice webhook URL for a given public base URL.
pub fn voice_webhook_url(public_url: &str) -> String {
    format!("{}{}", public_url.trim_end_matches('/'), VOICE_ENDPOINT)
}

/// List the account's phone numbers with their current voice URLs.
pub async fn list_phone_numbers(config: &ServerConfig) -> Result<Vec<PhoneNumber>, ProvisionError> {
    let creds = credentials(config)?;
    let client = reqwest::Client::builder().build()?;

    let url = format!(
        "{TWILIO_API_BASE}/Accounts/{}/IncomingPhoneNumbers.json",
        creds.account_sid
    );
    let response = client
        .get(url)
        .basic_auth(creds.account_sid, Some(creds.auth_token))
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ProvisionError::Api {
            status: status.as_u16(),
            body,
        });
    }

    let page: PhoneNumberPage = response.json().await?;
    Ok(page.incoming_phone_numbers)
}

/// Register `public_url` as the voice webhook of the configured phone number.
pub async fn set_voice_url(
    config: &ServerConfig,
    public_url: &str,
) -> Result<PhoneNumber, ProvisionError> {
    let phone_number = config
        .twilio_phone_number
        .as_deref()
        .ok_or(ProvisionError::MissingConfig("TWILIO_PHONE_NUMBER"))?;

    let number = list_phone_numbers(config)
        .await?
        .into_iter()
        .find(|n| n.phone_number == phone_number)
        .ok_or_else(|| ProvisionError::UnknownNumber(phone_number.to_string()))?;

    let voice_url = voice_webhook_url(public_url);
    let creds = credentials(config)?;
    let client = reqwest::Client::builder().build()?;

    let url = format!(
        "{TWILIO_API_BASE}/Accounts/{}/IncomingPhoneNumbers/{}.json",
        creds.account_sid, number.sid
    );
    let response = client
        .post(url)
        .basic_auth(creds.account_sid, Some(creds.auth_token))
        .form(&[("VoiceUrl", voice_url.as_str())])
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ProvisionError::Api {
            status: status.as_u16(),
            body,
        });
    }

    let updated: PhoneNumber = response.json().await?;
    info!(
        phone_number = %updated.phone_number,
        voice_url = %voice_url,
        "voice webhook updated"
    );
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_voice_webhook_url_joins_endpoint() {
        assert_eq!(
            voice_webhook_url("https://abc123.ngrok.io"),
            "https://abc123.ngrok.io/twilio/stream"
        );
        assert_eq!(
            voice_webhook_url("https://abc123.ngrok.io/"),
            "https://abc123.ngrok.io/twilio/stream"
        );
    }

    #[tokio::test]
    async fn test_missing_credentials_are_reported() {
        let config = ServerConfig::default();
        let err = list_phone_numbers(&config).await.unwrap_err();
        assert!(matches!(
            err,
            ProvisionError::MissingConfig("TWILIO_ACCOUNT_SID")
        ));
    }

    #[tokio::test]
    async fn test_set_voice_url_requires_phone_number() {
        let mut config = ServerConfig::default();
        config.twilio_account_sid = Some("AC123".to_string());
        config.twilio_auth_token = Some("token".to_string());
        let err = set_voice_url(&config, "https://example.com")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ProvisionError::MissingConfig("TWILIO_PHONE_NUMBER")
        ));
    }
}
