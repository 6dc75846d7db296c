//! Translation providers.
//!
//! Every supported provider is a variant of [`Provider`], selected by the
//! configured `translation_api` name. All of them share one contract: given a
//! text, a target language and an optional source language, return the
//! translated text or a [`TranslateError`]. Providers never log and never
//! retry; the caller decides what a failure means.
//!
//! # Example
//!
//! ```rust,ignore
//! let client = TranslationClient::from_config(&config)?;
//! let provider = Provider::from_name(&config.translation_api);
//! let request = TranslationRequest::auto_detect("Hello", "FR");
//! let text = provider.translate(&client, &request, credential.as_ref()).await?;
//! ```

mod deepl;
mod google;
mod papago;

use crate::config::Config;
use crate::credentials::Credential;
use anyhow::{Context, Result};
use futures::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

/// Provider name for DeepL in configuration and credential files.
pub const DEEPL: &str = "deepl";
/// Provider name for Google Translate.
pub const GOOGLE_TRANSLATE: &str = "google_translate";
/// Provider name for Papago.
pub const PAPAGO: &str = "papago";

/// Errors a provider call can end with.
#[derive(Debug, thiserror::Error)]
pub enum TranslateError {
    #[error("no usable {0} credential configured")]
    MissingCredential(&'static str),

    #[error("{provider} API error ({status}): {body}")]
    Api {
        provider: &'static str,
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("failed to send request to {provider}: {source}")]
    Transport {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to parse {provider} response: {detail}")]
    Parse {
        provider: &'static str,
        detail: String,
    },

    #[error("unsupported translation_api: '{0}'")]
    Unsupported(String),

    #[error("translation aborted unexpectedly: {0}")]
    Panicked(String),
}

/// The configured translation backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Provider {
    DeepL,
    GoogleTranslate,
    Papago,
    /// A configured name that matches no known provider.
    Unsupported(String),
}

impl Provider {
    /// Select a provider by its configuration name (case-insensitive).
    pub fn from_name(name: &str) -> Provider {
        match name.trim().to_lowercase().as_str() {
            DEEPL => Provider::DeepL,
            GOOGLE_TRANSLATE => Provider::GoogleTranslate,
            PAPAGO => Provider::Papago,
            other => Provider::Unsupported(other.to_string()),
        }
    }

    /// Configuration name of this provider.
    pub fn name(&self) -> &str {
        match self {
            Provider::DeepL => DEEPL,
            Provider::GoogleTranslate => GOOGLE_TRANSLATE,
            Provider::Papago => PAPAGO,
            Provider::Unsupported(name) => name,
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, Provider::Unsupported(_))
    }

    /// Whether credentials for this provider come as an id/secret pair.
    pub fn uses_credential_pair(&self) -> bool {
        matches!(self, Provider::Papago)
    }

    /// Translate one text.
    ///
    /// A panic inside the provider call is caught here and returned as
    /// [`TranslateError::Panicked`], so callers only ever see a `Result`.
    pub async fn translate(
        &self,
        client: &TranslationClient,
        request: &TranslationRequest<'_>,
        credential: Option<&Credential>,
    ) -> Result<String, TranslateError> {
        catch_panics(self.call(client, request, credential)).await
    }

    async fn call(
        &self,
        client: &TranslationClient,
        request: &TranslationRequest<'_>,
        credential: Option<&Credential>,
    ) -> Result<String, TranslateError> {
        match self {
            Provider::DeepL => {
                let key = credential
                    .and_then(Credential::secret)
                    .ok_or(TranslateError::MissingCredential(DEEPL))?;
                deepl::translate(&client.http, &client.deepl_url, key, request).await
            }
            Provider::GoogleTranslate => {
                let key = credential
                    .and_then(Credential::secret)
                    .ok_or(TranslateError::MissingCredential(GOOGLE_TRANSLATE))?;
                google::translate(&client.http, &client.google_translate_url, key, request).await
            }
            Provider::Papago => {
                let (client_id, client_secret) = credential
                    .and_then(Credential::pair)
                    .ok_or(TranslateError::MissingCredential(PAPAGO))?;
                papago::translate(
                    &client.http,
                    &client.papago_url,
                    client_id,
                    client_secret,
                    request,
                )
                .await
            }
            Provider::Unsupported(name) => Err(TranslateError::Unsupported(name.clone())),
        }
    }
}

/// One translation call.
#[derive(Debug, Clone, Copy)]
pub struct TranslationRequest<'a> {
    pub text: &'a str,
    pub target_lang: &'a str,
    /// `None` lets the provider detect the source language.
    pub source_lang: Option<&'a str>,
}

impl<'a> TranslationRequest<'a> {
    pub fn auto_detect(text: &'a str, target_lang: &'a str) -> Self {
        Self {
            text,
            target_lang,
            source_lang: None,
        }
    }
}

/// Shared HTTP client and provider endpoints.
#[derive(Debug, Clone)]
pub struct TranslationClient {
    http: reqwest::Client,
    deepl_url: String,
    google_translate_url: String,
    papago_url: String,
}

impl TranslationClient {
    /// Build a client whose every request is bounded by the configured timeout.
    pub fn from_config(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.translation_timeout_secs))
            .build()
            .context("Failed to build translation HTTP client")?;

        Ok(Self {
            http,
            deepl_url: config.deepl_api_url.clone(),
            google_translate_url: config.google_translate_api_url.clone(),
            papago_url: config.papago_api_url.clone(),
        })
    }
}

/// Read the error body of a non-success response into an [`TranslateError::Api`].
async fn api_error(provider: &'static str, response: reqwest::Response) -> TranslateError {
    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|e| format!("<failed to read body: {}>", e));
    TranslateError::Api {
        provider,
        status,
        body,
    }
}

/// Run a provider call, turning a panic into [`TranslateError::Panicked`].
async fn catch_panics<F>(call: F) -> Result<String, TranslateError>
where
    F: Future<Output = Result<String, TranslateError>>,
{
    AssertUnwindSafe(call)
        .catch_unwind()
        .await
        .unwrap_or_else(|payload| Err(TranslateError::Panicked(panic_message(&*payload))))
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
