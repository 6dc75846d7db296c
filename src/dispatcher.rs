//! Chat fan-out with per-message translation caching.

use crate::config::Config;
use crate::credentials::CredentialResolver;
use crate::metrics::TranslationMetrics;
use crate::session::{format_plain, format_translated, ChatEvent, Outbox, Participant};
use crate::settings::SettingsStore;
use crate::translation::{Provider, TranslateError, TranslationClient, TranslationRequest};
use anyhow::Result;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Outcome of translating one message into one language.
#[derive(Debug, Clone)]
enum CachedTranslation {
    Translated(String),
    Failed,
}

impl CachedTranslation {
    fn text(&self) -> Option<String> {
        match self {
            CachedTranslation::Translated(text) => Some(text.clone()),
            CachedTranslation::Failed => None,
        }
    }
}

/// What happened while dispatching one chat message.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchReport {
    pub plain: usize,
    pub translated: usize,
    pub cache_hits: usize,
    pub provider_calls: usize,
    pub provider_failures: usize,
}

/// The message-level facts every recipient decision needs.
struct Message<'a> {
    provider: &'a Provider,
    sender_id: &'a str,
    sender_language: Option<&'a str>,
    text: &'a str,
}

#[derive(Clone)]
pub struct Dispatcher {
    config: Arc<Config>,
    settings: SettingsStore,
    credentials: CredentialResolver,
    client: TranslationClient,
    metrics: Arc<TranslationMetrics>,
}

impl Dispatcher {
    pub fn new(
        config: Arc<Config>,
        settings: SettingsStore,
        credentials: CredentialResolver,
        metrics: Arc<TranslationMetrics>,
    ) -> Result<Self> {
        let client = TranslationClient::from_config(&config)?;
        Ok(Self {
            config,
            settings,
            credentials,
            client,
            metrics,
        })
    }

    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    pub fn credentials(&self) -> &CredentialResolver {
        &self.credentials
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Deliver one chat message to every recipient in the event's snapshot.
    ///
    /// The event is marked handled before any translation work starts. Each
    /// distinct target language is requested from the provider at most once;
    /// failures are cached too and every affected recipient gets the original
    /// text.
    pub async fn dispatch(
        &self,
        event: &mut ChatEvent,
        outbox: &mut impl Outbox,
    ) -> DispatchReport {
        let mut report = DispatchReport::default();

        if event.is_cancelled() {
            info!(
                "Chat from {} was already cancelled, leaving it alone",
                event.sender.name
            );
            return report;
        }
        event.cancel();

        let provider = Provider::from_name(&self.config.translation_api);
        if !provider.is_supported() {
            warn!(
                "Unsupported translation_api: '{}', chat is delivered untranslated",
                provider.name()
            );
        }

        let sender = &event.sender;
        let sender_settings = self
            .settings
            .get_or_create(&sender.id, &sender.locale)
            .await;

        let message = Message {
            provider: &provider,
            sender_id: &sender.id,
            sender_language: sender_settings.target_language.as_deref(),
            text: &event.message,
        };
        let plain = format_plain(&sender.name, &event.message);
        let mut cache: HashMap<String, CachedTranslation> = HashMap::new();

        for recipient in &event.recipients {
            let translated = self
                .translation_for(recipient, &message, &mut cache, &mut report)
                .await;

            match translated {
                Some(text) => {
                    outbox.send(&recipient.id, format_translated(&sender.name, &text));
                    report.translated += 1;
                    self.metrics.record_delivery(true);
                }
                None => {
                    outbox.send(&recipient.id, plain.clone());
                    report.plain += 1;
                    self.metrics.record_delivery(false);
                }
            }
        }

        debug!("Dispatched chat from {}: {:?}", sender.name, report);
        report
    }

    /// The translated text for `recipient`, or `None` when they get the original.
    async fn translation_for(
        &self,
        recipient: &Participant,
        message: &Message<'_>,
        cache: &mut HashMap<String, CachedTranslation>,
        report: &mut DispatchReport,
    ) -> Option<String> {
        // One snapshot; recipients without an entry (e.g. just quit) get plain.
        let settings = self
            .settings
            .get(&recipient.id)
            .await
            .filter(|s| s.translation_enabled)?;
        let target = settings
            .target_language
            .filter(|lang| Some(lang.as_str()) != message.sender_language)?;

        if let Some(cached) = cache.get(&target) {
            report.cache_hits += 1;
            self.metrics.record_cache_hit();
            return cached.text();
        }
        self.metrics.record_cache_miss();

        let outcome = self.request_translation(message, &target, report).await;
        let text = outcome.text();
        cache.insert(target, outcome);
        text
    }

    /// Ask the provider once for `target`, folding every failure into
    /// [`CachedTranslation::Failed`].
    async fn request_translation(
        &self,
        message: &Message<'_>,
        target: &str,
        report: &mut DispatchReport,
    ) -> CachedTranslation {
        if !message.provider.is_supported() {
            return CachedTranslation::Failed;
        }

        let credential = self
            .credentials
            .resolve(message.provider, Some(message.sender_id))
            .await;
        let request = TranslationRequest::auto_detect(message.text, target);

        report.provider_calls += 1;
        self.metrics.record_api_call();

        let result = message
            .provider
            .translate(&self.client, &request, credential.as_ref())
            .await;

        match result {
            Ok(text) if !text.is_empty() => CachedTranslation::Translated(text),
            Ok(_) => {
                report.provider_failures += 1;
                self.metrics.record_api_failure();
                warn!(
                    "{} returned an empty translation for {}",
                    message.provider.name(),
                    target
                );
                CachedTranslation::Failed
            }
            Err(e) => {
                report.provider_failures += 1;
                self.metrics.record_api_failure();
                match &e {
                    TranslateError::Panicked(_) => error!(
                        "An unexpected error occurred translating to {} via {}: {}",
                        target,
                        message.provider.name(),
                        e
                    ),
                    TranslateError::MissingCredential(_) => debug!(
                        "Skipping translation to {}: {}",
                        target, e
                    ),
                    _ => warn!("Translation to {} failed: {}", target, e),
                }
                CachedTranslation::Failed
            }
        }
    }
}
