//! Per-participant translation settings for the current session.
//!
//! Entries live exactly as long as the participant is online: created on join
//! (or lazily on first chat), removed on quit.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Translation settings of one online participant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantSettings {
    pub translation_enabled: bool,
    /// Language code the participant reads chat in, e.g. "FR".
    pub target_language: Option<String>,
}

/// Derive a target language from a locale string.
///
/// Takes the primary subtag and uppercases it: `"en_US"` becomes `"EN"`,
/// `"pt-BR"` becomes `"PT"`. An empty locale has no language.
pub fn language_from_locale(locale: &str) -> Option<String> {
    let primary = locale.trim().split(['_', '-']).next().unwrap_or_default();
    if primary.is_empty() {
        None
    } else {
        Some(primary.to_uppercase())
    }
}

/// Shared settings table, safe to use from join/quit handlers and dispatch
/// concurrently.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    default_enabled: bool,
    entries: Arc<RwLock<HashMap<String, ParticipantSettings>>>,
}

impl SettingsStore {
    pub fn new(default_enabled: bool) -> Self {
        Self {
            default_enabled,
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    fn defaults_for(&self, locale: &str) -> ParticipantSettings {
        ParticipantSettings {
            translation_enabled: self.default_enabled,
            target_language: language_from_locale(locale),
        }
    }

    /// Create or reset a participant's settings from their locale.
    pub async fn on_join(&self, participant: &str, locale: &str) -> ParticipantSettings {
        let settings = self.defaults_for(locale);
        debug!("Initialized settings for {}: {:?}", participant, settings);
        self.entries
            .write()
            .await
            .insert(participant.to_string(), settings.clone());
        settings
    }

    /// Drop a participant's settings. Returns whether an entry existed.
    pub async fn on_quit(&self, participant: &str) -> bool {
        self.entries.write().await.remove(participant).is_some()
    }

    pub async fn get(&self, participant: &str) -> Option<ParticipantSettings> {
        self.entries.read().await.get(participant).cloned()
    }

    /// Return the participant's settings, creating defaults if absent.
    ///
    /// Existing entries are never overwritten, even when two callers race to
    /// create the same participant.
    pub async fn get_or_create(&self, participant: &str, locale: &str) -> ParticipantSettings {
        if let Some(existing) = self.get(participant).await {
            return existing;
        }

        let mut entries = self.entries.write().await;
        entries
            .entry(participant.to_string())
            .or_insert_with(|| self.defaults_for(locale))
            .clone()
    }

    /// Whether translation is on for the participant. Unknown participants
    /// count as disabled.
    pub async fn is_enabled(&self, participant: &str) -> bool {
        self.entries
            .read()
            .await
            .get(participant)
            .map(|s| s.translation_enabled)
            .unwrap_or(false)
    }

    /// Turn translation on or off for a participant.
    ///
    /// A participant without an entry gets one with no target language.
    pub async fn set_enabled(&self, participant: &str, enabled: bool) {
        let mut entries = self.entries.write().await;
        entries
            .entry(participant.to_string())
            .or_insert_with(|| ParticipantSettings {
                translation_enabled: enabled,
                target_language: None,
            })
            .translation_enabled = enabled;
    }

    /// Explicitly set the language a participant reads chat in.
    pub async fn set_target_language(&self, participant: &str, language: &str) {
        let language = Some(language.trim().to_uppercase()).filter(|l| !l.is_empty());
        let mut entries = self.entries.write().await;
        match entries.get_mut(participant) {
            Some(settings) => settings.target_language = language,
            None => {
                entries.insert(
                    participant.to_string(),
                    ParticipantSettings {
                        translation_enabled: self.default_enabled,
                        target_language: language,
                    },
                );
            }
        }
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}
