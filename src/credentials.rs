//! Credentials for translation providers.
//!
//! Credentials either come from the global configuration or from a
//! per-participant store persisted as JSON, depending on the credential mode.

use crate::config::{is_unset_value, Config};
use crate::translation::{Provider, DEEPL, GOOGLE_TRANSLATE, PAPAGO};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

/// Credential material for one provider.
///
/// Serialized as a bare string for single-secret providers and as an object
/// with `client_id`/`client_secret` for providers that need both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Credential {
    Secret(String),
    Pair {
        client_id: String,
        client_secret: String,
    },
}

impl Credential {
    /// The single secret, unless it is empty or a placeholder.
    pub fn secret(&self) -> Option<&str> {
        match self {
            Credential::Secret(secret) if !is_unset_value(secret) => Some(secret),
            _ => None,
        }
    }

    /// The id/secret pair, if neither part is empty or a placeholder.
    pub fn pair(&self) -> Option<(&str, &str)> {
        match self {
            Credential::Pair {
                client_id,
                client_secret,
            } if !is_unset_value(client_id) && !is_unset_value(client_secret) => {
                Some((client_id, client_secret))
            }
            _ => None,
        }
    }

    /// Build a credential for `provider` from the parts a participant typed.
    pub fn from_parts(provider: &Provider, parts: &[String]) -> Result<Self, CredentialError> {
        let required = if provider.uses_credential_pair() { 2 } else { 1 };
        if parts.iter().take(required).any(|part| is_unset_value(part.trim())) {
            return Err(CredentialError::Placeholder {
                provider: provider.name().to_string(),
            });
        }

        if provider.uses_credential_pair() {
            match parts {
                [client_id, client_secret, ..] => Ok(Credential::Pair {
                    client_id: client_id.clone(),
                    client_secret: client_secret.clone(),
                }),
                _ => Err(CredentialError::MissingParts {
                    provider: provider.name().to_string(),
                    expected: 2,
                    got: parts.len(),
                }),
            }
        } else {
            match parts.first() {
                Some(secret) => Ok(Credential::Secret(secret.clone())),
                None => Err(CredentialError::MissingParts {
                    provider: provider.name().to_string(),
                    expected: 1,
                    got: 0,
                }),
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("{provider} needs {expected} key part(s), got {got}")]
    MissingParts {
        provider: String,
        expected: usize,
        got: usize,
    },

    #[error("{provider} key is empty or still a placeholder value")]
    Placeholder { provider: String },

    #[error(transparent)]
    Persist(#[from] anyhow::Error),
}

/// Where provider credentials come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialMode {
    /// One shared credential set from the configuration.
    Global,
    /// Each participant supplies their own credentials.
    PerParticipant,
}

impl CredentialMode {
    pub fn from_config(config: &Config) -> Self {
        if config.use_player_api_keys {
            CredentialMode::PerParticipant
        } else {
            CredentialMode::Global
        }
    }
}

type Records = BTreeMap<String, BTreeMap<String, Credential>>;

/// Per-participant credentials, keyed by participant identity then provider name.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
    records: Arc<RwLock<Records>>,
}

impl CredentialStore {
    /// Load the store from `path`. A missing file is an empty store.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let records: Records = if path.exists() {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read credentials file {}", path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse credentials file {}", path.display()))?
        } else {
            Records::new()
        };

        info!(
            "Loaded credentials for {} participants from {}",
            records.len(),
            path.display()
        );

        Ok(Self {
            path,
            records: Arc::new(RwLock::new(records)),
        })
    }

    pub async fn get(&self, participant: &str, provider: &str) -> Option<Credential> {
        let records = self.records.read().await;
        records
            .get(participant)
            .and_then(|providers| providers.get(provider))
            .cloned()
    }

    /// Store a participant's credential for `provider` and write the file.
    pub async fn set(
        &self,
        participant: &str,
        provider: &str,
        credential: Credential,
    ) -> Result<(), CredentialError> {
        let mut records = self.records.write().await;
        records
            .entry(participant.to_string())
            .or_default()
            .insert(provider.to_string(), credential);

        self.persist(&records).await?;
        Ok(())
    }

    async fn persist(&self, records: &Records) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let json = serde_json::to_string_pretty(records)
            .context("Failed to serialize credentials")?;
        tokio::fs::write(&self.path, json)
            .await
            .with_context(|| format!("Failed to write {}", self.path.display()))?;

        Ok(())
    }
}

/// Picks the credential to use for a provider call.
#[derive(Debug, Clone)]
pub struct CredentialResolver {
    mode: CredentialMode,
    global: HashMap<&'static str, Credential>,
    store: CredentialStore,
}

impl CredentialResolver {
    pub fn new(config: &Config, store: CredentialStore) -> Self {
        let mut global = HashMap::new();

        if let Some(key) = &config.deepl_api_key {
            global.insert(DEEPL, Credential::Secret(key.clone()));
        }
        if let Some(key) = &config.google_translate_api_key {
            global.insert(GOOGLE_TRANSLATE, Credential::Secret(key.clone()));
        }
        if let (Some(client_id), Some(client_secret)) =
            (&config.papago_client_id, &config.papago_client_secret)
        {
            global.insert(
                PAPAGO,
                Credential::Pair {
                    client_id: client_id.clone(),
                    client_secret: client_secret.clone(),
                },
            );
        }

        Self {
            mode: CredentialMode::from_config(config),
            global,
            store,
        }
    }

    pub fn mode(&self) -> CredentialMode {
        self.mode
    }

    pub fn store(&self) -> &CredentialStore {
        &self.store
    }

    /// Resolve the credential for `provider`.
    ///
    /// In global mode the participant is ignored. In per-participant mode an
    /// absent participant never has a credential.
    pub async fn resolve(
        &self,
        provider: &Provider,
        participant: Option<&str>,
    ) -> Option<Credential> {
        match self.mode {
            CredentialMode::Global => self.global.get(provider.name()).cloned(),
            CredentialMode::PerParticipant => match participant {
                Some(id) => self.store.get(id, provider.name()).await,
                None => None,
            },
        }
    }
}
