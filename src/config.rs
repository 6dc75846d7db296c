use anyhow::{Context, Result};

/// Placeholder prefix written by older default config files for unset keys.
const PLACEHOLDER_PREFIX: &str = "YOUR_";

#[derive(Debug, Clone)]
pub struct Config {
    // Provider selection
    pub translation_api: String,
    pub use_player_api_keys: bool,
    pub translation_enabled_by_default: bool,

    // Global credentials
    pub deepl_api_key: Option<String>,
    pub google_translate_api_key: Option<String>,
    pub papago_client_id: Option<String>,
    pub papago_client_secret: Option<String>,

    // Provider endpoints
    pub deepl_api_url: String,
    pub google_translate_api_url: String,
    pub papago_api_url: String,
    pub translation_timeout_secs: u64,

    // Storage
    pub player_keys_file: String,

    // Server
    pub port: u16,
    pub api_key: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            translation_api: std::env::var("TRANSLATION_API")
                .map(|v| v.trim().to_lowercase())
                .unwrap_or_else(|_| "google_translate".to_string()),
            use_player_api_keys: parse_bool("USE_PLAYER_API_KEYS", false)?,
            translation_enabled_by_default: parse_bool("TRANSLATION_ENABLED_BY_DEFAULT", true)?,

            deepl_api_key: optional_secret("DEEPL_API_KEY"),
            google_translate_api_key: optional_secret("GOOGLE_TRANSLATE_API_KEY"),
            papago_client_id: optional_secret("PAPAGO_CLIENT_ID"),
            papago_client_secret: optional_secret("PAPAGO_CLIENT_SECRET"),

            deepl_api_url: std::env::var("DEEPL_API_URL")
                .unwrap_or_else(|_| "https://api-free.deepl.com/v2/translate".to_string()),
            google_translate_api_url: std::env::var("GOOGLE_TRANSLATE_API_URL").unwrap_or_else(
                |_| "https://translation.googleapis.com/language/translate/v2".to_string(),
            ),
            papago_api_url: std::env::var("PAPAGO_API_URL")
                .unwrap_or_else(|_| "https://openapi.naver.com/v1/papago/n2mt".to_string()),
            translation_timeout_secs: parse_timeout_secs()?,

            player_keys_file: std::env::var("PLAYER_KEYS_FILE")
                .unwrap_or_else(|_| "data/player_keys.json".to_string()),

            port: std::env::var("PORT")
                .ok()
                .map(|v| v.parse().context("PORT must be a valid port number"))
                .transpose()?
                .unwrap_or(8080),
            api_key: optional_secret("API_KEY"),
        })
    }
}

/// Read a secret, treating empty and placeholder values as unset.
fn optional_secret(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !is_unset_value(v))
}

/// Empty strings and `YOUR_…` placeholders stand for "no value".
pub(crate) fn is_unset_value(value: &str) -> bool {
    value.is_empty() || value.starts_with(PLACEHOLDER_PREFIX)
}

fn parse_timeout_secs() -> Result<u64> {
    let Ok(value) = std::env::var("TRANSLATION_TIMEOUT_SECS") else {
        return Ok(10);
    };
    let secs: u64 = value
        .trim()
        .parse()
        .context("TRANSLATION_TIMEOUT_SECS must be a whole number of seconds")?;
    if secs == 0 {
        anyhow::bail!("TRANSLATION_TIMEOUT_SECS must be greater than 0");
    }
    Ok(secs)
}

fn parse_bool(name: &str, default: bool) -> Result<bool> {
    match std::env::var(name) {
        Ok(v) => match v.trim().to_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            other => anyhow::bail!("{} must be a boolean, got '{}'", name, other),
        },
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
pub(crate) fn test_config() -> Config {
    Config {
        translation_api: "deepl".to_string(),
        use_player_api_keys: false,
        translation_enabled_by_default: true,
        deepl_api_key: Some("test-deepl-key".to_string()),
        google_translate_api_key: Some("test-google-key".to_string()),
        papago_client_id: Some("test-papago-id".to_string()),
        papago_client_secret: Some("test-papago-secret".to_string()),
        deepl_api_url: "http://127.0.0.1:9/v2/translate".to_string(),
        google_translate_api_url: "http://127.0.0.1:9/language/translate/v2".to_string(),
        papago_api_url: "http://127.0.0.1:9/v1/papago/n2mt".to_string(),
        translation_timeout_secs: 5,
        player_keys_file: "player_keys.json".to_string(),
        port: 0,
        api_key: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: &[&str] = &[
        "TRANSLATION_API",
        "USE_PLAYER_API_KEYS",
        "TRANSLATION_ENABLED_BY_DEFAULT",
        "DEEPL_API_KEY",
        "GOOGLE_TRANSLATE_API_KEY",
        "PAPAGO_CLIENT_ID",
        "PAPAGO_CLIENT_SECRET",
        "TRANSLATION_TIMEOUT_SECS",
        "PORT",
        "API_KEY",
    ];

    fn clear_env() {
        for var in VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_defaults() {
        clear_env();
        let config = Config::from_env().expect("Should load with defaults");

        assert_eq!(config.translation_api, "google_translate");
        assert!(!config.use_player_api_keys);
        assert!(config.translation_enabled_by_default);
        assert!(config.deepl_api_key.is_none());
        assert_eq!(config.translation_timeout_secs, 10);
        assert_eq!(config.port, 8080);
        assert!(config.api_key.is_none());
    }

    #[test]
    #[serial]
    fn test_placeholder_keys_load_as_unset() {
        clear_env();
        std::env::set_var("DEEPL_API_KEY", "YOUR_DEEPL_API_KEY");
        std::env::set_var("GOOGLE_TRANSLATE_API_KEY", "   ");
        std::env::set_var("PAPAGO_CLIENT_ID", "real-id");

        let config = Config::from_env().expect("Should load");
        assert!(config.deepl_api_key.is_none());
        assert!(config.google_translate_api_key.is_none());
        assert_eq!(config.papago_client_id.as_deref(), Some("real-id"));
        clear_env();
    }

    #[test]
    #[serial]
    fn test_provider_name_is_normalized() {
        clear_env();
        std::env::set_var("TRANSLATION_API", "  DeepL ");
        let config = Config::from_env().expect("Should load");
        assert_eq!(config.translation_api, "deepl");
        clear_env();
    }

    #[test]
    #[serial]
    fn test_boolean_flags() {
        clear_env();
        std::env::set_var("USE_PLAYER_API_KEYS", "true");
        std::env::set_var("TRANSLATION_ENABLED_BY_DEFAULT", "off");
        let config = Config::from_env().expect("Should load");
        assert!(config.use_player_api_keys);
        assert!(!config.translation_enabled_by_default);
        clear_env();
    }

    #[test]
    #[serial]
    fn test_invalid_boolean_is_an_error() {
        clear_env();
        std::env::set_var("USE_PLAYER_API_KEYS", "maybe");
        let result = Config::from_env();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("USE_PLAYER_API_KEYS"));
        clear_env();
    }

    #[test]
    #[serial]
    fn test_timeout_parsing() {
        clear_env();
        std::env::set_var("TRANSLATION_TIMEOUT_SECS", "3");
        assert_eq!(Config::from_env().expect("Should load").translation_timeout_secs, 3);

        std::env::set_var("TRANSLATION_TIMEOUT_SECS", "soon");
        assert!(Config::from_env().is_err());

        std::env::set_var("TRANSLATION_TIMEOUT_SECS", "0");
        let err = Config::from_env().unwrap_err();
        assert!(err.to_string().contains("greater than 0"));
        clear_env();
    }

    #[test]
    #[serial]
    fn test_invalid_port_is_an_error() {
        clear_env();
        std::env::set_var("PORT", "not-a-port");
        assert!(Config::from_env().is_err());
        clear_env();
    }
}
