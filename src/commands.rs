//! The `/translator` settings command.
//!
//! Each invocation returns the reply lines to show the invoking participant.
//! Replies starting with `§c` are errors or warnings, `§a` confirmations.

use crate::credentials::{Credential, CredentialError, CredentialMode};
use crate::dispatcher::Dispatcher;
use crate::translation::Provider;
use tracing::{error, info};

pub const PERMISSION_TOGGLE: &str = "chattranslator.command.toggle";
pub const PERMISSION_SETKEY: &str = "chattranslator.command.setkey";

const USAGES: [&str; 3] = [
    "/translator <on|off>",
    "/translator setkey <deepl|google_translate|papago> <key:string>",
    "/translator lang <code>",
];

/// Who ran the command and what they are allowed to do.
#[derive(Debug, Clone, Copy)]
pub struct Invoker<'a> {
    /// `None` when the command came from something other than a participant,
    /// e.g. the server console.
    pub participant_id: Option<&'a str>,
    pub permissions: &'a [String],
}

impl Invoker<'_> {
    fn has_permission(&self, permission: &str) -> bool {
        self.permissions.iter().any(|p| p == permission)
    }
}

fn error_line(text: impl AsRef<str>) -> String {
    format!("§c{}", text.as_ref())
}

fn success_line(text: impl AsRef<str>) -> String {
    format!("§a{}", text.as_ref())
}

fn no_permission() -> Vec<String> {
    vec![error_line("You do not have permission to use this subcommand.")]
}

/// Run `/translator <args>` for `invoker`.
pub async fn handle_translator(
    dispatcher: &Dispatcher,
    invoker: Invoker<'_>,
    args: &[String],
) -> Vec<String> {
    let Some(participant) = invoker.participant_id else {
        return vec![error_line("This command can only be run by a player.")];
    };

    let Some(sub_command) = args.first().map(|a| a.to_lowercase()) else {
        let mut replies = vec![error_line("Usage:")];
        replies.extend(USAGES.iter().map(|usage| error_line(format!("- {}", usage))));
        return replies;
    };

    match sub_command.as_str() {
        "on" | "off" => {
            if !invoker.has_permission(PERMISSION_TOGGLE) {
                return no_permission();
            }
            toggle(dispatcher, participant, sub_command == "on").await
        }
        "setkey" => set_key(dispatcher, invoker, participant, &args[1..]).await,
        "lang" => {
            if !invoker.has_permission(PERMISSION_TOGGLE) {
                return no_permission();
            }
            match args.get(1).map(|code| code.trim()).filter(|code| !code.is_empty()) {
                Some(code) => {
                    dispatcher.settings().set_target_language(participant, code).await;
                    vec![success_line(format!(
                        "Chat will be translated into {}.",
                        code.to_uppercase()
                    ))]
                }
                None => vec![error_line(format!("Usage: {}", USAGES[2]))],
            }
        }
        _ => vec![error_line("Invalid subcommand.")],
    }
}

async fn toggle(dispatcher: &Dispatcher, participant: &str, enabled: bool) -> Vec<String> {
    let mut replies = Vec::new();

    if enabled && dispatcher.credentials().mode() == CredentialMode::PerParticipant {
        let provider = Provider::from_name(&dispatcher.config().translation_api);
        let stored = dispatcher
            .credentials()
            .store()
            .get(participant, provider.name())
            .await;
        let usable = stored.is_some_and(|c| c.secret().is_some() || c.pair().is_some());
        if !usable {
            replies.push(error_line(format!(
                "Warning: Translation is enabled, but you have not set an API key for '{}'.",
                provider.name()
            )));
            replies.push(error_line("Use '/translator setkey' to set your key."));
        }
    }

    dispatcher.settings().set_enabled(participant, enabled).await;
    info!(
        "Translation {} for {}",
        if enabled { "enabled" } else { "disabled" },
        participant
    );

    replies.push(success_line(if enabled {
        "Personal translation has been enabled."
    } else {
        "Personal translation has been disabled."
    }));
    replies
}

async fn set_key(
    dispatcher: &Dispatcher,
    invoker: Invoker<'_>,
    participant: &str,
    args: &[String],
) -> Vec<String> {
    if dispatcher.credentials().mode() != CredentialMode::PerParticipant {
        return vec![error_line(
            "The server is not configured to allow player-specific API keys.",
        )];
    }
    if !invoker.has_permission(PERMISSION_SETKEY) {
        return no_permission();
    }

    let [api_name, keys @ ..] = args else {
        return set_key_usage();
    };
    if keys.is_empty() {
        return set_key_usage();
    }

    let provider = Provider::from_name(api_name);
    let credential = match Credential::from_parts(&provider, keys) {
        Ok(credential) => credential,
        Err(e) => return vec![error_line(e.to_string())],
    };

    match dispatcher
        .credentials()
        .store()
        .set(participant, provider.name(), credential)
        .await
    {
        Ok(()) => {
            info!("Stored {} key for {}", provider.name(), participant);
            vec![success_line(format!(
                "Your API key for {} has been set.",
                provider.name()
            ))]
        }
        Err(CredentialError::Persist(e)) => {
            error!("Failed to save API key for {}: {:#}", participant, e);
            vec![error_line("Your API key could not be saved.")]
        }
        Err(e) => vec![error_line(e.to_string())],
    }
}

fn set_key_usage() -> Vec<String> {
    vec![
        error_line(format!("Usage: {}", USAGES[1])),
        error_line("Example: /translator setkey deepl YOUR_API_KEY"),
        error_line("Example: /translator setkey papago YOUR_CLIENT_ID YOUR_CLIENT_SECRET"),
    ]
}
