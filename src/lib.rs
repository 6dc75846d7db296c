//! Chat fan-out with per-recipient machine translation.
//!
//! A chat message is delivered to every online participant, translated into
//! each recipient's language when they have translation turned on. Each
//! distinct target language is translated at most once per message.

pub mod commands;
pub mod config;
pub mod credentials;
pub mod dispatcher;
pub mod metrics;
pub mod security;
pub mod server;
pub mod session;
pub mod settings;
pub mod translation;
