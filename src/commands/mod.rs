//! Named operations: one HTTP call each, folded into the store.

pub mod oauth;
pub mod user;

use crate::api::{ApiClient, ApiFailure};
use crate::i18n::Messages;
use crate::notifications::Notifier;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    /// The command needs a signed-in user; no request was sent.
    #[error("not authenticated")]
    Unauthorized,
    #[error(transparent)]
    Api(#[from] ApiFailure),
}

pub type CommandResult<T> = Result<T, CommandError>;

/// Everything an OAuth command needs besides the state it mutates.
pub struct CommandContext<'a> {
    pub api: &'a ApiClient,
    pub notifier: &'a dyn Notifier,
    pub messages: &'a Messages,
    pub csrf_token: &'a str,
}
