//! Client-side state for the Toolhub web API: the signed-in user, the URLs
//! they registered with the crawler, and their OAuth applications.

pub mod api;
pub mod app;
pub mod auth;
pub mod commands;
pub mod config;
pub mod i18n;
pub mod logging;
pub mod notifications;
pub mod store;

#[cfg(test)]
mod testdata;

pub use api::{ApiClient, ApiFailure};
pub use app::App;
pub use commands::{CommandError, CommandResult};
pub use config::ClientConfig;
pub use store::Store;
