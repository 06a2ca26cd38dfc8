//! In-memory mirror of the server records this client works with.
//!
//! Fields are private; every change goes through a mutation method so the
//! list counters cannot drift from the splices that accompany them.

pub mod oauth;
pub mod user;

use serde::Serialize;

pub use oauth::OauthState;
pub use user::UserState;

#[derive(Debug, Clone, Default, Serialize)]
pub struct Store {
    pub user: UserState,
    pub oauth: OauthState,
}
