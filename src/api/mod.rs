pub mod client;
pub mod error;
pub mod types;

pub use client::{ApiClient, ApiRequest};
pub use error::{ApiFailure, FieldError};
pub use types::{
    AppOwner, AuthorizedApp, AuthorizedApplication, ClientApp, ClientAppUpdate, NewClientApp,
    Page, RegisteredUrl, User,
};
