use std::fmt;
use std::sync::Arc;

use reqwest::cookie::Jar;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Method;
use url::Url;

use crate::api::ApiFailure;

pub const SESSION_COOKIE: &str = "sessionid";
pub const CSRF_HEADER: &str = "X-CSRFToken";

/// How requests authenticate against the backend.
///
/// Browser-style sessions ride on the `sessionid` cookie and need the CSRF
/// token on mutating requests; OAuth bearer tokens do not.
#[derive(Clone, Default, PartialEq, Eq)]
pub enum Credentials {
    #[default]
    Anonymous,
    Session(String),
    Bearer(String),
}

impl Credentials {
    /// A bearer token takes precedence over a session id when both are set.
    pub fn from_parts(session_id: Option<String>, access_token: Option<String>) -> Self {
        let session_id = session_id.filter(|s| !s.trim().is_empty());
        let access_token = access_token.filter(|s| !s.trim().is_empty());
        match (session_id, access_token) {
            (_, Some(token)) => Credentials::Bearer(token.trim().to_string()),
            (Some(session), None) => Credentials::Session(session.trim().to_string()),
            (None, None) => Credentials::Anonymous,
        }
    }

    /// Cookie store shared by every request of one client, seeded with the
    /// session cookie. The server's `csrftoken` cookie lands here too.
    pub(crate) fn cookie_jar(&self, base_url: &Url) -> Arc<Jar> {
        let jar = Jar::default();
        if let Credentials::Session(session_id) = self {
            jar.add_cookie_str(&format!("{SESSION_COOKIE}={session_id}; Path=/"), base_url);
        }
        Arc::new(jar)
    }

    pub(crate) fn default_headers(&self) -> Result<HeaderMap, ApiFailure> {
        let mut headers = HeaderMap::new();
        if let Credentials::Bearer(token) = self {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| ApiFailure::new("access token contains invalid characters"))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }
        Ok(headers)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::Anonymous => f.write_str("Anonymous"),
            Credentials::Session(_) => f.write_str("Session(<redacted>)"),
            Credentials::Bearer(_) => f.write_str("Bearer(<redacted>)"),
        }
    }
}

/// Methods Django treats as unsafe, which must carry the CSRF header.
pub fn requires_csrf(method: &Method) -> bool {
    !matches!(
        *method,
        Method::GET | Method::HEAD | Method::OPTIONS | Method::TRACE
    )
}
