use serde::Serialize;

use crate::api::{RegisteredUrl, User};

#[derive(Debug, Clone, Default, Serialize)]
pub struct UserState {
    user: User,
    user_created_urls: Vec<RegisteredUrl>,
    api_error_msg: Option<String>,
}

impl UserState {
    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_authenticated
    }

    pub fn csrf_token(&self) -> &str {
        &self.user.csrf_token
    }

    pub fn user_created_urls(&self) -> &[RegisteredUrl] {
        &self.user_created_urls
    }

    pub fn api_error_msg(&self) -> Option<&str> {
        self.api_error_msg.as_deref()
    }

    pub fn find_url(&self, url: &str) -> Option<&RegisteredUrl> {
        self.user_created_urls.iter().find(|u| u.url == url)
    }

    pub fn set_user(&mut self, user: User) {
        self.user = user;
    }

    pub fn set_user_created_urls(&mut self, urls: Vec<RegisteredUrl>) {
        self.user_created_urls = urls;
        self.api_error_msg = None;
    }

    pub fn register_url(&mut self, url: RegisteredUrl) {
        self.user_created_urls.push(url);
        self.api_error_msg = None;
    }

    /// Remove the first entry whose `url` matches. Unknown urls leave the
    /// list untouched.
    pub fn unregister_url(&mut self, url: &str) -> Option<RegisteredUrl> {
        let removed = self
            .user_created_urls
            .iter()
            .position(|u| u.url == url)
            .map(|index| self.user_created_urls.remove(index));
        self.api_error_msg = None;
        removed
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.api_error_msg = Some(message.into());
    }
}
