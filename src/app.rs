use std::sync::Arc;

use anyhow::{Context, Result};

use crate::api::{ApiClient, ClientApp, ClientAppUpdate, NewClientApp, RegisteredUrl};
use crate::commands::{self, CommandContext, CommandResult};
use crate::config::ClientConfig;
use crate::i18n::Messages;
use crate::notifications::Notifier;
use crate::store::{OauthState, Store};

/// Owns everything a command touches. Commands take `&mut self`, so two
/// commands never interleave on one store.
pub struct App {
    api: ApiClient,
    store: Store,
    notifier: Arc<dyn Notifier>,
    messages: Messages,
}

impl App {
    pub fn new(api: ApiClient, notifier: Arc<dyn Notifier>, messages: Messages) -> Self {
        Self {
            api,
            store: Store::default(),
            notifier,
            messages,
        }
    }

    pub fn from_config(config: &ClientConfig, notifier: Arc<dyn Notifier>) -> Result<Self> {
        let api = ApiClient::new(config).context("failed to create API client")?;
        let messages = match &config.messages_path {
            Some(path) => Messages::load(path)?,
            None => Messages::english(),
        };
        Ok(Self::new(api, notifier, messages))
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn messages(&self) -> &Messages {
        &self.messages
    }

    fn oauth(&mut self) -> (CommandContext<'_>, &mut OauthState) {
        let Store { user, oauth } = &mut self.store;
        let user = &*user;
        let ctx = CommandContext {
            api: &self.api,
            notifier: self.notifier.as_ref(),
            messages: &self.messages,
            csrf_token: user.csrf_token(),
        };
        (ctx, oauth)
    }

    pub async fn get_user_info(&mut self) -> CommandResult<()> {
        commands::user::get_user_info(&self.api, &mut self.store.user).await
    }

    pub async fn register_url(&mut self, url: &str) -> CommandResult<RegisteredUrl> {
        commands::user::register_url(&self.api, &mut self.store.user, url).await
    }

    pub async fn unregister_url(
        &mut self,
        url: &RegisteredUrl,
    ) -> CommandResult<Option<RegisteredUrl>> {
        commands::user::unregister_url(&self.api, &mut self.store.user, url).await
    }

    pub async fn get_urls_created_by_user(&mut self) -> CommandResult<()> {
        commands::user::get_urls_created_by_user(&self.api, &mut self.store.user).await
    }

    pub async fn register_app(&mut self, app: &NewClientApp) -> CommandResult<ClientApp> {
        let (ctx, state) = self.oauth();
        commands::oauth::register_app(&ctx, state, app).await
    }

    pub async fn list_client_apps(&mut self, page: u32) -> CommandResult<()> {
        let (ctx, state) = self.oauth();
        commands::oauth::list_client_apps(&ctx, state, page).await
    }

    pub async fn update_client_app(
        &mut self,
        update: &ClientAppUpdate,
    ) -> CommandResult<ClientApp> {
        let (ctx, state) = self.oauth();
        commands::oauth::update_client_app(&ctx, state, update).await
    }

    pub async fn delete_client_app(&mut self, client_id: &str) -> CommandResult<()> {
        let (ctx, state) = self.oauth();
        commands::oauth::delete_client_app(&ctx, state, client_id).await
    }

    pub async fn list_authorized_apps(&mut self, page: u32) -> CommandResult<()> {
        let (ctx, state) = self.oauth();
        commands::oauth::list_authorized_apps(&ctx, state, page).await
    }

    pub async fn delete_authorized_app(&mut self, id: i64) -> CommandResult<()> {
        let (ctx, state) = self.oauth();
        commands::oauth::delete_authorized_app(&ctx, state, id).await
    }
}
