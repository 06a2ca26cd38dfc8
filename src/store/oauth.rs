use serde::Serialize;

use crate::api::{AuthorizedApp, ClientApp, Page};

#[derive(Debug, Clone, Default, Serialize)]
pub struct OauthState {
    client_apps: Vec<ClientApp>,
    num_client_apps: u64,
    authorized_apps: Vec<AuthorizedApp>,
    num_authorized_apps: u64,
    client_app_created: Option<ClientApp>,
}

impl OauthState {
    pub fn client_apps(&self) -> &[ClientApp] {
        &self.client_apps
    }

    pub fn num_client_apps(&self) -> u64 {
        self.num_client_apps
    }

    pub fn authorized_apps(&self) -> &[AuthorizedApp] {
        &self.authorized_apps
    }

    pub fn num_authorized_apps(&self) -> u64 {
        self.num_authorized_apps
    }

    /// The last successfully registered app, the only record that carries
    /// its client secret.
    pub fn client_app_created(&self) -> Option<&ClientApp> {
        self.client_app_created.as_ref()
    }

    /// `None` records a failed registration.
    pub fn register_app(&mut self, app: Option<ClientApp>) {
        if let Some(app) = &app {
            self.client_apps.push(app.clone());
            self.num_client_apps += 1;
        }
        self.client_app_created = app;
    }

    /// Replace the visible page. The counter is the server's total, not the
    /// page length.
    pub fn set_client_apps(&mut self, page: Page<ClientApp>) {
        self.client_apps = page.results;
        self.num_client_apps = page.count;
    }

    /// Returns false when the app is not on the current page.
    pub fn update_client_app(&mut self, app: ClientApp) -> bool {
        match self
            .client_apps
            .iter_mut()
            .find(|existing| existing.client_id == app.client_id)
        {
            Some(existing) => {
                *existing = app;
                true
            }
            None => false,
        }
    }

    /// Called after the server confirmed the deletion, so the total drops by
    /// one even when the app is not on the current page.
    pub fn delete_client_app(&mut self, client_id: &str) -> Option<ClientApp> {
        let removed = self
            .client_apps
            .iter()
            .position(|app| app.client_id == client_id)
            .map(|index| self.client_apps.remove(index));
        self.num_client_apps = self.num_client_apps.saturating_sub(1);
        removed
    }

    pub fn set_authorized_apps(&mut self, page: Page<AuthorizedApp>) {
        self.authorized_apps = page.results;
        self.num_authorized_apps = page.count;
    }

    pub fn delete_authorized_app(&mut self, id: i64) -> Option<AuthorizedApp> {
        let removed = self
            .authorized_apps
            .iter()
            .position(|app| app.id == id)
            .map(|index| self.authorized_apps.remove(index));
        self.num_authorized_apps = self.num_authorized_apps.saturating_sub(1);
        removed
    }
}
