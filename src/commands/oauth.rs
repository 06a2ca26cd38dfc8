use validator::Validate;

use crate::api::{
    ApiClient, ApiFailure, ApiRequest, AuthorizedApp, ClientApp, ClientAppUpdate, NewClientApp,
    Page,
};
use crate::commands::{CommandContext, CommandResult};
use crate::i18n;
use crate::notifications::{self, Notification};
use crate::store::OauthState;

async fn notify(ctx: &CommandContext<'_>, notification: Notification) {
    notifications::deliver(ctx.notifier, vec![notification]).await;
}

async fn notify_failure(ctx: &CommandContext<'_>, failure: &ApiFailure) {
    let rendered = notifications::render_failure(ctx.messages, failure);
    notifications::deliver(ctx.notifier, rendered).await;
}

async fn send_registration(
    ctx: &CommandContext<'_>,
    app: &NewClientApp,
) -> Result<ClientApp, ApiFailure> {
    app.validate().map_err(|e| ApiFailure::validation(&e))?;
    let request = ApiRequest::post(ApiClient::applications_path())
        .json(app)?
        .csrf(ctx.csrf_token);
    ctx.api.call(request).await
}

pub async fn register_app(
    ctx: &CommandContext<'_>,
    state: &mut OauthState,
    app: &NewClientApp,
) -> CommandResult<ClientApp> {
    match send_registration(ctx, app).await {
        Ok(created) => {
            tracing::info!(
                client_id = %created.client_id,
                name = %created.name,
                "client app registered"
            );
            state.register_app(Some(created.clone()));
            let message = ctx.messages.t(i18n::MSG_APP_REGISTER_SUCCESS, &[created.name.as_str()]);
            notify(ctx, Notification::success(message)).await;
            Ok(created)
        }
        Err(failure) => {
            state.register_app(None);
            notify_failure(ctx, &failure).await;
            Err(failure.into())
        }
    }
}

pub async fn list_client_apps(
    ctx: &CommandContext<'_>,
    state: &mut OauthState,
    page: u32,
) -> CommandResult<()> {
    let request = ApiRequest::get(ApiClient::applications_page_path(page));
    match ctx.api.call::<Page<ClientApp>>(request).await {
        Ok(apps) => {
            tracing::debug!(page, count = apps.count, "client apps loaded");
            state.set_client_apps(apps);
            Ok(())
        }
        Err(failure) => {
            notify_failure(ctx, &failure).await;
            Err(failure.into())
        }
    }
}

async fn send_update(
    ctx: &CommandContext<'_>,
    update: &ClientAppUpdate,
) -> Result<ClientApp, ApiFailure> {
    update.validate().map_err(|e| ApiFailure::validation(&e))?;
    let request = ApiRequest::patch(ApiClient::application_path(&update.client_id))
        .json(update)?
        .csrf(ctx.csrf_token);
    ctx.api.call(request).await
}

/// Changes the redirect URL of an app.
pub async fn update_client_app(
    ctx: &CommandContext<'_>,
    state: &mut OauthState,
    update: &ClientAppUpdate,
) -> CommandResult<ClientApp> {
    let client_id = update.client_id.as_str();
    match send_update(ctx, update).await {
        Ok(updated) => {
            tracing::info!(client_id, "client app updated");
            state.update_client_app(updated.clone());
            let message = ctx.messages.t(i18n::MSG_APP_UPDATE_SUCCESS, &[client_id]);
            notify(ctx, Notification::success(message)).await;
            Ok(updated)
        }
        Err(failure) => {
            let message = ctx.messages.t(i18n::MSG_APP_UPDATE_ERROR, &[client_id]);
            notify(ctx, Notification::error(message)).await;
            Err(failure.into())
        }
    }
}

pub async fn delete_client_app(
    ctx: &CommandContext<'_>,
    state: &mut OauthState,
    client_id: &str,
) -> CommandResult<()> {
    let request = ApiRequest::delete(ApiClient::application_path(client_id)).csrf(ctx.csrf_token);
    match ctx.api.call_no_content(request).await {
        Ok(()) => {
            tracing::info!(client_id, "client app deleted");
            state.delete_client_app(client_id);
            let message = ctx.messages.t(i18n::MSG_APP_DELETED, &[client_id]);
            notify(ctx, Notification::success(message)).await;
            Ok(())
        }
        Err(failure) => {
            notify_failure(ctx, &failure).await;
            Err(failure.into())
        }
    }
}

pub async fn list_authorized_apps(
    ctx: &CommandContext<'_>,
    state: &mut OauthState,
    page: u32,
) -> CommandResult<()> {
    let request = ApiRequest::get(ApiClient::authorized_page_path(page));
    match ctx.api.call::<Page<AuthorizedApp>>(request).await {
        Ok(apps) => {
            tracing::debug!(page, count = apps.count, "authorized apps loaded");
            state.set_authorized_apps(apps);
            Ok(())
        }
        Err(failure) => {
            notify_failure(ctx, &failure).await;
            Err(failure.into())
        }
    }
}

/// Revokes a grant.
pub async fn delete_authorized_app(
    ctx: &CommandContext<'_>,
    state: &mut OauthState,
    id: i64,
) -> CommandResult<()> {
    let request = ApiRequest::delete(ApiClient::authorized_path(id)).csrf(ctx.csrf_token);
    match ctx.api.call_no_content(request).await {
        Ok(()) => {
            tracing::info!(id, "authorized app deleted");
            state.delete_authorized_app(id);
            let id = id.to_string();
            let message = ctx.messages.t(i18n::MSG_APP_DELETED, &[id.as_str()]);
            notify(ctx, Notification::success(message)).await;
            Ok(())
        }
        Err(failure) => {
            notify_failure(ctx, &failure).await;
            Err(failure.into())
        }
    }
}
