use crate::api::types::NewRegisteredUrl;
use crate::api::{ApiClient, ApiFailure, ApiRequest, Page, RegisteredUrl, User};
use crate::commands::{CommandError, CommandResult};
use crate::store::UserState;

/// Record the failure in the shared error string and hand it back.
fn fail(state: &mut UserState, failure: ApiFailure) -> CommandError {
    state.set_error(failure.to_string());
    CommandError::Api(failure)
}

fn require_authenticated(state: &UserState, action: &str) -> CommandResult<()> {
    if state.is_authenticated() {
        Ok(())
    } else {
        tracing::debug!(action, "skipped: not authenticated");
        Err(CommandError::Unauthorized)
    }
}

pub async fn get_user_info(api: &ApiClient, state: &mut UserState) -> CommandResult<()> {
    match api.call::<User>(ApiRequest::get(ApiClient::user_path())).await {
        Ok(user) => {
            tracing::debug!(authenticated = user.is_authenticated, "user info loaded");
            state.set_user(user);
            Ok(())
        }
        Err(failure) => Err(fail(state, failure)),
    }
}

pub async fn register_url(
    api: &ApiClient,
    state: &mut UserState,
    url: &str,
) -> CommandResult<RegisteredUrl> {
    require_authenticated(state, "register_url")?;

    let csrf_token = state.csrf_token().to_string();
    let body = NewRegisteredUrl { url };
    let request = match ApiRequest::post(ApiClient::crawler_urls_path()).json(&body) {
        Ok(request) => request.csrf(&csrf_token),
        Err(failure) => return Err(fail(state, failure)),
    };

    match api.call::<RegisteredUrl>(request).await {
        Ok(created) => {
            tracing::info!(id = created.id, url = %created.url, "url registered");
            state.register_url(created.clone());
            Ok(created)
        }
        Err(failure) => Err(fail(state, failure)),
    }
}

/// Returns the removed local entry, if the url was in the list.
pub async fn unregister_url(
    api: &ApiClient,
    state: &mut UserState,
    url: &RegisteredUrl,
) -> CommandResult<Option<RegisteredUrl>> {
    require_authenticated(state, "unregister_url")?;

    let csrf_token = state.csrf_token().to_string();
    let request = ApiRequest::delete(ApiClient::crawler_url_path(url.id)).csrf(&csrf_token);

    match api.call_no_content(request).await {
        Ok(()) => {
            tracing::info!(id = url.id, url = %url.url, "url unregistered");
            Ok(state.unregister_url(&url.url))
        }
        Err(failure) => Err(fail(state, failure)),
    }
}

pub async fn get_urls_created_by_user(api: &ApiClient, state: &mut UserState) -> CommandResult<()> {
    require_authenticated(state, "get_urls_created_by_user")?;

    let request = ApiRequest::get(ApiClient::crawler_urls_self_path());
    match api.call::<Page<RegisteredUrl>>(request).await {
        Ok(page) => {
            tracing::debug!(count = page.count, "user urls loaded");
            state.set_user_created_urls(page.results);
            Ok(())
        }
        Err(failure) => Err(fail(state, failure)),
    }
}
