use crate::api::ApiClient;
use crate::auth::Session;

/// Work out who is looking at the page. A stored token is only trusted if
/// the backend still recognises it; otherwise the token is dropped.
pub async fn sync_auth_ui(api: &ApiClient) -> Session {
    let user = match api.tokens().get() {
        Some(_) => api.me().await.ok(),
        None => None,
    };

    match user {
        Some(user) => {
            tracing::info!("Signed in as {}", user.email);
            Session::signed_in(user)
        }
        None => {
            if let Err(e) = api.tokens().clear() {
                tracing::warn!("Failed to clear stored token: {}", e);
            }
            Session::guest()
        }
    }
}
