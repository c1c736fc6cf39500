use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;

use kisan_types::User;

use crate::api::AppError;
use crate::db::repositories::UserRepository;
use crate::session::SESSION_COOKIE;
use crate::state::AppState;

/// The logged-in user, inserted into request extensions by [`require_session`]
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub user: User,
    pub token: String,
}

/// Resolve the session cookie to a user, if the session is valid
pub fn user_from_jar(state: &AppState, jar: &CookieJar) -> Option<CurrentUser> {
    let token = jar.get(SESSION_COOKIE)?.value().to_string();
    let user_id = state.get_authenticated_user_id_from_token(&token)?;

    match UserRepository::new(state.db.pool.clone()).get_by_id(&user_id) {
        Ok(Some(user)) => Some(CurrentUser { user, token }),
        Ok(None) => None,
        Err(e) => {
            tracing::error!("Failed to load session user {}: {}", user_id, e);
            None
        }
    }
}

/// Gate for every authenticated view.
///
/// Requests without a valid session are redirected to the login page
/// instead of reaching the handler.
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let jar = CookieJar::from_headers(request.headers());

    match user_from_jar(&state, &jar) {
        Some(current) => {
            request.extensions_mut().insert(current);
            next.run(request).await
        }
        None => {
            tracing::debug!("No valid session for {}, redirecting to login", request.uri());
            AppError::Unauthenticated.into_response()
        }
    }
}
