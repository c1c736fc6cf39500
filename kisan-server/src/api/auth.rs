use axum::{
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::Utc;
use uuid::Uuid;

use kisan_types::{LoginForm, RegisterForm, User};

use super::AppResult;
use crate::db::{is_unique_violation, repositories::UserRepository};
use crate::middleware::user_from_jar;
use crate::password::{spawn_hash_password, spawn_verify_password};
use crate::session::SESSION_COOKIE;
use crate::state::AppState;
use crate::views;

const INVALID_CREDENTIALS: &str = "Invalid phone number or password";

fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

/// Start a session for the user and send them to the dashboard
fn start_session(state: &AppState, jar: CookieJar, user: &User) -> AppResult<Response> {
    let token = state.session_manager.create_session(user.id)?;
    Ok((jar.add(session_cookie(token)), Redirect::to("/dashboard")).into_response())
}

/// GET / and GET /login
pub async fn login_page(State(state): State<AppState>, jar: CookieJar) -> Response {
    if user_from_jar(&state, &jar).is_some() {
        return Redirect::to("/dashboard").into_response();
    }
    Html(views::login_page(None)).into_response()
}

/// POST / and POST /login
///
/// Unknown phone numbers get a phone-only account on first login.
/// Accounts registered with a password must supply it.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> AppResult<Response> {
    let phone = form.phone.trim();
    if phone.is_empty() {
        return Ok(Html(views::login_page(Some("Please enter your mobile number"))).into_response());
    }

    let repo = UserRepository::new(state.db.pool.clone());

    let user = match repo.get_by_phone(phone)? {
        Some(existing) => {
            if let Some(stored_hash) = existing.password_hash.clone() {
                let password = form.password.clone().unwrap_or_default();
                if !spawn_verify_password(password, stored_hash).await? {
                    tracing::info!("Rejected login for user {}", existing.id);
                    return Ok(Html(views::login_page(Some(INVALID_CREDENTIALS))).into_response());
                }
            }
            existing
        }
        None => repo.find_or_create_by_phone(phone)?.0,
    };

    start_session(&state, jar, &user)
}

/// GET /register
pub async fn register_page() -> Html<String> {
    Html(views::register_page(None))
}

/// POST /register
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<RegisterForm>,
) -> AppResult<Response> {
    let name = form.name.trim();
    let phone = form.phone.trim();
    if name.is_empty() || phone.is_empty() || form.password.is_empty() {
        return Ok(Html(views::register_page(Some("All fields are required"))).into_response());
    }

    let user = User {
        id: Uuid::new_v4(),
        phone: phone.to_string(),
        name: name.to_string(),
        password_hash: Some(spawn_hash_password(form.password.clone()).await?),
        join_date: Utc::now(),
    };

    let repo = UserRepository::new(state.db.pool.clone());
    match repo.create(&user) {
        Ok(()) => {
            tracing::info!("Registered user {}", user.id);
            start_session(&state, jar, &user)
        }
        Err(e) if is_unique_violation(&e) => Ok(Html(views::register_page(Some(
            "This phone number is already registered",
        )))
        .into_response()),
        Err(e) => Err(e.into()),
    }
}

/// GET /logout
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> AppResult<Response> {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        state.session_manager.delete_session(cookie.value())?;
    }
    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    Ok((jar, Redirect::to("/login")).into_response())
}
