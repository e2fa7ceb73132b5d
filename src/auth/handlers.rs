use axum::{
    extract::{Query, State},
    http::header,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use time::Duration;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{ErrorFlag, LoginForm, RegisterForm},
        extractors::MaybeSession,
        services::{authenticate, normalize_email, register_user, AuthError, RegisterError},
        session::{clear_session_cookie, session_cookie},
    },
    error::AppError,
    state::AppState,
    views,
};

pub const LOGIN_PATH: &str = "/login";
pub const HOME_PATH: &str = "/home";
const LOGIN_FAILED_PATH: &str = "/login?error=1";
const REGISTER_INVALID_PATH: &str = "/register?error=invalid";
const REGISTER_EXISTS_PATH: &str = "/register?error=exists";

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", get(register_page).post(register))
        .route("/login", get(login_page).post(login))
        .route("/logout", post(logout))
}

pub fn home_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(|| async { Redirect::to(LOGIN_PATH) }))
        .route("/home", get(home))
}

#[instrument(skip(state, form))]
pub async fn register(
    State(state): State<AppState>,
    Form(form): Form<RegisterForm>,
) -> Result<Redirect, AppError> {
    let email = normalize_email(&form.email);

    match register_user(state.users.as_ref(), form).await {
        Ok(()) => {
            info!(email = %email, "user registered");
            Ok(Redirect::to(LOGIN_PATH))
        }
        Err(RegisterError::InvalidInput) => Ok(Redirect::to(REGISTER_INVALID_PATH)),
        Err(RegisterError::EmailTaken) => {
            warn!(email = %email, "email already registered");
            Ok(Redirect::to(REGISTER_EXISTS_PATH))
        }
        Err(RegisterError::Hash(e)) => Err(AppError::Hash(e)),
        Err(RegisterError::Store(e)) => Err(e.into()),
    }
}

#[instrument(skip(state, previous, form))]
pub async fn login(
    State(state): State<AppState>,
    MaybeSession(previous): MaybeSession,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let email = normalize_email(&form.email);

    let user = match authenticate(state.users.as_ref(), form).await {
        Ok(user) => user,
        Err(AuthError::InvalidCredentials) => {
            warn!(email = %email, "login rejected");
            return Ok(Redirect::to(LOGIN_FAILED_PATH).into_response());
        }
        Err(AuthError::Store(e)) => return Err(e.into()),
    };

    if let Some(old) = previous {
        state.sessions.remove(old.id).await;
    }

    let session = state.sessions.create(&user.name).await;
    let cookie = session_cookie(
        &session,
        Duration::minutes(state.config.session.ttl_minutes),
        state.config.session.cookie_secure,
    );

    info!(email = %user.email, session_id = %session.id, "user logged in");
    Ok(([(header::SET_COOKIE, cookie)], Redirect::to(HOME_PATH)).into_response())
}

#[instrument(skip(state, session))]
pub async fn logout(
    State(state): State<AppState>,
    MaybeSession(session): MaybeSession,
) -> impl IntoResponse {
    if let Some(session) = session {
        state.sessions.remove(session.id).await;
        info!(session_id = %session.id, "user logged out");
    }
    let cookie = clear_session_cookie(state.config.session.cookie_secure);
    ([(header::SET_COOKIE, cookie)], Redirect::to(LOGIN_PATH))
}

pub async fn login_page(Query(flag): Query<ErrorFlag>) -> Html<String> {
    Html(views::login_page(flag.error.is_some()))
}

pub async fn register_page(Query(flag): Query<ErrorFlag>) -> Html<String> {
    Html(views::register_page(flag.error.as_deref()))
}

pub async fn home(MaybeSession(session): MaybeSession) -> Response {
    match session {
        Some(session) => Html(views::home_page(&session.name)).into_response(),
        None => Redirect::to(LOGIN_PATH).into_response(),
    }
}
