use std::convert::Infallible;

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::{
    auth::session::{session_id_from_headers, Session},
    state::AppState,
};

/// The caller's live session, if the cookie names one.
pub struct MaybeSession(pub Option<Session>);

#[async_trait]
impl FromRequestParts<AppState> for MaybeSession {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = match session_id_from_headers(&parts.headers) {
            Some(id) => state.sessions.get(id).await,
            None => None,
        };
        Ok(MaybeSession(session))
    }
}
