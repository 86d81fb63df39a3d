use crate::error::AuctionError;
use crate::handlers::found;
use crate::router::AppState;
use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::{Cookie, PrivateCookieJar, SameSite};
use tracing::debug;

/// Private (encrypted) cookie carrying the signed-in user's id.
pub const SESSION_COOKIE: &str = "auctions_session";

pub fn start_session(jar: PrivateCookieJar, user_id: i64) -> PrivateCookieJar {
    jar.add(
        Cookie::build((SESSION_COOKIE, user_id.to_string()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax),
    )
}

pub fn end_session(jar: PrivateCookieJar) -> PrivateCookieJar {
    jar.remove(Cookie::build(SESSION_COOKIE).path("/"))
}

/// `302` to the login page, remembering where the user was going.
pub fn login_redirect(next: &str) -> Response {
    found(&format!("/login?next={next}"))
}

// region:    --- Extractors

/// The signed-in user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: i64,
    pub username: String,
}

/// The signed-in user, if any. A session for a deleted user counts as none.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<CurrentUser>);

#[async_trait]
impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = AuctionError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = PrivateCookieJar::from_headers(&parts.headers, state.cookie_key());
        let Some(user_id) = jar
            .get(SESSION_COOKIE)
            .and_then(|cookie| cookie.value().parse::<i64>().ok())
        else {
            return Ok(Self(None));
        };

        let user = state.store().get_user(user_id).await?;
        Ok(Self(user.map(|u| CurrentUser {
            id: u.id,
            username: u.username,
        })))
    }
}

/// Requires a session; anonymous requests are redirected to `/login`.
#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let MaybeUser(user) = MaybeUser::from_request_parts(parts, state)
            .await
            .map_err(IntoResponse::into_response)?;

        user.ok_or_else(|| {
            debug!(
                "{:<12} --> anonymous request to {}",
                "Accounts",
                parts.uri.path()
            );
            login_redirect(parts.uri.path())
        })
    }
}

// endregion: --- Extractors
