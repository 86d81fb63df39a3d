use crate::error::AuctionError;
use crate::handlers;
use crate::store::AuctionStore;
use axum::extract::{DefaultBodyLimit, FromRef};
use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use axum_extra::extract::cookie::Key;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared by every handler: the store and the session cookie key.
#[derive(Clone)]
pub struct AppState {
    store: Arc<dyn AuctionStore>,
    cookie_key: Key,
}

impl AppState {
    pub fn new(store: Arc<dyn AuctionStore>, cookie_key: Key) -> Self {
        Self { store, cookie_key }
    }

    pub fn store(&self) -> &dyn AuctionStore {
        self.store.as_ref()
    }

    pub fn cookie_key(&self) -> Key {
        self.cookie_key.clone()
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key()
    }
}

pub fn auction_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::handle_index))
        .route(
            "/login",
            get(handlers::handle_login_page).post(handlers::handle_login),
        )
        .route("/logout", get(handlers::handle_logout))
        .route(
            "/register",
            get(handlers::handle_register_page).post(handlers::handle_register),
        )
        .route(
            "/create",
            get(handlers::handle_create_page).post(handlers::handle_create),
        )
        .route("/listing/:listing_id", get(handlers::handle_listing))
        .route("/listing/:listing_id/comment", post(handlers::handle_comment))
        .route("/listing/:listing_id/bid", post(handlers::handle_bid))
        .route(
            "/listing/:listing_id/watchlist",
            post(handlers::handle_toggle_watchlist),
        )
        .route("/listing/:listing_id/close", post(handlers::handle_close))
        .route("/categories", get(handlers::handle_categories))
        .route("/category/:name", get(handlers::handle_category))
        .route("/watchlist", get(handlers::handle_watchlist))
        .layer(DefaultBodyLimit::max(1024 * 1024))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS for the configured origin, or any origin when none is set.
pub fn cors_layer(allowed_origin: Option<&str>) -> Result<CorsLayer, AuctionError> {
    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    match allowed_origin {
        Some(origin) => {
            let origin = HeaderValue::from_str(origin)
                .map_err(|e| AuctionError::Config(format!("allowed_origin: {e}")))?;
            Ok(cors.allow_origin(origin))
        }
        None => Ok(cors.allow_origin(Any)),
    }
}
