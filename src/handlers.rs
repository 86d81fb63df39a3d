// region:    --- Imports
use crate::accounts::session::{end_session, start_session};
use crate::accounts::{self, CurrentUser, MaybeUser};
use crate::bidding::commands::{self, CloseAuctionCommand, PlaceBidCommand};
use crate::error::AuctionError;
use crate::forms::{
    self, BidForm, CommentForm, FieldErrors, FieldState, ListingForm, LoginForm, RegisterForm,
};
use crate::query;
use crate::router::AppState;
use crate::views::{AuthPage, CategoriesPage, CreatePage, IndexPage, ListingPage};
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Form, Json};
use axum_extra::extract::cookie::PrivateCookieJar;
use serde::Deserialize;
use tracing::info;

// endregion: --- Imports

/// `302 Found` to `location`.
pub fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

fn listing_url(listing_id: i64) -> String {
    format!("/listing/{listing_id}")
}

#[derive(Debug, Default, Deserialize)]
pub struct NextParam {
    next: Option<String>,
}

impl NextParam {
    /// Local path to return to after login; anything else goes home.
    fn target(&self) -> &str {
        match self.next.as_deref() {
            Some(path) if path.starts_with('/') && !path.starts_with("//") => path,
            _ => "/",
        }
    }
}

// region:    --- Account Handlers

/// Empty login form.
pub async fn handle_login_page() -> Json<AuthPage> {
    Json(AuthPage::default())
}

/// Check credentials and start a session.
pub async fn handle_login(
    State(state): State<AppState>,
    Query(next): Query<NextParam>,
    jar: PrivateCookieJar,
    Form(form): Form<LoginForm>,
) -> Result<Response, AuctionError> {
    info!("{:<12} --> login attempt: {}", "Handler", form.username);
    match accounts::login(state.store(), &form).await {
        Ok(user) => Ok((start_session(jar, user.id), found(next.target())).into_response()),
        Err(e @ AuctionError::InvalidCredentials) => {
            Ok(Json(AuthPage::with_message(e.to_string())).into_response())
        }
        Err(e) => Err(e),
    }
}

/// Clear the session.
pub async fn handle_logout(jar: PrivateCookieJar) -> Response {
    info!("{:<12} --> logout", "Handler");
    (end_session(jar), found("/")).into_response()
}

/// Empty registration form.
pub async fn handle_register_page() -> Json<AuthPage> {
    Json(AuthPage::default())
}

/// Create an account and sign it in.
pub async fn handle_register(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    Form(form): Form<RegisterForm>,
) -> Result<Response, AuctionError> {
    info!("{:<12} --> register: {}", "Handler", form.username);
    match accounts::register(state.store(), &form).await {
        Ok(user) => Ok((start_session(jar, user.id), found("/")).into_response()),
        Err(
            e @ (AuctionError::PasswordMismatch
            | AuctionError::UsernameRequired
            | AuctionError::UsernameTaken),
        ) => Ok(Json(AuthPage::with_message(e.to_string())).into_response()),
        Err(e) => Err(e),
    }
}

// endregion: --- Account Handlers

// region:    --- Command Handlers

/// Empty listing form with the category choices.
pub async fn handle_create_page(_user: CurrentUser) -> Json<CreatePage> {
    Json(CreatePage::new(ListingForm::default(), FieldErrors::new()))
}

/// Validate and store a new listing.
pub async fn handle_create(
    State(state): State<AppState>,
    user: CurrentUser,
    Form(form): Form<ListingForm>,
) -> Result<Response, AuctionError> {
    match form.validate() {
        Ok(listing) => {
            commands::handle_create_listing(state.store(), user.id, listing).await?;
            Ok(found("/"))
        }
        Err(errors) => {
            info!("{:<12} --> listing form invalid: {:?}", "Handler", errors);
            Ok(Json(CreatePage::new(form, errors)).into_response())
        }
    }
}

/// Post a comment on a listing.
pub async fn handle_comment(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(listing_id): Path<i64>,
    Form(form): Form<CommentForm>,
) -> Result<Response, AuctionError> {
    match form.validate() {
        Ok(content) => {
            commands::handle_add_comment(state.store(), listing_id, user.id, content).await?;
            Ok(found(&listing_url(listing_id)))
        }
        Err(message) => {
            let mut page =
                query::handlers::listing_page(state.store(), listing_id, Some(&user)).await?;
            page.comment_form = FieldState::invalid(form.content.as_str(), message);
            Ok(Json(page).into_response())
        }
    }
}

/// Listing page again, with the entered amount and why it was refused.
async fn rerender_bid(
    state: &AppState,
    listing_id: i64,
    user: &CurrentUser,
    entered: &str,
    message: String,
) -> Result<Response, AuctionError> {
    let mut page = query::handlers::listing_page(state.store(), listing_id, Some(user)).await?;
    page.bid_form = FieldState::invalid(entered, message);
    Ok(Json(page).into_response())
}

/// Place a bid; refused bids re-render the listing with the reason.
pub async fn handle_bid(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(listing_id): Path<i64>,
    Form(form): Form<BidForm>,
) -> Result<Response, AuctionError> {
    let amount = match forms::parse_amount(&form.bid_price) {
        Ok(amount) => amount,
        Err(message) => {
            return rerender_bid(&state, listing_id, &user, &form.bid_price, message).await
        }
    };

    let cmd = PlaceBidCommand {
        listing_id,
        bidder_id: user.id,
        amount,
    };
    match commands::handle_place_bid(state.store(), cmd).await {
        Ok(_) => Ok(found(&listing_url(listing_id))),
        Err(AuctionError::BidRejected(reason)) => {
            rerender_bid(&state, listing_id, &user, &form.bid_price, reason.to_string()).await
        }
        Err(e) => Err(e),
    }
}

/// Add or remove the listing from the watchlist.
pub async fn handle_toggle_watchlist(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(listing_id): Path<i64>,
) -> Result<Response, AuctionError> {
    commands::handle_toggle_watchlist(state.store(), user.id, listing_id).await?;
    Ok(found(&listing_url(listing_id)))
}

/// Close the auction and record its winner.
pub async fn handle_close(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(listing_id): Path<i64>,
) -> Result<Response, AuctionError> {
    let cmd = CloseAuctionCommand {
        listing_id,
        requested_by: user.id,
    };
    commands::handle_close_auction(state.store(), cmd).await?;
    Ok(found(&listing_url(listing_id)))
}

// endregion: --- Command Handlers

// region:    --- Query Handlers

/// Active listings.
pub async fn handle_index(State(state): State<AppState>) -> Result<Json<IndexPage>, AuctionError> {
    Ok(Json(query::handlers::index_page(state.store()).await?))
}

/// Listing detail page.
pub async fn handle_listing(
    State(state): State<AppState>,
    MaybeUser(viewer): MaybeUser,
    Path(listing_id): Path<i64>,
) -> Result<Json<ListingPage>, AuctionError> {
    let page = query::handlers::listing_page(state.store(), listing_id, viewer.as_ref()).await?;
    Ok(Json(page))
}

/// Categories with active listings.
pub async fn handle_categories(
    State(state): State<AppState>,
) -> Result<Json<CategoriesPage>, AuctionError> {
    Ok(Json(query::handlers::categories_page(state.store()).await?))
}

/// Active listings in one category.
pub async fn handle_category(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<IndexPage>, AuctionError> {
    Ok(Json(
        query::handlers::category_page(state.store(), &name).await?,
    ))
}

/// The signed-in user's watchlist.
pub async fn handle_watchlist(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<IndexPage>, AuctionError> {
    Ok(Json(
        query::handlers::watchlist_page(state.store(), &user).await?,
    ))
}

// endregion: --- Query Handlers
