// region:    --- Imports
use crate::accounts::CurrentUser;
use crate::bidding::model::Category;
use crate::error::AuctionError;
use crate::forms::FieldState;
use crate::store::AuctionStore;
use crate::views::{CategoriesPage, IndexPage, ListingDetail, ListingPage, PageKind};
use tracing::info;

// endregion: --- Imports

// region:    --- Query Handlers

/// Active listings with their highest bid.
pub async fn index_page(store: &dyn AuctionStore) -> Result<IndexPage, AuctionError> {
    info!("{:<12} --> active listings", "Query");
    Ok(IndexPage {
        page: PageKind::Home,
        category: None,
        listings: store.active_listings().await?,
    })
}

/// Listing detail with bid count, comments and the viewer's watch state.
pub async fn listing_page(
    store: &dyn AuctionStore,
    listing_id: i64,
    viewer: Option<&CurrentUser>,
) -> Result<ListingPage, AuctionError> {
    info!("{:<12} --> listing id: {}", "Query", listing_id);
    let listing = store
        .get_listing(listing_id)
        .await?
        .ok_or(AuctionError::ListingNotFound(listing_id))?;
    let summary = store.bid_summary(listing_id).await?;
    let comments = store.comments_for_listing(listing_id).await?;

    let in_watchlist = match viewer {
        Some(user) => store.is_watching(user.id, listing_id).await?,
        None => false,
    };
    let viewer_id = viewer.map(|user| user.id);

    Ok(ListingPage {
        viewer_is_creator: viewer_id == Some(listing.creator_id),
        viewer_is_winner: viewer_id.is_some() && viewer_id == listing.winner_id,
        listing: ListingDetail {
            listing,
            highest_bid: summary.highest_bid,
            num_bids: summary.num_bids,
        },
        comments,
        in_watchlist,
        bid_form: FieldState::default(),
        comment_form: FieldState::default(),
    })
}

/// Labels of the categories that have at least one active listing.
pub async fn categories_page(store: &dyn AuctionStore) -> Result<CategoriesPage, AuctionError> {
    info!("{:<12} --> categories", "Query");
    let categories = store.active_categories().await?;
    Ok(CategoriesPage {
        categories: categories.into_iter().map(Category::label).collect(),
    })
}

/// Active listings in the named category; unknown names list nothing.
pub async fn category_page(
    store: &dyn AuctionStore,
    name: &str,
) -> Result<IndexPage, AuctionError> {
    info!("{:<12} --> category: {}", "Query", name);
    let listings = match Category::from_name(name) {
        Some(category) => store.listings_in_category(category).await?,
        None => Vec::new(),
    };
    Ok(IndexPage {
        page: PageKind::Category,
        category: Some(name.to_string()),
        listings,
    })
}

/// Listings on the user's watchlist.
pub async fn watchlist_page(
    store: &dyn AuctionStore,
    user: &CurrentUser,
) -> Result<IndexPage, AuctionError> {
    info!("{:<12} --> watchlist of user {}", "Query", user.id);
    Ok(IndexPage {
        page: PageKind::Watchlist,
        category: None,
        listings: store.watched_listings(user.id).await?,
    })
}

// endregion: --- Query Handlers
