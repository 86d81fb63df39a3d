//! Write-side operations on listings.
// region:    --- Imports
use crate::bidding::model::{Bid, Comment, Listing, NewListing};
use crate::error::AuctionError;
use crate::store::AuctionStore;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
// endregion: --- Imports

// region:    --- Commands

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PlaceBidCommand {
    pub listing_id: i64,
    pub bidder_id: i64,
    pub amount: Decimal,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CloseAuctionCommand {
    pub listing_id: i64,
    pub requested_by: i64,
}

/// Create a listing owned by `creator_id`.
pub async fn handle_create_listing(
    store: &dyn AuctionStore,
    creator_id: i64,
    listing: NewListing,
) -> Result<Listing, AuctionError> {
    info!(
        "{:<12} --> create listing {:?} by user {}",
        "Command", listing.title, creator_id
    );
    store.create_listing(creator_id, listing).await
}

/// Place a bid. Rejections surface as `AuctionError::BidRejected`.
pub async fn handle_place_bid(
    store: &dyn AuctionStore,
    cmd: PlaceBidCommand,
) -> Result<Bid, AuctionError> {
    info!("{:<12} --> place bid: {:?}", "Command", cmd);
    match store
        .place_bid(cmd.listing_id, cmd.bidder_id, cmd.amount)
        .await
    {
        Ok(bid) => {
            info!(
                "{:<12} --> bid {} accepted on listing {}",
                "Command", bid.id, bid.listing_id
            );
            Ok(bid)
        }
        Err(AuctionError::BidRejected(reason)) => {
            warn!(
                "{:<12} --> bid {} on listing {} rejected: {}",
                "Command", cmd.amount, cmd.listing_id, reason
            );
            Err(AuctionError::BidRejected(reason))
        }
        Err(e) => Err(e),
    }
}

/// Close bidding on a listing. Only its creator may do so.
pub async fn handle_close_auction(
    store: &dyn AuctionStore,
    cmd: CloseAuctionCommand,
) -> Result<Listing, AuctionError> {
    info!("{:<12} --> close auction: {:?}", "Command", cmd);
    let listing = store
        .get_listing(cmd.listing_id)
        .await?
        .ok_or(AuctionError::ListingNotFound(cmd.listing_id))?;

    if listing.creator_id != cmd.requested_by {
        warn!(
            "{:<12} --> user {} may not close listing {}",
            "Command", cmd.requested_by, cmd.listing_id
        );
        return Err(AuctionError::NotListingCreator);
    }

    let closed = store.close_listing(cmd.listing_id).await?;
    info!(
        "{:<12} --> listing {} closed, winner {:?}",
        "Command", closed.id, closed.winner_id
    );
    Ok(closed)
}

/// Add a comment to an existing listing.
pub async fn handle_add_comment(
    store: &dyn AuctionStore,
    listing_id: i64,
    commenter_id: i64,
    content: &str,
) -> Result<Comment, AuctionError> {
    info!(
        "{:<12} --> comment on listing {} by user {}",
        "Command", listing_id, commenter_id
    );
    store
        .get_listing(listing_id)
        .await?
        .ok_or(AuctionError::ListingNotFound(listing_id))?;
    store.add_comment(listing_id, commenter_id, content).await
}

/// Returns whether the listing is watched afterwards.
pub async fn handle_toggle_watchlist(
    store: &dyn AuctionStore,
    user_id: i64,
    listing_id: i64,
) -> Result<bool, AuctionError> {
    store
        .get_listing(listing_id)
        .await?
        .ok_or(AuctionError::ListingNotFound(listing_id))?;
    let watching = store.toggle_watchlist(user_id, listing_id).await?;
    info!(
        "{:<12} --> user {} watching listing {}: {}",
        "Command", user_id, listing_id, watching
    );
    Ok(watching)
}

// endregion: --- Commands
