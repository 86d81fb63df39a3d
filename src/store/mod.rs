// region:    --- Imports
use crate::bidding::model::{
    Bid, BidSummary, Category, Comment, CommentView, Listing, ListingSummary, NewListing, User,
    UserCredentials,
};
use crate::error::AuctionError;
use async_trait::async_trait;
use rust_decimal::Decimal;

pub mod memory;
pub mod postgres;
pub mod queries;

pub use memory::MemoryAuctionStore;
pub use postgres::PostgresAuctionStore;

// endregion: --- Imports

// region:    --- Auction Store Trait

/// Persistence seam for users, listings, bids, comments and watchlists.
///
/// `place_bid` and `close_listing` run their read and write as one unit so
/// that the comparison and the insert see the same highest bid.
#[async_trait]
pub trait AuctionStore: Send + Sync {
    /// Fails with `UsernameTaken` when the username already exists.
    async fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, AuctionError>;

    async fn find_credentials(&self, username: &str)
        -> Result<Option<UserCredentials>, AuctionError>;

    async fn get_user(&self, user_id: i64) -> Result<Option<User>, AuctionError>;

    async fn create_listing(
        &self,
        creator_id: i64,
        listing: NewListing,
    ) -> Result<Listing, AuctionError>;

    async fn get_listing(&self, listing_id: i64) -> Result<Option<Listing>, AuctionError>;

    async fn active_listings(&self) -> Result<Vec<ListingSummary>, AuctionError>;

    async fn listings_in_category(
        &self,
        category: Category,
    ) -> Result<Vec<ListingSummary>, AuctionError>;

    /// Distinct categories of active listings, ordered by code.
    async fn active_categories(&self) -> Result<Vec<Category>, AuctionError>;

    async fn watched_listings(&self, user_id: i64) -> Result<Vec<ListingSummary>, AuctionError>;

    async fn bid_summary(&self, listing_id: i64) -> Result<BidSummary, AuctionError>;

    /// Bids in placement order.
    async fn bids_for_listing(&self, listing_id: i64) -> Result<Vec<Bid>, AuctionError>;

    /// Validate and append a bid. Rejections come back as `BidRejected`
    /// with nothing written.
    async fn place_bid(
        &self,
        listing_id: i64,
        bidder_id: i64,
        amount: Decimal,
    ) -> Result<Bid, AuctionError>;

    /// Mark the listing inactive and record the winning bidder, if any.
    async fn close_listing(&self, listing_id: i64) -> Result<Listing, AuctionError>;

    async fn add_comment(
        &self,
        listing_id: i64,
        commenter_id: i64,
        content: &str,
    ) -> Result<Comment, AuctionError>;

    /// Comments in posting order.
    async fn comments_for_listing(&self, listing_id: i64)
        -> Result<Vec<CommentView>, AuctionError>;

    async fn is_watching(&self, user_id: i64, listing_id: i64) -> Result<bool, AuctionError>;

    /// Flip watchlist membership; returns the new state.
    async fn toggle_watchlist(&self, user_id: i64, listing_id: i64) -> Result<bool, AuctionError>;
}

// endregion: --- Auction Store Trait
