// region:    --- Imports
use super::{queries, AuctionStore};
use crate::bidding::model::{
    Bid, BidSummary, Category, Comment, CommentView, Listing, ListingSummary, NewListing, User,
    UserCredentials,
};
use crate::bidding::rules;
use crate::database::DatabaseManager;
use crate::error::AuctionError;
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, info};

// endregion: --- Imports

// region:    --- Postgres Auction Store

pub struct PostgresAuctionStore {
    db_manager: Arc<DatabaseManager>,
}

impl PostgresAuctionStore {
    pub fn new(db_manager: Arc<DatabaseManager>) -> Self {
        Self { db_manager }
    }
}

#[async_trait]
impl AuctionStore for PostgresAuctionStore {
    async fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, AuctionError> {
        info!("{:<12} --> insert user {}", "Store", username);
        sqlx::query_as::<_, User>(queries::INSERT_USER)
            .bind(username)
            .bind(email)
            .bind(password_hash)
            .fetch_one(self.db_manager.pool())
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                    AuctionError::UsernameTaken
                }
                other => AuctionError::Database(other),
            })
    }

    async fn find_credentials(
        &self,
        username: &str,
    ) -> Result<Option<UserCredentials>, AuctionError> {
        let credentials = sqlx::query_as::<_, UserCredentials>(queries::FIND_CREDENTIALS)
            .bind(username)
            .fetch_optional(self.db_manager.pool())
            .await?;
        Ok(credentials)
    }

    async fn get_user(&self, user_id: i64) -> Result<Option<User>, AuctionError> {
        let user = sqlx::query_as::<_, User>(queries::GET_USER)
            .bind(user_id)
            .fetch_optional(self.db_manager.pool())
            .await?;
        Ok(user)
    }

    async fn create_listing(
        &self,
        creator_id: i64,
        listing: NewListing,
    ) -> Result<Listing, AuctionError> {
        let listing = sqlx::query_as::<_, Listing>(queries::INSERT_LISTING)
            .bind(creator_id)
            .bind(&listing.title)
            .bind(&listing.description)
            .bind(listing.starting_price)
            .bind(&listing.image_url)
            .bind(listing.category)
            .fetch_one(self.db_manager.pool())
            .await?;
        info!("{:<12} --> listing {} created", "Store", listing.id);
        Ok(listing)
    }

    async fn get_listing(&self, listing_id: i64) -> Result<Option<Listing>, AuctionError> {
        let listing = sqlx::query_as::<_, Listing>(queries::GET_LISTING)
            .bind(listing_id)
            .fetch_optional(self.db_manager.pool())
            .await?;
        Ok(listing)
    }

    async fn active_listings(&self) -> Result<Vec<ListingSummary>, AuctionError> {
        let listings = sqlx::query_as::<_, ListingSummary>(queries::ACTIVE_LISTINGS)
            .fetch_all(self.db_manager.pool())
            .await?;
        Ok(listings)
    }

    async fn listings_in_category(
        &self,
        category: Category,
    ) -> Result<Vec<ListingSummary>, AuctionError> {
        let listings = sqlx::query_as::<_, ListingSummary>(queries::LISTINGS_IN_CATEGORY)
            .bind(category)
            .fetch_all(self.db_manager.pool())
            .await?;
        Ok(listings)
    }

    async fn active_categories(&self) -> Result<Vec<Category>, AuctionError> {
        let categories = sqlx::query_scalar::<_, Category>(queries::ACTIVE_CATEGORIES)
            .fetch_all(self.db_manager.pool())
            .await?;
        Ok(categories)
    }

    async fn watched_listings(&self, user_id: i64) -> Result<Vec<ListingSummary>, AuctionError> {
        let listings = sqlx::query_as::<_, ListingSummary>(queries::WATCHED_LISTINGS)
            .bind(user_id)
            .fetch_all(self.db_manager.pool())
            .await?;
        Ok(listings)
    }

    async fn bid_summary(&self, listing_id: i64) -> Result<BidSummary, AuctionError> {
        let summary = sqlx::query_as::<_, BidSummary>(queries::BID_SUMMARY)
            .bind(listing_id)
            .fetch_one(self.db_manager.pool())
            .await?;
        Ok(summary)
    }

    async fn bids_for_listing(&self, listing_id: i64) -> Result<Vec<Bid>, AuctionError> {
        let bids = sqlx::query_as::<_, Bid>(queries::BIDS_FOR_LISTING)
            .bind(listing_id)
            .fetch_all(self.db_manager.pool())
            .await?;
        Ok(bids)
    }

    async fn place_bid(
        &self,
        listing_id: i64,
        bidder_id: i64,
        amount: Decimal,
    ) -> Result<Bid, AuctionError> {
        self.db_manager
            .transaction(|tx| {
                Box::pin(async move {
                    let listing = sqlx::query_as::<_, Listing>(queries::LOCK_LISTING)
                        .bind(listing_id)
                        .fetch_optional(&mut **tx)
                        .await?
                        .ok_or(AuctionError::ListingNotFound(listing_id))?;

                    let highest = sqlx::query_scalar::<_, Option<Decimal>>(queries::HIGHEST_BID)
                        .bind(listing_id)
                        .fetch_one(&mut **tx)
                        .await?;
                    debug!(
                        "{:<12} --> listing {} highest bid {:?}",
                        "Store", listing_id, highest
                    );

                    rules::validate_bid(amount, &listing, highest)?;

                    let bid = sqlx::query_as::<_, Bid>(queries::INSERT_BID)
                        .bind(listing_id)
                        .bind(bidder_id)
                        .bind(amount)
                        .fetch_one(&mut **tx)
                        .await?;
                    Ok::<_, AuctionError>(bid)
                })
            })
            .await
    }

    async fn close_listing(&self, listing_id: i64) -> Result<Listing, AuctionError> {
        self.db_manager
            .transaction(|tx| {
                Box::pin(async move {
                    sqlx::query_as::<_, Listing>(queries::LOCK_LISTING)
                        .bind(listing_id)
                        .fetch_optional(&mut **tx)
                        .await?
                        .ok_or(AuctionError::ListingNotFound(listing_id))?;

                    let bids = sqlx::query_as::<_, Bid>(queries::BIDS_FOR_LISTING)
                        .bind(listing_id)
                        .fetch_all(&mut **tx)
                        .await?;
                    let winner_id = rules::select_winner(&bids).map(|bid| bid.bidder_id);

                    let listing = sqlx::query_as::<_, Listing>(queries::CLOSE_LISTING)
                        .bind(listing_id)
                        .bind(winner_id)
                        .fetch_one(&mut **tx)
                        .await?;
                    Ok::<_, AuctionError>(listing)
                })
            })
            .await
    }

    async fn add_comment(
        &self,
        listing_id: i64,
        commenter_id: i64,
        content: &str,
    ) -> Result<Comment, AuctionError> {
        let comment = sqlx::query_as::<_, Comment>(queries::INSERT_COMMENT)
            .bind(listing_id)
            .bind(commenter_id)
            .bind(content)
            .fetch_one(self.db_manager.pool())
            .await?;
        Ok(comment)
    }

    async fn comments_for_listing(
        &self,
        listing_id: i64,
    ) -> Result<Vec<CommentView>, AuctionError> {
        let comments = sqlx::query_as::<_, CommentView>(queries::COMMENTS_FOR_LISTING)
            .bind(listing_id)
            .fetch_all(self.db_manager.pool())
            .await?;
        Ok(comments)
    }

    async fn is_watching(&self, user_id: i64, listing_id: i64) -> Result<bool, AuctionError> {
        let watching = sqlx::query_scalar::<_, bool>(queries::IS_WATCHING)
            .bind(user_id)
            .bind(listing_id)
            .fetch_one(self.db_manager.pool())
            .await?;
        Ok(watching)
    }

    async fn toggle_watchlist(&self, user_id: i64, listing_id: i64) -> Result<bool, AuctionError> {
        self.db_manager
            .transaction(|tx| {
                Box::pin(async move {
                    let removed = sqlx::query(queries::REMOVE_FROM_WATCHLIST)
                        .bind(user_id)
                        .bind(listing_id)
                        .execute(&mut **tx)
                        .await?
                        .rows_affected();
                    if removed > 0 {
                        return Ok(false);
                    }

                    sqlx::query(queries::ADD_TO_WATCHLIST)
                        .bind(user_id)
                        .bind(listing_id)
                        .execute(&mut **tx)
                        .await?;
                    Ok::<_, AuctionError>(true)
                })
            })
            .await
    }
}

// endregion: --- Postgres Auction Store
