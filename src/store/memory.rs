//! Process-local store used when no database is configured, and by the tests.

use super::AuctionStore;
use crate::bidding::model::{
    Bid, BidSummary, Category, Comment, CommentView, Listing, ListingSummary, NewListing, User,
    UserCredentials,
};
use crate::bidding::rules;
use crate::error::AuctionError;
use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use std::collections::{BTreeSet, HashSet};
use tokio::sync::Mutex;
use tracing::info;

#[derive(Default)]
struct MemoryState {
    users: Vec<(User, String)>,
    listings: Vec<Listing>,
    bids: Vec<Bid>,
    comments: Vec<Comment>,
    watchlist: HashSet<(i64, i64)>,
}

impl MemoryState {
    fn listing(&self, listing_id: i64) -> Option<&Listing> {
        self.listings.iter().find(|l| l.id == listing_id)
    }

    fn bids_on(&self, listing_id: i64) -> impl Iterator<Item = &Bid> {
        self.bids.iter().filter(move |b| b.listing_id == listing_id)
    }

    fn summarize<'a>(&self, listings: impl Iterator<Item = &'a Listing>) -> Vec<ListingSummary> {
        listings
            .map(|listing| ListingSummary {
                listing: listing.clone(),
                highest_bid: rules::highest_bid(self.bids_on(listing.id)),
            })
            .collect()
    }
}

/// Every mutation takes the one lock, so bids on a listing are serialized.
#[derive(Default)]
pub struct MemoryAuctionStore {
    state: Mutex<MemoryState>,
}

impl MemoryAuctionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AuctionStore for MemoryAuctionStore {
    async fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, AuctionError> {
        let mut state = self.state.lock().await;
        if state.users.iter().any(|(u, _)| u.username == username) {
            return Err(AuctionError::UsernameTaken);
        }
        let user = User {
            id: state.users.len() as i64 + 1,
            username: username.to_string(),
            email: email.to_string(),
            created_at: Utc::now(),
        };
        state.users.push((user.clone(), password_hash.to_string()));
        info!("{:<12} --> insert user {}", "Store", username);
        Ok(user)
    }

    async fn find_credentials(
        &self,
        username: &str,
    ) -> Result<Option<UserCredentials>, AuctionError> {
        let state = self.state.lock().await;
        Ok(state
            .users
            .iter()
            .find(|(u, _)| u.username == username)
            .map(|(u, hash)| UserCredentials {
                id: u.id,
                username: u.username.clone(),
                password_hash: hash.clone(),
            }))
    }

    async fn get_user(&self, user_id: i64) -> Result<Option<User>, AuctionError> {
        let state = self.state.lock().await;
        Ok(state
            .users
            .iter()
            .find(|(u, _)| u.id == user_id)
            .map(|(u, _)| u.clone()))
    }

    async fn create_listing(
        &self,
        creator_id: i64,
        listing: NewListing,
    ) -> Result<Listing, AuctionError> {
        let mut state = self.state.lock().await;
        let listing = Listing {
            id: state.listings.len() as i64 + 1,
            creator_id,
            title: listing.title,
            description: listing.description,
            starting_price: listing.starting_price,
            image_url: listing.image_url,
            category: listing.category,
            active: true,
            winner_id: None,
            created_at: Utc::now(),
        };
        state.listings.push(listing.clone());
        info!("{:<12} --> listing {} created", "Store", listing.id);
        Ok(listing)
    }

    async fn get_listing(&self, listing_id: i64) -> Result<Option<Listing>, AuctionError> {
        let state = self.state.lock().await;
        Ok(state.listing(listing_id).cloned())
    }

    async fn active_listings(&self) -> Result<Vec<ListingSummary>, AuctionError> {
        let state = self.state.lock().await;
        Ok(state.summarize(state.listings.iter().filter(|l| l.active)))
    }

    async fn listings_in_category(
        &self,
        category: Category,
    ) -> Result<Vec<ListingSummary>, AuctionError> {
        let state = self.state.lock().await;
        Ok(state.summarize(
            state
                .listings
                .iter()
                .filter(|l| l.active && l.category == Some(category)),
        ))
    }

    async fn active_categories(&self) -> Result<Vec<Category>, AuctionError> {
        let state = self.state.lock().await;
        let codes: BTreeSet<&'static str> = state
            .listings
            .iter()
            .filter(|l| l.active)
            .filter_map(|l| l.category)
            .map(Category::code)
            .collect();
        Ok(codes.into_iter().filter_map(Category::from_code).collect())
    }

    async fn watched_listings(&self, user_id: i64) -> Result<Vec<ListingSummary>, AuctionError> {
        let state = self.state.lock().await;
        Ok(state.summarize(
            state
                .listings
                .iter()
                .filter(|l| state.watchlist.contains(&(user_id, l.id))),
        ))
    }

    async fn bid_summary(&self, listing_id: i64) -> Result<BidSummary, AuctionError> {
        let state = self.state.lock().await;
        Ok(BidSummary {
            highest_bid: rules::highest_bid(state.bids_on(listing_id)),
            num_bids: state.bids_on(listing_id).count() as i64,
        })
    }

    async fn bids_for_listing(&self, listing_id: i64) -> Result<Vec<Bid>, AuctionError> {
        let state = self.state.lock().await;
        Ok(state.bids_on(listing_id).cloned().collect())
    }

    async fn place_bid(
        &self,
        listing_id: i64,
        bidder_id: i64,
        amount: Decimal,
    ) -> Result<Bid, AuctionError> {
        let mut state = self.state.lock().await;
        let listing = state
            .listing(listing_id)
            .ok_or(AuctionError::ListingNotFound(listing_id))?;
        rules::validate_bid(amount, listing, rules::highest_bid(state.bids_on(listing_id)))?;

        let bid = Bid {
            id: state.bids.len() as i64 + 1,
            listing_id,
            bidder_id,
            amount,
            placed_at: Utc::now(),
        };
        state.bids.push(bid.clone());
        Ok(bid)
    }

    async fn close_listing(&self, listing_id: i64) -> Result<Listing, AuctionError> {
        let mut state = self.state.lock().await;
        let winner_id = rules::select_winner(state.bids_on(listing_id)).map(|bid| bid.bidder_id);
        let listing = state
            .listings
            .iter_mut()
            .find(|l| l.id == listing_id)
            .ok_or(AuctionError::ListingNotFound(listing_id))?;

        if winner_id.is_some() {
            listing.winner_id = winner_id;
        }
        listing.active = false;
        Ok(listing.clone())
    }

    async fn add_comment(
        &self,
        listing_id: i64,
        commenter_id: i64,
        content: &str,
    ) -> Result<Comment, AuctionError> {
        let mut state = self.state.lock().await;
        let comment = Comment {
            id: state.comments.len() as i64 + 1,
            listing_id,
            commenter_id,
            content: content.to_string(),
            posted_at: Utc::now(),
        };
        state.comments.push(comment.clone());
        Ok(comment)
    }

    async fn comments_for_listing(
        &self,
        listing_id: i64,
    ) -> Result<Vec<CommentView>, AuctionError> {
        let state = self.state.lock().await;
        Ok(state
            .comments
            .iter()
            .filter(|c| c.listing_id == listing_id)
            .map(|c| CommentView {
                id: c.id,
                listing_id: c.listing_id,
                commenter_id: c.commenter_id,
                commenter: state
                    .users
                    .iter()
                    .find(|(u, _)| u.id == c.commenter_id)
                    .map(|(u, _)| u.username.clone())
                    .unwrap_or_default(),
                content: c.content.clone(),
                posted_at: c.posted_at,
            })
            .collect())
    }

    async fn is_watching(&self, user_id: i64, listing_id: i64) -> Result<bool, AuctionError> {
        let state = self.state.lock().await;
        Ok(state.watchlist.contains(&(user_id, listing_id)))
    }

    async fn toggle_watchlist(&self, user_id: i64, listing_id: i64) -> Result<bool, AuctionError> {
        let mut state = self.state.lock().await;
        if state.watchlist.remove(&(user_id, listing_id)) {
            Ok(false)
        } else {
            state.watchlist.insert((user_id, listing_id));
            Ok(true)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use std::sync::Arc;
    use tokio::task::JoinSet;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn new_listing(price: &str, category: Option<Category>) -> NewListing {
        NewListing {
            title: "Record player".to_string(),
            description: "Turntable, works fine".to_string(),
            starting_price: dec(price),
            image_url: None,
            category,
        }
    }

    async fn seeded() -> (MemoryAuctionStore, i64, i64, i64) {
        let store = MemoryAuctionStore::new();
        let alice = store.create_user("alice", "", "hash").await.unwrap();
        let bob = store.create_user("bob", "", "hash").await.unwrap();
        let listing = store
            .create_listing(alice.id, new_listing("10.00", None))
            .await
            .unwrap();
        (store, alice.id, bob.id, listing.id)
    }

    #[tokio::test]
    async fn duplicate_username_creates_nothing() {
        let store = MemoryAuctionStore::new();
        store.create_user("carol", "c@example.com", "h1").await.unwrap();
        let err = store.create_user("carol", "other@example.com", "h2").await;
        assert!(matches!(err, Err(AuctionError::UsernameTaken)));

        let creds = store.find_credentials("carol").await.unwrap().unwrap();
        assert_eq!(creds.password_hash, "h1");
        assert!(store.get_user(2).await.unwrap().is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_bids_are_accepted_in_increasing_order() {
        let (store, alice, bob, listing) = seeded().await;
        let store = Arc::new(store);

        let mut tasks = JoinSet::new();
        for step in 0..40i64 {
            let store = Arc::clone(&store);
            let bidder = if step % 2 == 0 { alice } else { bob };
            // 10.00 through 49.00, arriving out of order
            let amount = Decimal::new(1000 + (step * 17) % 40 * 100, 2);
            tasks.spawn(async move { store.place_bid(listing, bidder, amount).await.is_ok() });
        }
        let mut accepted = 0;
        while let Some(placed) = tasks.join_next().await {
            if placed.unwrap() {
                accepted += 1;
            }
        }

        let amounts: Vec<Decimal> = store
            .bids_for_listing(listing)
            .await
            .unwrap()
            .into_iter()
            .map(|bid| bid.amount)
            .collect();
        assert_eq!(amounts.len(), accepted);
        assert!(amounts.windows(2).all(|pair| pair[0] < pair[1]));
        assert_eq!(amounts.last(), Some(&dec("49.00")));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn close_racing_bids_picks_highest_stored_bid() {
        let (store, alice, bob, listing) = seeded().await;
        let store = Arc::new(store);

        let mut tasks = JoinSet::new();
        for step in 0..20i64 {
            let store = Arc::clone(&store);
            let bidder = if step % 2 == 0 { alice } else { bob };
            let amount = Decimal::new(1000 + step * 100, 2);
            tasks.spawn(async move {
                let _ = store.place_bid(listing, bidder, amount).await;
            });
        }
        let closer = Arc::clone(&store);
        tasks.spawn(async move {
            closer.close_listing(listing).await.unwrap();
        });
        while let Some(done) = tasks.join_next().await {
            done.unwrap();
        }

        let closed = store.get_listing(listing).await.unwrap().unwrap();
        let bids = store.bids_for_listing(listing).await.unwrap();
        assert!(!closed.active);
        assert_eq!(
            closed.winner_id,
            rules::select_winner(&bids).map(|bid| bid.bidder_id)
        );
        let err = store.place_bid(listing, bob, dec("1000.00")).await;
        assert!(matches!(err, Err(AuctionError::BidRejected(_))));
    }

    #[tokio::test]
    async fn rejected_bid_is_not_stored() {
        let (store, _, bob, listing) = seeded().await;
        let err = store.place_bid(listing, bob, dec("9.99")).await;
        assert!(matches!(err, Err(AuctionError::BidRejected(_))));
        assert!(store.bids_for_listing(listing).await.unwrap().is_empty());

        store.place_bid(listing, bob, dec("10.00")).await.unwrap();
        let summary = store.bid_summary(listing).await.unwrap();
        assert_eq!(summary.num_bids, 1);
        assert_eq!(summary.highest_bid, Some(dec("10.00")));
    }

    #[tokio::test]
    async fn close_picks_highest_bidder() {
        let (store, alice, bob, listing) = seeded().await;
        store.place_bid(listing, alice, dec("20.00")).await.unwrap();
        store.place_bid(listing, bob, dec("25.00")).await.unwrap();

        let closed = store.close_listing(listing).await.unwrap();
        assert!(!closed.active);
        assert_eq!(closed.winner_id, Some(bob));

        let again = store.close_listing(listing).await.unwrap();
        assert_eq!(again.winner_id, Some(bob));
        assert!(store.active_listings().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn close_without_bids_leaves_winner_unset() {
        let (store, _, _, listing) = seeded().await;
        let closed = store.close_listing(listing).await.unwrap();
        assert!(!closed.active);
        assert_eq!(closed.winner_id, None);
    }

    #[tokio::test]
    async fn watchlist_toggle_round_trips() {
        let (store, _, bob, listing) = seeded().await;
        assert!(!store.is_watching(bob, listing).await.unwrap());
        assert!(store.toggle_watchlist(bob, listing).await.unwrap());
        assert_eq!(store.watched_listings(bob).await.unwrap().len(), 1);
        assert!(!store.toggle_watchlist(bob, listing).await.unwrap());
        assert!(!store.is_watching(bob, listing).await.unwrap());
        assert!(store.watched_listings(bob).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn categories_are_distinct_active_and_ordered() {
        let (store, alice, _, first) = seeded().await;
        store
            .create_listing(alice, new_listing("1.00", Some(Category::Toys)))
            .await
            .unwrap();
        store
            .create_listing(alice, new_listing("1.00", Some(Category::Books)))
            .await
            .unwrap();
        store
            .create_listing(alice, new_listing("1.00", Some(Category::Toys)))
            .await
            .unwrap();
        let closed = store
            .create_listing(alice, new_listing("1.00", Some(Category::Music)))
            .await
            .unwrap();
        store.close_listing(closed.id).await.unwrap();

        let categories = store.active_categories().await.unwrap();
        assert_eq!(categories, vec![Category::Books, Category::Toys]);

        let toys = store.listings_in_category(Category::Toys).await.unwrap();
        assert_eq!(toys.len(), 2);
        assert!(toys.iter().all(|s| s.listing.id != first));
    }
}
