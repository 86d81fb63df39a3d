//! Bid acceptance and winner selection.
//!
//! Both stores call into these functions so the comparison rules live in one
//! place regardless of where the rows come from.

use crate::bidding::model::{Bid, Listing};
use rust_decimal::Decimal;
use thiserror::Error as ThisError;

/// Why a bid was turned away. The message is shown next to the bid field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ThisError)]
pub enum BidRejection {
    #[error("This auction is closed.")]
    ListingClosed,

    #[error("Bid must be as large as the starting bid")]
    BelowStartingPrice,

    #[error("Bid must be greater than any bids already placed")]
    NotAboveHighestBid,
}

/// Decide whether `candidate` may be placed on `listing`.
///
/// With no prior bid the candidate only has to match the starting price;
/// once a bid exists it has to beat the highest one outright.
pub fn validate_bid(
    candidate: Decimal,
    listing: &Listing,
    highest_bid: Option<Decimal>,
) -> Result<(), BidRejection> {
    if !listing.active {
        return Err(BidRejection::ListingClosed);
    }

    match highest_bid {
        Some(highest) if candidate <= highest => Err(BidRejection::NotAboveHighestBid),
        Some(_) => Ok(()),
        None if candidate < listing.starting_price => Err(BidRejection::BelowStartingPrice),
        None => Ok(()),
    }
}

/// Highest amount among `bids`.
pub fn highest_bid<'a>(bids: impl IntoIterator<Item = &'a Bid>) -> Option<Decimal> {
    bids.into_iter().map(|bid| bid.amount).max()
}

/// Winning bid at close time.
///
/// Ordered by amount, then placement time, then id; the last one wins, so a
/// tie on amount goes to whoever placed it most recently.
pub fn select_winner<'a>(bids: impl IntoIterator<Item = &'a Bid>) -> Option<&'a Bid> {
    bids.into_iter().max_by(|a, b| {
        a.amount
            .cmp(&b.amount)
            .then(a.placed_at.cmp(&b.placed_at))
            .then(a.id.cmp(&b.id))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn listing(starting_price: &str) -> Listing {
        Listing {
            id: 1,
            creator_id: 1,
            title: "Lamp".to_string(),
            description: "Brass desk lamp".to_string(),
            starting_price: dec(starting_price),
            image_url: None,
            category: None,
            active: true,
            winner_id: None,
            created_at: Utc::now(),
        }
    }

    fn bid(id: i64, bidder_id: i64, amount: &str, seconds: i64) -> Bid {
        Bid {
            id,
            listing_id: 1,
            bidder_id,
            amount: dec(amount),
            placed_at: Utc::now() + Duration::seconds(seconds),
        }
    }

    #[test]
    fn first_bid_may_equal_starting_price() {
        let listing = listing("10.00");
        assert_eq!(validate_bid(dec("10.00"), &listing, None), Ok(()));
        assert_eq!(
            validate_bid(dec("9.99"), &listing, None),
            Err(BidRejection::BelowStartingPrice)
        );
    }

    #[test]
    fn later_bids_must_beat_highest() {
        let listing = listing("10.00");
        let highest = Some(dec("15.00"));
        assert_eq!(
            validate_bid(dec("15.00"), &listing, highest),
            Err(BidRejection::NotAboveHighestBid)
        );
        assert_eq!(
            validate_bid(dec("14.00"), &listing, highest),
            Err(BidRejection::NotAboveHighestBid)
        );
        assert_eq!(validate_bid(dec("15.01"), &listing, highest), Ok(()));
    }

    #[test]
    fn highest_bid_ignores_starting_price() {
        // A prior bid below the starting price still sets the bar.
        let listing = listing("50.00");
        assert_eq!(validate_bid(dec("20.01"), &listing, Some(dec("20.00"))), Ok(()));
    }

    #[test]
    fn closed_listing_rejects_everything() {
        let mut listing = listing("10.00");
        listing.active = false;
        assert_eq!(
            validate_bid(dec("1000.00"), &listing, None),
            Err(BidRejection::ListingClosed)
        );
    }

    #[test]
    fn winner_is_highest_bidder() {
        let bids = vec![bid(1, 7, "20.00", 0), bid(2, 8, "25.00", 1)];
        assert_eq!(select_winner(&bids).map(|b| b.bidder_id), Some(8));
        assert_eq!(highest_bid(&bids), Some(dec("25.00")));
    }

    #[test]
    fn tie_goes_to_latest_bid() {
        let bids = vec![
            bid(1, 7, "30.00", 0),
            bid(2, 8, "30.00", 5),
            bid(3, 9, "12.00", 9),
        ];
        assert_eq!(select_winner(&bids).map(|b| b.id), Some(2));

        let mut same_instant = vec![bid(4, 7, "30.00", 0), bid(5, 8, "30.00", 0)];
        same_instant[1].placed_at = same_instant[0].placed_at;
        assert_eq!(select_winner(&same_instant).map(|b| b.id), Some(5));
    }

    #[test]
    fn no_bids_no_winner() {
        let bids: Vec<Bid> = Vec::new();
        assert!(select_winner(&bids).is_none());
        assert!(highest_bid(&bids).is_none());
    }
}
