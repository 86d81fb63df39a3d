//! JSON documents returned by the GET pages and by form re-renders.

use crate::bidding::model::{Category, CommentView, Listing, ListingSummary};
use crate::forms::{FieldErrors, FieldState, ListingForm};
use rust_decimal::Decimal;
use serde::Serialize;

/// Which listing collection a page shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PageKind {
    Home,
    Category,
    Watchlist,
}

#[derive(Debug, Clone, Serialize)]
pub struct IndexPage {
    pub page: PageKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub listings: Vec<ListingSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListingDetail {
    #[serde(flatten)]
    pub listing: Listing,
    pub highest_bid: Option<Decimal>,
    pub num_bids: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListingPage {
    pub listing: ListingDetail,
    pub comments: Vec<CommentView>,
    pub in_watchlist: bool,
    pub viewer_is_creator: bool,
    pub viewer_is_winner: bool,
    pub bid_form: FieldState,
    pub comment_form: FieldState,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoriesPage {
    pub categories: Vec<String>,
}

/// Login and register pages.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AuthPage {
    pub message: Option<String>,
}

impl AuthPage {
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryChoice {
    pub code: &'static str,
    pub label: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreatePage {
    pub values: ListingForm,
    pub errors: FieldErrors,
    pub categories: Vec<CategoryChoice>,
}

impl CreatePage {
    pub fn new(values: ListingForm, errors: FieldErrors) -> Self {
        Self {
            values,
            errors,
            categories: Category::ALL
                .into_iter()
                .map(|c| CategoryChoice {
                    code: c.code(),
                    label: c.label(),
                })
                .collect(),
        }
    }
}
