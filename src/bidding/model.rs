use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::encode::IsNull;
use sqlx::error::BoxDynError;
use sqlx::postgres::{PgArgumentBuffer, PgTypeInfo, PgValueRef};
use sqlx::{Decode, Encode, Postgres, Type};

// region:    --- Category

/// Fixed set of listing categories, stored as their upper-case code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Category {
    Books,
    Music,
    Movies,
    Games,
    Computers,
    Electronics,
    Kitchen,
    Home,
    Health,
    Pets,
    Toys,
    Fashion,
    Shoes,
    Sports,
    Baby,
    Travel,
}

impl Category {
    pub const ALL: [Category; 16] = [
        Category::Books,
        Category::Music,
        Category::Movies,
        Category::Games,
        Category::Computers,
        Category::Electronics,
        Category::Kitchen,
        Category::Home,
        Category::Health,
        Category::Pets,
        Category::Toys,
        Category::Fashion,
        Category::Shoes,
        Category::Sports,
        Category::Baby,
        Category::Travel,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Category::Books => "BOOKS",
            Category::Music => "MUSIC",
            Category::Movies => "MOVIES",
            Category::Games => "GAMES",
            Category::Computers => "COMPUTERS",
            Category::Electronics => "ELECTRONICS",
            Category::Kitchen => "KITCHEN",
            Category::Home => "HOME",
            Category::Health => "HEALTH",
            Category::Pets => "PETS",
            Category::Toys => "TOYS",
            Category::Fashion => "FASHION",
            Category::Shoes => "SHOES",
            Category::Sports => "SPORTS",
            Category::Baby => "BABY",
            Category::Travel => "TRAVEL",
        }
    }

    /// Display label: the code with only its first letter upper-case.
    pub fn label(self) -> String {
        let code = self.code();
        let mut chars = code.chars();
        match chars.next() {
            Some(first) => first.to_string() + &chars.as_str().to_lowercase(),
            None => String::new(),
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.code() == code)
    }

    /// Case-insensitive lookup, used for `/category/{name}` path segments.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::from_code(&name.trim().to_uppercase())
    }
}

impl Type<Postgres> for Category {
    fn type_info() -> PgTypeInfo {
        <String as Type<Postgres>>::type_info()
    }

    fn compatible(ty: &PgTypeInfo) -> bool {
        <String as Type<Postgres>>::compatible(ty)
    }
}

impl<'r> Decode<'r, Postgres> for Category {
    fn decode(value: PgValueRef<'r>) -> Result<Self, BoxDynError> {
        let code = <&str as Decode<Postgres>>::decode(value)?;
        Category::from_code(code).ok_or_else(|| format!("unknown category code: {code}").into())
    }
}

impl Encode<'_, Postgres> for Category {
    fn encode_by_ref(&self, buf: &mut PgArgumentBuffer) -> Result<IsNull, BoxDynError> {
        <&str as Encode<Postgres>>::encode_by_ref(&self.code(), buf)
    }
}

// endregion: --- Category

// region:    --- Entities

// User account
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// Login lookup row; never serialized.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserCredentials {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
}

// Listing
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Listing {
    pub id: i64,
    pub creator_id: i64,
    pub title: String,
    pub description: String,
    pub starting_price: Decimal,
    pub image_url: Option<String>,
    pub category: Option<Category>,
    pub active: bool,
    pub winner_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// Validated fields of a listing about to be created.
#[derive(Debug, Clone, PartialEq)]
pub struct NewListing {
    pub title: String,
    pub description: String,
    pub starting_price: Decimal,
    pub image_url: Option<String>,
    pub category: Option<Category>,
}

// Bid
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Bid {
    pub id: i64,
    pub listing_id: i64,
    pub bidder_id: i64,
    pub amount: Decimal,
    pub placed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Comment {
    pub id: i64,
    pub listing_id: i64,
    pub commenter_id: i64,
    pub content: String,
    pub posted_at: DateTime<Utc>,
}

/// A comment joined with its author's username.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CommentView {
    pub id: i64,
    pub listing_id: i64,
    pub commenter_id: i64,
    pub commenter: String,
    pub content: String,
    pub posted_at: DateTime<Utc>,
}

// endregion: --- Entities

// region:    --- Aggregates

/// A listing annotated with its highest bid, if any.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ListingSummary {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub listing: Listing,
    pub highest_bid: Option<Decimal>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, sqlx::FromRow)]
pub struct BidSummary {
    pub highest_bid: Option<Decimal>,
    pub num_bids: i64,
}

// endregion: --- Aggregates

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_capitalize_codes() {
        assert_eq!(Category::Electronics.label(), "Electronics");
        assert_eq!(Category::Baby.label(), "Baby");
    }

    #[test]
    fn names_resolve_case_insensitively() {
        assert_eq!(Category::from_name("books"), Some(Category::Books));
        assert_eq!(Category::from_name("Travel"), Some(Category::Travel));
        assert_eq!(Category::from_name("garden"), None);
    }

    #[test]
    fn serializes_as_code() {
        let json = serde_json::to_string(&Category::Computers).unwrap();
        assert_eq!(json, "\"COMPUTERS\"");
    }
}
