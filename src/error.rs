use crate::bidding::rules::BidRejection;
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use sqlx::Error as SqlxError;
use thiserror::Error as ThisError;
use tracing::error;

#[derive(Debug, ThisError)]
pub enum AuctionError {
    #[error("Database error: {0}")]
    Database(#[from] SqlxError),

    #[error("Listing {0} not found")]
    ListingNotFound(i64),

    #[error("Only the listing's creator may close this auction.")]
    NotListingCreator,

    #[error("{0}")]
    BidRejected(#[from] BidRejection),

    #[error("Invalid username and/or password.")]
    InvalidCredentials,

    #[error("Passwords must match.")]
    PasswordMismatch,

    #[error("Username is required.")]
    UsernameRequired,

    #[error("Username already taken.")]
    UsernameTaken,

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl IntoResponse for AuctionError {
    fn into_response(self) -> axum::response::Response {
        let (status, code, message) = match &self {
            AuctionError::ListingNotFound(_) => {
                (StatusCode::NOT_FOUND, "NOT_FOUND", self.to_string())
            }
            AuctionError::NotListingCreator => {
                (StatusCode::FORBIDDEN, "FORBIDDEN", self.to_string())
            }
            AuctionError::BidRejected(_) => (StatusCode::BAD_REQUEST, "BID_REJECTED", self.to_string()),
            AuctionError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", self.to_string())
            }
            AuctionError::PasswordMismatch
            | AuctionError::UsernameRequired
            | AuctionError::UsernameTaken => {
                (StatusCode::BAD_REQUEST, "INVALID_REGISTRATION", self.to_string())
            }
            AuctionError::Database(_) | AuctionError::PasswordHash(_) | AuctionError::Config(_) => {
                error!("{:<12} --> {}", "Error", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred.".to_string(),
                )
            }
        };

        let body = ApiErrorResponse {
            error: ApiErrorBody {
                code: code.to_string(),
                message,
            },
        };
        (status, Json(body)).into_response()
    }
}

#[derive(Serialize)]
pub struct ApiErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Serialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}
