//! Form payloads and their field validation.
//!
//! Every form field arrives as a string; validation turns a form into the
//! typed value a command needs, or into per-field messages for re-rendering.

use crate::bidding::model::{Category, NewListing};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;
use url::Url;

pub const REQUIRED: &str = "This field is required.";
pub const TITLE_MAX_CHARS: usize = 200;
pub const MAX_INTEGER_DIGITS: u32 = 13;

/// Field name to error messages.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// A single input as the client should redisplay it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FieldState {
    pub value: String,
    pub errors: Vec<String>,
}

impl FieldState {
    pub fn invalid(value: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            errors: vec![error.into()],
        }
    }
}

// region:    --- Forms

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListingForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub category: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BidForm {
    #[serde(default)]
    pub bid_price: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommentForm {
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirmation: String,
}

// endregion: --- Forms

// region:    --- Validation

/// Parse a money amount: two fractional digits, thirteen integer digits.
pub fn parse_amount(raw: &str) -> Result<Decimal, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(REQUIRED.to_string());
    }
    let mut amount = Decimal::from_str(raw).map_err(|_| "Enter a number.".to_string())?;
    if amount.scale() > 2 {
        return Err("Ensure that there are no more than 2 decimal places.".to_string());
    }
    if amount.abs().trunc() >= Decimal::from(10i64.pow(MAX_INTEGER_DIGITS)) {
        return Err(
            format!("Ensure that there are no more than {MAX_INTEGER_DIGITS} digits before the decimal point."),
        );
    }
    amount.rescale(2);
    Ok(amount)
}

fn parse_image_url(raw: &str) -> Result<Option<String>, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    match Url::parse(raw) {
        Ok(url)
            if matches!(url.scheme(), "http" | "https" | "ftp" | "ftps")
                && url.host_str().is_some() =>
        {
            Ok(Some(raw.to_string()))
        }
        _ => Err("Enter a valid URL.".to_string()),
    }
}

fn parse_category(raw: &str) -> Result<Option<Category>, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    Category::from_code(raw)
        .map(Some)
        .ok_or_else(|| format!("Select a valid choice. {raw} is not one of the available choices."))
}

impl ListingForm {
    pub fn validate(&self) -> Result<NewListing, FieldErrors> {
        let mut errors = FieldErrors::new();
        let mut fail = |field: &str, message: String| {
            errors.entry(field.to_string()).or_default().push(message);
        };

        let title = self.title.trim();
        if title.is_empty() {
            fail("title", REQUIRED.to_string());
        } else if title.chars().count() > TITLE_MAX_CHARS {
            fail(
                "title",
                format!("Ensure this value has at most {TITLE_MAX_CHARS} characters."),
            );
        }

        let description = self.description.trim();
        if description.is_empty() {
            fail("description", REQUIRED.to_string());
        }

        let price = parse_amount(&self.price).map_err(|e| fail("price", e)).ok();
        let image_url = parse_image_url(&self.image)
            .map_err(|e| fail("image", e))
            .ok()
            .flatten();
        let category = parse_category(&self.category)
            .map_err(|e| fail("category", e))
            .ok()
            .flatten();

        match price {
            Some(starting_price) if errors.is_empty() => Ok(NewListing {
                title: title.to_string(),
                description: description.to_string(),
                starting_price,
                image_url,
                category,
            }),
            _ => Err(errors),
        }
    }
}

impl CommentForm {
    /// Trimmed comment text, or the message for the empty case.
    pub fn validate(&self) -> Result<&str, &'static str> {
        match self.content.trim() {
            "" => Err(REQUIRED),
            content => Ok(content),
        }
    }
}

// endregion: --- Validation

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> ListingForm {
        ListingForm {
            title: "Bicycle".to_string(),
            description: "Road bike, 54cm".to_string(),
            price: "120.5".to_string(),
            image: "https://example.com/bike.jpg".to_string(),
            category: "SPORTS".to_string(),
        }
    }

    #[test]
    fn amount_is_normalized_to_cents() {
        assert_eq!(parse_amount(" 10 ").unwrap().to_string(), "10.00");
        assert_eq!(parse_amount("15.01").unwrap().to_string(), "15.01");
    }

    #[test]
    fn amount_errors_match_field_messages() {
        assert_eq!(parse_amount("").unwrap_err(), REQUIRED);
        assert_eq!(parse_amount("ten").unwrap_err(), "Enter a number.");
        assert_eq!(
            parse_amount("1.005").unwrap_err(),
            "Ensure that there are no more than 2 decimal places."
        );
        assert!(parse_amount("9999999999999.99").is_ok());
    }

    #[test]
    fn amount_integer_digits_are_capped() {
        assert_eq!(
            parse_amount("10000000000000").unwrap_err(),
            "Ensure that there are no more than 13 digits before the decimal point."
        );
        assert!(parse_amount("-10000000000000").is_err());
    }

    #[test]
    fn valid_listing_form() {
        let listing = form().validate().unwrap();
        assert_eq!(listing.title, "Bicycle");
        assert_eq!(listing.starting_price.to_string(), "120.50");
        assert_eq!(listing.category, Some(Category::Sports));
        assert_eq!(
            listing.image_url.as_deref(),
            Some("https://example.com/bike.jpg")
        );
    }

    #[test]
    fn blank_optional_fields_become_none() {
        let listing = ListingForm {
            image: " ".to_string(),
            category: String::new(),
            ..form()
        }
        .validate()
        .unwrap();
        assert_eq!(listing.image_url, None);
        assert_eq!(listing.category, None);
    }

    #[test]
    fn every_bad_field_is_reported() {
        let errors = ListingForm {
            title: "x".repeat(201),
            description: "   ".to_string(),
            price: "abc".to_string(),
            image: "not a url".to_string(),
            category: "GARDEN".to_string(),
        }
        .validate()
        .unwrap_err();

        let fields: Vec<&str> = errors.keys().map(String::as_str).collect();
        assert_eq!(
            fields,
            vec!["category", "description", "image", "price", "title"]
        );
        assert_eq!(errors["description"], vec![REQUIRED.to_string()]);
    }

    #[test]
    fn blank_comment_is_required() {
        let empty = CommentForm {
            content: "  \n".to_string(),
        };
        assert_eq!(empty.validate(), Err(REQUIRED));
        let filled = CommentForm {
            content: " Nice! ".to_string(),
        };
        assert_eq!(filled.validate(), Ok("Nice!"));
    }
}
