//! Accounts: password hashing, register/login, and the session cookie.

pub mod session;

pub use session::{CurrentUser, MaybeUser};

// region:    --- Imports
use crate::bidding::model::User;
use crate::error::AuctionError;
use crate::forms::{LoginForm, RegisterForm};
use crate::store::AuctionStore;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use tracing::{info, warn};

// endregion: --- Imports

// region:    --- Passwords

/// Hash `password` into a PHC string (argon2id, random salt).
pub fn hash_password(password: &str) -> Result<String, AuctionError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuctionError::PasswordHash(e.to_string()))
}

pub fn verify_password(password: &str, password_hash: &str) -> bool {
    match PasswordHash::new(password_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            warn!("{:<12} --> unreadable password hash: {}", "Accounts", e);
            false
        }
    }
}

// endregion: --- Passwords

// region:    --- Register / Login

/// Create an account. The caller starts the session.
pub async fn register(store: &dyn AuctionStore, form: &RegisterForm) -> Result<User, AuctionError> {
    if form.password != form.confirmation {
        return Err(AuctionError::PasswordMismatch);
    }
    let username = form.username.trim();
    if username.is_empty() {
        return Err(AuctionError::UsernameRequired);
    }

    let password_hash = hash_password(&form.password)?;
    let user = store
        .create_user(username, form.email.trim(), &password_hash)
        .await?;
    info!("{:<12} --> registered user {}", "Accounts", user.id);
    Ok(user)
}

/// Check credentials. Unknown user and wrong password look the same.
pub async fn login(store: &dyn AuctionStore, form: &LoginForm) -> Result<User, AuctionError> {
    let credentials = store
        .find_credentials(form.username.trim())
        .await?
        .filter(|c| verify_password(&form.password, &c.password_hash))
        .ok_or(AuctionError::InvalidCredentials)?;

    store
        .get_user(credentials.id)
        .await?
        .ok_or(AuctionError::InvalidCredentials)
}

// endregion: --- Register / Login

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryAuctionStore;

    fn register_form(username: &str, password: &str, confirmation: &str) -> RegisterForm {
        RegisterForm {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password: password.to_string(),
            confirmation: confirmation.to_string(),
        }
    }

    #[test]
    fn hash_verifies_only_the_original_password() {
        let hash = hash_password("hunter2").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("hunter2", &hash));
        assert!(!verify_password("hunter3", &hash));
        assert!(!verify_password("hunter2", "not-a-phc-string"));
    }

    #[tokio::test]
    async fn register_checks_confirmation_first() {
        let store = MemoryAuctionStore::new();
        let err = register(&store, &register_form("dave", "a", "b")).await;
        assert!(matches!(err, Err(AuctionError::PasswordMismatch)));
        assert!(store.find_credentials("dave").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_username_is_reported() {
        let store = MemoryAuctionStore::new();
        register(&store, &register_form("erin", "pw", "pw"))
            .await
            .unwrap();
        let err = register(&store, &register_form("erin", "other", "other")).await;
        assert!(matches!(err, Err(AuctionError::UsernameTaken)));
        assert_eq!(err.unwrap_err().to_string(), "Username already taken.");
    }

    #[tokio::test]
    async fn login_accepts_only_matching_password() {
        let store = MemoryAuctionStore::new();
        let user = register(&store, &register_form("frank", "s3cret", "s3cret"))
            .await
            .unwrap();

        let ok = login(
            &store,
            &LoginForm {
                username: "frank".to_string(),
                password: "s3cret".to_string(),
            },
        )
        .await
        .unwrap();
        assert_eq!(ok.id, user.id);

        for (username, password) in [("frank", "wrong"), ("nobody", "s3cret")] {
            let err = login(
                &store,
                &LoginForm {
                    username: username.to_string(),
                    password: password.to_string(),
                },
            )
            .await;
            assert!(matches!(err, Err(AuctionError::InvalidCredentials)));
        }
    }
}
