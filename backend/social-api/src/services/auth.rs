//! Registration, credential verification and token issuance
use once_cell::sync::Lazy;
use tracing::{info, warn};

use crate::db::CredentialStore;
use crate::error::{AppError, Result};
use crate::security::password::{hash_password, verify_password};
use crypto_core::JwtKeys;

/// Hash verified when the email is unknown, so both login failures cost one
/// Argon2 verification.
static DUMMY_HASH: Lazy<Option<String>> =
    Lazy::new(|| hash_password("social-api-dummy-password").ok());

async fn run_blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AppError::Internal(format!("blocking task failed: {}", e)))?
}

/// Hash the password and persist a new user.
pub async fn register(
    store: &dyn CredentialStore,
    email: &str,
    name: &str,
    password: &str,
) -> Result<i64> {
    let password = password.to_owned();
    let password_hash = run_blocking(move || hash_password(&password)).await?;

    let user_id = store.register(email, name, &password_hash).await?;
    info!(user_id, "User registered");
    Ok(user_id)
}

/// Resolve an email/password pair to a user id.
///
/// `None` covers both an unknown email and a wrong password.
pub async fn verify_credentials(
    store: &dyn CredentialStore,
    email: &str,
    password: &str,
) -> Result<Option<i64>> {
    let user = store.find_by_email(email).await?;
    let password = password.to_owned();

    match user {
        Some(user) => {
            let hash = user.password_hash;
            let matches = run_blocking(move || verify_password(&password, &hash)).await?;
            Ok(matches.then_some(user.id))
        }
        None => {
            run_blocking(move || {
                if let Some(hash) = DUMMY_HASH.as_deref() {
                    verify_password(&password, hash)?;
                }
                Ok(())
            })
            .await?;
            Ok(None)
        }
    }
}

/// Verify credentials and issue an access token.
pub async fn login(
    store: &dyn CredentialStore,
    jwt: &JwtKeys,
    email: &str,
    password: &str,
) -> Result<String> {
    match verify_credentials(store, email, password).await? {
        Some(user_id) => {
            let token = jwt.issue(user_id)?;
            info!(user_id, "User logged in");
            Ok(token)
        }
        None => {
            warn!("Login rejected");
            Err(AppError::InvalidCredentials)
        }
    }
}
