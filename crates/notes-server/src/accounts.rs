//! Registration and login.

use notes_core::{MAX_EMAIL_CHARS, limits};
use notes_store::{NewUser, Store, StoreError, UserRow};

use crate::auth::{self, TokenError, TokenService};

/// Failures of the account flows.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("{0}")]
    Validation(String),

    #[error("email already registered")]
    DuplicateEmail,

    /// Unknown email and wrong password both end up here.
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("password hashing failed: {0}")]
    Hashing(String),

    #[error("token issuance failed: {0}")]
    TokenIssuance(#[from] TokenError),

    #[error("persistence failed: {0}")]
    Persistence(StoreError),
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateEmail(_) => Self::DuplicateEmail,
            other => Self::Persistence(other),
        }
    }
}

/// Argon2id hash (default cost) of no real password. Unknown emails are
/// verified against it so that login costs the same whether or not the
/// account exists.
const DUMMY_PASSWORD_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$c29tZXNhbHRzb21lc2FsdA$AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";

/// A user together with a freshly issued token.
#[derive(Debug, Clone)]
pub struct Session {
    pub user: UserRow,
    pub token: String,
}

fn validate_credentials(email: &str, password: &str) -> Result<(), AuthError> {
    if email.is_empty() || password.is_empty() {
        return Err(AuthError::Validation(
            "Email and password are required".to_string(),
        ));
    }
    if !email.contains('@') {
        return Err(AuthError::Validation("Invalid email address".to_string()));
    }
    if !limits::fits(email, MAX_EMAIL_CHARS) {
        return Err(AuthError::Validation(format!(
            "Email must be at most {MAX_EMAIL_CHARS} characters"
        )));
    }
    Ok(())
}

/// Create an account and sign it in.
///
/// Uniqueness of the email is left to the database constraint.
pub async fn register(
    store: &Store,
    tokens: &TokenService,
    email: &str,
    password: &str,
) -> Result<Session, AuthError> {
    validate_credentials(email, password)?;

    let password_hash =
        auth::hash_password(password).map_err(|e| AuthError::Hashing(e.to_string()))?;

    let user = store
        .insert_user(&NewUser {
            email: email.to_string(),
            password_hash,
        })
        .await?;

    let token = tokens.issue(user.user_id(), &user.email)?;

    tracing::info!(user_id = %user.user_id(), "User registered");

    Ok(Session { user, token })
}

/// Check credentials and issue a token.
pub async fn login(
    store: &Store,
    tokens: &TokenService,
    email: &str,
    password: &str,
) -> Result<Session, AuthError> {
    validate_credentials(email, password)?;

    let Some(user) = store.get_user_by_email(email).await? else {
        // Result is ignored; only the time spent matters.
        let _ = auth::verify_password(password, DUMMY_PASSWORD_HASH);
        return Err(AuthError::InvalidCredentials);
    };

    let matches = auth::verify_password(password, &user.password_hash)
        .map_err(|e| AuthError::Hashing(e.to_string()))?;
    if !matches {
        tracing::debug!(user_id = %user.user_id(), "Login rejected: wrong password");
        return Err(AuthError::InvalidCredentials);
    }

    let token = tokens.issue(user.user_id(), &user.email)?;

    tracing::info!(user_id = %user.user_id(), "User logged in");

    Ok(Session { user, token })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_validation() {
        assert!(validate_credentials("a@example.com", "pw").is_ok());
        assert!(matches!(
            validate_credentials("", "pw"),
            Err(AuthError::Validation(_))
        ));
        assert!(matches!(
            validate_credentials("a@example.com", ""),
            Err(AuthError::Validation(_))
        ));
        assert!(matches!(
            validate_credentials("not-an-email", "pw"),
            Err(AuthError::Validation(_))
        ));
    }

    #[test]
    fn test_overlong_email_is_a_validation_error() {
        let local = "a".repeat(MAX_EMAIL_CHARS);
        let email = format!("{local}@example.com");
        assert!(matches!(
            validate_credentials(&email, "pw"),
            Err(AuthError::Validation(_))
        ));

        let fits = format!("{}@example.com", "a".repeat(MAX_EMAIL_CHARS - "@example.com".len()));
        assert!(validate_credentials(&fits, "pw").is_ok());
    }

    #[test]
    fn test_dummy_hash_is_a_real_phc_string_that_never_matches() {
        assert!(!auth::verify_password("", DUMMY_PASSWORD_HASH).unwrap());
        assert!(!auth::verify_password("password", DUMMY_PASSWORD_HASH).unwrap());
    }

    #[test]
    fn test_duplicate_email_is_recognized_structurally() {
        let err: AuthError = StoreError::DuplicateEmail("a@example.com".to_string()).into();
        assert!(matches!(err, AuthError::DuplicateEmail));

        let err: AuthError = StoreError::MigrationError("x".to_string()).into();
        assert!(matches!(err, AuthError::Persistence(_)));
    }
}
