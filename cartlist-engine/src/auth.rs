/// Auth provider seam
///
/// The engine needs three facts about the signed-in account: its ID, its
/// email, and the language it picked on the sign-up form. [`AuthProvider`]
/// supplies them.
///
/// # Providers
///
/// - [`TokenAuthProvider`]: decodes the access token issued by the hosted auth
///   service (HS256, audience `authenticated`)
/// - [`StaticAuthProvider`]: returns a fixed record, for tests and local runs
///
/// # Example
///
/// ```
/// use cartlist_engine::auth::{AuthProvider, StaticAuthProvider};
/// use cartlist_shared::auth::AuthUser;
/// use uuid::Uuid;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let provider = StaticAuthProvider::new(AuthUser {
///     id: Uuid::new_v4(),
///     email: None,
///     signup_language: Some("no".to_string()),
/// });
///
/// let user = provider.current_user().await?;
/// assert_eq!(user.signup_language.as_deref(), Some("no"));
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use cartlist_shared::auth::jwt::{validate_access_token, JwtError};
use cartlist_shared::auth::AuthUser;
use tracing::debug;

/// Auth error types
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No account is signed in
    #[error("No signed-in account")]
    NotSignedIn,

    /// The access token was rejected
    #[error("Invalid access token: {0}")]
    InvalidToken(#[from] JwtError),

    /// The provider could not be reached
    #[error("Auth provider unavailable: {0}")]
    Unavailable(String),
}

/// Source of the signed-in account
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Returns the signed-in account
    async fn current_user(&self) -> Result<AuthUser, AuthError>;
}

/// Provider that decodes an access token
pub struct TokenAuthProvider {
    access_token: Option<String>,
    jwt_secret: String,
}

impl TokenAuthProvider {
    /// Creates a provider for `access_token`, verified with the project secret
    pub fn new(access_token: Option<String>, jwt_secret: impl Into<String>) -> Self {
        Self {
            access_token,
            jwt_secret: jwt_secret.into(),
        }
    }
}

#[async_trait]
impl AuthProvider for TokenAuthProvider {
    async fn current_user(&self) -> Result<AuthUser, AuthError> {
        let token = self.access_token.as_deref().ok_or(AuthError::NotSignedIn)?;
        let claims = validate_access_token(token, &self.jwt_secret)?;

        debug!(account_id = %claims.sub, "Access token accepted");
        Ok(AuthUser::from(claims))
    }
}

/// Provider that always returns the same result
pub struct StaticAuthProvider {
    user: Option<AuthUser>,
}

impl StaticAuthProvider {
    /// Provider for a signed-in account
    pub fn new(user: AuthUser) -> Self {
        Self { user: Some(user) }
    }

    /// Provider whose every call fails with `AuthError::Unavailable`
    pub fn unavailable() -> Self {
        Self { user: None }
    }
}

#[async_trait]
impl AuthProvider for StaticAuthProvider {
    async fn current_user(&self) -> Result<AuthUser, AuthError> {
        self.user
            .clone()
            .ok_or_else(|| AuthError::Unavailable("static provider has no account".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cartlist_shared::auth::jwt::{create_token, AccessClaims};
    use chrono::Duration;
    use uuid::Uuid;

    const SECRET: &str = "super-secret-jwt-token-with-at-least-32-characters";

    #[tokio::test]
    async fn test_token_provider_reads_signup_language() {
        let account = Uuid::new_v4();
        let claims = AccessClaims::new(account, Some("ona@example.com".to_string()))
            .with_signup_language("lt");
        let token = create_token(&claims, SECRET).unwrap();

        let provider = TokenAuthProvider::new(Some(token), SECRET);
        let user = provider.current_user().await.unwrap();

        assert_eq!(user.id, account);
        assert_eq!(user.email.as_deref(), Some("ona@example.com"));
        assert_eq!(user.signup_language.as_deref(), Some("lt"));
    }

    #[tokio::test]
    async fn test_token_provider_without_token() {
        let provider = TokenAuthProvider::new(None, SECRET);
        assert!(matches!(
            provider.current_user().await,
            Err(AuthError::NotSignedIn)
        ));
    }

    #[tokio::test]
    async fn test_token_provider_rejects_expired_token() {
        let claims = AccessClaims::new(Uuid::new_v4(), None).with_expiration(Duration::minutes(-5));
        let token = create_token(&claims, SECRET).unwrap();

        let provider = TokenAuthProvider::new(Some(token), SECRET);
        assert!(matches!(
            provider.current_user().await,
            Err(AuthError::InvalidToken(JwtError::Expired))
        ));
    }

    #[tokio::test]
    async fn test_static_provider() {
        let provider = StaticAuthProvider::unavailable();
        assert!(matches!(
            provider.current_user().await,
            Err(AuthError::Unavailable(_))
        ));
    }
}
