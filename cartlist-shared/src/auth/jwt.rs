/// Access-token claims and validation
///
/// The hosted auth service signs access tokens with the project's JWT secret
/// using HS256. Tokens carry the account ID in `sub`, the audience
/// `authenticated`, and free-form `user_metadata` captured at sign-up. The
/// language chosen on the sign-up form lives in
/// `user_metadata.signup_language`.
///
/// Issuing tokens is the auth service's job. [`create_token`] exists so tests
/// and local tooling can mint tokens the validator accepts.
///
/// # Example
///
/// ```
/// use cartlist_shared::auth::jwt::{create_token, validate_access_token, AccessClaims};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let account = Uuid::new_v4();
/// let token = create_token(&AccessClaims::new(account, None), "secret")?;
///
/// let claims = validate_access_token(&token, "secret")?;
/// assert_eq!(claims.sub, account);
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Audience of tokens issued to signed-in accounts
pub const AUTHENTICATED_AUDIENCE: &str = "authenticated";

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Failed to validate token
    #[error("Failed to validate token: {0}")]
    ValidationError(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Token was not issued for signed-in accounts
    #[error("Invalid audience: expected {}", AUTHENTICATED_AUDIENCE)]
    InvalidAudience,
}

/// Sign-up metadata attached to the auth record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserMetadata {
    /// Language picked on the sign-up form
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signup_language: Option<String>,
}

/// Access-token claims
///
/// Unknown claims in the token are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject - account ID
    pub sub: Uuid,

    /// Audience - `authenticated` for signed-in accounts
    pub aud: String,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Email address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Database role the backend assumes for this token
    #[serde(default = "default_role")]
    pub role: String,

    /// Sign-up metadata
    #[serde(default)]
    pub user_metadata: UserMetadata,
}

fn default_role() -> String {
    AUTHENTICATED_AUDIENCE.to_string()
}

impl AccessClaims {
    /// Claims for a signed-in account, valid for one hour
    pub fn new(account_id: Uuid, email: Option<String>) -> Self {
        let now = Utc::now();

        Self {
            sub: account_id,
            aud: AUTHENTICATED_AUDIENCE.to_string(),
            exp: (now + Duration::hours(1)).timestamp(),
            iat: now.timestamp(),
            email,
            role: default_role(),
            user_metadata: UserMetadata::default(),
        }
    }

    /// Sets the sign-up language
    pub fn with_signup_language(mut self, language: impl Into<String>) -> Self {
        self.user_metadata.signup_language = Some(language.into());
        self
    }

    /// Replaces the expiration, counted from the issue time
    pub fn with_expiration(mut self, expires_in: Duration) -> Self {
        self.exp = self.iat + expires_in.num_seconds();
        self
    }

    /// Checks if token has expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Signs claims with HS256
///
/// # Errors
///
/// Returns `JwtError::CreateError` if encoding fails
pub fn create_token(claims: &AccessClaims, secret: &str) -> Result<String, JwtError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key)
        .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Validates an access token and extracts its claims
///
/// Verifies the HS256 signature, the expiration and the `authenticated`
/// audience.
///
/// # Errors
///
/// - `JwtError::Expired` if the token has expired
/// - `JwtError::InvalidAudience` if the audience is not `authenticated`
/// - `JwtError::ValidationError` for bad signatures or malformed tokens
pub fn validate_access_token(token: &str, secret: &str) -> Result<AccessClaims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_audience(&[AUTHENTICATED_AUDIENCE]);
    validation.validate_exp = true;

    let token_data = decode::<AccessClaims>(token, &key, &validation).map_err(|e| {
        match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
            jsonwebtoken::errors::ErrorKind::InvalidAudience => JwtError::InvalidAudience,
            _ => JwtError::ValidationError(format!("Token validation failed: {}", e)),
        }
    })?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    #[test]
    fn test_claims_creation() {
        let account = Uuid::new_v4();
        let claims = AccessClaims::new(account, Some("ana@example.com".to_string()));

        assert_eq!(claims.sub, account);
        assert_eq!(claims.aud, "authenticated");
        assert_eq!(claims.role, "authenticated");
        assert_eq!(claims.user_metadata.signup_language, None);
        assert!(!claims.is_expired());
    }

    #[test]
    fn test_create_and_validate_token() {
        let account = Uuid::new_v4();
        let claims = AccessClaims::new(account, None).with_signup_language("no");
        let token = create_token(&claims, SECRET).expect("Should create token");

        let validated = validate_access_token(&token, SECRET).expect("Should validate token");
        assert_eq!(validated.sub, account);
        assert_eq!(validated.user_metadata.signup_language.as_deref(), Some("no"));
    }

    #[test]
    fn test_validate_with_wrong_secret() {
        let token = create_token(&AccessClaims::new(Uuid::new_v4(), None), "secret1").unwrap();
        let result = validate_access_token(&token, "wrong-secret");
        assert!(matches!(result, Err(JwtError::ValidationError(_))));
    }

    #[test]
    fn test_validate_expired_token() {
        let claims =
            AccessClaims::new(Uuid::new_v4(), None).with_expiration(Duration::seconds(-3600));
        assert!(claims.is_expired());

        let token = create_token(&claims, SECRET).unwrap();
        let result = validate_access_token(&token, SECRET);
        assert!(matches!(result, Err(JwtError::Expired)));
    }

    #[test]
    fn test_validate_wrong_audience() {
        let mut claims = AccessClaims::new(Uuid::new_v4(), None);
        claims.aud = "anon".to_string();

        let token = create_token(&claims, SECRET).unwrap();
        let result = validate_access_token(&token, SECRET);
        assert!(matches!(result, Err(JwtError::InvalidAudience)));
    }

    #[test]
    fn test_missing_metadata_defaults() {
        let json = serde_json::json!({
            "sub": Uuid::new_v4(),
            "aud": "authenticated",
            "exp": 4_000_000_000i64,
            "iat": 1_700_000_000i64,
        });
        let claims: AccessClaims = serde_json::from_value(json).unwrap();
        assert_eq!(claims.user_metadata, UserMetadata::default());
        assert_eq!(claims.role, "authenticated");
        assert_eq!(claims.email, None);
    }
}
