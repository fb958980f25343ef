/// Authentication types
///
/// The hosted backend issues HS256 access tokens for signed-in accounts. This
/// module decodes them into an [`AuthUser`], the record the rest of the
/// workspace works with.
///
/// # Example
///
/// ```
/// use cartlist_shared::auth::jwt::{create_token, validate_access_token, AccessClaims};
/// use cartlist_shared::auth::AuthUser;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let claims = AccessClaims::new(Uuid::new_v4(), Some("ana@example.com".into()))
///     .with_signup_language("lt");
/// let token = create_token(&claims, "project-jwt-secret")?;
///
/// let user = AuthUser::from(validate_access_token(&token, "project-jwt-secret")?);
/// assert_eq!(user.signup_language.as_deref(), Some("lt"));
/// # Ok(())
/// # }
/// ```

pub mod jwt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use jwt::AccessClaims;

/// Authenticated account as seen by the auth service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    /// Account ID, equal to the profile ID
    pub id: Uuid,

    /// Email address, if the account has one
    pub email: Option<String>,

    /// Language picked on the sign-up form
    pub signup_language: Option<String>,
}

impl From<AccessClaims> for AuthUser {
    fn from(claims: AccessClaims) -> Self {
        Self {
            id: claims.sub,
            email: claims.email,
            signup_language: claims.user_metadata.signup_language,
        }
    }
}
