use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use tracing::{debug, info, instrument, warn};

use super::domain::Claims;
use super::errors::AuthError;

/// Issues and verifies HS256 session tokens.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_secs: i64,
}

impl TokenService {
    pub fn new(secret: &str, ttl_secs: u64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl_secs: i64::try_from(ttl_secs).unwrap_or(i64::MAX),
        }
    }

    /// Sign a token for `email`, valid for the configured lifetime.
    ///
    /// # Examples
    /// ```
    /// use service::auth::TokenService;
    /// let tokens = TokenService::new("secret", 3600);
    /// let token = tokens.issue("user@example.com").unwrap();
    /// assert_eq!(tokens.verify(&token).unwrap().email, "user@example.com");
    /// ```
    #[instrument(skip(self))]
    pub fn issue(&self, email: &str) -> Result<String, AuthError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(AuthError::Validation("email is required".into()));
        }
        let iat = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: email.to_string(),
            email: email.to_string(),
            iat,
            exp: iat.saturating_add(self.ttl_secs),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AuthError::TokenError(e.to_string()))?;
        info!(exp = claims.exp, "session_issued");
        Ok(token)
    }

    /// Check signature and expiry.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let validation = Validation::new(Algorithm::HS256);
        match decode::<Claims>(token, &self.decoding, &validation) {
            Ok(data) => {
                debug!(email = %data.claims.email, "session verified");
                Ok(data.claims)
            }
            Err(e) => {
                warn!(reason = %e, "session token rejected");
                Err(AuthError::InvalidToken(e.to_string()))
            }
        }
    }

    /// The verified caller must be the owner named in the path.
    pub fn ensure_owner(claims: &Claims, owner: &str) -> Result<(), AuthError> {
        if claims.email == owner {
            Ok(())
        } else {
            warn!(caller = %claims.email, owner, "owner mismatch");
            Err(AuthError::Forbidden)
        }
    }
}
