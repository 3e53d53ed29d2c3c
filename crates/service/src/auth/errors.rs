use thiserror::Error;

/// Errors raised while issuing or checking a session
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("missing session token")]
    MissingToken,
    #[error("invalid session token: {0}")]
    InvalidToken(String),
    #[error("caller does not own this resource")]
    Forbidden,
    #[error("token error: {0}")]
    TokenError(String),
}

impl AuthError {
    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            AuthError::Validation(_) => 1001,
            AuthError::MissingToken => 1004,
            AuthError::InvalidToken(_) => 1005,
            AuthError::Forbidden => 1006,
            AuthError::TokenError(_) => 1102,
        }
    }

    /// 401 as opposed to 403 or 400.
    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, AuthError::MissingToken | AuthError::InvalidToken(_))
    }
}
