//! Failure taxonomy of the authentication core.
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Unknown account or wrong password; the two are never told apart
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Unparsable token, bad signature or unexpected algorithm
    #[error("malformed token")]
    MalformedToken,

    #[error("token expired")]
    ExpiredToken,

    #[error("token has no subject")]
    MissingSubject,

    #[error("password hashing failed: {0}")]
    Hashing(String),

    #[error("token signing failed: {0}")]
    Signing(String),

    #[error("invalid auth configuration: {0}")]
    Config(String),
}

impl AuthError {
    /// True for failures caused by what the client presented
    pub fn is_client_failure(&self) -> bool {
        matches!(
            self,
            AuthError::InvalidCredentials
                | AuthError::MalformedToken
                | AuthError::ExpiredToken
                | AuthError::MissingSubject
        )
    }
}
