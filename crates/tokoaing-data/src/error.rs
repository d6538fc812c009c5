use thiserror::Error;

/// Failures surfaced by the realtime store.
///
/// Missing records are not errors: reads return `None` and mutations of a
/// missing record no-op, matching the store's semantics.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A push, update, remove, or transaction failed to commit.
    #[error("store write failed: {0}")]
    Write(String),

    /// A snapshot read or subscription failed.
    #[error("store read failed: {0}")]
    Read(String),
}

impl StoreError {
    pub fn write(err: impl std::fmt::Display) -> Self {
        Self::Write(err.to_string())
    }

    pub fn read(err: impl std::fmt::Display) -> Self {
        Self::Read(err.to_string())
    }
}

/// Failures of the admin-session flow.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Password did not match the configured admin credential.
    #[error("invalid admin credentials")]
    InvalidCredentials,

    /// Token is malformed, carries a bad signature, or has the wrong shape.
    #[error("invalid session token: {0}")]
    InvalidToken(String),

    /// Token was valid once but its expiry has passed.
    #[error("session token expired")]
    Expired,

    /// Admin session is not configured correctly.
    #[error("admin session misconfigured: {0}")]
    Config(String),
}
