#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};

/// Coarse classification of a failed fetch. Carried for logs and metric labels; the
/// scheduler handles every kind the same way.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum FetchErrorKind {
    Transport,
    Auth,
    Malformed,
}

impl FetchErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FetchErrorKind::Transport => "transport",
            FetchErrorKind::Auth => "auth",
            FetchErrorKind::Malformed => "malformed",
        }
    }
}

impl std::fmt::Display for FetchErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.write_str(self.as_str()) }
}

/// The only error that leaves the event source.
#[derive(Debug, Clone, thiserror::Error, Serialize, Deserialize, PartialEq, Eq)]
#[error("{kind}: {message}")]
pub struct FetchError {
    pub kind: FetchErrorKind,
    pub message: String,
}

impl FetchError {
    pub fn new(kind: FetchErrorKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into() }
    }

    pub fn transport(message: impl Into<String>) -> Self { Self::new(FetchErrorKind::Transport, message) }

    pub fn auth(message: impl Into<String>) -> Self { Self::new(FetchErrorKind::Auth, message) }

    pub fn malformed(message: impl Into<String>) -> Self { Self::new(FetchErrorKind::Malformed, message) }
}

pub type FetchResult<T> = Result<T, FetchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_kind_and_message() {
        let e = FetchError::auth("token expired");
        assert_eq!(e.to_string(), "auth: token expired");
        assert_eq!(FetchError::malformed("x").kind, FetchErrorKind::Malformed);
    }
}
