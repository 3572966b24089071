//! Unified error model for the dynamic-columns component.
//! Binding/lifecycle misuse and persisted-state corruption are surfaced through
//! this enum; per-cell expression failures are NOT errors at this level (they
//! render inline, see the generator module).

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ColumnsError {
    /// `set_target` was called with a different target after one was bound.
    AlreadyBound { message: String },
    /// A binding operation received an absent target.
    NullTarget { message: String },
    /// Reconciliation or a scoped operation ran before a target was bound.
    NotBound { message: String },
    /// The persisted column document does not have the expected shape.
    InvalidPersistedState { message: String },
    /// Unexpected codec/storage failure while writing state.
    Internal { message: String },
}

impl ColumnsError {
    pub fn message(&self) -> &str {
        match self {
            ColumnsError::AlreadyBound { message }
            | ColumnsError::NullTarget { message }
            | ColumnsError::NotBound { message }
            | ColumnsError::InvalidPersistedState { message }
            | ColumnsError::Internal { message } => message.as_str(),
        }
    }

    pub fn kind_str(&self) -> &'static str {
        match self {
            ColumnsError::AlreadyBound { .. } => "already_bound",
            ColumnsError::NullTarget { .. } => "null_target",
            ColumnsError::NotBound { .. } => "not_bound",
            ColumnsError::InvalidPersistedState { .. } => "invalid_persisted_state",
            ColumnsError::Internal { .. } => "internal",
        }
    }

    pub fn already_bound<S: Into<String>>(msg: S) -> Self { ColumnsError::AlreadyBound { message: msg.into() } }
    pub fn null_target<S: Into<String>>(msg: S) -> Self { ColumnsError::NullTarget { message: msg.into() } }
    pub fn not_bound<S: Into<String>>(msg: S) -> Self { ColumnsError::NotBound { message: msg.into() } }
    pub fn invalid_persisted_state<S: Into<String>>(msg: S) -> Self { ColumnsError::InvalidPersistedState { message: msg.into() } }
    pub fn internal<S: Into<String>>(msg: S) -> Self { ColumnsError::Internal { message: msg.into() } }
}

impl Display for ColumnsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind_str(), self.message())
    }
}

impl std::error::Error for ColumnsError {}

pub type ColumnsResult<T> = Result<T, ColumnsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_strings() {
        assert_eq!(ColumnsError::already_bound("x").kind_str(), "already_bound");
        assert_eq!(ColumnsError::null_target("x").kind_str(), "null_target");
        assert_eq!(ColumnsError::not_bound("x").kind_str(), "not_bound");
        assert_eq!(ColumnsError::invalid_persisted_state("x").kind_str(), "invalid_persisted_state");
        assert_eq!(ColumnsError::internal("x").kind_str(), "internal");
    }

    #[test]
    fn display_includes_kind_and_message() {
        let e = ColumnsError::not_bound("target has not been set");
        assert_eq!(e.to_string(), "not_bound: target has not been set");
        assert_eq!(e.message(), "target has not been set");
    }
}
