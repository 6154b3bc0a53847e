//! Error types for the modifier key-translation layer.
//!
//! Nothing in the derivation pipeline itself is fatal: malformed input is
//! coerced, unresolvable references are skipped. The only operation with a
//! meaningful failure mode is parsing an external modifier key into a typed
//! [`crate::modifier::ModifierTarget`], and the overlay treats those
//! failures as "unmatched key, ignore". The error type exists so that the
//! translation layer stays individually testable.

use thiserror::Error;

/// Reasons a modifier key fails to translate into a typed target.
///
/// # Examples
///
/// ```rust
/// use sheetstat::{EngineConfig, ModifierTarget};
///
/// let config = EngineConfig::default();
/// let err = ModifierTarget::parse("system.offense.attacks.x.hit", &config).unwrap_err();
/// assert!(err.to_string().contains("row index"));
/// ```
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeyParseError {
    /// The key does not start with any recognized target prefix.
    #[error("unrecognized modifier key: {0}")]
    UnknownKey(String),

    /// A row index segment was not a non-negative integer.
    #[error("invalid row index in modifier key: {0}")]
    BadIndex(String),

    /// The field segment is not addressable on this target.
    #[error("unknown field {field:?} in modifier key: {key}")]
    UnknownField { key: String, field: String },

    /// The damage type is not in the configured canonical set.
    #[error("unknown damage type {0:?}")]
    UnknownDamageType(String),

    /// The source category is not in the configured canonical set.
    #[error("unknown source category {0:?}")]
    UnknownSource(String),
}
