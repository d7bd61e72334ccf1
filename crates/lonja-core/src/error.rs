//! # Error Types
//!
//! Domain errors for lonja-core, split in two:
//!
//! - [`ValidationError`] rejects malformed input (blank fields, bad
//!   ranges) and carries the field name so the UI can point at the
//!   offending control.
//! - [`CoreError`] covers business rule violations past validation,
//!   such as draft limits and the submit-in-flight guard. It absorbs
//!   `ValidationError` via `#[from]`.
//!
//! The storage crate wraps both into its own error type, so the flow
//! is ValidationError → CoreError → DbError → UI. Every variant's
//! message is written to be shown to the operator as-is.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations or domain logic failures.
/// They should be caught and translated to user-friendly messages.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Draft has exceeded the maximum allowed number of lines.
    #[error("Order draft cannot have more than {max} lines")]
    DraftTooLarge { max: usize },

    /// Line quantity exceeds the maximum allowed.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// A submit is already in flight for this draft session.
    ///
    /// ## When This Occurs
    /// - Double-clicking the submit button
    /// - Retrying before the previous persistence call resolved
    #[error("A submit is already in progress for this draft")]
    SubmitInFlight,

    /// The customer cannot be changed on a draft loaded from a
    /// persisted order.
    #[error("Customer cannot be changed while editing an existing order")]
    CustomerLocked,

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustBeNonNegative { field: String },

    /// A collection must contain at least one entry.
    #[error("{field} must contain at least one entry")]
    MustNotBeEmpty { field: String },

    /// Invalid format (e.g., invalid UUID).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
