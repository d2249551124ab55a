//! # Error Types
//!
//! Domain-specific error types for masterclass-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  masterclass-core errors (this file)                                   │
//! │  ├── CoreError        - Engine and domain errors                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  masterclass-db errors (separate crate)                                │
//! │  └── DbError          - Database failures, converted into CoreError    │
//! │                         when they cross a port                          │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError ← DbError                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The engine surfaces collaborator errors unchanged and never retries.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Errors returned by the cart engine and the store ports.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A cart, product or order id did not resolve.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Quantity outside the allowed range.
    ///
    /// ## When This Occurs
    /// - `add_item` would push a line past `MAX_ITEM_QUANTITY`
    /// - `change_qty` asks for more than `MAX_ITEM_QUANTITY`
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    InvalidQuantity { requested: i64, max: i64 },

    /// Cart already holds the maximum number of distinct products.
    #[error("Cart cannot have more than {max} items")]
    CartTooLarge { max: usize },

    /// The cart changed between read and write.
    ///
    /// ## User Workflow
    /// ```text
    /// Request A: read cart (v3) ─────────────► replace(v3) ✓ → v4
    /// Request B: read cart (v3) ──────────────────────► replace(v3) ✗
    ///                                                   Conflict { v3 }
    /// ```
    /// Nothing is written on conflict. The caller decides whether to retry.
    #[error("Cart {cart_id} was modified concurrently (expected version {expected_version})")]
    Conflict {
        cart_id: String,
        expected_version: i64,
    },

    /// A store round trip failed.
    #[error("Persistence failure: {0}")]
    Persistence(String),

    /// A monetary calculation left the representable range.
    #[error("Monetary amount out of range")]
    AmountOverflow,

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        CoreError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Returns true for [`CoreError::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, CoreError::NotFound { .. })
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before business logic runs, and again at the persistence boundary
/// when rows are written.
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

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format (e.g., invalid UUID, invalid email).
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::not_found("Product", "abc");
        assert_eq!(err.to_string(), "Product not found: abc");
        assert!(err.is_not_found());

        let err = CoreError::InvalidQuantity {
            requested: 1000,
            max: 999,
        };
        assert_eq!(
            err.to_string(),
            "Quantity 1000 exceeds maximum allowed (999)"
        );
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "email".to_string(),
        };
        assert_eq!(err.to_string(), "email is required");

        let err = ValidationError::MustNotBeNegative {
            field: "price".to_string(),
        };
        assert_eq!(err.to_string(), "price must not be negative");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "sku".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
