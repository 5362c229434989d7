//! Unified error types for the wallet and order placement core.
//!
//! Validation and policy errors carry enough context for the caller to render
//! a recoverable message (remaining cooldown, a suggested replacement code,
//! the shortfall amount). Infrastructure errors wrap the underlying store
//! error. Reference lookups that fail in an ambiguous way get their own
//! variant so callers never mistake "could not check" for "code is free".

use thiserror::Error;

/// Crate-wide error type
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration loading or parsing failure
    #[error("Configuration error: {message}")]
    Config {
        /// Description of what went wrong
        message: String,
    },

    /// Underlying database error
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Draft payload could not be serialized or deserialized
    #[error("Draft serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// No agent row exists for the given id
    #[error("Agent {id} not found")]
    AgentNotFound {
        /// The agent id that was looked up
        id: i64,
    },

    /// The selected bundle does not exist or is not currently for sale
    #[error("Data bundle {id} is not available")]
    BundleUnavailable {
        /// The bundle id that was requested
        id: i64,
    },

    /// Monetary amount is zero, negative, or not a finite number
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The rejected amount
        amount: f64,
    },

    /// Recipient phone number does not contain 10 digits
    #[error("Invalid recipient phone number: {phone}")]
    InvalidPhone {
        /// The rejected input as entered
        phone: String,
    },

    /// Wallet balance cannot cover the requested charge
    #[error("Insufficient funds: available {available:.2}, required {required:.2}")]
    InsufficientFunds {
        /// Spendable balance at check time
        available: f64,
        /// Amount the purchase requires
        required: f64,
    },

    /// An identical purchase was submitted within the cooldown window
    #[error("Duplicate order for {bundle_name}: retry allowed in {minutes_until_allowed} minute(s)")]
    DuplicateOrder {
        /// Name of the bundle from the earlier attempt
        bundle_name: String,
        /// Remaining wait before an identical order is accepted
        minutes_until_allowed: i64,
    },

    /// Reference code is below the minimum length
    #[error("Reference code '{code}' is too short; try '{suggestion}'")]
    ReferenceTooShort {
        /// The rejected code
        code: String,
        /// A freshly generated replacement candidate
        suggestion: String,
    },

    /// Reference code already exists in the ledger
    #[error("Reference code '{code}' is already in use; try '{suggestion}'")]
    ReferenceInUse {
        /// The colliding code
        code: String,
        /// A freshly generated replacement candidate
        suggestion: String,
    },

    /// Reference lookup failed in a way that proves nothing about the code
    #[error("Unable to validate reference code, try again")]
    ReferenceUnavailable(#[source] sea_orm::DbErr),

    /// A confirmation is already in flight for this checkout
    #[error("A submission is already in progress")]
    SubmissionInProgress,

    /// The requested action is not legal in the flow's current state
    #[error("Cannot {action} while checkout is in state {state}")]
    InvalidTransition {
        /// Current state of the checkout flow
        state: &'static str,
        /// The action that was attempted
        action: &'static str,
    },
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
