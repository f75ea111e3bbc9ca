//! Domain error types.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FunnelError {
    /// A required field was missing or malformed before any network call.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Submission was attempted while a previous one is still in flight.
    #[error("A submission is already in progress")]
    SubmissionInProgress,

    /// Payment was attempted while a previous attempt is still in flight.
    #[error("A payment is already being processed")]
    PaymentInProgress,

    /// Payment preconditions (lead id, service, name) were not met.
    #[error("Payment precondition not met: {0}")]
    PaymentPrecondition(String),

    /// A payment-status transition outside the allowed lifecycle.
    #[error("Invalid payment status transition: {0}")]
    InvalidTransition(String),
}

pub type Result<T> = std::result::Result<T, FunnelError>;
