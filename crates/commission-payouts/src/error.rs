//! Payout Error Types

use chrono::NaiveDate;
use membership_core::RelationshipId;
use thiserror::Error;

use crate::record::{PayoutId, PayoutStatus};

/// Result type alias
pub type Result<T> = std::result::Result<T, PayoutError>;

/// Payout-engine errors
#[derive(Error, Debug)]
pub enum PayoutError {
    /// A payout already exists for this relationship and month.
    /// Recoverable: the caller treats it as already-processed.
    #[error("payout already exists for relationship {relationship_id} in {payout_month}")]
    DuplicateRecord {
        relationship_id: RelationshipId,
        payout_month: NaiveDate,
    },

    /// A bulk status transition targeted a record not in the expected
    /// source state. Never partially applied; `targets` is the full set
    /// of ids the transition attempted, so the admin layer can surface
    /// "batch incomplete, no payouts marked paid" with the records to
    /// re-trigger.
    #[error("payout {payout_id} is {status}, expected pending")]
    InvalidTransition {
        payout_id: PayoutId,
        status: PayoutStatus,
        targets: Vec<PayoutId>,
    },

    /// Storage backend failure
    #[error("storage error: {0}")]
    Storage(String),
}

impl PayoutError {
    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PayoutError::InvalidTransition { .. } | PayoutError::Storage(_)
        )
    }

    /// Whether this error means the work was already done
    pub fn is_already_processed(&self) -> bool {
        matches!(self, PayoutError::DuplicateRecord { .. })
    }
}

impl From<anyhow::Error> for PayoutError {
    fn from(err: anyhow::Error) -> Self {
        PayoutError::Storage(err.to_string())
    }
}
