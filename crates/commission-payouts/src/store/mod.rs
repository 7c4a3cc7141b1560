//! Storage Abstractions
//!
//! Trait seams between the payout engine and whatever backs it - a
//! relational table, a document store, or the in-memory implementations
//! in [`memory`] used for tests and local development. The invariants
//! (unique relationship+month, all-or-nothing transitions) are the
//! contract, not the storage technology.

mod memory;

pub use memory::{MemoryPayoutLedger, MemoryRelationshipStore};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use membership_core::{AgentId, CommissionRelationship, MemberId, RelationshipId};

use crate::error::Result;
use crate::record::{BatchId, NewPayout, PayoutId, PayoutRecord, PayoutStatus};

/// Read access to standing commission relationships.
///
/// Populated by the enrollment workflow; the payout engine only reads.
#[async_trait]
pub trait RelationshipStore: Send + Sync {
    /// All active relationships for a member: the direct relationship (if
    /// any) plus one override per upline level. A member with no
    /// relationships yields an empty list, not an error - the payment
    /// simply produces zero payouts.
    ///
    /// Zero-rate override relationships are included: they generate
    /// zero-amount payout records so the hierarchy stays auditable.
    async fn relationships_for_member(
        &self,
        member_id: &MemberId,
    ) -> Result<Vec<CommissionRelationship>>;

    /// All relationships for a member regardless of active flag. The
    /// cancellation flow uses this: a relationship the enrollment
    /// workflow already deactivated still needs its future payouts
    /// cancelled.
    async fn all_relationships_for_member(
        &self,
        member_id: &MemberId,
    ) -> Result<Vec<CommissionRelationship>>;
}

/// Persisted payout records and their state transitions.
#[async_trait]
pub trait PayoutLedger: Send + Sync {
    /// Insert a new payout, assigning its serial id and its born-with
    /// status: `Ineligible` when `in_grace_window` is set and no record
    /// exists yet for the relationship, `Pending` otherwise.
    ///
    /// Fails with [`PayoutError::DuplicateRecord`] if a record already
    /// exists for the same (relationship, payout month) - the authoritative
    /// enforcement point for the once-per-month invariant. The uniqueness
    /// check, the first-payout check, and the insert are one atomic step;
    /// concurrent inserts for the same key produce exactly one winner, and
    /// concurrent inserts for different months of a new relationship
    /// withhold at most one of them.
    ///
    /// [`PayoutError::DuplicateRecord`]: crate::error::PayoutError::DuplicateRecord
    async fn insert(&self, payout: NewPayout) -> Result<PayoutRecord>;

    /// Fetch a single record by id.
    async fn get(&self, id: PayoutId) -> Result<Option<PayoutRecord>>;

    /// All pending records whose eligible date has arrived
    /// (`eligible_on <= as_of`), ordered by agent id then payout month so
    /// batch runs are reproducible.
    async fn find_eligible(&self, as_of: NaiveDate) -> Result<Vec<PayoutRecord>>;

    /// Bulk pending -> paid transition, stamping `paid_at` and the batch.
    ///
    /// All-or-nothing: if any target is not currently pending the call
    /// fails with [`PayoutError::InvalidTransition`] and no record is
    /// modified. Returns the post-transition records.
    ///
    /// [`PayoutError::InvalidTransition`]: crate::error::PayoutError::InvalidTransition
    async fn mark_paid(
        &self,
        ids: &[PayoutId],
        paid_at: DateTime<Utc>,
        batch_id: &BatchId,
    ) -> Result<Vec<PayoutRecord>>;

    /// Bulk pending -> cancelled for a relationship's records with
    /// `payout_month > after`. Paid and ineligible records are untouched;
    /// already-captured months at or before `after` remain payable in
    /// full. Returns the newly cancelled records.
    async fn cancel_future(
        &self,
        relationship_id: &RelationshipId,
        after: NaiveDate,
    ) -> Result<Vec<PayoutRecord>>;

    /// Report query: all payouts owed to an agent.
    async fn payouts_for_agent(&self, agent_id: &AgentId) -> Result<Vec<PayoutRecord>>;

    /// Report query: all payouts generated by a member's payments.
    async fn payouts_for_member(&self, member_id: &MemberId) -> Result<Vec<PayoutRecord>>;

    /// Report query: all payouts covering a given month.
    async fn payouts_for_month(&self, month: NaiveDate) -> Result<Vec<PayoutRecord>>;

    /// Report query: all payouts in a given status.
    async fn payouts_with_status(&self, status: PayoutStatus) -> Result<Vec<PayoutRecord>>;

    /// Report query: all payouts disbursed in a batch.
    async fn payouts_in_batch(&self, batch_id: &BatchId) -> Result<Vec<PayoutRecord>>;
}
