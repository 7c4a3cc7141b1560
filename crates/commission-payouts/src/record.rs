//! Payout Records
//!
//! The persisted unit of commission accounting: one record per commission
//! relationship per covered month, frozen at creation and moved through a
//! small terminal state machine by the batch and cancellation flows.

use chrono::{DateTime, NaiveDate, Utc};
use membership_core::{AgentId, CommissionType, MemberId, RelationshipId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Ledger-assigned serial payout identifier
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PayoutId(pub u64);

impl std::fmt::Display for PayoutId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Payout lifecycle state.
///
/// `Pending` is the only non-terminal state: a pending payout either gets
/// paid by a weekly batch or cancelled by a member cancellation. Records
/// created inside the 14-day grace window are born `Ineligible` and never
/// move again.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayoutStatus {
    Pending,
    Paid,
    Cancelled,
    Ineligible,
}

impl PayoutStatus {
    pub fn as_str(&self) -> &str {
        match self {
            PayoutStatus::Pending => "pending",
            PayoutStatus::Paid => "paid",
            PayoutStatus::Cancelled => "cancelled",
            PayoutStatus::Ineligible => "ineligible",
        }
    }

    /// No transition ever leaves a terminal state
    pub fn is_terminal(&self) -> bool {
        !matches!(self, PayoutStatus::Pending)
    }
}

impl std::fmt::Display for PayoutStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Disbursement batch identifier (date-stamped, unique per run)
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BatchId(String);

impl BatchId {
    /// Generate a fresh id for a batch run dated `as_of`
    pub fn generate(as_of: NaiveDate) -> Self {
        let suffix = uuid::Uuid::new_v4().simple().to_string().to_uppercase();
        Self(format!("batch-{}-{}", as_of.format("%Y%m%d"), &suffix[0..8]))
    }

    /// Parse from string
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the id as a string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BatchId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A payout awaiting insertion; the ledger assigns the serial id.
///
/// The born-with status is NOT carried here: the ledger decides
/// `Pending` vs `Ineligible` from `in_grace_window` and whether the
/// relationship already has a record, inside the same critical section
/// as the uniqueness check. Deciding it earlier lets two concurrent
/// captures both observe "first payout" and both be withheld.
#[derive(Clone, Debug)]
pub struct NewPayout {
    pub relationship_id: RelationshipId,
    pub agent_id: AgentId,
    pub member_id: MemberId,
    pub commission_type: CommissionType,
    pub payout_month: NaiveDate,
    pub captured_at: DateTime<Utc>,
    pub eligible_on: NaiveDate,
    pub amount: Decimal,
    /// Whether the capture fell inside the relationship's 14-day grace
    /// window (see `policy::in_grace_window`)
    pub in_grace_window: bool,
    pub payment_ref: String,
}

/// A dated, status-tracked commission payout.
///
/// Amount, type, and agent are copied from the owning relationship at
/// creation time and never change afterwards - later rate reconfiguration
/// does not touch existing records.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PayoutRecord {
    /// Serial id
    pub id: PayoutId,

    /// Owning commission relationship
    pub relationship_id: RelationshipId,

    /// Agent owed this payout (copied for grouping and reports)
    pub agent_id: AgentId,

    /// Member whose payment generated it
    pub member_id: MemberId,

    /// Direct or override (copied for query convenience)
    pub commission_type: CommissionType,

    /// First calendar day of the covered month
    pub payout_month: NaiveDate,

    /// When the underlying payment was captured
    pub captured_at: DateTime<Utc>,

    /// Friday after the capture week; earliest batchable date
    pub eligible_on: NaiveDate,

    /// Frozen payout amount in USD
    pub amount: Decimal,

    /// Lifecycle state
    pub status: PayoutStatus,

    /// Set on transition to paid
    pub paid_at: Option<DateTime<Utc>>,

    /// Disbursement batch, set on transition to paid
    pub batch_id: Option<BatchId>,

    /// Originating payment transaction reference
    pub payment_ref: String,
}

impl PayoutRecord {
    pub fn is_pending(&self) -> bool {
        self.status == PayoutStatus::Pending
    }
}
