//! Cancellation and Grace-Period Policy
//!
//! Two related rules: a 14-day grace window that withholds a
//! relationship's *first* payout when the payment lands right after
//! enrollment, and the mid-cycle cancellation flow that cancels future
//! months while leaving settled and already-captured months alone.

use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

use membership_core::{CancellationEvent, CommissionRelationship};

use crate::error::Result;
use crate::record::{PayoutRecord, PayoutStatus};
use crate::store::{PayoutLedger, RelationshipStore};

/// Enrollments younger than this at capture time get their first payout
/// withheld as `Ineligible`.
pub const GRACE_PERIOD_DAYS: i64 = 14;

/// Whether a capture falls inside the relationship's grace window.
pub fn in_grace_window(
    relationship: &CommissionRelationship,
    captured_at: DateTime<Utc>,
) -> bool {
    captured_at - relationship.enrolled_at < Duration::days(GRACE_PERIOD_DAYS)
}

/// Status a new payout is born with.
///
/// `Ineligible` only when this would be the relationship's first payout
/// AND the capture falls inside the grace window. Once the window has
/// passed, every subsequent month is `Pending` unconditionally.
///
/// `first_payout` must be determined inside the ledger's insert critical
/// section - probing it separately can let two concurrent captures both
/// observe "first" and both be withheld.
pub fn initial_status(in_grace_window: bool, first_payout: bool) -> PayoutStatus {
    if first_payout && in_grace_window {
        PayoutStatus::Ineligible
    } else {
        PayoutStatus::Pending
    }
}

/// Applies member cancellations to the payout ledger.
///
/// Already-paid records are never clawed back, and captured months at or
/// before the effective date stay payable in full - no proration.
pub struct CancellationPolicy<R, L> {
    relationships: Arc<R>,
    ledger: Arc<L>,
}

impl<R: RelationshipStore, L: PayoutLedger> CancellationPolicy<R, L> {
    pub fn new(relationships: Arc<R>, ledger: Arc<L>) -> Self {
        Self {
            relationships,
            ledger,
        }
    }

    /// Cancel future payouts for every relationship tied to the member.
    /// Returns the records that transitioned to cancelled.
    ///
    /// Uses the unfiltered lookup: a relationship the enrollment workflow
    /// already deactivated still gets its future payouts cancelled.
    pub async fn handle(&self, event: &CancellationEvent) -> Result<Vec<PayoutRecord>> {
        let relationships = self
            .relationships
            .all_relationships_for_member(&event.member_id)
            .await?;

        let mut cancelled = Vec::new();
        for relationship in &relationships {
            let mut records = self
                .ledger
                .cancel_future(&relationship.id, event.effective_date)
                .await?;
            cancelled.append(&mut records);
        }

        tracing::info!(
            member_id = %event.member_id,
            effective = %event.effective_date,
            relationships = relationships.len(),
            cancelled = cancelled.len(),
            "Applied member cancellation"
        );

        Ok(cancelled)
    }
}
