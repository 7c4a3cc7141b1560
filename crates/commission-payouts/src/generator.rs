//! Payout Generator
//!
//! Turns a captured member payment into one dated payout record per
//! applicable commission relationship: the direct relationship plus every
//! override level. Amounts are frozen from the relationship's configured
//! rate at creation time.
//!
//! Creation is reactive - records exist only for months whose payment has
//! actually been captured, never speculatively for future months.

use std::sync::Arc;

use membership_core::{calendar, CommissionType, PaymentCaptureEvent};

use crate::error::{PayoutError, Result};
use crate::policy;
use crate::record::{NewPayout, PayoutRecord};
use crate::store::{PayoutLedger, RelationshipStore};

/// Newly created payouts, partitioned by commission type. Records skipped
/// by the once-per-month uniqueness check are not included.
#[derive(Clone, Debug, Default)]
pub struct CreatedPayouts {
    pub direct: Vec<PayoutRecord>,
    pub overrides: Vec<PayoutRecord>,
}

impl CreatedPayouts {
    pub fn len(&self) -> usize {
        self.direct.len() + self.overrides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.direct.is_empty() && self.overrides.is_empty()
    }

    /// All created records, direct first
    pub fn all(&self) -> impl Iterator<Item = &PayoutRecord> {
        self.direct.iter().chain(self.overrides.iter())
    }
}

/// The core payout-creation algorithm.
pub struct PayoutGenerator<R, L> {
    relationships: Arc<R>,
    ledger: Arc<L>,
}

impl<R: RelationshipStore, L: PayoutLedger> PayoutGenerator<R, L> {
    pub fn new(relationships: Arc<R>, ledger: Arc<L>) -> Self {
        Self {
            relationships,
            ledger,
        }
    }

    /// Create payout records for a captured payment.
    ///
    /// Idempotent under redelivery: a relationship that already has a
    /// record for the covered month is skipped silently, so the second
    /// delivery of the same capture event creates nothing. The ledger's
    /// unique (relationship, month) constraint is the enforcement point,
    /// so concurrent deliveries cannot double-pay either.
    ///
    /// Never mutates relationships or any other aggregate; the only side
    /// effect is the ledger insert.
    pub async fn create_payouts_for_payment(
        &self,
        event: &PaymentCaptureEvent,
    ) -> Result<CreatedPayouts> {
        let payout_month = calendar::payout_month(event.captured_at);
        let eligible_on = calendar::payment_eligible_date(event.captured_at.date_naive());

        let relationships = self
            .relationships
            .relationships_for_member(&event.member_id)
            .await?;

        if relationships.is_empty() {
            // Valid: a payment for a member with no commission
            // relationships produces zero payouts.
            tracing::debug!(
                member_id = %event.member_id,
                payment_ref = %event.payment_ref,
                "No commission relationships for member"
            );
            return Ok(CreatedPayouts::default());
        }

        let mut created = CreatedPayouts::default();

        for relationship in relationships {
            // The ledger resolves Pending vs Ineligible at insert time,
            // atomically with the first-payout check.
            let payout = NewPayout {
                relationship_id: relationship.id.clone(),
                agent_id: relationship.agent_id.clone(),
                member_id: relationship.member_id.clone(),
                commission_type: relationship.commission_type,
                payout_month,
                captured_at: event.captured_at,
                eligible_on,
                amount: relationship.monthly_rate,
                in_grace_window: policy::in_grace_window(&relationship, event.captured_at),
                payment_ref: event.payment_ref.clone(),
            };

            match self.ledger.insert(payout).await {
                Ok(record) => {
                    tracing::info!(
                        payout_id = %record.id,
                        relationship_id = %record.relationship_id,
                        agent_id = %record.agent_id,
                        month = %record.payout_month,
                        amount = %record.amount,
                        status = %record.status,
                        "Created payout"
                    );
                    match record.commission_type {
                        CommissionType::Direct => created.direct.push(record),
                        CommissionType::Override => created.overrides.push(record),
                    }
                }
                Err(PayoutError::DuplicateRecord { relationship_id, payout_month }) => {
                    // Expected under duplicate/concurrent delivery
                    tracing::debug!(
                        relationship_id = %relationship_id,
                        month = %payout_month,
                        payment_ref = %event.payment_ref,
                        "Payout already recorded for month, skipping"
                    );
                }
                Err(err) => return Err(err),
            }
        }

        Ok(created)
    }
}
