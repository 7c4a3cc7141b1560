//! In-Memory Stores
//!
//! Reference implementations of the storage traits for tests and local
//! development. A single `RwLock` per store keeps every multi-record
//! operation atomic: `insert`'s uniqueness check, `mark_paid`'s
//! all-or-nothing validation, and `cancel_future` all run under one write
//! lock, so a batch run and a cancellation racing on the same record
//! resolve to whichever takes the lock first - the loser observes the
//! non-pending status and gets `InvalidTransition`.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use membership_core::{AgentId, CommissionRelationship, MemberId, RelationshipId};

use crate::error::{PayoutError, Result};
use crate::policy;
use crate::record::{BatchId, NewPayout, PayoutId, PayoutRecord, PayoutStatus};

use super::{PayoutLedger, RelationshipStore};

/// In-memory relationship store, keyed by member
pub struct MemoryRelationshipStore {
    by_member: RwLock<HashMap<MemberId, Vec<CommissionRelationship>>>,
}

impl Default for MemoryRelationshipStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryRelationshipStore {
    pub fn new() -> Self {
        Self {
            by_member: RwLock::new(HashMap::new()),
        }
    }

    /// Register a relationship (stands in for the enrollment workflow)
    pub fn add(&self, relationship: CommissionRelationship) {
        let mut by_member = self.by_member.write().unwrap();
        by_member
            .entry(relationship.member_id.clone())
            .or_default()
            .push(relationship);
    }

    /// Update a relationship's configured monthly rate going forward.
    /// Existing payout records keep their frozen amounts.
    pub fn set_rate(&self, relationship_id: &RelationshipId, rate: rust_decimal::Decimal) {
        let mut by_member = self.by_member.write().unwrap();
        for relationships in by_member.values_mut() {
            for rel in relationships.iter_mut() {
                if &rel.id == relationship_id {
                    rel.monthly_rate = rate;
                }
            }
        }
    }

    /// Mark a relationship as no longer standing (stands in for the
    /// enrollment workflow's deactivation)
    pub fn deactivate(&self, relationship_id: &RelationshipId) {
        let mut by_member = self.by_member.write().unwrap();
        for relationships in by_member.values_mut() {
            for rel in relationships.iter_mut() {
                if &rel.id == relationship_id {
                    rel.active = false;
                }
            }
        }
    }
}

#[async_trait]
impl RelationshipStore for MemoryRelationshipStore {
    async fn relationships_for_member(
        &self,
        member_id: &MemberId,
    ) -> Result<Vec<CommissionRelationship>> {
        let by_member = self.by_member.read().unwrap();
        Ok(by_member
            .get(member_id)
            .map(|rels| rels.iter().filter(|r| r.active).cloned().collect())
            .unwrap_or_default())
    }

    async fn all_relationships_for_member(
        &self,
        member_id: &MemberId,
    ) -> Result<Vec<CommissionRelationship>> {
        let by_member = self.by_member.read().unwrap();
        Ok(by_member.get(member_id).cloned().unwrap_or_default())
    }
}

/// Unique-key index entry: one payout per relationship per month
type MonthKey = (RelationshipId, NaiveDate);

struct LedgerInner {
    records: BTreeMap<PayoutId, PayoutRecord>,
    by_month_key: HashMap<MonthKey, PayoutId>,
    next_id: u64,
}

/// In-memory payout ledger
pub struct MemoryPayoutLedger {
    inner: RwLock<LedgerInner>,
}

impl Default for MemoryPayoutLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryPayoutLedger {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(LedgerInner {
                records: BTreeMap::new(),
                by_month_key: HashMap::new(),
                next_id: 1,
            }),
        }
    }

    fn collect_where(&self, predicate: impl Fn(&PayoutRecord) -> bool) -> Vec<PayoutRecord> {
        let inner = self.inner.read().unwrap();
        inner
            .records
            .values()
            .filter(|r| predicate(r))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl PayoutLedger for MemoryPayoutLedger {
    async fn insert(&self, payout: NewPayout) -> Result<PayoutRecord> {
        let mut inner = self.inner.write().unwrap();

        let key = (payout.relationship_id.clone(), payout.payout_month);
        if inner.by_month_key.contains_key(&key) {
            return Err(PayoutError::DuplicateRecord {
                relationship_id: payout.relationship_id,
                payout_month: payout.payout_month,
            });
        }

        // First-payout check under the same lock as the insert, so two
        // captures for different months of a new relationship withhold
        // at most one record.
        let first_payout = !inner
            .by_month_key
            .keys()
            .any(|(rel_id, _)| rel_id == &payout.relationship_id);
        let status = policy::initial_status(payout.in_grace_window, first_payout);

        let id = PayoutId(inner.next_id);
        inner.next_id += 1;

        let record = PayoutRecord {
            id,
            relationship_id: payout.relationship_id,
            agent_id: payout.agent_id,
            member_id: payout.member_id,
            commission_type: payout.commission_type,
            payout_month: payout.payout_month,
            captured_at: payout.captured_at,
            eligible_on: payout.eligible_on,
            amount: payout.amount,
            status,
            paid_at: None,
            batch_id: None,
            payment_ref: payout.payment_ref,
        };

        inner.by_month_key.insert(key, id);
        inner.records.insert(id, record.clone());

        Ok(record)
    }

    async fn get(&self, id: PayoutId) -> Result<Option<PayoutRecord>> {
        let inner = self.inner.read().unwrap();
        Ok(inner.records.get(&id).cloned())
    }

    async fn find_eligible(&self, as_of: NaiveDate) -> Result<Vec<PayoutRecord>> {
        let mut eligible = self
            .collect_where(|r| r.status == PayoutStatus::Pending && r.eligible_on <= as_of);
        eligible.sort_by(|a, b| {
            (&a.agent_id, a.payout_month, a.id).cmp(&(&b.agent_id, b.payout_month, b.id))
        });
        Ok(eligible)
    }

    async fn mark_paid(
        &self,
        ids: &[PayoutId],
        paid_at: DateTime<Utc>,
        batch_id: &BatchId,
    ) -> Result<Vec<PayoutRecord>> {
        let mut inner = self.inner.write().unwrap();

        // Validate every target before touching any of them.
        for id in ids {
            match inner.records.get(id) {
                Some(record) if record.status == PayoutStatus::Pending => {}
                Some(record) => {
                    return Err(PayoutError::InvalidTransition {
                        payout_id: *id,
                        status: record.status,
                        targets: ids.to_vec(),
                    });
                }
                None => {
                    return Err(PayoutError::Storage(format!("unknown payout id {id}")));
                }
            }
        }

        let mut updated = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(record) = inner.records.get_mut(id) {
                record.status = PayoutStatus::Paid;
                record.paid_at = Some(paid_at);
                record.batch_id = Some(batch_id.clone());
                updated.push(record.clone());
            }
        }

        Ok(updated)
    }

    async fn cancel_future(
        &self,
        relationship_id: &RelationshipId,
        after: NaiveDate,
    ) -> Result<Vec<PayoutRecord>> {
        let mut inner = self.inner.write().unwrap();

        let mut cancelled = Vec::new();
        for record in inner.records.values_mut() {
            if &record.relationship_id == relationship_id
                && record.payout_month > after
                && record.status == PayoutStatus::Pending
            {
                record.status = PayoutStatus::Cancelled;
                cancelled.push(record.clone());
            }
        }

        Ok(cancelled)
    }

    async fn payouts_for_agent(&self, agent_id: &AgentId) -> Result<Vec<PayoutRecord>> {
        Ok(self.collect_where(|r| &r.agent_id == agent_id))
    }

    async fn payouts_for_member(&self, member_id: &MemberId) -> Result<Vec<PayoutRecord>> {
        Ok(self.collect_where(|r| &r.member_id == member_id))
    }

    async fn payouts_for_month(&self, month: NaiveDate) -> Result<Vec<PayoutRecord>> {
        Ok(self.collect_where(|r| r.payout_month == month))
    }

    async fn payouts_with_status(&self, status: PayoutStatus) -> Result<Vec<PayoutRecord>> {
        Ok(self.collect_where(|r| r.status == status))
    }

    async fn payouts_in_batch(&self, batch_id: &BatchId) -> Result<Vec<PayoutRecord>> {
        Ok(self.collect_where(|r| r.batch_id.as_ref() == Some(batch_id)))
    }
}
