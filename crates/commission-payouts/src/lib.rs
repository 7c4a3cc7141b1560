//! # commission-payouts
//!
//! Recurring commission payout engine for the DPC membership platform.
//!
//! Translates captured subscription payments into dated, status-tracked
//! payout records for a multi-level agent hierarchy, batched weekly and
//! governed by a 14-day grace-period cancellation policy.
//!
//! ## Flow
//!
//! ```text
//! payment capture ──▶ PayoutGenerator ──▶ PayoutLedger ◀── CancellationPolicy
//!                      (one record per        │
//!                       relationship,         ▼
//!                       rate frozen)    WeeklyBatchSelector
//!                                       (Friday: pending ─▶ paid,
//!                                        grouped per agent)
//! ```
//!
//! ## Cadence
//!
//! A payment captured during a Monday..Sunday week becomes eligible for
//! disbursement on the Friday after that week ends. Each relationship is
//! paid at most once per covered month; redelivered capture events are
//! silent no-ops.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use commission_payouts::{
//!     MemoryPayoutLedger, MemoryRelationshipStore, PayoutGenerator, WeeklyBatchSelector,
//! };
//!
//! let relationships = Arc::new(MemoryRelationshipStore::new());
//! let ledger = Arc::new(MemoryPayoutLedger::new());
//!
//! let generator = PayoutGenerator::new(relationships.clone(), ledger.clone());
//! let created = generator.create_payouts_for_payment(&event).await?;
//!
//! let selector = WeeklyBatchSelector::new(ledger.clone());
//! let batch = selector.run_weekly_batch(friday).await?;
//! // Hand batch.payouts_by_agent to the disbursement layer
//! ```

mod batch;
mod error;
mod generator;
mod policy;
mod record;
mod store;

pub use batch::{DisbursementBatch, WeeklyBatchSelector};
pub use error::{PayoutError, Result};
pub use generator::{CreatedPayouts, PayoutGenerator};
pub use policy::{in_grace_window, initial_status, CancellationPolicy, GRACE_PERIOD_DAYS};
pub use record::{BatchId, NewPayout, PayoutId, PayoutRecord, PayoutStatus};
pub use store::{MemoryPayoutLedger, MemoryRelationshipStore, PayoutLedger, RelationshipStore};

// Re-export the domain crate so callers can depend on one crate
pub use membership_core::{
    calendar, AgentId, CancellationEvent, CommissionRelationship, CommissionType, MemberId,
    PaymentCaptureEvent, RelationshipId,
};
