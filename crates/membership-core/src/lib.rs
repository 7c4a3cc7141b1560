//! # membership-core
//!
//! Domain model for the DPC membership platform: members, agents, the
//! commission relationships that link them, and the calendar arithmetic
//! that drives the weekly payout cadence.
//!
//! This crate is deliberately dependency-light: no storage, no I/O, no
//! async. The payout engine (`commission-payouts`) builds on top of it.
//!
//! ## Commission relationships
//!
//! Every enrolled member carries exactly one *direct* relationship to the
//! agent who signed them up, plus zero or more *override* relationships,
//! one per upline level. Each override carries its own independently
//! configured monthly rate - rates are never derived from a single
//! percentage:
//!
//! ```text
//! member ──direct ($40/mo)──▶ agent A
//!        ──override ($15/mo)─▶ agent B   (A's upline)
//!        ──override ($5/mo)──▶ agent C   (B's upline)
//! ```

pub mod calendar;
pub mod model;

pub use model::{
    AgentId, CancellationEvent, CommissionRelationship, CommissionType, MemberId,
    PaymentCaptureEvent, RelationshipId,
};
