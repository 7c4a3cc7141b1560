//! Domain Models
//!
//! Members, agents, commission relationships, and the external events the
//! payout engine consumes. Uses `rust_decimal` for all monetary values -
//! never use f64 for money!

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Opaque member identifier
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberId(String);

impl MemberId {
    /// Generate a fresh identifier
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
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

impl std::fmt::Display for MemberId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque sales-agent identifier
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(String);

impl AgentId {
    /// Generate a fresh identifier
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
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

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque commission-relationship identifier
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RelationshipId(String);

impl RelationshipId {
    /// Generate a fresh identifier
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
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

impl std::fmt::Display for RelationshipId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Commission classification
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommissionType {
    /// Owed to the agent who personally enrolled the member
    Direct,
    /// Owed to an upline agent for a downline agent's sale
    Override,
}

impl CommissionType {
    pub fn as_str(&self) -> &str {
        match self {
            CommissionType::Direct => "direct",
            CommissionType::Override => "override",
        }
    }
}

/// A standing agent-member commission link.
///
/// Created once at enrollment time by the enrollment workflow. The monthly
/// rate may be reconfigured going forward, but payout records freeze the
/// rate at creation time and are never retroactively altered.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CommissionRelationship {
    /// Relationship id
    pub id: RelationshipId,

    /// Agent owed the commission
    pub agent_id: AgentId,

    /// Enrolled member the commission derives from
    pub member_id: MemberId,

    /// Flat monthly rate in USD (zero is valid - tracked for hierarchy
    /// reporting, pays out a zero-amount record)
    pub monthly_rate: Decimal,

    /// Direct or override
    pub commission_type: CommissionType,

    /// Downline agent whose sale generated this override link.
    /// Always `None` for direct relationships.
    pub source_agent_id: Option<AgentId>,

    /// When the member's enrollment took effect; drives the 14-day
    /// grace window on the first payout
    pub enrolled_at: DateTime<Utc>,

    /// Whether the relationship is still standing
    pub active: bool,
}

impl CommissionRelationship {
    /// Direct relationship between an enrolling agent and their member
    pub fn direct(
        agent_id: AgentId,
        member_id: MemberId,
        monthly_rate: Decimal,
        enrolled_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: RelationshipId::generate(),
            agent_id,
            member_id,
            monthly_rate,
            commission_type: CommissionType::Direct,
            source_agent_id: None,
            enrolled_at,
            active: true,
        }
    }

    /// Override relationship for an upline agent, derived from
    /// `source_agent_id`'s sale
    pub fn override_for(
        agent_id: AgentId,
        member_id: MemberId,
        monthly_rate: Decimal,
        source_agent_id: AgentId,
        enrolled_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: RelationshipId::generate(),
            agent_id,
            member_id,
            monthly_rate,
            commission_type: CommissionType::Override,
            source_agent_id: Some(source_agent_id),
            enrolled_at,
            active: true,
        }
    }

    pub fn is_override(&self) -> bool {
        self.commission_type == CommissionType::Override
    }
}

/// A captured subscription payment, reported by the payment-gateway
/// callback handler. Consumed exactly once per event; idempotency is
/// enforced downstream by the ledger's uniqueness constraint.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PaymentCaptureEvent {
    /// Member whose subscription was charged
    pub member_id: MemberId,

    /// Gateway transaction reference, kept for traceability
    pub payment_ref: String,

    /// When the charge was captured
    pub captured_at: DateTime<Utc>,

    /// Captured amount in USD
    pub amount: Decimal,
}

/// A member cancellation, reported by the subscription-management
/// workflow with the date the cancellation takes effect.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CancellationEvent {
    /// Member who cancelled
    pub member_id: MemberId,

    /// Effective date of the cancellation
    pub effective_date: NaiveDate,
}
