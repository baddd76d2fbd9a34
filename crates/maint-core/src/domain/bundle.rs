//! Per-request aggregates.

use maint_collab::{AuditRecord, FlatRecord, PaymentLookup, ReminderResult};
use serde::Serialize;

use super::error::PlanError;
use super::plan::Plan;

/// Everything produced while executing one plan. Created fresh per request
/// and never persisted by the agent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultBundle {
    pub plan: Plan,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment: Option<PaymentLookup>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reminder: Option<ReminderResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audit: Option<AuditRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flat: Option<FlatRecord>,
}

impl ResultBundle {
    pub fn new(plan: Plan) -> Self {
        Self {
            plan,
            payment: None,
            reminder: None,
            audit: None,
            flat: None,
        }
    }
}

/// What the planner stage produced: a plan, or the reason there is none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PlanOutcome {
    Planned(Plan),
    Rejected(PlanError),
}

impl PlanOutcome {
    pub fn plan(&self) -> Option<&Plan> {
        match self {
            Self::Planned(plan) => Some(plan),
            Self::Rejected(_) => None,
        }
    }

    pub fn error(&self) -> Option<&PlanError> {
        match self {
            Self::Planned(_) => None,
            Self::Rejected(err) => Some(err),
        }
    }
}

impl From<Result<Plan, PlanError>> for PlanOutcome {
    fn from(result: Result<Plan, PlanError>) -> Self {
        match result {
            Ok(plan) => Self::Planned(plan),
            Err(err) => Self::Rejected(err),
        }
    }
}
