//! Error taxonomy for planning, orchestration and request handling.

use maint_collab::{CollaboratorError, GenerationError, ReminderResult};
use serde::Serialize;

use super::plan::PlanAction;

/// Planner output that could not be turned into a well-formed plan.
///
/// Every variant keeps the raw planner text unchanged for diagnostic display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlanError {
    #[error("planner output contains no JSON object")]
    NoObject { raw: String },

    #[error("planner output is not a valid plan: {reason}")]
    Malformed { reason: String, raw: String },

    #[error("{action} plan is missing required field `{field}`")]
    MissingField {
        action: PlanAction,
        field: &'static str,
        raw: String,
    },
}

impl PlanError {
    /// The planner text exactly as received.
    pub fn raw(&self) -> &str {
        match self {
            Self::NoObject { raw } | Self::Malformed { raw, .. } | Self::MissingField { raw, .. } => {
                raw
            }
        }
    }
}

/// Collaborator failures during plan execution.
#[derive(Debug, thiserror::Error)]
pub enum OrchestrationError {
    #[error("collaborator call failed: {0}")]
    Collaborator(#[from] CollaboratorError),

    /// The reminder went out but the audit write failed. Nothing is rolled
    /// back; the delivered reminder is kept here for manual reconciliation.
    #[error("reminder {} for {} ({}) was sent but not recorded: {source}", reminder.message_id, reminder.flat_no, reminder.month_year)]
    ReminderNotRecorded {
        reminder: Box<ReminderResult>,
        #[source]
        source: CollaboratorError,
    },
}

/// Result type for orchestration.
pub type OrchestrationResult<T> = std::result::Result<T, OrchestrationError>;

/// Request-level failures returned by `MaintenanceAgent::handle_request`.
///
/// A rejected plan is not here: it is a normal response carrying the
/// `PlanError`.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("request text is empty")]
    EmptyRequest,

    #[error("planner unavailable: {0}")]
    Planner(#[from] GenerationError),

    #[error(transparent)]
    Orchestration(#[from] OrchestrationError),
}
