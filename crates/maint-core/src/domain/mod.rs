//! Domain models for the maintenance agent.
//!
//! - `Plan`: the single action derived from a request
//! - `ResultBundle`: every collaborator outcome for that action
//! - `PlanError`, `OrchestrationError`, `AgentError`: failure taxonomy

pub mod bundle;
pub mod error;
pub mod plan;

pub use bundle::{PlanOutcome, ResultBundle};
pub use error::{AgentError, OrchestrationError, OrchestrationResult, PlanError};
pub use plan::{current_month_year, month_year_of, Plan, PlanAction};
