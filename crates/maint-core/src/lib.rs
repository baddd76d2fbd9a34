//! Maintenance-fee agent core.
//!
//! A request flows through three stages:
//! - [`Planner`]: free text to a typed [`Plan`] via the text generator
//! - [`Orchestrator`]: the plan against payments, messaging and audit
//! - [`ExplanationComposer`]: a plain-language summary of what happened
//!
//! [`MaintenanceAgent`] wires them together.

pub mod agent;
pub mod config;
pub mod domain;
pub mod explain;
pub mod heuristic;
pub mod obs;
pub mod orchestrator;
pub mod planner;
pub mod telemetry;

pub use agent::{AgentResponse, MaintenanceAgent};
pub use config::{remote_generator, AgentConfig, Collaborators, ConfigError, LlmConfig};
pub use domain::{
    current_month_year, month_year_of, AgentError, OrchestrationError, OrchestrationResult, Plan,
    PlanAction, PlanError, PlanOutcome, ResultBundle,
};
pub use explain::{
    explanation_context, ExplanationComposer, GenerativeNarrator, Narrator, TemplateNarrator,
};
pub use heuristic::HeuristicGenerator;
pub use orchestrator::{Orchestrator, REMINDER_SENT_EVENT};
pub use planner::{extract_object, parse_plan, parse_plan_at, Planner};

/// Crate version, reported by `maint --version`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
