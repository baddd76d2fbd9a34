//! Request entry point: plan, execute, explain.

use std::sync::Arc;
use std::time::Instant;

use maint_collab::{
    AuditRecord, AuditSink, FlatRecord, MessagingSender, PaymentLookup, PaymentStore,
    ReminderResult, TextGenerator,
};
use serde::Serialize;
use tracing::{instrument, Instrument};

use crate::domain::{AgentError, PlanOutcome, ResultBundle};
use crate::explain::{ExplanationComposer, Narrator};
use crate::obs;
use crate::orchestrator::Orchestrator;
use crate::planner::Planner;

/// What the user gets back for one request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentResponse {
    pub request_id: String,
    pub explanation: String,
    pub plan: PlanOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment: Option<PaymentLookup>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reminder: Option<ReminderResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audit: Option<AuditRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flat: Option<FlatRecord>,
}

impl AgentResponse {
    fn rejected(request_id: String, outcome: PlanOutcome, explanation: String) -> Self {
        Self {
            request_id,
            explanation,
            plan: outcome,
            payment: None,
            reminder: None,
            audit: None,
            flat: None,
        }
    }

    fn completed(request_id: String, bundle: ResultBundle, explanation: String) -> Self {
        Self {
            request_id,
            explanation,
            plan: PlanOutcome::Planned(bundle.plan),
            payment: bundle.payment,
            reminder: bundle.reminder,
            audit: bundle.audit,
            flat: bundle.flat,
        }
    }
}

/// The maintenance-fee agent.
///
/// Holds no per-request state, so one instance can serve concurrent
/// requests.
#[derive(Clone)]
pub struct MaintenanceAgent {
    planner: Arc<Planner>,
    orchestrator: Orchestrator,
    composer: Arc<ExplanationComposer>,
}

impl MaintenanceAgent {
    /// Agent whose planner and narrator share one generator.
    pub fn new(
        payments: Arc<dyn PaymentStore>,
        messenger: Arc<dyn MessagingSender>,
        audit: Arc<dyn AuditSink>,
        generator: Arc<dyn TextGenerator>,
    ) -> Self {
        Self {
            planner: Arc::new(Planner::new(generator.clone())),
            orchestrator: Orchestrator::new(payments, messenger, audit),
            composer: Arc::new(ExplanationComposer::generative(generator)),
        }
    }

    /// Replace the primary narrator; the template fallback stays.
    pub fn with_narrator(mut self, narrator: Arc<dyn Narrator>) -> Self {
        self.composer = Arc::new(ExplanationComposer::new(narrator));
        self
    }

    /// Handle one free-text request.
    ///
    /// A plan the parser rejects is answered with an explanation and no
    /// collaborator is called. Collaborator failures are returned as errors;
    /// explanation failures never are.
    pub async fn handle_request(&self, text: &str) -> Result<AgentResponse, AgentError> {
        if text.trim().is_empty() {
            return Err(AgentError::EmptyRequest);
        }

        let request_id = uuid::Uuid::new_v4().to_string();
        let span = obs::request_span(&request_id);
        let started = Instant::now();
        span.in_scope(|| obs::emit_request_started(&request_id, text.chars().count()));

        let result = self
            .run(request_id.clone(), text)
            .instrument(span.clone())
            .await;

        let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        span.in_scope(|| obs::emit_request_finished(&request_id, duration_ms, result.is_ok()));
        result
    }

    #[instrument(skip_all)]
    async fn run(&self, request_id: String, text: &str) -> Result<AgentResponse, AgentError> {
        let plan = match self.planner.plan(text).await? {
            PlanOutcome::Planned(plan) => plan,
            rejected @ PlanOutcome::Rejected(_) => {
                let explanation = match rejected.error() {
                    Some(err) => format!("I could not work out a plan from that request: {err}."),
                    None => "I could not work out a plan from that request.".to_string(),
                };
                return Ok(AgentResponse::rejected(request_id, rejected, explanation));
            }
        };

        let bundle = self.orchestrator.execute(plan).await?;
        let explanation = self.composer.compose(text, &bundle).await;
        Ok(AgentResponse::completed(request_id, bundle, explanation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::explain::TemplateNarrator;
    use maint_collab::fakes::{MemoryAuditSink, MemoryPaymentStore, RecordingMessenger, ScriptedGenerator};

    fn agent(generator: ScriptedGenerator) -> (MaintenanceAgent, Arc<MemoryPaymentStore>) {
        let payments = Arc::new(MemoryPaymentStore::new().with_payment("C-101", "2025-12", false, None));
        let agent = MaintenanceAgent::new(
            payments.clone(),
            Arc::new(RecordingMessenger::new()),
            Arc::new(MemoryAuditSink::new()),
            Arc::new(generator),
        );
        (agent, payments)
    }

    #[tokio::test]
    async fn test_empty_request_is_refused() {
        let (agent, payments) = agent(ScriptedGenerator::new());
        let err = agent.handle_request("   ").await.unwrap_err();
        assert!(matches!(err, AgentError::EmptyRequest));
        assert_eq!(payments.status_calls(), 0);
    }

    #[tokio::test]
    async fn test_rejected_plan_skips_collaborators() {
        let (agent, payments) = agent(ScriptedGenerator::new().with_reply("I have no idea."));
        let response = agent.handle_request("hello?").await.unwrap();

        assert!(response.plan.error().is_some());
        assert!(response.explanation.contains("could not work out a plan"));
        assert_eq!(payments.status_calls(), 0);
        assert!(response.payment.is_none());
    }

    #[tokio::test]
    async fn test_planner_unavailable_is_an_error() {
        let (agent, _) = agent(ScriptedGenerator::unreachable());
        let err = agent.handle_request("Has C-101 paid?").await.unwrap_err();
        assert!(matches!(err, AgentError::Planner(_)));
    }

    #[tokio::test]
    async fn test_template_narrator_override() {
        let generator = ScriptedGenerator::new()
            .with_reply(r#"{"action":"CHECK_ONLY","flat_no":"C-101","month_year":"2025-12"}"#);
        let (agent, _) = agent(generator);
        let agent = agent.with_narrator(Arc::new(TemplateNarrator));

        let response = agent.handle_request("Has C-101 paid for 2025-12?").await.unwrap();
        assert_eq!(response.explanation, "C-101 has not paid for 2025-12 yet.");
        assert!(!response.request_id.is_empty());
    }
}
