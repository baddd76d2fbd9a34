//! Turning a result bundle into a plain-language answer.
//!
//! Two [`Narrator`] implementations:
//! - [`GenerativeNarrator`]: asks the text generator to summarise the bundle
//! - [`TemplateNarrator`]: a fixed sentence derived from the bundle alone
//!
//! [`ExplanationComposer`] wraps a primary narrator and substitutes the
//! template when the primary fails. Only generation failures (timeouts,
//! transport, bad status) are absorbed; the composer never retries.

use std::sync::Arc;

use async_trait::async_trait;
use maint_collab::{GenerationError, PaymentLookup, TextGenerator};
use serde_json::{json, Value};
use tracing::instrument;

use crate::domain::{Plan, ResultBundle};
use crate::obs;

/// System instruction for the explanation call.
pub const EXPLAINER_SYSTEM_PROMPT: &str = r#"
You are MaintenanceExplainer.

Given:
- The original user request
- The payment status result
- Any actions taken (reminder sent, audit log, flat added)

Explain clearly in simple English what happened.
"#;

/// Produces the narrative for one request.
#[async_trait]
pub trait Narrator: Send + Sync {
    async fn narrate(&self, request: &str, bundle: &ResultBundle) -> Result<String, GenerationError>;
}

/// The JSON context handed to the generator.
///
/// A missing payment record is rendered as `{"error": "not_found"}`, the
/// shape explainer prompts are written against.
pub fn explanation_context(request: &str, bundle: &ResultBundle) -> Value {
    let payment = bundle.payment.as_ref().map(|lookup| match lookup {
        PaymentLookup::Found(status) => json!(status),
        PaymentLookup::NotFound {
            flat_no,
            month_year,
        } => json!({"error": "not_found", "flat_no": flat_no, "month_year": month_year}),
    });

    json!({
        "user_message": request,
        "plan": bundle.plan,
        "payment_result": payment,
        "reminder_result": bundle.reminder,
        "log_result": bundle.audit,
        "flat_result": bundle.flat,
    })
}

/// Narration by the text generator.
pub struct GenerativeNarrator {
    generator: Arc<dyn TextGenerator>,
}

impl GenerativeNarrator {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }
}

#[async_trait]
impl Narrator for GenerativeNarrator {
    async fn narrate(&self, request: &str, bundle: &ResultBundle) -> Result<String, GenerationError> {
        let context = explanation_context(request, bundle);
        let pretty = serde_json::to_string_pretty(&context)
            .map_err(|e| GenerationError::MalformedResponse(e.to_string()))?;
        let prompt = format!(
            "Here is the context in JSON:\n\n{pretty}\n\nPlease explain to the user what you did in simple, concise language."
        );
        self.generator
            .complete(EXPLAINER_SYSTEM_PROMPT, &prompt)
            .await
    }
}

/// Deterministic one-line summary.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateNarrator;

impl TemplateNarrator {
    /// First match wins: flat added, paid, unpaid, anything else.
    pub fn summarize(&self, bundle: &ResultBundle) -> String {
        let flat_no = bundle.plan.flat_no();
        let month_year = bundle.plan.month_year().unwrap_or("the requested month");

        if let Plan::AddFlat { .. } = bundle.plan {
            return format!("Added or updated flat {flat_no}.");
        }
        match bundle.payment.as_ref().and_then(PaymentLookup::is_paid) {
            Some(true) => format!("{flat_no} has already paid for {month_year}."),
            Some(false) => format!("{flat_no} has not paid for {month_year} yet."),
            None => format!("Checked payment status for {flat_no} for {month_year}."),
        }
    }
}

#[async_trait]
impl Narrator for TemplateNarrator {
    async fn narrate(&self, _request: &str, bundle: &ResultBundle) -> Result<String, GenerationError> {
        Ok(self.summarize(bundle))
    }
}

/// Primary narrator with the template as a safety net.
pub struct ExplanationComposer {
    primary: Arc<dyn Narrator>,
    fallback: TemplateNarrator,
}

impl ExplanationComposer {
    pub fn new(primary: Arc<dyn Narrator>) -> Self {
        Self {
            primary,
            fallback: TemplateNarrator,
        }
    }

    /// Narration backed by `generator`.
    pub fn generative(generator: Arc<dyn TextGenerator>) -> Self {
        Self::new(Arc::new(GenerativeNarrator::new(generator)))
    }

    /// Always returns some text.
    #[instrument(skip_all, fields(action = %bundle.plan.action()))]
    pub async fn compose(&self, request: &str, bundle: &ResultBundle) -> String {
        match self.primary.narrate(request, bundle).await {
            Ok(text) => text,
            Err(err) => {
                obs::emit_explanation_fallback(&err);
                self.fallback.summarize(bundle)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maint_collab::fakes::ScriptedGenerator;
    use maint_collab::{FlatRecord, PaymentStatus};

    fn check(flat_no: &str, month_year: &str, lookup: Option<PaymentLookup>) -> ResultBundle {
        let mut bundle = ResultBundle::new(Plan::CheckOnly {
            flat_no: flat_no.to_string(),
            month_year: month_year.to_string(),
        });
        bundle.payment = lookup;
        bundle
    }

    fn found(flat_no: &str, month_year: &str, is_paid: bool) -> PaymentLookup {
        PaymentLookup::Found(PaymentStatus {
            flat_no: flat_no.to_string(),
            month_year: month_year.to_string(),
            is_paid,
            paid_on: None,
        })
    }

    #[test]
    fn test_template_unpaid() {
        let bundle = check("C-101", "2025-12", Some(found("C-101", "2025-12", false)));
        assert_eq!(
            TemplateNarrator.summarize(&bundle),
            "C-101 has not paid for 2025-12 yet."
        );
    }

    #[test]
    fn test_template_paid() {
        let bundle = check("B-302", "2025-12", Some(found("B-302", "2025-12", true)));
        assert_eq!(
            TemplateNarrator.summarize(&bundle),
            "B-302 has already paid for 2025-12."
        );
    }

    #[test]
    fn test_template_not_found() {
        let bundle = check(
            "Z-999",
            "2025-11",
            Some(PaymentLookup::NotFound {
                flat_no: "Z-999".to_string(),
                month_year: "2025-11".to_string(),
            }),
        );
        assert_eq!(
            TemplateNarrator.summarize(&bundle),
            "Checked payment status for Z-999 for 2025-11."
        );
    }

    #[test]
    fn test_template_add_flat_wins() {
        let mut bundle = ResultBundle::new(Plan::AddFlat {
            flat_no: "D-404".to_string(),
            owner_name: Some("Jane".to_string()),
            phone_number: None,
            whatsapp_number: None,
        });
        bundle.flat = Some(FlatRecord {
            flat_id: Some(4),
            flat_no: "D-404".to_string(),
            owner_name: Some("Jane".to_string()),
            phone_number: None,
            whatsapp_number: None,
        });
        assert_eq!(TemplateNarrator.summarize(&bundle), "Added or updated flat D-404.");
    }

    #[test]
    fn test_context_renders_not_found_as_error() {
        let bundle = check(
            "Z-999",
            "2025-11",
            Some(PaymentLookup::NotFound {
                flat_no: "Z-999".to_string(),
                month_year: "2025-11".to_string(),
            }),
        );
        let context = explanation_context("Has Z-999 paid?", &bundle);
        assert_eq!(context["payment_result"]["error"], "not_found");
        assert_eq!(context["plan"]["action"], "CHECK_ONLY");
        assert!(context["reminder_result"].is_null());
    }

    #[tokio::test]
    async fn test_compose_returns_generator_text_verbatim() {
        let generator = Arc::new(ScriptedGenerator::new().with_reply("  C-101 still owes for December.  "));
        let composer = ExplanationComposer::generative(generator.clone());
        let bundle = check("C-101", "2025-12", Some(found("C-101", "2025-12", false)));

        let text = composer.compose("Has C-101 paid?", &bundle).await;

        assert_eq!(text, "  C-101 still owes for December.  ");
        let (system, user) = &generator.prompts()[0];
        assert!(system.contains("MaintenanceExplainer"));
        assert!(user.contains("Has C-101 paid?"));
        assert!(user.contains("\"is_paid\": false"));
    }

    #[tokio::test]
    async fn test_compose_falls_back_once_on_generation_failure() {
        let generator = Arc::new(ScriptedGenerator::new().with_failure(GenerationError::Timeout));
        let composer = ExplanationComposer::generative(generator.clone());
        let bundle = check("C-101", "2025-12", Some(found("C-101", "2025-12", false)));

        let text = composer.compose("Has C-101 paid?", &bundle).await;

        assert_eq!(text, "C-101 has not paid for 2025-12 yet.");
        assert_eq!(generator.calls(), 1);
    }

    #[tokio::test]
    async fn test_template_as_primary_never_calls_generator() {
        let composer = ExplanationComposer::new(Arc::new(TemplateNarrator));
        let bundle = check("B-302", "2025-12", Some(found("B-302", "2025-12", true)));
        assert_eq!(
            composer.compose("Has B-302 paid?", &bundle).await,
            "B-302 has already paid for 2025-12."
        );
    }
}
