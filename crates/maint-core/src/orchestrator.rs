//! Plan execution against the collaborator services.
//!
//! | Plan | Calls |
//! |---|---|
//! | `AddFlat` | upsert |
//! | `CheckOnly` | status lookup |
//! | `CheckAndRemind` | status lookup; if unpaid: reminder, then audit |
//!
//! The orchestrator holds no per-request state; every call is sequential
//! because each step depends on the previous result.

use std::sync::Arc;

use maint_collab::{
    AuditEvent, AuditSink, FlatUpsert, MessagingSender, PaymentLookup, PaymentStore,
    ReminderRequest,
};
use tracing::{debug, instrument};

use crate::domain::{OrchestrationError, OrchestrationResult, Plan, ResultBundle};
use crate::obs;

/// Audit event type written after a reminder goes out.
pub const REMINDER_SENT_EVENT: &str = "MAINTENANCE_REMINDER_SENT";

/// Executes plans against injected collaborators.
#[derive(Clone)]
pub struct Orchestrator {
    payments: Arc<dyn PaymentStore>,
    messenger: Arc<dyn MessagingSender>,
    audit: Arc<dyn AuditSink>,
}

impl Orchestrator {
    pub fn new(
        payments: Arc<dyn PaymentStore>,
        messenger: Arc<dyn MessagingSender>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            payments,
            messenger,
            audit,
        }
    }

    /// Run `plan` and collect what each collaborator returned.
    ///
    /// A missing payment record is reported in the bundle, not as an error.
    /// Collaborator failures propagate. Once a reminder has been sent it is
    /// never treated as unsent: an audit failure after it yields
    /// [`OrchestrationError::ReminderNotRecorded`] carrying the reminder.
    #[instrument(skip_all, fields(action = %plan.action(), flat_no = %plan.flat_no()))]
    pub async fn execute(&self, plan: Plan) -> OrchestrationResult<ResultBundle> {
        let mut bundle = ResultBundle::new(plan);

        match &bundle.plan {
            Plan::AddFlat {
                flat_no,
                owner_name,
                phone_number,
                whatsapp_number,
            } => {
                let flat = self
                    .payments
                    .upsert_flat(FlatUpsert {
                        flat_no: flat_no.clone(),
                        owner_name: owner_name.clone(),
                        phone_number: phone_number.clone(),
                        whatsapp_number: whatsapp_number.clone(),
                    })
                    .await?;
                bundle.flat = Some(flat);
            }
            Plan::CheckOnly {
                flat_no,
                month_year,
            } => {
                let lookup = self.payments.payment_status(flat_no, month_year).await?;
                bundle.payment = Some(lookup);
            }
            Plan::CheckAndRemind {
                flat_no,
                month_year,
            } => {
                let lookup = self.payments.payment_status(flat_no, month_year).await?;
                let needs_reminder = match &lookup {
                    PaymentLookup::NotFound { .. } => {
                        debug!("No payment record, nothing to remind about");
                        false
                    }
                    PaymentLookup::Found(status) if status.is_paid => {
                        debug!("Already paid, no reminder needed");
                        false
                    }
                    PaymentLookup::Found(_) => true,
                };
                let (flat_no, month_year) = (flat_no.clone(), month_year.clone());
                bundle.payment = Some(lookup);

                if needs_reminder {
                    self.remind_and_record(&mut bundle, flat_no, month_year)
                        .await?;
                }
            }
        }

        Ok(bundle)
    }

    async fn remind_and_record(
        &self,
        bundle: &mut ResultBundle,
        flat_no: String,
        month_year: String,
    ) -> OrchestrationResult<()> {
        let reminder = self
            .messenger
            .send_reminder(ReminderRequest {
                flat_no: flat_no.clone(),
                month_year: month_year.clone(),
            })
            .await?;
        obs::emit_reminder_sent(&reminder);

        let event = AuditEvent {
            event_type: REMINDER_SENT_EVENT.to_string(),
            flat_no,
            month_year,
            details: serde_json::json!({ "reminder": &reminder }),
        };

        match self.audit.log_event(event).await {
            Ok(record) => {
                obs::emit_audit_logged(&record);
                bundle.reminder = Some(reminder);
                bundle.audit = Some(record);
                Ok(())
            }
            Err(source) => {
                obs::emit_reminder_unrecorded(&reminder, &source);
                Err(OrchestrationError::ReminderNotRecorded {
                    reminder: Box::new(reminder),
                    source,
                })
            }
        }
    }
}
