//! Structured observability hooks for the request lifecycle.
//!
//! This module provides:
//! - A request-scoped span from `request_span`, attached to the request
//!   future with `tracing::Instrument`
//! - Emission functions for key lifecycle events: request start/finish,
//!   plan parsed/rejected, reminder sent, audit logged, explanation fallback
//!
//! Events are emitted at `info!` level (`warn!` for failures), filtered by
//! `RUST_LOG`.

use maint_collab::{AuditRecord, GenerationError, ReminderResult};
use tracing::{info, warn, Span};

use crate::domain::{Plan, PlanError};

/// Span carrying `request_id` for everything one request logs.
///
/// ```ignore
/// let span = request_span(&request_id);
/// handle(request).instrument(span).await;
/// ```
///
/// Instrument the future instead of entering the span across an `.await`:
/// an entered guard is `!Send` and would leak into other tasks on the thread.
pub fn request_span(request_id: &str) -> Span {
    tracing::info_span!("maint.request", request_id = %request_id)
}

pub fn emit_request_started(request_id: &str, chars: usize) {
    info!(event = "request.started", request_id = %request_id, chars = chars);
}

pub fn emit_request_finished(request_id: &str, duration_ms: u64, success: bool) {
    info!(
        event = "request.finished",
        request_id = %request_id,
        duration_ms = duration_ms,
        success = success,
    );
}

pub fn emit_plan_parsed(plan: &Plan) {
    info!(
        event = "plan.parsed",
        action = %plan.action(),
        flat_no = %plan.flat_no(),
        month_year = plan.month_year().unwrap_or("-"),
    );
}

/// Warn level: the raw planner text is attached for debugging.
pub fn emit_plan_rejected(err: &PlanError) {
    warn!(event = "plan.rejected", error = %err, raw = %err.raw());
}

pub fn emit_reminder_sent(reminder: &ReminderResult) {
    info!(
        event = "reminder.sent",
        flat_no = %reminder.flat_no,
        month_year = %reminder.month_year,
        message_id = %reminder.message_id,
        status = ?reminder.status,
    );
}

pub fn emit_audit_logged(record: &AuditRecord) {
    info!(
        event = "audit.logged",
        log_id = record.log_id,
        event_type = %record.event_type,
        flat_no = %record.flat_no,
    );
}

/// Warn level: a sent reminder has no audit row.
pub fn emit_reminder_unrecorded(reminder: &ReminderResult, error: &dyn std::fmt::Display) {
    warn!(
        event = "reminder.unrecorded",
        flat_no = %reminder.flat_no,
        month_year = %reminder.month_year,
        message_id = %reminder.message_id,
        error = %error,
    );
}

pub fn emit_explanation_fallback(error: &GenerationError) {
    warn!(event = "explanation.fallback", error = %error);
}
