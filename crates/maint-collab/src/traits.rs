//! Collaborator trait definitions
//!
//! - `PaymentStore`: payment status and the flat directory
//! - `MessagingSender`: reminder dispatch
//! - `AuditSink`: append-only audit log
//! - `TextGenerator`: the natural-language capability
//!
//! All traits are async and transport-agnostic. HTTP implementations live in
//! `maint-http`; in-memory fakes live in the `fakes` module.

use async_trait::async_trait;

use crate::error::GenerationError;
use crate::types::{
    AuditEvent, AuditRecord, FlatRecord, FlatUpsert, PaymentLookup, ReminderRequest,
    ReminderResult,
};
use crate::CollabResult;

/// Payment records and the flat directory.
///
/// Guarantees:
/// - `payment_status` reports a missing record as `PaymentLookup::NotFound`,
///   never as an error.
/// - `upsert_flat` keeps at most one record per `flat_no`; a repeated call
///   updates the owner and contact fields in place.
#[async_trait]
pub trait PaymentStore: Send + Sync {
    async fn payment_status(&self, flat_no: &str, month_year: &str) -> CollabResult<PaymentLookup>;

    async fn upsert_flat(&self, flat: FlatUpsert) -> CollabResult<FlatRecord>;

    /// All flats, ordered by `flat_no`.
    async fn list_flats(&self) -> CollabResult<Vec<FlatRecord>>;
}

/// Fire-and-forget reminder delivery.
#[async_trait]
pub trait MessagingSender: Send + Sync {
    async fn send_reminder(&self, request: ReminderRequest) -> CollabResult<ReminderResult>;
}

/// Append-only event sink.
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn log_event(&self, event: AuditEvent) -> CollabResult<AuditRecord>;
}

/// Free-text completion: a system instruction and a user message in, text out.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn complete(
        &self,
        system_instruction: &str,
        user_message: &str,
    ) -> Result<String, GenerationError>;
}
