//! Maint-Collab: Collaborator Contracts for the Maintenance Agent
//!
//! The agent never stores payments, delivers messages or writes audit rows
//! itself. This crate defines the narrow request/response contracts it uses
//! to reach the services that do.
//!
//! ## Layer 0 - Contracts
//!
//! Focus: typed snapshots and a failure taxonomy that keeps "not found"
//! distinguishable from "broken".
//!
//! ## Key Components
//!
//! - `PaymentStore`: payment status lookup and the flat directory
//! - `MessagingSender`: reminder dispatch
//! - `AuditSink`: append-only event log
//! - `TextGenerator`: system instruction + user message in, free text out
//! - `fakes`: in-memory implementations for tests and demos

mod error;
pub mod fakes;
mod traits;
mod types;

pub use error::{CollaboratorError, GenerationError, Service};
pub use traits::{AuditSink, MessagingSender, PaymentStore, TextGenerator};
pub use types::{
    AuditEvent, AuditRecord, DeliveryStatus, FlatRecord, FlatUpsert, PaymentLookup, PaymentStatus,
    ReminderRequest, ReminderResult,
};

/// Result type for collaborator calls
pub type CollabResult<T> = std::result::Result<T, CollaboratorError>;
