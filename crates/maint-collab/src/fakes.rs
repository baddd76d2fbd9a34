//! In-memory fakes for the collaborator traits (testing and demos)
//!
//! Provides `MemoryPaymentStore`, `RecordingMessenger`, `MemoryAuditSink`
//! and `ScriptedGenerator`. Each one counts its calls so tests can assert
//! which collaborators a flow touched.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};

use crate::error::{CollaboratorError, GenerationError, Service};
use crate::traits::*;
use crate::types::*;
use crate::CollabResult;

// ---------------------------------------------------------------------------
// MemoryPaymentStore
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct PaymentState {
    flats: BTreeMap<String, FlatRecord>,
    payments: HashMap<(String, String), PaymentStatus>,
    next_flat_id: i64,
    status_calls: usize,
    upsert_calls: usize,
    fail_with: Option<CollaboratorError>,
}

/// Payment store backed by a flat map and a `(flat_no, month_year)` map.
#[derive(Debug, Default)]
pub struct MemoryPaymentStore {
    state: Mutex<PaymentState>,
}

impl MemoryPaymentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a payment row, creating the flat if it does not exist yet.
    pub fn with_payment(
        self,
        flat_no: &str,
        month_year: &str,
        is_paid: bool,
        paid_on: Option<NaiveDate>,
    ) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            if !state.flats.contains_key(flat_no) {
                state.next_flat_id += 1;
                let flat_id = state.next_flat_id;
                state.flats.insert(
                    flat_no.to_string(),
                    FlatRecord {
                        flat_id: Some(flat_id),
                        flat_no: flat_no.to_string(),
                        owner_name: None,
                        phone_number: None,
                        whatsapp_number: None,
                    },
                );
            }
            state.payments.insert(
                (flat_no.to_string(), month_year.to_string()),
                PaymentStatus {
                    flat_no: flat_no.to_string(),
                    month_year: month_year.to_string(),
                    is_paid,
                    paid_on,
                },
            );
        }
        self
    }

    /// Make every subsequent call fail with `err`.
    pub fn fail_with(&self, err: CollaboratorError) {
        self.state.lock().unwrap().fail_with = Some(err);
    }

    pub fn status_calls(&self) -> usize {
        self.state.lock().unwrap().status_calls
    }

    pub fn upsert_calls(&self) -> usize {
        self.state.lock().unwrap().upsert_calls
    }

    pub fn flat(&self, flat_no: &str) -> Option<FlatRecord> {
        self.state.lock().unwrap().flats.get(flat_no).cloned()
    }

    pub fn flat_count(&self) -> usize {
        self.state.lock().unwrap().flats.len()
    }
}

#[async_trait]
impl PaymentStore for MemoryPaymentStore {
    async fn payment_status(&self, flat_no: &str, month_year: &str) -> CollabResult<PaymentLookup> {
        let mut state = self.state.lock().unwrap();
        state.status_calls += 1;
        if let Some(err) = state.fail_with.clone() {
            return Err(err);
        }
        let key = (flat_no.to_string(), month_year.to_string());
        Ok(match state.payments.get(&key) {
            Some(status) => PaymentLookup::Found(status.clone()),
            None => PaymentLookup::NotFound {
                flat_no: flat_no.to_string(),
                month_year: month_year.to_string(),
            },
        })
    }

    async fn upsert_flat(&self, flat: FlatUpsert) -> CollabResult<FlatRecord> {
        let mut state = self.state.lock().unwrap();
        state.upsert_calls += 1;
        if let Some(err) = state.fail_with.clone() {
            return Err(err);
        }
        let flat_id = match state.flats.get(&flat.flat_no).and_then(|f| f.flat_id) {
            Some(id) => id,
            None => {
                state.next_flat_id += 1;
                state.next_flat_id
            }
        };
        // Same semantics as the SQL upsert: every contact field is replaced.
        let record = FlatRecord {
            flat_id: Some(flat_id),
            flat_no: flat.flat_no.clone(),
            owner_name: flat.owner_name,
            phone_number: flat.phone_number,
            whatsapp_number: flat.whatsapp_number,
        };
        state.flats.insert(flat.flat_no, record.clone());
        Ok(record)
    }

    async fn list_flats(&self) -> CollabResult<Vec<FlatRecord>> {
        let state = self.state.lock().unwrap();
        if let Some(err) = state.fail_with.clone() {
            return Err(err);
        }
        Ok(state
            .flats
            .values()
            .map(|f| FlatRecord {
                flat_id: None,
                ..f.clone()
            })
            .collect())
    }
}

// ---------------------------------------------------------------------------
// RecordingMessenger
// ---------------------------------------------------------------------------

/// Messenger that records every request and acknowledges with `SENT`.
#[derive(Debug, Default)]
pub struct RecordingMessenger {
    sent: Mutex<Vec<ReminderRequest>>,
    fail_with: Mutex<Option<CollaboratorError>>,
}

impl RecordingMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(err: CollaboratorError) -> Self {
        Self {
            sent: Mutex::default(),
            fail_with: Mutex::new(Some(err)),
        }
    }

    pub fn calls(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn sent(&self) -> Vec<ReminderRequest> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessagingSender for RecordingMessenger {
    async fn send_reminder(&self, request: ReminderRequest) -> CollabResult<ReminderResult> {
        let mut sent = self.sent.lock().unwrap();
        sent.push(request.clone());
        if let Some(err) = self.fail_with.lock().unwrap().clone() {
            return Err(err);
        }
        Ok(ReminderResult {
            status: DeliveryStatus::Delivered,
            message_id: format!("fake-whatsapp-{}", sent.len()),
            flat_no: request.flat_no,
            month_year: request.month_year,
            sent_at: Utc::now(),
        })
    }
}

// ---------------------------------------------------------------------------
// MemoryAuditSink
// ---------------------------------------------------------------------------

/// Audit sink that appends to a vector and hands out monotonic log ids.
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    records: Mutex<Vec<AuditRecord>>,
    attempts: Mutex<usize>,
    fail_with: Mutex<Option<CollaboratorError>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(err: CollaboratorError) -> Self {
        Self {
            fail_with: Mutex::new(Some(err)),
            ..Self::default()
        }
    }

    /// Calls made, including failed ones.
    pub fn calls(&self) -> usize {
        *self.attempts.lock().unwrap()
    }

    pub fn records(&self) -> Vec<AuditRecord> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait]
impl AuditSink for MemoryAuditSink {
    async fn log_event(&self, event: AuditEvent) -> CollabResult<AuditRecord> {
        *self.attempts.lock().unwrap() += 1;
        if let Some(err) = self.fail_with.lock().unwrap().clone() {
            return Err(err);
        }
        let mut records = self.records.lock().unwrap();
        let record = AuditRecord::from_event(records.len() as i64 + 1, event);
        records.push(record.clone());
        Ok(record)
    }
}

// ---------------------------------------------------------------------------
// ScriptedGenerator
// ---------------------------------------------------------------------------

/// Text generator that replays queued replies in order.
///
/// Once the queue is drained every call fails with a transport error, which
/// is also how `ScriptedGenerator::unreachable()` behaves from the start.
#[derive(Debug, Default)]
pub struct ScriptedGenerator {
    replies: Mutex<VecDeque<Result<String, GenerationError>>>,
    prompts: Mutex<Vec<(String, String)>>,
}

impl ScriptedGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unreachable() -> Self {
        Self::default()
    }

    pub fn with_reply(self, reply: impl Into<String>) -> Self {
        self.replies.lock().unwrap().push_back(Ok(reply.into()));
        self
    }

    pub fn with_failure(self, err: GenerationError) -> Self {
        self.replies.lock().unwrap().push_back(Err(err));
        self
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    /// `(system_instruction, user_message)` pairs in call order.
    pub fn prompts(&self) -> Vec<(String, String)> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn complete(
        &self,
        system_instruction: &str,
        user_message: &str,
    ) -> Result<String, GenerationError> {
        self.prompts
            .lock()
            .unwrap()
            .push((system_instruction.to_string(), user_message.to_string()));
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(GenerationError::Transport("connection refused".to_string())))
    }
}

/// Convenience error for failure injection.
pub fn unreachable(service: Service) -> CollaboratorError {
    CollaboratorError::Transport {
        service,
        message: "connection refused".to_string(),
    }
}
