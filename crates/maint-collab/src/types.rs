//! Snapshots exchanged with the collaborator services.
//!
//! Everything here is returned by a collaborator and treated as read-only
//! by the agent.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Payments
// ---------------------------------------------------------------------------

/// Payment state of one flat for one month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentStatus {
    pub flat_no: String,
    /// `YYYY-MM`
    pub month_year: String,
    pub is_paid: bool,
    #[serde(default)]
    pub paid_on: Option<NaiveDate>,
}

/// Outcome of a payment status lookup.
///
/// `NotFound` is data, not a failure: the store has no record for the
/// flat/month pair and the paid state is unknown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PaymentLookup {
    Found(PaymentStatus),
    NotFound { flat_no: String, month_year: String },
}

impl PaymentLookup {
    /// `Some(paid)` when a record exists, `None` when the state is unknown.
    pub fn is_paid(&self) -> Option<bool> {
        match self {
            Self::Found(status) => Some(status.is_paid),
            Self::NotFound { .. } => None,
        }
    }

    pub fn status(&self) -> Option<&PaymentStatus> {
        match self {
            Self::Found(status) => Some(status),
            Self::NotFound { .. } => None,
        }
    }
}

/// A flat in the society directory, keyed by `flat_no`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatRecord {
    /// Store-assigned surrogate key; not every endpoint reports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flat_id: Option<i64>,
    pub flat_no: String,
    #[serde(default)]
    pub owner_name: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub whatsapp_number: Option<String>,
}

/// Insert-or-update request for a flat. Absent fields are stored as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatUpsert {
    pub flat_no: String,
    pub owner_name: Option<String>,
    pub phone_number: Option<String>,
    pub whatsapp_number: Option<String>,
}

impl FlatUpsert {
    pub fn new(flat_no: impl Into<String>) -> Self {
        Self {
            flat_no: flat_no.into(),
            ..Default::default()
        }
    }

    pub fn with_owner(mut self, owner_name: impl Into<String>) -> Self {
        self.owner_name = Some(owner_name.into());
        self
    }

    pub fn with_phone(mut self, phone_number: impl Into<String>) -> Self {
        self.phone_number = Some(phone_number.into());
        self
    }

    pub fn with_whatsapp(mut self, whatsapp_number: impl Into<String>) -> Self {
        self.whatsapp_number = Some(whatsapp_number.into());
        self
    }
}

// ---------------------------------------------------------------------------
// Messaging
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderRequest {
    pub flat_no: String,
    pub month_year: String,
}

/// Delivery acknowledgment reported by the messaging service.
///
/// The service speaks `"SENT"`; anything it does not recognise as a
/// successful hand-off is treated as failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String")]
pub enum DeliveryStatus {
    #[serde(rename = "SENT")]
    Delivered,
    #[serde(rename = "FAILED")]
    Failed,
}

impl From<String> for DeliveryStatus {
    fn from(value: String) -> Self {
        match value.to_ascii_uppercase().as_str() {
            "SENT" | "DELIVERED" | "QUEUED" | "OK" => Self::Delivered,
            _ => Self::Failed,
        }
    }
}

/// Result of one reminder dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderResult {
    pub status: DeliveryStatus,
    pub message_id: String,
    pub flat_no: String,
    pub month_year: String,
    /// When the send attempt completed, stamped by the client.
    pub sent_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Audit
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    pub event_type: String,
    pub flat_no: String,
    pub month_year: String,
    /// Forwarded verbatim.
    pub details: serde_json::Value,
}

/// An appended audit row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub log_id: i64,
    pub event_type: String,
    pub flat_no: String,
    pub month_year: String,
    pub details: serde_json::Value,
}

impl AuditRecord {
    pub fn from_event(log_id: i64, event: AuditEvent) -> Self {
        Self {
            log_id,
            event_type: event.event_type,
            flat_no: event.flat_no,
            month_year: event.month_year,
            details: event.details,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delivery_status_reads_service_vocabulary() {
        let sent: DeliveryStatus = serde_json::from_str("\"SENT\"").unwrap();
        assert_eq!(sent, DeliveryStatus::Delivered);

        let odd: DeliveryStatus = serde_json::from_str("\"REJECTED\"").unwrap();
        assert_eq!(odd, DeliveryStatus::Failed);

        assert_eq!(
            serde_json::to_string(&DeliveryStatus::Delivered).unwrap(),
            "\"SENT\""
        );
    }

    #[test]
    fn test_payment_status_accepts_null_paid_on() {
        let status: PaymentStatus = serde_json::from_str(
            r#"{"flat_no":"C-101","month_year":"2025-12","is_paid":false,"paid_on":null}"#,
        )
        .unwrap();
        assert!(!status.is_paid);
        assert_eq!(status.paid_on, None);

        let paid: PaymentStatus = serde_json::from_str(
            r#"{"flat_no":"B-302","month_year":"2025-12","is_paid":true,"paid_on":"2025-12-03"}"#,
        )
        .unwrap();
        assert_eq!(paid.paid_on, NaiveDate::from_ymd_opt(2025, 12, 3));
    }

    #[test]
    fn test_payment_lookup_paid_state_is_tri_state() {
        let found = PaymentLookup::Found(PaymentStatus {
            flat_no: "B-302".to_string(),
            month_year: "2025-12".to_string(),
            is_paid: true,
            paid_on: None,
        });
        assert_eq!(found.is_paid(), Some(true));

        let missing = PaymentLookup::NotFound {
            flat_no: "Z-999".to_string(),
            month_year: "2025-12".to_string(),
        };
        assert_eq!(missing.is_paid(), None);
        assert!(missing.status().is_none());
    }

    #[test]
    fn test_flat_record_from_list_endpoint_has_no_id() {
        let flat: FlatRecord = serde_json::from_str(
            r#"{"flat_no":"D-404","owner_name":"Jane Doe","phone_number":null,"whatsapp_number":null}"#,
        )
        .unwrap();
        assert_eq!(flat.flat_id, None);
        assert_eq!(flat.owner_name.as_deref(), Some("Jane Doe"));
    }
}
