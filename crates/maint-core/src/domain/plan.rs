//! The structured plan derived from a user's request.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The three things the agent knows how to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlanAction {
    /// Look up payment status and report it.
    CheckOnly,
    /// Look up status; if unpaid, send a reminder and record it.
    CheckAndRemind,
    /// Create or update a flat record.
    AddFlat,
}

impl PlanAction {
    /// Parse the planner's wire label (`"CHECK_ONLY"`, ...). Case-insensitive.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_uppercase().as_str() {
            "CHECK_ONLY" => Some(Self::CheckOnly),
            "CHECK_AND_REMIND" => Some(Self::CheckAndRemind),
            "ADD_FLAT" => Some(Self::AddFlat),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::CheckOnly => "CHECK_ONLY",
            Self::CheckAndRemind => "CHECK_AND_REMIND",
            Self::AddFlat => "ADD_FLAT",
        }
    }
}

impl std::fmt::Display for PlanAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A well-formed plan. Each variant carries exactly the fields its action
/// needs, so a half-populated plan cannot be constructed.
///
/// Serializes in the planner's own shape:
/// `{"action": "CHECK_ONLY", "flat_no": "C-101", "month_year": "2025-12"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Plan {
    CheckOnly {
        flat_no: String,
        month_year: String,
    },
    CheckAndRemind {
        flat_no: String,
        month_year: String,
    },
    AddFlat {
        flat_no: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        owner_name: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        phone_number: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        whatsapp_number: Option<String>,
    },
}

impl Plan {
    pub fn action(&self) -> PlanAction {
        match self {
            Self::CheckOnly { .. } => PlanAction::CheckOnly,
            Self::CheckAndRemind { .. } => PlanAction::CheckAndRemind,
            Self::AddFlat { .. } => PlanAction::AddFlat,
        }
    }

    pub fn flat_no(&self) -> &str {
        match self {
            Self::CheckOnly { flat_no, .. }
            | Self::CheckAndRemind { flat_no, .. }
            | Self::AddFlat { flat_no, .. } => flat_no,
        }
    }

    /// `None` for `AddFlat`, which is not tied to a billing month.
    pub fn month_year(&self) -> Option<&str> {
        match self {
            Self::CheckOnly { month_year, .. } | Self::CheckAndRemind { month_year, .. } => {
                Some(month_year)
            }
            Self::AddFlat { .. } => None,
        }
    }
}

/// `YYYY-MM` for the UTC month containing `now`.
pub fn month_year_of(now: DateTime<Utc>) -> String {
    now.format("%Y-%m").to_string()
}

/// `YYYY-MM` for the current UTC month.
pub fn current_month_year() -> String {
    month_year_of(Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_plan_serializes_in_planner_shape() {
        let plan = Plan::CheckOnly {
            flat_no: "C-101".to_string(),
            month_year: "2025-12".to_string(),
        };
        let value = serde_json::to_value(&plan).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"action": "CHECK_ONLY", "flat_no": "C-101", "month_year": "2025-12"})
        );
    }

    #[test]
    fn test_add_flat_omits_absent_contact_fields() {
        let plan = Plan::AddFlat {
            flat_no: "D-404".to_string(),
            owner_name: Some("Jane".to_string()),
            phone_number: None,
            whatsapp_number: None,
        };
        let value = serde_json::to_value(&plan).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"action": "ADD_FLAT", "flat_no": "D-404", "owner_name": "Jane"})
        );
        assert_eq!(plan.month_year(), None);
    }

    #[test]
    fn test_action_labels() {
        assert_eq!(
            PlanAction::from_label("check_and_remind"),
            Some(PlanAction::CheckAndRemind)
        );
        assert_eq!(PlanAction::from_label(" ADD_FLAT "), Some(PlanAction::AddFlat));
        assert_eq!(PlanAction::from_label("LIST_FLATS"), None);
        assert_eq!(PlanAction::CheckOnly.to_string(), "CHECK_ONLY");
    }

    #[test]
    fn test_month_year_is_zero_padded() {
        let now = Utc.with_ymd_and_hms(2026, 3, 9, 23, 59, 0).unwrap();
        assert_eq!(month_year_of(now), "2026-03");
    }
}
