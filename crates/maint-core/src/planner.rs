//! Plan parsing and the planner call.
//!
//! Parsing is two explicit stages so each failure is distinguishable:
//! 1. [`extract_object`] finds the first `{` and the last `}`. Generators
//!    like to wrap their JSON in commentary, so everything outside is ignored.
//! 2. [`parse_plan`] strictly parses that slice and checks the fields the
//!    declared action requires.
//!
//! Nothing here checks that the flat exists; that is the payment store's job.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use maint_collab::{GenerationError, TextGenerator};
use serde::Deserialize;
use tracing::{instrument, warn};

use crate::domain::{month_year_of, Plan, PlanAction, PlanError, PlanOutcome};
use crate::obs;

/// System instruction for the planning call.
pub const PLANNER_SYSTEM_PROMPT: &str = r#"
You are MaintenancePlanner, an assistant that plans what to do for society maintenance.

You MUST output ONLY a single JSON object, nothing else.
No explanation, no backticks, no extra text.

The JSON format MUST be:
{
  "action": "CHECK_ONLY" or "CHECK_AND_REMIND" or "ADD_FLAT",
  "flat_no": "C-101",
  "month_year": "2025-12",
  "owner_name": "Optional when adding",
  "phone_number": "Optional when adding",
  "whatsapp_number": "Optional when adding"
}

- action:
  - "CHECK_ONLY": Just check payment status and report it.
  - "CHECK_AND_REMIND": Check status, and if unpaid, send a reminder and log it.
  - "ADD_FLAT": Create or update a flat record with owner and phone details.

If user does not specify month/year, omit month_year.
Try to extract flat number from text like "C-101", "B-302", etc.
If user wants to add a flat, include any provided owner/phone numbers; duplicates should be treated as updates.
"#;

/// Marker the planning instruction carries, so a generator serving both
/// planning and explanation can tell the two calls apart.
pub const PLANNER_MARKER: &str = "MaintenancePlanner";

/// Field bag as the generator writes it; every field may be missing.
#[derive(Debug, Deserialize)]
struct PlanFields {
    action: Option<String>,
    flat_no: Option<String>,
    month_year: Option<String>,
    owner_name: Option<String>,
    phone_number: Option<String>,
    whatsapp_number: Option<String>,
}

/// Stage one: the slice from the first `{` to the last `}`, inclusive.
///
/// Returns `None` when either brace is missing or they are out of order.
pub fn extract_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (end > start).then(|| &raw[start..=end])
}

/// Parse planner output, defaulting a missing month to the current UTC month.
pub fn parse_plan(raw: &str) -> Result<Plan, PlanError> {
    parse_plan_at(raw, Utc::now())
}

/// [`parse_plan`] with an explicit clock.
pub fn parse_plan_at(raw: &str, now: DateTime<Utc>) -> Result<Plan, PlanError> {
    let object = extract_object(raw).ok_or_else(|| PlanError::NoObject {
        raw: raw.to_string(),
    })?;

    let fields: PlanFields = serde_json::from_str(object).map_err(|e| PlanError::Malformed {
        reason: e.to_string(),
        raw: raw.to_string(),
    })?;

    build_plan(fields, raw, now)
}

/// Blank values count as absent; anything else is kept exactly as emitted.
fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn resolve_action(label: Option<&str>) -> PlanAction {
    match label.map(str::trim).filter(|l| !l.is_empty()) {
        None => PlanAction::CheckOnly,
        Some(label) => PlanAction::from_label(label).unwrap_or_else(|| {
            warn!(action = %label, "Unsupported plan action, treating as CHECK_ONLY");
            PlanAction::CheckOnly
        }),
    }
}

fn build_plan(fields: PlanFields, raw: &str, now: DateTime<Utc>) -> Result<Plan, PlanError> {
    let action = resolve_action(fields.action.as_deref());

    let flat_no = non_blank(fields.flat_no).ok_or_else(|| PlanError::MissingField {
        action,
        field: "flat_no",
        raw: raw.to_string(),
    })?;

    let plan = match action {
        PlanAction::AddFlat => Plan::AddFlat {
            flat_no,
            owner_name: non_blank(fields.owner_name),
            phone_number: non_blank(fields.phone_number),
            whatsapp_number: non_blank(fields.whatsapp_number),
        },
        PlanAction::CheckOnly | PlanAction::CheckAndRemind => {
            let month_year = non_blank(fields.month_year).unwrap_or_else(|| month_year_of(now));
            if action == PlanAction::CheckOnly {
                Plan::CheckOnly {
                    flat_no,
                    month_year,
                }
            } else {
                Plan::CheckAndRemind {
                    flat_no,
                    month_year,
                }
            }
        }
    };
    Ok(plan)
}

/// Turns a user's request into a plan via the text generator.
pub struct Planner {
    generator: Arc<dyn TextGenerator>,
}

impl Planner {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// A generator failure is returned as an error; unusable generator output
    /// is a `PlanOutcome::Rejected`.
    #[instrument(skip_all)]
    pub async fn plan(&self, user_text: &str) -> Result<PlanOutcome, GenerationError> {
        let raw = self
            .generator
            .complete(PLANNER_SYSTEM_PROMPT, user_text)
            .await?;

        let outcome = PlanOutcome::from(parse_plan(&raw));
        match &outcome {
            PlanOutcome::Planned(plan) => obs::emit_plan_parsed(plan),
            PlanOutcome::Rejected(err) => obs::emit_plan_rejected(err),
        }
        Ok(outcome)
    }
}
