//! Offline text generator for demos and local runs without a model.
//!
//! Recognises the planning instruction by its marker and answers with a
//! keyword-derived plan wrapped in a sentence, the way chatty models do.
//! Any other call is treated as an explanation request and answered from the
//! JSON context embedded in the user message.

use std::sync::OnceLock;

use async_trait::async_trait;
use chrono::Utc;
use maint_collab::{GenerationError, TextGenerator};
use regex::Regex;
use serde_json::{json, Value};

use crate::domain::month_year_of;
use crate::planner::{extract_object, PLANNER_MARKER};

const DEFAULT_FLAT: &str = "C-101";
const DEFAULT_OWNER: &str = "New Owner";
const DEFAULT_PHONE: &str = "+910000000000";

fn flat_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b[A-Z]-\d{3}\b").expect("valid flat regex"))
}

fn owner_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)(?:for|owner is|owner)\s+([A-Za-z ]+)").expect("valid owner regex")
    })
}

fn phone_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\+?\d{10,15})").expect("valid phone regex"))
}

fn month_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b(20\d{2})[-/](0[1-9]|1[0-2])\b").expect("valid month regex"))
}

fn detect_flat_no(text: &str) -> String {
    flat_re()
        .find(&text.to_uppercase())
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| DEFAULT_FLAT.to_string())
}

fn title_case(words: &str) -> String {
    words
        .split_whitespace()
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn detect_owner(text: &str) -> String {
    owner_re()
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| title_case(m.as_str()))
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| DEFAULT_OWNER.to_string())
}

fn detect_phone(text: &str) -> String {
    phone_re()
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| DEFAULT_PHONE.to_string())
}

fn detect_month_year(text: &str) -> String {
    month_re()
        .captures(text)
        .map(|c| format!("{}-{}", &c[1], &c[2]))
        .unwrap_or_else(|| month_year_of(Utc::now()))
}

/// Keyword plan for `text`, in the planner's JSON shape.
pub fn heuristic_plan(text: &str) -> Value {
    let lower = text.to_lowercase();
    if lower.contains("add flat") || lower.contains("create flat") {
        let phone = detect_phone(text);
        return json!({
            "action": "ADD_FLAT",
            "flat_no": detect_flat_no(text),
            "owner_name": detect_owner(text),
            "phone_number": phone,
            "whatsapp_number": phone,
        });
    }

    let action = if lower.contains("remind") || lower.contains("send") {
        "CHECK_AND_REMIND"
    } else {
        "CHECK_ONLY"
    };
    json!({
        "action": action,
        "flat_no": detect_flat_no(text),
        "month_year": detect_month_year(text),
    })
}

/// Narrative from an explanation context (see `explain::explanation_context`).
pub fn heuristic_explanation(message: &str) -> String {
    let context: Value = match extract_object(message).and_then(|o| serde_json::from_str(o).ok()) {
        Some(context) => context,
        None => return "I parsed the request and responded with the available data.".to_string(),
    };

    let plan = &context["plan"];
    let payment = &context["payment_result"];
    let reminder = &context["reminder_result"];
    let flat = &context["flat_result"];
    let log = &context["log_result"];

    let flat_no = plan["flat_no"].as_str().unwrap_or("the flat");
    let month_year = plan["month_year"].as_str().unwrap_or("the requested month");

    let mut text = if payment["error"] == "not_found" {
        format!("I could not find payment data for {flat_no} for {month_year}.")
    } else if payment["is_paid"] == true {
        match payment["paid_on"].as_str() {
            Some(paid_on) => format!("{flat_no} has already paid for {month_year} on {paid_on}."),
            None => format!("{flat_no} has already paid for {month_year}."),
        }
    } else if payment["is_paid"] == false {
        format!("{flat_no} has not paid for {month_year} yet.")
    } else if flat.is_object() {
        format!(
            "Added or updated flat {} with owner info.",
            flat["flat_no"].as_str().unwrap_or(flat_no)
        )
    } else {
        format!("I checked payment status for {flat_no} for {month_year}.")
    };

    if reminder.is_object() {
        text.push_str(&format!(
            " Sent a WhatsApp reminder at {}.",
            reminder["sent_at"].as_str().unwrap_or("an unknown time")
        ));
    }
    if let Some(log_id) = log["log_id"].as_i64() {
        text.push_str(&format!(" Logged the action with id {log_id}."));
    }
    text
}

/// Deterministic `TextGenerator` that needs no model.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicGenerator;

#[async_trait]
impl TextGenerator for HeuristicGenerator {
    async fn complete(
        &self,
        system_instruction: &str,
        user_message: &str,
    ) -> Result<String, GenerationError> {
        if system_instruction.contains(PLANNER_MARKER) {
            let plan = heuristic_plan(user_message);
            Ok(format!("I'll handle it. Here's the plan: {plan}"))
        } else {
            Ok(heuristic_explanation(user_message))
        }
    }
}
