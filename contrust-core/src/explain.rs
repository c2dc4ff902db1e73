//! Campaign explanations for the assistant chat endpoint
//!
//! The text-generation call itself belongs to the caller. This module builds the
//! prompt for it and supplies keyword-matched fallback answers when the upstream
//! call fails or returns nothing.

use anyhow::Result;
use chrono::{DateTime, SecondsFormat, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::OnceLock;

pub const FRAUD_ANSWER: &str = "Contrust uses AI-powered fraud detection to analyze every donation. We check for unusual patterns, verify donor information through the Nessie API, and assign a trust score to each transaction. Donations with high risk scores are flagged for review before processing.";
pub const SPENDING_ANSWER: &str = "Smart contracts in Contrust enforce spending categories set by organizations. Each campaign specifies how funds will be allocated (e.g., 40% medical, 35% food, 25% shelter). The AI verifies that every withdrawal matches its intended category and stays within budget. Donors can see real-time spending breakdowns.";
pub const TRACKING_ANSWER: &str = "You can track your donation in real-time through the dashboard. Every transaction is logged with: donation amount, category allocation, AI verification score, and spending updates. The system uses live data to show exactly how funds are being used.";
pub const PAYMENT_ANSWER: &str = "Contrust integrates with Capital One's Nessie API for secure payment processing. Your transactions are logged in real-time, and customer information is tracked for transparency and fraud prevention.";
pub const INTRODUCTION: &str = "I'm the Contrust AI Assistant. I can help you understand donation tracking, fraud detection, smart contract spending rules, and real-time progress monitoring. What would you like to know?";

/// Incoming chat question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplainRequest {
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplainResponse {
    pub explanation: String,
    /// RFC 3339 timestamp
    pub timestamp: String,
}

impl ExplainRequest {
    pub fn validate(&self) -> Result<()> {
        if self.query.trim().is_empty() {
            anyhow::bail!("query is required");
        }
        Ok(())
    }
}

/// Render the prompt sent to the upstream text-generation service
pub fn build_prompt(request: &ExplainRequest) -> String {
    let data = request
        .data
        .as_ref()
        .map(Value::to_string)
        .unwrap_or_else(|| "{}".to_string());
    format!(
        "You are Contrust AI Assistant, an expert in transparent donation tracking and smart contract management. Context: {}. User data: {}. User question: {}\n\nProvide a clear, concise, and helpful response focused on donation transparency, fraud detection, or campaign progress.",
        request.context.as_deref().filter(|c| !c.is_empty()).unwrap_or("general"),
        data,
        request.query
    )
}

/// Answer a request, preferring non-empty upstream text over the fallback
pub fn explain(request: &ExplainRequest, upstream: Option<String>) -> Result<ExplainResponse> {
    explain_at(request, upstream, Utc::now())
}

pub fn explain_at(
    request: &ExplainRequest,
    upstream: Option<String>,
    now: DateTime<Utc>,
) -> Result<ExplainResponse> {
    request.validate()?;

    let explanation = match upstream.filter(|text| !text.trim().is_empty()) {
        Some(text) => text,
        None => {
            tracing::debug!("no upstream explanation, using fallback");
            fallback_response(request)
        }
    };

    Ok(ExplainResponse {
        explanation,
        timestamp: now.to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}

fn keyword_routes() -> &'static [(Regex, &'static str)] {
    static ROUTES: OnceLock<Vec<(Regex, &'static str)>> = OnceLock::new();
    ROUTES.get_or_init(|| {
        [
            (r"(?i)fraud|security", FRAUD_ANSWER),
            (r"(?i)smart contract|spending", SPENDING_ANSWER),
            (r"(?i)track|progress", TRACKING_ANSWER),
            (r"(?i)nessie|payment", PAYMENT_ANSWER),
        ]
        .into_iter()
        .filter_map(|(pattern, answer)| Regex::new(pattern).ok().map(|re| (re, answer)))
        .collect()
    })
}

/// Fixed answers keyed by keywords in the query, checked in order
pub fn fallback_response(request: &ExplainRequest) -> String {
    if let Some((_, answer)) = keyword_routes()
        .iter()
        .find(|(re, _)| re.is_match(&request.query))
    {
        return (*answer).to_string();
    }

    if request.context.as_deref() == Some("donation") {
        if let Some(data) = request.data.as_ref().filter(|d| !d.is_null()) {
            return donation_summary(data);
        }
    }

    INTRODUCTION.to_string()
}

fn donation_summary(data: &Value) -> String {
    let amount = display_field(data, "amount").unwrap_or_else(|| "0".to_string());
    let category = display_field(data, "category").unwrap_or_else(|| "campaign".to_string());
    let score = display_field(data, "fraudScore").unwrap_or_else(|| "95".to_string());
    format!(
        "Your donation of ${} to the {} category has been processed with AI verification. The fraud detection score is {}%, indicating a secure transaction. Funds will be allocated according to the smart contract terms.",
        amount, category, score
    )
}

/// A data field rendered for display; missing, null, false, zero and empty
/// values count as absent
fn display_field(data: &Value, key: &str) -> Option<String> {
    match data.get(key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64().is_some_and(|v| v != 0.0) => Some(n.to_string()),
        Value::Bool(true) => Some("true".to_string()),
        _ => None,
    }
}
