use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Well-known signal keys supplied by upstream collaborators.
pub mod signal {
    pub const CASH_PRESSURE: &str = "cash_pressure";
    pub const RUNWAY_PRESSURE: &str = "runway_pressure";
    pub const SLEEP_PRESSURE: &str = "sleep_pressure";
    pub const WORKLOAD_PRESSURE: &str = "workload_pressure";
    pub const DEADLINE_PRESSURE: &str = "deadline_pressure";
    pub const DELAY_MAGNITUDE: &str = "delay_magnitude";
    /// Raw amount, not a pressure reading.
    pub const AVAILABLE_CASH: &str = "available_cash";
}

/// Snapshot of numeric signal readings.
///
/// Missing keys and non-finite readings read as `0.0`; a malformed signal is
/// never an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Signals(BTreeMap<String, f64>);

impl Signals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: f64) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: &str, value: f64) {
        self.0.insert(key.to_string(), value);
    }

    pub fn get(&self, key: &str) -> f64 {
        match self.0.get(key) {
            Some(v) if v.is_finite() => *v,
            _ => 0.0,
        }
    }

    /// Pressure reading for a named node, e.g. `"cash"` -> `cash_pressure`.
    pub fn pressure_of(&self, target: &str) -> f64 {
        self.get(&format!("{}_pressure", target))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bill {
    pub id: String,
    pub name: String,
    pub amount: f64,
    pub due_date: NaiveDate,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub account: Option<String>,
    #[serde(default)]
    pub auto_pay: bool,
    #[serde(default)]
    pub is_paid: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: String,
    pub amount: f64,
    pub category: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InformationItem {
    pub id: String,
    pub source: String,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub received_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DecisionCategory {
    Food,
    Transport,
    Schedule,
    Purchase,
    #[default]
    Other,
}

impl DecisionCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecisionCategory::Food => "food",
            DecisionCategory::Transport => "transport",
            DecisionCategory::Schedule => "schedule",
            DecisionCategory::Purchase => "purchase",
            DecisionCategory::Other => "other",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Decision {
    pub id: String,
    pub question: String,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub category: DecisionCategory,
    /// 0.0 (trivial) .. 1.0 (life-changing)
    pub importance: f64,
    #[serde(default)]
    pub deadline: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomingMessage {
    pub id: String,
    pub sender: String,
    #[serde(default)]
    pub sender_name: Option<String>,
    #[serde(default)]
    pub channel: String,
    pub content: String,
    #[serde(default)]
    pub received_at: Option<DateTime<Utc>>,
}

impl IncomingMessage {
    pub fn display_sender(&self) -> &str {
        self.sender_name.as_deref().unwrap_or(&self.sender)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingRequest {
    pub id: String,
    pub requester: String,
    pub title: String,
    #[serde(default)]
    pub duration_minutes: u32,
    #[serde(default)]
    pub proposed_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_required: bool,
}

/// Everything the host hands over for one orchestration cycle.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleInput {
    #[serde(default)]
    pub signals: Signals,
    #[serde(default)]
    pub bills: Vec<Bill>,
    #[serde(default)]
    pub expenses: Vec<Expense>,
    #[serde(default)]
    pub information: Vec<InformationItem>,
    #[serde(default)]
    pub decisions: Vec<Decision>,
    #[serde(default)]
    pub messages: Vec<IncomingMessage>,
    #[serde(default)]
    pub meeting_requests: Vec<MeetingRequest>,
    #[serde(default)]
    pub is_resting: bool,
    /// Decisions the user faced today in total; defaults to the number of
    /// decisions in this cycle.
    #[serde(default)]
    pub total_decisions_today: Option<u32>,
}

impl CycleInput {
    pub fn total_decisions_today(&self) -> u32 {
        self.total_decisions_today
            .unwrap_or(self.decisions.len() as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_and_nan_signals_read_zero() {
        let signals = Signals::new()
            .with(signal::CASH_PRESSURE, f64::NAN)
            .with(signal::SLEEP_PRESSURE, 0.4);
        assert_eq!(signals.get(signal::CASH_PRESSURE), 0.0);
        assert_eq!(signals.get(signal::RUNWAY_PRESSURE), 0.0);
        assert_eq!(signals.get(signal::SLEEP_PRESSURE), 0.4);
        assert_eq!(signals.pressure_of("sleep"), 0.4);
    }

    #[test]
    fn test_cycle_input_from_json() {
        let raw = r#"{
  "signals": { "cash_pressure": 0.7, "available_cash": 1200 },
  "bills": [{ "id": "b1", "name": "Rent", "amount": 900, "dueDate": "2026-10-18", "autoPay": true }],
  "decisions": [{ "id": "d1", "question": "Lunch?", "options": ["salad"], "category": "food", "importance": 0.1 }]
}"#;
        let input: CycleInput = serde_json::from_str(raw).unwrap();
        assert_eq!(input.signals.get(signal::AVAILABLE_CASH), 1200.0);
        assert!(input.bills[0].auto_pay);
        assert!(!input.bills[0].is_paid);
        assert_eq!(input.decisions[0].category, DecisionCategory::Food);
        assert_eq!(input.total_decisions_today(), 1);
    }
}
