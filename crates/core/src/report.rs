use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::action::AgentAction;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnergySavedSummary {
    pub cognitive: f64,
    pub physical: f64,
    pub emotional: f64,
    pub total: f64,
    pub by_financial: f64,
    pub by_decision: f64,
    pub by_social: f64,
}

/// Illustrative efficiency-vs-target projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeapfrogIndex {
    pub current_efficiency: f64,
    pub target_efficiency: f64,
    pub days_to_target: u32,
    pub percentile_rank: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyAgentReport {
    pub date: NaiveDate,
    pub financial_actions: u32,
    pub decision_actions: u32,
    pub social_actions: u32,
    pub total_actions: u32,
    pub executed_actions: u32,
    pub pending_actions: u32,
    /// executed / total, 0.0 with no actions.
    pub success_rate: f64,
    pub time_saved_minutes: f64,
    pub energy_saved: EnergySavedSummary,
    #[serde(default)]
    pub deleted_worries: Vec<String>,
    /// 25..=100
    pub freedom_score: u32,
    pub pure_will_decisions: u32,
    pub automated_decisions: u32,
    pub leapfrog_index: LeapfrogIndex,
    #[serde(default)]
    pub actions: Vec<AgentAction>,
    #[serde(default)]
    pub insights: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Increasing,
    Stable,
    Decreasing,
}

impl Trend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::Increasing => "increasing",
            Trend::Stable => "stable",
            Trend::Decreasing => "decreasing",
        }
    }
}

/// Longitudinal scores over the recent report window. All sub-scores are
/// in 0..=100.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FreedomMetrics {
    pub overall_score: f64,
    pub time_freedom: f64,
    pub energy_freedom: f64,
    pub decision_freedom: f64,
    pub financial_freedom: f64,
    pub trend: Trend,
    pub window_size: usize,
}
