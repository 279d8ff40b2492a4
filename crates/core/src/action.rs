use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Which sub-agent produced an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentType {
    Financial,
    Decision,
    Social,
}

impl AgentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentType::Financial => "financial",
            AgentType::Decision => "decision",
            AgentType::Social => "social",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    BillPayment,
    BudgetAlert,
    InformationFilter,
    AutoDecision,
    AutoReply,
    SpamFilter,
    DeclineRequest,
    ScheduleMeeting,
    EnergyProtection,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::BillPayment => "bill_payment",
            ActionKind::BudgetAlert => "budget_alert",
            ActionKind::InformationFilter => "information_filter",
            ActionKind::AutoDecision => "auto_decision",
            ActionKind::AutoReply => "auto_reply",
            ActionKind::SpamFilter => "spam_filter",
            ActionKind::DeclineRequest => "decline_request",
            ActionKind::ScheduleMeeting => "schedule_meeting",
            ActionKind::EnergyProtection => "energy_protection",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionStatus {
    Pending,
    Approved,
    Executed,
    Rejected,
    Failed,
}

/// Four-step gate deciding whether a proposed action may self-execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PermissionLevel {
    Observe,
    #[default]
    Suggest,
    Execute,
    Autonomous,
}

impl PermissionLevel {
    /// Execute or autonomous.
    pub fn can_execute(&self) -> bool {
        *self >= PermissionLevel::Execute
    }

    pub fn is_autonomous(&self) -> bool {
        *self == PermissionLevel::Autonomous
    }

    /// Status for an action that would run itself if allowed.
    pub fn gate(&self) -> ActionStatus {
        if self.can_execute() {
            ActionStatus::Executed
        } else {
            ActionStatus::Pending
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PermissionLevel::Observe => "observe",
            PermissionLevel::Suggest => "suggest",
            PermissionLevel::Execute => "execute",
            PermissionLevel::Autonomous => "autonomous",
        }
    }
}

impl std::str::FromStr for PermissionLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "observe" => Ok(PermissionLevel::Observe),
            "suggest" => Ok(PermissionLevel::Suggest),
            "execute" => Ok(PermissionLevel::Execute),
            "autonomous" => Ok(PermissionLevel::Autonomous),
            other => Err(Error::Validation(format!(
                "unknown permission level '{}' (expected observe, suggest, execute or autonomous)",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialDetails {
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub account: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionDetails {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub selected_option: Option<String>,
    #[serde(default)]
    pub filtered_count: u32,
    #[serde(default)]
    pub decisions_automated: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialDetails {
    #[serde(default)]
    pub contact: Option<String>,
    #[serde(default)]
    pub message_id: Option<String>,
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub reply_text: Option<String>,
}

/// Agent-specific payload carried by an [`AgentAction`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "agentType", rename_all = "snake_case")]
pub enum ActionDetails {
    Financial(FinancialDetails),
    Decision(DecisionDetails),
    Social(SocialDetails),
}

/// A proposed or executed action. The envelope is shared by all agents;
/// `details` carries the agent-specific fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentAction {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub action_type: ActionKind,
    pub description: String,
    #[serde(default)]
    pub target_refs: Vec<String>,
    pub status: ActionStatus,
    pub requires_approval: bool,
    pub estimated_time_saved_minutes: f64,
    #[serde(default)]
    pub actual_time_saved_minutes: Option<f64>,
    pub estimated_energy_saved: f64,
    #[serde(default)]
    pub actual_energy_saved: Option<f64>,
    pub reasoning: String,
    pub confidence: f64,
    pub details: ActionDetails,
}

impl AgentAction {
    /// Start a pending action; callers fill in the rest with the builder
    /// methods below.
    pub fn new(
        id: String,
        timestamp: DateTime<Utc>,
        action_type: ActionKind,
        description: impl Into<String>,
        details: ActionDetails,
    ) -> Self {
        Self {
            id,
            timestamp,
            action_type,
            description: description.into(),
            target_refs: Vec::new(),
            status: ActionStatus::Pending,
            requires_approval: true,
            estimated_time_saved_minutes: 0.0,
            actual_time_saved_minutes: None,
            estimated_energy_saved: 0.0,
            actual_energy_saved: None,
            reasoning: String::new(),
            confidence: 1.0,
            details,
        }
    }

    pub fn with_status(mut self, status: ActionStatus) -> Self {
        self.status = status;
        self.requires_approval = status == ActionStatus::Pending;
        self
    }

    pub fn with_targets<I, S>(mut self, targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.target_refs = targets.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_savings(mut self, minutes: f64, energy: f64) -> Self {
        self.estimated_time_saved_minutes = minutes;
        self.estimated_energy_saved = energy;
        self
    }

    pub fn with_reasoning(mut self, reasoning: impl Into<String>, confidence: f64) -> Self {
        self.reasoning = reasoning.into();
        self.confidence = confidence;
        self
    }

    pub fn agent_type(&self) -> AgentType {
        match self.details {
            ActionDetails::Financial(_) => AgentType::Financial,
            ActionDetails::Decision(_) => AgentType::Decision,
            ActionDetails::Social(_) => AgentType::Social,
        }
    }

    pub fn is_executed(&self) -> bool {
        self.status == ActionStatus::Executed
    }

    pub fn is_pending(&self) -> bool {
        self.status == ActionStatus::Pending
    }

    /// Actual minutes saved when known, otherwise the estimate.
    pub fn time_saved_minutes(&self) -> f64 {
        self.actual_time_saved_minutes
            .unwrap_or(self.estimated_time_saved_minutes)
    }

    pub fn energy_saved(&self) -> f64 {
        self.actual_energy_saved.unwrap_or(self.estimated_energy_saved)
    }

    pub fn financial(&self) -> Option<&FinancialDetails> {
        match &self.details {
            ActionDetails::Financial(d) => Some(d),
            _ => None,
        }
    }

    pub fn decision(&self) -> Option<&DecisionDetails> {
        match &self.details {
            ActionDetails::Decision(d) => Some(d),
            _ => None,
        }
    }

    pub fn social(&self) -> Option<&SocialDetails> {
        match &self.details {
            ActionDetails::Social(d) => Some(d),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_permission_gate() {
        assert_eq!(PermissionLevel::Observe.gate(), ActionStatus::Pending);
        assert_eq!(PermissionLevel::Suggest.gate(), ActionStatus::Pending);
        assert_eq!(PermissionLevel::Execute.gate(), ActionStatus::Executed);
        assert_eq!(PermissionLevel::Autonomous.gate(), ActionStatus::Executed);
        assert_eq!(" Autonomous ".parse::<PermissionLevel>().unwrap(), PermissionLevel::Autonomous);
        assert!("root".parse::<PermissionLevel>().is_err());
    }

    #[test]
    fn test_action_serializes_agent_type_tag() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();
        let action = AgentAction::new(
            "fin_1".to_string(),
            now,
            ActionKind::BillPayment,
            "Pay rent",
            ActionDetails::Financial(FinancialDetails {
                amount: Some(900.0),
                ..Default::default()
            }),
        )
        .with_status(ActionStatus::Executed);

        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(json["actionType"], "bill_payment");
        assert_eq!(json["status"], "executed");
        assert_eq!(json["details"]["agentType"], "financial");
        assert_eq!(json["requiresApproval"], false);

        let back: AgentAction = serde_json::from_value(json).unwrap();
        assert_eq!(back.agent_type(), AgentType::Financial);
        assert_eq!(back.financial().and_then(|d| d.amount), Some(900.0));
    }
}
