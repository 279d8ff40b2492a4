use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::action::PermissionLevel;
use crate::error::{Error, Result};
use crate::paths::Paths;
use crate::types::DecisionCategory;

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

// ── Financial ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialConfig {
    #[serde(default = "default_true")]
    pub auto_pay_bills: bool,
    /// Bills due within this many days are considered for payment.
    #[serde(default = "default_bill_payment_buffer")]
    pub bill_payment_buffer_days: i64,
    /// Monthly limit per expense category.
    #[serde(default)]
    pub budget_limits: BTreeMap<String, f64>,
    #[serde(default)]
    pub default_account: Option<String>,
}

fn default_true() -> bool {
    true
}

fn default_bill_payment_buffer() -> i64 {
    3
}

impl Default for FinancialConfig {
    fn default() -> Self {
        Self {
            auto_pay_bills: true,
            bill_payment_buffer_days: default_bill_payment_buffer(),
            budget_limits: BTreeMap::new(),
            default_account: None,
        }
    }
}

// ── Decision ────────────────────────────────────────────────────────────────

/// Preferred-option keywords for one decision category.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionHeuristic {
    pub category: DecisionCategory,
    pub label: String,
    pub preferred_keywords: Vec<String>,
}

/// Lexical tables driving relevance, importance and auto-decisions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionRules {
    #[serde(default = "default_priority_keywords")]
    pub priority_keywords: BTreeMap<String, Vec<String>>,
    #[serde(default = "default_related_targets")]
    pub related_targets: BTreeMap<String, Vec<String>>,
    #[serde(default = "default_urgency_keywords")]
    pub urgency_keywords: Vec<String>,
    #[serde(default = "default_heuristics")]
    pub heuristics: Vec<DecisionHeuristic>,
}

fn default_priority_keywords() -> BTreeMap<String, Vec<String>> {
    let mut table = BTreeMap::new();
    table.insert(
        "cash".to_string(),
        strings(&["cash", "payment", "invoice", "bank", "funding", "cost", "profit", "price"]),
    );
    table.insert(
        "runway".to_string(),
        strings(&["runway", "burn", "investor", "months left", "expense", "fundraise"]),
    );
    table.insert(
        "customer".to_string(),
        strings(&["customer", "client", "churn", "feedback", "support", "contract"]),
    );
    table.insert(
        "product".to_string(),
        strings(&["product", "launch", "release", "feature", "bug", "roadmap"]),
    );
    table.insert(
        "health".to_string(),
        strings(&["health", "sleep", "exercise", "doctor", "stress"]),
    );
    table
}

fn default_related_targets() -> BTreeMap<String, Vec<String>> {
    let mut table = BTreeMap::new();
    table.insert("cash".to_string(), strings(&["runway", "customer", "revenue"]));
    table.insert("runway".to_string(), strings(&["cash", "revenue"]));
    table.insert("customer".to_string(), strings(&["product", "cash"]));
    table.insert("product".to_string(), strings(&["customer", "growth"]));
    table.insert("health".to_string(), strings(&["energy", "rest"]));
    table
}

fn default_urgency_keywords() -> Vec<String> {
    strings(&[
        "urgent",
        "asap",
        "deadline",
        "immediately",
        "critical",
        "overdue",
        "action required",
    ])
}

fn default_heuristics() -> Vec<DecisionHeuristic> {
    vec![
        DecisionHeuristic {
            category: DecisionCategory::Food,
            label: "health-first".to_string(),
            preferred_keywords: strings(&[
                "salad", "healthy", "vegetable", "fish", "soup", "fruit", "grilled",
            ]),
        },
        DecisionHeuristic {
            category: DecisionCategory::Transport,
            label: "fastest-option".to_string(),
            preferred_keywords: strings(&["fastest", "express", "direct", "taxi", "fast"]),
        },
        DecisionHeuristic {
            category: DecisionCategory::Schedule,
            label: "afternoon-preference".to_string(),
            preferred_keywords: strings(&["afternoon", "pm", "14:", "15:", "16:"]),
        },
    ]
}

impl Default for DecisionRules {
    fn default() -> Self {
        Self {
            priority_keywords: default_priority_keywords(),
            related_targets: default_related_targets(),
            urgency_keywords: default_urgency_keywords(),
            heuristics: default_heuristics(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionConfig {
    /// The single node information relevance is optimized against.
    #[serde(default = "default_priority_target")]
    pub priority_target: String,
    #[serde(default = "default_blocked_categories")]
    pub blocked_categories: Vec<String>,
    #[serde(default = "default_top_n")]
    pub top_n_relevance_filter: usize,
    #[serde(default = "default_true")]
    pub auto_decide_enabled: bool,
    /// Decisions with importance at or below this are resolved automatically.
    #[serde(default = "default_auto_decide_threshold")]
    pub auto_decide_threshold: f64,
    #[serde(default)]
    pub rules: DecisionRules,
}

fn default_priority_target() -> String {
    "cash".to_string()
}

fn default_blocked_categories() -> Vec<String> {
    strings(&["celebrity", "gossip", "horoscope"])
}

fn default_top_n() -> usize {
    5
}

fn default_auto_decide_threshold() -> f64 {
    0.3
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            priority_target: default_priority_target(),
            blocked_categories: default_blocked_categories(),
            top_n_relevance_filter: default_top_n(),
            auto_decide_enabled: true,
            auto_decide_threshold: default_auto_decide_threshold(),
            rules: DecisionRules::default(),
        }
    }
}

// ── Social ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyTemplate {
    pub id: String,
    /// Regex matched against the message content.
    pub trigger: String,
    pub response: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclineCondition {
    LowEnergy,
    DeadlinePressure,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeclineReason {
    pub id: String,
    pub condition: DeclineCondition,
    pub message: String,
    #[serde(default)]
    pub auto_apply: bool,
}

/// Keyword buckets used to derive message intent, checked in field order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentKeywords {
    #[serde(default = "default_urgent_keywords")]
    pub urgent: Vec<String>,
    #[serde(default = "default_request_keywords")]
    pub request: Vec<String>,
    #[serde(default = "default_social_keywords")]
    pub social: Vec<String>,
    #[serde(default = "default_info_keywords")]
    pub info: Vec<String>,
}

fn default_urgent_keywords() -> Vec<String> {
    strings(&["urgent", "asap", "emergency", "immediately", "critical"])
}

fn default_request_keywords() -> Vec<String> {
    strings(&["can you", "could you", "would you", "please", "request"])
}

fn default_social_keywords() -> Vec<String> {
    strings(&["lunch", "coffee", "drinks", "dinner", "party", "catch up"])
}

fn default_info_keywords() -> Vec<String> {
    strings(&["fyi", "update", "newsletter", "announcement", "heads up"])
}

impl Default for IntentKeywords {
    fn default() -> Self {
        Self {
            urgent: default_urgent_keywords(),
            request: default_request_keywords(),
            social: default_social_keywords(),
            info: default_info_keywords(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialConfig {
    /// Senders that always get a personal response.
    #[serde(default)]
    pub vip_contacts: Vec<String>,
    /// Requesters whose meetings are never auto-declined.
    #[serde(default)]
    pub priority_contacts: Vec<String>,
    #[serde(default = "default_low_priority_patterns")]
    pub low_priority_patterns: Vec<String>,
    #[serde(default = "default_min_energy_for_social")]
    pub min_energy_for_social: f64,
    #[serde(default = "default_true")]
    pub auto_reply_enabled: bool,
    #[serde(default = "default_true")]
    pub auto_decline_enabled: bool,
    #[serde(default)]
    pub mirror_personality: bool,
    #[serde(default = "default_reply_templates")]
    pub reply_templates: Vec<ReplyTemplate>,
    #[serde(default = "default_decline_reasons")]
    pub decline_reasons: Vec<DeclineReason>,
    #[serde(default)]
    pub intent_keywords: IntentKeywords,
}

fn default_low_priority_patterns() -> Vec<String> {
    strings(&["noreply", "no-reply", "newsletter", "unsubscribe", "promotion"])
}

fn default_min_energy_for_social() -> f64 {
    0.4
}

fn default_reply_templates() -> Vec<ReplyTemplate> {
    vec![
        ReplyTemplate {
            id: "meeting_ack".to_string(),
            trigger: r"(?i)\b(meet|meeting|call|sync)\b".to_string(),
            response: "Thanks for reaching out. I'm heads-down right now and will get back to you about timing soon."
                .to_string(),
        },
        ReplyTemplate {
            id: "social_invite".to_string(),
            trigger: r"(?i)\b(coffee|lunch|drinks|dinner)\b".to_string(),
            response: "Thanks for the invite! This week is packed, let's find a slot later on."
                .to_string(),
        },
        ReplyTemplate {
            id: "thanks".to_string(),
            trigger: r"(?i)\b(thanks|thank you|appreciate)\b".to_string(),
            response: "You're welcome, glad it helped.".to_string(),
        },
        ReplyTemplate {
            id: "info_ack".to_string(),
            trigger: r"(?i)\b(fyi|update|heads up)\b".to_string(),
            response: "Thanks for the update, noted.".to_string(),
        },
    ]
}

fn default_decline_reasons() -> Vec<DeclineReason> {
    vec![
        DeclineReason {
            id: "low_energy".to_string(),
            condition: DeclineCondition::LowEnergy,
            message: "I'm protecting my focus time today and can't make this one.".to_string(),
            auto_apply: true,
        },
        DeclineReason {
            id: "deadline".to_string(),
            condition: DeclineCondition::DeadlinePressure,
            message: "I'm on a tight deadline right now. Could we revisit after it ships?"
                .to_string(),
            auto_apply: false,
        },
    ]
}

impl Default for SocialConfig {
    fn default() -> Self {
        Self {
            vip_contacts: Vec::new(),
            priority_contacts: Vec::new(),
            low_priority_patterns: default_low_priority_patterns(),
            min_energy_for_social: default_min_energy_for_social(),
            auto_reply_enabled: true,
            auto_decline_enabled: true,
            mirror_personality: false,
            reply_templates: default_reply_templates(),
            decline_reasons: default_decline_reasons(),
            intent_keywords: IntentKeywords::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Formal,
    #[default]
    Casual,
    Minimal,
}

/// How replies should sound when personality mirroring is on.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalityProfile {
    #[serde(default)]
    pub tone: Tone,
    #[serde(default)]
    pub signature: Option<String>,
}

// ── Top level ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub permission_level: PermissionLevel,
    #[serde(default)]
    pub financial: FinancialConfig,
    #[serde(default)]
    pub decision: DecisionConfig,
    #[serde(default)]
    pub social: SocialConfig,
    #[serde(default)]
    pub personality: Option<PersonalityProfile>,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        Ok(config)
    }

    pub fn load_or_default(paths: &Paths) -> Result<Self> {
        let config_path = paths.config_file();
        if config_path.exists() {
            Self::load(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_fills_defaults() {
        let raw = r#"{
  "permissionLevel": "autonomous",
  "financial": { "budgetLimits": { "food": 400 } },
  "social": { "vipContacts": ["mom"], "intentKeywords": { "urgent": ["sos"] } }
}"#;
        let cfg: Config = serde_json::from_str(raw).unwrap();
        assert_eq!(cfg.permission_level, PermissionLevel::Autonomous);
        assert!(cfg.financial.auto_pay_bills);
        assert_eq!(cfg.financial.bill_payment_buffer_days, 3);
        assert_eq!(cfg.financial.budget_limits.get("food"), Some(&400.0));
        assert_eq!(cfg.decision.priority_target, "cash");
        assert_eq!(cfg.decision.top_n_relevance_filter, 5);
        assert!(cfg.decision.rules.priority_keywords.contains_key("cash"));
        assert_eq!(cfg.social.vip_contacts, vec!["mom".to_string()]);
        assert_eq!(cfg.social.min_energy_for_social, 0.4);
        assert!(!cfg.social.reply_templates.is_empty());
        assert_eq!(cfg.social.intent_keywords.urgent, vec!["sos".to_string()]);
        assert!(cfg.social.intent_keywords.request.contains(&"please".to_string()));
        assert!(cfg.social.intent_keywords.info.contains(&"fyi".to_string()));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut cfg = Config::default();
        cfg.permission_level = PermissionLevel::Execute;
        cfg.personality = Some(PersonalityProfile {
            tone: Tone::Formal,
            signature: Some("A.".to_string()),
        });
        cfg.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.permission_level, PermissionLevel::Execute);
        assert_eq!(loaded.personality.map(|p| p.tone), Some(Tone::Formal));
    }

    #[test]
    fn test_malformed_config_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        match Config::load(&path) {
            Err(Error::Config(msg)) => assert!(msg.contains("config.json")),
            other => panic!("expected config error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_load_or_default_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let paths = Paths::with_base(dir.path().to_path_buf());
        let cfg = Config::load_or_default(&paths).unwrap();
        assert_eq!(cfg.permission_level, PermissionLevel::Suggest);
    }
}
