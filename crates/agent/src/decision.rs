use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info};
use unburden_core::{
    ActionDetails, ActionIdGen, ActionKind, ActionStatus, AgentAction, Decision, DecisionCategory,
    DecisionConfig, DecisionDetails, InformationItem, PermissionLevel, Signals,
};

static TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[a-z0-9]+").expect("token regex is valid"));

const RELEVANCE_FLOOR: f64 = 0.3;
const PRESSURE_BOOST_LEVEL: f64 = 0.6;
const DUPLICATE_SIMILARITY: f64 = 0.7;
const MINUTES_PER_DECISION: f64 = 3.0;
const ENERGY_PER_DECISION: f64 = 0.01;
const MINUTES_PER_FILTERED_ITEM: f64 = 0.5;
const ENERGY_PER_FILTERED_ITEM: f64 = 0.005;

/// An information item with its scores and, if dropped, the reason.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredItem {
    pub item: InformationItem,
    pub relevance: f64,
    pub importance: f64,
    pub action_required: bool,
    #[serde(default)]
    pub filter_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOutcome {
    /// Most relevant first.
    pub passed: Vec<ScoredItem>,
    pub filtered: Vec<ScoredItem>,
    pub actions: Vec<AgentAction>,
}

/// A past decision, used to answer near-duplicate questions the same way.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionRecord {
    pub decision_id: String,
    pub question: String,
    pub category: DecisionCategory,
    pub selected_option: String,
    pub confidence: f64,
    pub decided_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoDecisionResult {
    pub decision_id: String,
    pub was_automated: bool,
    /// Empty when the decision was left to the user.
    pub selected_option: String,
    pub reasoning: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchOutcome {
    pub results: Vec<AutoDecisionResult>,
    /// Records for the decisions automated in this batch, oldest first.
    pub records: Vec<DecisionRecord>,
    pub actions: Vec<AgentAction>,
}

impl BatchOutcome {
    pub fn automated_count(&self) -> usize {
        self.results.iter().filter(|r| r.was_automated).count()
    }
}

/// Relevance filtering against one priority target, plus auto-resolution
/// of low-importance decisions.
pub struct DecisionFilter;

impl DecisionFilter {
    pub fn filter_information(
        items: &[InformationItem],
        config: &DecisionConfig,
        signals: &Signals,
        permission: PermissionLevel,
        now: DateTime<Utc>,
        ids: &mut ActionIdGen,
    ) -> FilterOutcome {
        let mut survivors = Vec::new();
        let mut filtered = Vec::new();

        for item in items {
            if let Some(blocked) = blocked_category(item, config) {
                filtered.push(ScoredItem {
                    item: item.clone(),
                    relevance: 0.0,
                    importance: 0.0,
                    action_required: false,
                    filter_reason: Some(format!("blocked category: {}", blocked)),
                });
                continue;
            }

            let scored = Self::score(item, config, signals);
            if scored.relevance < RELEVANCE_FLOOR && !scored.action_required {
                filtered.push(ScoredItem {
                    filter_reason: Some("irrelevant to priority".to_string()),
                    ..scored
                });
            } else {
                survivors.push(scored);
            }
        }

        survivors.sort_by(|a, b| b.relevance.total_cmp(&a.relevance));
        if survivors.len() > config.top_n_relevance_filter {
            let overflow = survivors.split_off(config.top_n_relevance_filter);
            let reason = format!("outside top {}", config.top_n_relevance_filter);
            filtered.extend(overflow.into_iter().map(|s| ScoredItem {
                filter_reason: Some(reason.clone()),
                ..s
            }));
        }

        let mut actions = Vec::new();
        if !filtered.is_empty() {
            let count = filtered.len();
            let status = if permission == PermissionLevel::Observe {
                ActionStatus::Pending
            } else {
                ActionStatus::Executed
            };
            actions.push(
                AgentAction::new(
                    ids.next("dec"),
                    now,
                    ActionKind::InformationFilter,
                    format!(
                        "Filtered {} of {} items not relevant to {}",
                        count,
                        items.len(),
                        config.priority_target
                    ),
                    ActionDetails::Decision(DecisionDetails {
                        category: Some(config.priority_target.clone()),
                        selected_option: None,
                        filtered_count: count as u32,
                        decisions_automated: 0,
                    }),
                )
                .with_status(status)
                .with_targets(filtered.iter().map(|s| s.item.id.clone()))
                .with_savings(
                    MINUTES_PER_FILTERED_ITEM * count as f64,
                    ENERGY_PER_FILTERED_ITEM * count as f64,
                )
                .with_reasoning(
                    format!(
                        "Kept the top {} items for {}",
                        survivors.len(),
                        config.priority_target
                    ),
                    0.8,
                ),
            );
        }

        info!(
            passed = survivors.len(),
            filtered = filtered.len(),
            target = %config.priority_target,
            "Information filtered"
        );

        FilterOutcome {
            passed: survivors,
            filtered,
            actions,
        }
    }

    /// Relevance and importance of a single (non-blocked) item.
    pub fn score(item: &InformationItem, config: &DecisionConfig, signals: &Signals) -> ScoredItem {
        let text = format!("{} {} {}", item.source, item.title, item.content).to_lowercase();
        let rules = &config.rules;
        let target = config.priority_target.as_str();

        let keyword_hits = rules
            .priority_keywords
            .get(target)
            .map(|kws| count_matches(&text, kws))
            .unwrap_or(0);
        let related_hits = rules
            .related_targets
            .get(target)
            .map(|names| count_matches(&text, names))
            .unwrap_or(0);
        // Hundredths keep the sums exact.
        let relevance = ((20 * keyword_hits + 15 * related_hits) as f64 / 100.0).min(1.0);

        let urgency_hits = count_matches(&text, &rules.urgency_keywords);
        let pressure_boost = usize::from(signals.pressure_of(target) > PRESSURE_BOOST_LEVEL);
        let importance = ((3 + 2 * urgency_hits + 2 * pressure_boost) as f64 / 10.0).min(1.0);

        let action_required = importance > 0.7 || (relevance > 0.5 && importance > 0.5);

        debug!(
            item = %item.id,
            relevance,
            importance,
            action_required,
            "Scored information item"
        );

        ScoredItem {
            item: item.clone(),
            relevance,
            importance,
            action_required,
            filter_reason: None,
        }
    }

    pub fn auto_decide(
        decision: &Decision,
        config: &DecisionConfig,
        history: &[DecisionRecord],
    ) -> AutoDecisionResult {
        let manual = |reasoning: String| AutoDecisionResult {
            decision_id: decision.id.clone(),
            was_automated: false,
            selected_option: String::new(),
            reasoning,
            confidence: 0.0,
        };

        if !config.auto_decide_enabled {
            return manual("Auto-decide is disabled".to_string());
        }
        if decision.importance > config.auto_decide_threshold {
            return manual(format!(
                "Importance {:.2} exceeds the auto-decide threshold {:.2}",
                decision.importance, config.auto_decide_threshold
            ));
        }
        if decision.options.is_empty() {
            return manual("No options to choose from".to_string());
        }

        let automated = |option: &str, reasoning: String, confidence: f64| AutoDecisionResult {
            decision_id: decision.id.clone(),
            was_automated: true,
            selected_option: option.to_string(),
            reasoning,
            confidence,
        };

        let question = tokens(&decision.question);
        for prior in history.iter().rev() {
            if jaccard(&question, &tokens(&prior.question)) <= DUPLICATE_SIMILARITY {
                continue;
            }
            if let Some(option) = decision
                .options
                .iter()
                .find(|o| o.eq_ignore_ascii_case(&prior.selected_option))
            {
                return automated(
                    option,
                    format!("Same choice as the similar earlier decision '{}'", prior.question),
                    0.85,
                );
            }
        }

        if let Some(heuristic) = config
            .rules
            .heuristics
            .iter()
            .find(|h| h.category == decision.category)
        {
            let preferred = decision.options.iter().find(|option| {
                let lower = option.to_lowercase();
                heuristic
                    .preferred_keywords
                    .iter()
                    .any(|kw| mentions_word(&lower, kw))
            });
            if let Some(option) = preferred {
                return automated(
                    option,
                    format!(
                        "Applied the {} rule for {}",
                        heuristic.label,
                        decision.category.as_str()
                    ),
                    0.7,
                );
            }
        }

        automated(
            &decision.options[0],
            "No rule applied, picked the first option".to_string(),
            0.5,
        )
    }

    /// Resolve a batch, letting later decisions reuse earlier choices from
    /// the same batch. Emits one aggregate action when anything was automated.
    pub fn batch_decisions(
        decisions: &[Decision],
        config: &DecisionConfig,
        history: &[DecisionRecord],
        permission: PermissionLevel,
        now: DateTime<Utc>,
        ids: &mut ActionIdGen,
    ) -> BatchOutcome {
        let mut working: Vec<DecisionRecord> = history.to_vec();
        let mut outcome = BatchOutcome::default();

        for decision in decisions {
            let result = Self::auto_decide(decision, config, &working);
            if result.was_automated {
                let record = DecisionRecord {
                    decision_id: decision.id.clone(),
                    question: decision.question.clone(),
                    category: decision.category,
                    selected_option: result.selected_option.clone(),
                    confidence: result.confidence,
                    decided_at: now,
                };
                working.push(record.clone());
                outcome.records.push(record);
            }
            outcome.results.push(result);
        }

        let automated = outcome.automated_count();
        if automated > 0 {
            let summary: Vec<String> = outcome
                .results
                .iter()
                .filter(|r| r.was_automated)
                .map(|r| format!("{}: {}", r.decision_id, r.selected_option))
                .collect();
            let mut categories: Vec<&str> = outcome
                .records
                .iter()
                .map(|r| r.category.as_str())
                .collect();
            categories.dedup();
            let category = if categories.len() == 1 {
                categories[0].to_string()
            } else {
                "mixed".to_string()
            };
            let confidence = outcome.records.iter().map(|r| r.confidence).sum::<f64>()
                / automated as f64;

            outcome.actions.push(
                AgentAction::new(
                    ids.next("dec"),
                    now,
                    ActionKind::AutoDecision,
                    format!("Auto-decided {} low-importance decision(s)", automated),
                    ActionDetails::Decision(DecisionDetails {
                        category: Some(category),
                        selected_option: Some(summary.join(", ")),
                        filtered_count: 0,
                        decisions_automated: automated as u32,
                    }),
                )
                .with_status(permission.gate())
                .with_targets(outcome.records.iter().map(|r| r.decision_id.clone()))
                .with_savings(
                    MINUTES_PER_DECISION * automated as f64,
                    ENERGY_PER_DECISION * automated as f64,
                )
                .with_reasoning(
                    format!(
                        "Importance at or below {:.2}; resolved by history and category rules",
                        config.auto_decide_threshold
                    ),
                    confidence,
                ),
            );
        }

        info!(
            decisions = decisions.len(),
            automated,
            "Decision batch processed"
        );
        outcome
    }
}

fn blocked_category<'a>(item: &InformationItem, config: &'a DecisionConfig) -> Option<&'a str> {
    let source = item.source.to_lowercase();
    let title = item.title.to_lowercase();
    config
        .blocked_categories
        .iter()
        .map(String::as_str)
        .find(|c| {
            let c = c.to_lowercase();
            !c.is_empty() && (source.contains(&c) || title.contains(&c))
        })
}

/// Number of distinct entries of `needles` found in `text` (lowercased).
fn count_matches(text: &str, needles: &[String]) -> usize {
    needles
        .iter()
        .filter(|n| !n.is_empty() && text.contains(&n.to_lowercase()))
        .count()
}

/// Whether `keyword` occurs in `text` without being glued to other letters,
/// so "pm" matches "2pm" and "3 pm" but not "equipment".
fn mentions_word(text: &str, keyword: &str) -> bool {
    let keyword = keyword.to_lowercase();
    if keyword.is_empty() {
        return false;
    }
    let open = !keyword.starts_with(char::is_alphabetic);
    let close = !keyword.ends_with(char::is_alphabetic);
    text.match_indices(keyword.as_str()).any(|(start, hit)| {
        let before = text[..start].chars().next_back();
        let after = text[start + hit.len()..].chars().next();
        (open || !before.is_some_and(char::is_alphabetic))
            && (close || !after.is_some_and(char::is_alphabetic))
    })
}

fn tokens(text: &str) -> HashSet<String> {
    let lower = text.to_lowercase();
    TOKEN
        .find_iter(&lower)
        .map(|m| m.as_str().to_string())
        .collect()
}

fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count() as f64;
    let union = a.union(b).count() as f64;
    intersection / union
}
