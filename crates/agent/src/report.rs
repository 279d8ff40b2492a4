use chrono::NaiveDate;
use tracing::debug;
use unburden_core::{
    signal, ActionKind, AgentAction, AgentType, DailyAgentReport, EnergySaved, EnergySavedSummary,
    EnergyState, EnergyType, FreedomMetrics, LeapfrogIndex, Signals, Trend,
};

use crate::energy::{HIGH_BURN_RATE, LOW_ENERGY_THRESHOLD};
use crate::render::format_minutes;

/// Reports considered by [`ReportGenerator::calculate_freedom_metrics`].
pub const METRICS_WINDOW: usize = 7;

const FULL_DAY_MINUTES: f64 = 1440.0;
const TIME_SCORE_MINUTES: f64 = 240.0;
const ENERGY_SCORE_CAP: f64 = 0.25;
const TARGET_EFFICIENCY: f64 = 1.5;
const DAILY_EFFICIENCY_GROWTH: f64 = 0.01;
const TREND_HYSTERESIS: f64 = 5.0;
const PENDING_BACKLOG: u32 = 3;

/// Everything a daily report is computed from.
pub struct ReportInput<'a> {
    pub date: NaiveDate,
    pub financial: &'a [AgentAction],
    pub decision: &'a [AgentAction],
    pub social: &'a [AgentAction],
    pub energy_saved: &'a [EnergySaved],
    pub energy_state: &'a EnergyState,
    pub signals: &'a Signals,
    pub total_decisions_today: u32,
    pub deleted_worries: &'a [Vec<String>],
}

pub struct ReportGenerator;

impl ReportGenerator {
    pub fn generate(input: &ReportInput<'_>) -> DailyAgentReport {
        let actions: Vec<AgentAction> = input
            .financial
            .iter()
            .chain(input.decision)
            .chain(input.social)
            .cloned()
            .collect();

        let total = actions.len() as u32;
        let executed = actions.iter().filter(|a| a.is_executed()).count() as u32;
        let pending = actions.iter().filter(|a| a.is_pending()).count() as u32;
        let success_rate = if total == 0 {
            0.0
        } else {
            executed as f64 / total as f64
        };

        let time_saved: f64 = actions.iter().map(|a| a.time_saved_minutes()).sum();
        let energy_saved = summarize_energy(input.energy_saved);

        let automated: u32 = input
            .decision
            .iter()
            .filter(|a| a.action_type == ActionKind::AutoDecision)
            .filter_map(|a| a.decision())
            .map(|d| d.decisions_automated)
            .sum();
        let pure = input.total_decisions_today.saturating_sub(automated);
        let pure_ratio = if input.total_decisions_today == 0 {
            0.5
        } else {
            pure as f64 / input.total_decisions_today as f64
        };

        let freedom_score = freedom_score(time_saved, energy_saved.total, pure_ratio);
        let leapfrog_index = leapfrog(time_saved, energy_saved.total);
        let deleted_worries: Vec<String> =
            input.deleted_worries.iter().flatten().cloned().collect();

        let mut insights = Vec::new();
        let mut recommendations = Vec::new();
        if time_saved > 0.0 {
            insights.push(format!("Saved {} of your time today", format_minutes(time_saved)));
        }
        if energy_saved.total > 0.1 {
            insights.push(format!(
                "Preserved {:.0}% of your energy",
                energy_saved.total * 100.0
            ));
        }
        if !deleted_worries.is_empty() {
            insights.push(format!(
                "Deleted {} worr{} from your mind",
                deleted_worries.len(),
                if deleted_worries.len() == 1 { "y" } else { "ies" }
            ));
        }
        let net = input.energy_state.net_available;
        if net >= 0.7 {
            insights.push("Energy is high, a good window for deep work".to_string());
        } else if net < LOW_ENERGY_THRESHOLD {
            recommendations
                .push("Energy is low: rest before taking on new commitments".to_string());
        }
        if input.energy_state.burn_rate > HIGH_BURN_RATE {
            recommendations
                .push("Burn rate is high: delegate or postpone non-essential work".to_string());
        }
        if pending > PENDING_BACKLOG {
            recommendations.push(format!(
                "{} actions await approval; consider raising the permission level",
                pending
            ));
        }

        debug!(
            date = %input.date,
            total,
            executed,
            freedom_score,
            "Daily report generated"
        );

        DailyAgentReport {
            date: input.date,
            financial_actions: input.financial.len() as u32,
            decision_actions: input.decision.len() as u32,
            social_actions: input.social.len() as u32,
            total_actions: total,
            executed_actions: executed,
            pending_actions: pending,
            success_rate,
            time_saved_minutes: time_saved,
            energy_saved,
            deleted_worries,
            freedom_score,
            pure_will_decisions: pure,
            automated_decisions: automated,
            leapfrog_index,
            actions,
            insights,
            recommendations,
        }
    }

    /// Longitudinal metrics over the most recent reports (oldest first).
    pub fn calculate_freedom_metrics(
        history: &[DailyAgentReport],
        signals: &Signals,
    ) -> FreedomMetrics {
        let start = history.len().saturating_sub(METRICS_WINDOW);
        let window = &history[start..];
        if window.is_empty() {
            return FreedomMetrics {
                overall_score: 0.0,
                time_freedom: 0.0,
                energy_freedom: 0.0,
                decision_freedom: 0.0,
                financial_freedom: 0.0,
                trend: Trend::Stable,
                window_size: 0,
            };
        }

        let overall_score = mean(window.iter().map(|r| r.freedom_score as f64));
        let mean_minutes = mean(window.iter().map(|r| r.time_saved_minutes));
        let mean_energy = mean(window.iter().map(|r| r.energy_saved.total));
        let time_freedom = (mean_minutes / TIME_SCORE_MINUTES * 100.0).min(100.0);
        let energy_freedom = (mean_energy / ENERGY_SCORE_CAP * 100.0).min(100.0);
        let decision_freedom = mean(window.iter().map(|r| {
            let total = r.pure_will_decisions + r.automated_decisions;
            if total == 0 {
                50.0
            } else {
                r.pure_will_decisions as f64 / total as f64 * 100.0
            }
        }));
        let financial_freedom =
            ((1.0 - signals.get(signal::CASH_PRESSURE)) * 100.0).clamp(0.0, 100.0);

        FreedomMetrics {
            overall_score,
            time_freedom,
            energy_freedom,
            decision_freedom,
            financial_freedom,
            trend: trend(window),
            window_size: window.len(),
        }
    }
}

pub fn freedom_score(time_saved_minutes: f64, energy_saved: f64, pure_ratio: f64) -> u32 {
    let time = (time_saved_minutes.max(0.0) / TIME_SCORE_MINUTES * 25.0).min(25.0);
    let energy = (energy_saved.max(0.0) * 100.0).min(25.0);
    let will = 25.0 * pure_ratio.clamp(0.0, 1.0);
    let score = (25.0 + time + energy + will).round();
    if score.is_nan() {
        return 25;
    }
    score.clamp(25.0, 100.0) as u32
}

pub fn leapfrog(time_saved_minutes: f64, energy_saved: f64) -> LeapfrogIndex {
    let current = 1.0 + time_saved_minutes / FULL_DAY_MINUTES + energy_saved;
    let gap = TARGET_EFFICIENCY - current;
    let days_to_target = if gap > 0.0 {
        (gap / DAILY_EFFICIENCY_GROWTH).ceil() as u32
    } else {
        0
    };
    LeapfrogIndex {
        current_efficiency: current,
        target_efficiency: TARGET_EFFICIENCY,
        days_to_target,
        percentile_rank: ((current * 50.0).round() as u32).min(99),
    }
}

fn summarize_energy(entries: &[EnergySaved]) -> EnergySavedSummary {
    let mut summary = EnergySavedSummary::default();
    for entry in entries {
        match entry.energy_type {
            EnergyType::Cognitive => summary.cognitive += entry.amount,
            EnergyType::Physical => summary.physical += entry.amount,
            EnergyType::Emotional => summary.emotional += entry.amount,
        }
        match entry.agent_type {
            AgentType::Financial => summary.by_financial += entry.amount,
            AgentType::Decision => summary.by_decision += entry.amount,
            AgentType::Social => summary.by_social += entry.amount,
        }
    }
    summary.total = summary.cognitive + summary.physical + summary.emotional;
    summary
}

fn trend(window: &[DailyAgentReport]) -> Trend {
    if window.len() < 2 {
        return Trend::Stable;
    }
    let (first, second) = window.split_at(window.len() / 2);
    let delta = mean(second.iter().map(|r| r.freedom_score as f64))
        - mean(first.iter().map(|r| r.freedom_score as f64));
    if delta > TREND_HYSTERESIS {
        Trend::Increasing
    } else if delta < -TREND_HYSTERESIS {
        Trend::Decreasing
    } else {
        Trend::Stable
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}
