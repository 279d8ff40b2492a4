use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use unburden_core::{
    ActionIdGen, ActionKind, AgentAction, Clock, Config, CycleInput, DailyAgentReport, DrainSource,
    EnergySaved, EnergyState, EnergyType, FreedomMetrics, Result, Signals, SystemClock,
};

use crate::decision::{AutoDecisionResult, DecisionFilter, DecisionRecord, ScoredItem};
use crate::energy::{EnergyAnalysis, EnergyTracker};
use crate::financial::FinancialAgent;
use crate::render;
use crate::report::{ReportGenerator, ReportInput};
use crate::social::SocialBuffer;

pub const MAX_REPORTS: usize = 30;
pub const MAX_DECISION_HISTORY: usize = 100;
pub const MAX_ENERGY_SAVED_LOG: usize = 500;

/// Lifetime counters across all cycles.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunningTotals {
    pub cycles: u64,
    pub actions: u64,
    pub executed_actions: u64,
    pub minutes_saved: f64,
    pub energy_saved: f64,
}

/// Everything that survives between cycles. Owned by the caller and
/// borrowed mutably for the duration of one cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentServiceState {
    pub energy_state: EnergyState,
    pub energy_saved: VecDeque<EnergySaved>,
    pub config: Config,
    pub reports: VecDeque<DailyAgentReport>,
    pub decision_history: VecDeque<DecisionRecord>,
    pub totals: RunningTotals,
}

impl AgentServiceState {
    pub fn new(config: Config, now: DateTime<Utc>) -> Self {
        Self {
            energy_state: EnergyState::initial(now),
            energy_saved: VecDeque::new(),
            config,
            reports: VecDeque::new(),
            decision_history: VecDeque::new(),
            totals: RunningTotals::default(),
        }
    }

    pub fn latest_report(&self) -> Option<&DailyAgentReport> {
        self.reports.back()
    }
}

/// What one cycle produced besides the state changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleOutcome {
    pub report: DailyAgentReport,
    pub drains: Vec<DrainSource>,
    pub energy: EnergyAnalysis,
    /// Information items worth the user's attention, most relevant first.
    pub relevant_information: Vec<ScoredItem>,
    pub decision_results: Vec<AutoDecisionResult>,
}

/// Sequences the energy tracker and the three agents over one input snapshot.
pub struct AgentService<C: Clock = SystemClock> {
    clock: C,
}

impl Default for AgentService<SystemClock> {
    fn default() -> Self {
        Self::new(SystemClock)
    }
}

impl<C: Clock> AgentService<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }

    /// Run one cycle: detect, financial, decisions, social, energy update,
    /// report, commit. The state is left untouched when an error is returned.
    pub fn run_cycle(
        &self,
        state: &mut AgentServiceState,
        input: &CycleInput,
    ) -> Result<CycleOutcome> {
        let now = self.clock.now();
        let mut ids = ActionIdGen::for_cycle(now, state.totals.cycles + 1);
        let config = &state.config;
        let permission = config.permission_level;
        let social_buffer = SocialBuffer::new(config.social.clone())?;

        let drains = EnergyTracker::detect(
            &input.signals,
            input.decisions.len() as u32,
            (input.messages.len() + input.meeting_requests.len()) as u32,
        );

        let financial = FinancialAgent::run(
            &input.signals,
            &input.bills,
            &input.expenses,
            &config.financial,
            permission,
            now,
            &mut ids,
        );

        let filtered = DecisionFilter::filter_information(
            &input.information,
            &config.decision,
            &input.signals,
            permission,
            now,
            &mut ids,
        );
        let history: Vec<DecisionRecord> = state.decision_history.iter().cloned().collect();
        let batch = DecisionFilter::batch_decisions(
            &input.decisions,
            &config.decision,
            &history,
            permission,
            now,
            &mut ids,
        );
        let mut decision = filtered.actions;
        decision.extend(batch.actions);

        let social = social_buffer.run(
            &input.signals,
            &state.energy_state,
            &input.messages,
            &input.meeting_requests,
            permission,
            config.personality.as_ref(),
            now,
            &mut ids,
        );

        let saved: Vec<EnergySaved> = financial
            .iter()
            .chain(&decision)
            .chain(&social.actions)
            .filter_map(|a| energy_saved_entry(a, now))
            .collect();

        let energy_state =
            EnergyTracker::update(&state.energy_state, &drains, &saved, input.is_resting, now);
        let energy = EnergyTracker::analyze(&energy_state, &drains);

        let settled_bills: Vec<String> = financial
            .iter()
            .filter(|a| a.is_executed() && a.action_type == ActionKind::BillPayment)
            .map(|a| a.description.clone())
            .collect();
        let deleted_worries = [settled_bills, social.deleted_guilt_notes];

        let report = ReportGenerator::generate(&ReportInput {
            date: now.date_naive(),
            financial: &financial,
            decision: &decision,
            social: &social.actions,
            energy_saved: &saved,
            energy_state: &energy_state,
            signals: &input.signals,
            total_decisions_today: input.total_decisions_today(),
            deleted_worries: &deleted_worries,
        });

        // Commit.
        state.energy_state = energy_state;
        push_capped(&mut state.energy_saved, saved, MAX_ENERGY_SAVED_LOG);
        push_capped(&mut state.decision_history, batch.records, MAX_DECISION_HISTORY);
        push_capped(&mut state.reports, [report.clone()], MAX_REPORTS);
        state.totals.cycles += 1;
        state.totals.actions += report.total_actions as u64;
        state.totals.executed_actions += report.executed_actions as u64;
        state.totals.minutes_saved += report.time_saved_minutes;
        state.totals.energy_saved += report.energy_saved.total;

        info!(
            cycle = state.totals.cycles,
            actions = report.total_actions,
            executed = report.executed_actions,
            net_energy = state.energy_state.net_available,
            freedom_score = report.freedom_score,
            "Cycle complete"
        );

        Ok(CycleOutcome {
            report,
            drains,
            energy,
            relevant_information: filtered.passed,
            decision_results: batch.results,
        })
    }

    pub fn freedom_metrics(state: &AgentServiceState, signals: &Signals) -> FreedomMetrics {
        let history: Vec<DailyAgentReport> = state.reports.iter().cloned().collect();
        ReportGenerator::calculate_freedom_metrics(&history, signals)
    }

    pub fn render_latest(state: &AgentServiceState) -> Option<String> {
        state.latest_report().map(render::render)
    }
}

/// Which axis an executed action gives energy back to.
fn credited_axis(kind: ActionKind) -> EnergyType {
    match kind {
        ActionKind::InformationFilter | ActionKind::AutoDecision => EnergyType::Cognitive,
        ActionKind::EnergyProtection => EnergyType::Physical,
        ActionKind::BillPayment
        | ActionKind::BudgetAlert
        | ActionKind::AutoReply
        | ActionKind::SpamFilter
        | ActionKind::DeclineRequest
        | ActionKind::ScheduleMeeting => EnergyType::Emotional,
    }
}

fn energy_saved_entry(action: &AgentAction, now: DateTime<Utc>) -> Option<EnergySaved> {
    let amount = action.energy_saved();
    if !action.is_executed() || amount.is_nan() || amount <= 0.0 {
        return None;
    }
    Some(EnergySaved {
        id: format!("es_{}", action.id),
        agent_type: action.agent_type(),
        action_id: action.id.clone(),
        energy_type: credited_axis(action.action_type),
        amount,
        description: action.description.clone(),
        timestamp: now,
    })
}

fn push_capped<T>(buf: &mut VecDeque<T>, items: impl IntoIterator<Item = T>, cap: usize) {
    for item in items {
        if buf.len() == cap {
            buf.pop_front();
        }
        buf.push_back(item);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate, TimeZone};
    use unburden_core::{
        signal, ActionStatus, Bill, Decision, DecisionCategory, FixedClock, MeetingRequest,
        PermissionLevel,
    };

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 1, 9, 0, 0).unwrap()
    }

    fn service() -> AgentService<FixedClock> {
        AgentService::new(FixedClock::new(start()))
    }

    fn low_decision(i: usize) -> Decision {
        Decision {
            id: format!("d{}", i),
            question: format!("Pick snack number {}", i),
            options: vec!["Chips".to_string(), "Fruit".to_string()],
            category: DecisionCategory::Food,
            importance: 0.1,
            deadline: None,
        }
    }

    #[test]
    fn test_cycle_produces_report_and_commits() {
        let svc = service();
        let mut config = Config::default();
        config.permission_level = PermissionLevel::Autonomous;
        let mut state = AgentServiceState::new(config, start());

        let input = CycleInput {
            signals: Signals::new()
                .with(signal::AVAILABLE_CASH, 100_000.0)
                .with(signal::WORKLOAD_PRESSURE, 0.9),
            bills: vec![Bill {
                id: "rent".to_string(),
                name: "Rent".to_string(),
                amount: 50_000.0,
                due_date: NaiveDate::from_ymd_opt(2026, 6, 3).unwrap(),
                category: "housing".to_string(),
                account: None,
                auto_pay: true,
                is_paid: false,
            }],
            decisions: vec![low_decision(1)],
            ..Default::default()
        };

        let outcome = svc.run_cycle(&mut state, &input).unwrap();
        let report = &outcome.report;
        assert_eq!(report.date, start().date_naive());
        assert_eq!(report.financial_actions, 1);
        assert_eq!(report.decision_actions, 1);
        assert_eq!(report.automated_decisions, 1);
        assert_eq!(report.pure_will_decisions, 0);
        assert!(report.actions.iter().all(|a| a.status == ActionStatus::Executed));
        assert_eq!(report.deleted_worries.len(), 1);
        assert_eq!(outcome.drains.len(), 1);
        assert_eq!(outcome.decision_results[0].selected_option, "Fruit");

        assert_eq!(state.reports.len(), 1);
        assert_eq!(state.decision_history.len(), 1);
        assert_eq!(state.energy_saved.len(), 2);
        assert_eq!(state.totals.cycles, 1);
        assert_eq!(state.totals.executed_actions, 2);

        let millis = start().timestamp_millis().to_string();
        assert!(report.actions.iter().all(|a| a.id.contains(&millis)));
        assert!(AgentService::<FixedClock>::render_latest(&state).is_some());
    }

    #[test]
    fn test_history_buffers_are_bounded() {
        let svc = service();
        let mut config = Config::default();
        config.permission_level = PermissionLevel::Execute;
        let mut state = AgentServiceState::new(config, start());

        let input = CycleInput {
            decisions: (0..4).map(low_decision).collect(),
            ..Default::default()
        };
        for _ in 0..31 {
            svc.clock.advance(Duration::hours(1));
            svc.run_cycle(&mut state, &input).unwrap();
        }

        assert_eq!(state.reports.len(), MAX_REPORTS);
        assert_eq!(state.decision_history.len(), MAX_DECISION_HISTORY);
        assert_eq!(state.totals.cycles, 31);
        let e = &state.energy_state;
        assert!(e.daily_peak >= e.net_available && e.net_available >= e.daily_low);
    }

    #[test]
    fn test_low_energy_cycle_declines_and_protects() {
        let svc = service();
        let mut state = AgentServiceState::new(Config::default(), start());
        state.energy_state.cognitive = 0.2;
        state.energy_state.physical = 0.2;
        state.energy_state.emotional = 0.2;
        state.energy_state.net_available = 0.2;

        let input = CycleInput {
            meeting_requests: vec![MeetingRequest {
                id: "m1".to_string(),
                requester: "vendor".to_string(),
                title: "Demo".to_string(),
                duration_minutes: 45,
                proposed_time: None,
                is_required: false,
            }],
            ..Default::default()
        };
        let outcome = svc.run_cycle(&mut state, &input).unwrap();
        let kinds: Vec<ActionKind> = outcome.report.actions.iter().map(|a| a.action_type).collect();
        assert_eq!(kinds, vec![ActionKind::DeclineRequest, ActionKind::EnergyProtection]);
        assert!(outcome.report.actions[0].is_executed());
        assert!(outcome.report.actions[1].is_pending());
    }

    #[test]
    fn test_invalid_template_leaves_state_untouched() {
        let svc = service();
        let mut config = Config::default();
        config.social.reply_templates[0].trigger = "[".to_string();
        let mut state = AgentServiceState::new(config, start());
        assert!(svc.run_cycle(&mut state, &CycleInput::default()).is_err());
        assert!(state.reports.is_empty());
        assert_eq!(state.totals.cycles, 0);
    }

    #[test]
    fn test_freedom_metrics_from_state() {
        let svc = service();
        let mut state = AgentServiceState::new(Config::default(), start());
        let signals = Signals::new();
        assert_eq!(AgentService::<FixedClock>::freedom_metrics(&state, &signals).window_size, 0);
        for _ in 0..3 {
            svc.run_cycle(&mut state, &CycleInput::default()).unwrap();
        }
        let metrics = AgentService::<FixedClock>::freedom_metrics(&state, &signals);
        assert_eq!(metrics.window_size, 3);
        assert_eq!(metrics.financial_freedom, 100.0);
    }

    #[test]
    fn test_state_survives_json_round_trip() {
        let svc = service();
        let mut state = AgentServiceState::new(Config::default(), start());
        let input = CycleInput {
            decisions: vec![low_decision(1)],
            ..Default::default()
        };
        svc.run_cycle(&mut state, &input).unwrap();

        let json = serde_json::to_string(&state).unwrap();
        let back: AgentServiceState = serde_json::from_str(&json).unwrap();
        assert_eq!(back.reports.len(), 1);
        assert_eq!(back.decision_history.len(), 1);
        assert_eq!(back.totals, state.totals);
        assert_eq!(back.latest_report().map(|r| r.date), Some(start().date_naive()));
    }

    #[test]
    fn test_cycles_at_same_instant_get_distinct_ids() {
        let svc = service();
        let mut config = Config::default();
        config.permission_level = PermissionLevel::Execute;
        let mut state = AgentServiceState::new(config, start());
        let input = CycleInput {
            decisions: vec![low_decision(1)],
            ..Default::default()
        };

        let first = svc.run_cycle(&mut state, &input).unwrap();
        let second = svc.run_cycle(&mut state, &input).unwrap();
        assert_ne!(first.report.actions[0].id, second.report.actions[0].id);

        let saved: Vec<&str> = state.energy_saved.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(saved.len(), 2);
        assert_ne!(saved[0], saved[1]);
    }
}
