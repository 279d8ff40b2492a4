use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use unburden_core::energy::blend;
use unburden_core::{signal, DrainSource, DrainType, EnergySaved, EnergyState, EnergyType, Signals};

/// Below this net level the other agents switch to protective behavior.
pub const LOW_ENERGY_THRESHOLD: f64 = 0.3;
/// Burn rate (per hour) above which the report flags overload.
pub const HIGH_BURN_RATE: f64 = 0.15;

const BASE_BURN_RATE: f64 = 0.02;
const COGNITIVE_DECAY: f64 = 0.02;
const PHYSICAL_DECAY: f64 = 0.015;
const EMOTIONAL_DECAY: f64 = 0.01;

const DECISION_COUNT_THRESHOLD: u32 = 10;
const SOCIAL_COUNT_THRESHOLD: u32 = 5;

/// Signal-driven drain rules: (signal, threshold, type, label, base, can_automate).
const SIGNAL_DRAINS: &[(&str, f64, DrainType, &str, f64, bool)] = &[
    (signal::CASH_PRESSURE, 0.6, DrainType::FinancialStress, "cash pressure", 0.05, true),
    (signal::RUNWAY_PRESSURE, 0.5, DrainType::FinancialStress, "runway pressure", 0.04, true),
    (signal::SLEEP_PRESSURE, 0.5, DrainType::SleepDebt, "sleep debt", 0.06, false),
    (signal::WORKLOAD_PRESSURE, 0.7, DrainType::Workload, "workload", 0.05, true),
    (signal::DEADLINE_PRESSURE, 0.6, DrainType::Deadline, "deadline pressure", 0.04, false),
    (signal::DELAY_MAGNITUDE, 0.5, DrainType::Waiting, "waiting on delays", 0.03, true),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnergyStatus {
    Optimal,
    Good,
    Low,
    Critical,
}

impl EnergyStatus {
    pub fn from_level(net: f64) -> Self {
        if net >= 0.7 {
            EnergyStatus::Optimal
        } else if net >= LOW_ENERGY_THRESHOLD {
            EnergyStatus::Good
        } else if net >= 0.15 {
            EnergyStatus::Low
        } else {
            EnergyStatus::Critical
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EnergyStatus::Optimal => "optimal",
            EnergyStatus::Good => "good",
            EnergyStatus::Low => "low",
            EnergyStatus::Critical => "critical",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnergyAnalysis {
    pub status: EnergyStatus,
    pub net_available: f64,
    pub burn_rate: f64,
    /// Heaviest drains first, at most three.
    pub top_drains: Vec<DrainSource>,
    pub automatable_drains: usize,
    pub recommendations: Vec<String>,
}

/// Three-axis energy gauge: drain detection, the single state mutator, and
/// a read-only analysis.
pub struct EnergyTracker;

impl EnergyTracker {
    /// Derive this cycle's drains from the signal snapshot and activity counters.
    pub fn detect(
        signals: &Signals,
        recent_decision_count: u32,
        recent_social_count: u32,
    ) -> Vec<DrainSource> {
        let mut drains = Vec::new();

        for (key, threshold, drain_type, label, base, can_automate) in SIGNAL_DRAINS {
            let reading = signals.get(key);
            if reading > *threshold {
                drains.push(DrainSource {
                    drain_type: *drain_type,
                    source: label.to_string(),
                    signal: Some(key.to_string()),
                    base_amount: *base,
                    multiplier: reading,
                    can_automate: *can_automate,
                });
            }
        }

        if recent_decision_count > DECISION_COUNT_THRESHOLD {
            drains.push(DrainSource {
                drain_type: DrainType::DecisionFatigue,
                source: format!("{} pending decisions", recent_decision_count),
                signal: None,
                base_amount: 0.02,
                multiplier: recent_decision_count as f64 / DECISION_COUNT_THRESHOLD as f64,
                can_automate: true,
            });
        }

        if recent_social_count > SOCIAL_COUNT_THRESHOLD {
            drains.push(DrainSource {
                drain_type: DrainType::SocialInteraction,
                source: format!("{} incoming social requests", recent_social_count),
                signal: None,
                base_amount: 0.02,
                multiplier: recent_social_count as f64 / SOCIAL_COUNT_THRESHOLD as f64,
                can_automate: true,
            });
        }

        debug!(count = drains.len(), "Detected energy drains");
        drains
    }

    /// Advance the gauge to `now`.
    ///
    /// Drains are per-hour rates and are applied for the whole elapsed span;
    /// saved entries are absolute amounts credited once.
    pub fn update(
        current: &EnergyState,
        drains: &[DrainSource],
        saved: &[EnergySaved],
        is_resting: bool,
        now: DateTime<Utc>,
    ) -> EnergyState {
        let elapsed_ms = (now - current.last_updated).num_milliseconds().max(0);
        let hours = elapsed_ms as f64 / 3_600_000.0;

        let mut cognitive = current.cognitive - COGNITIVE_DECAY * hours;
        let mut physical = current.physical - PHYSICAL_DECAY * hours;
        let mut emotional = current.emotional - EMOTIONAL_DECAY * hours;

        for drain in drains {
            let amount = drain.weight() * hours;
            match drain.drain_type.axis() {
                EnergyType::Cognitive => cognitive -= amount,
                EnergyType::Physical => physical -= amount,
                EnergyType::Emotional => emotional -= amount,
            }
        }

        for entry in saved {
            match entry.energy_type {
                EnergyType::Cognitive => cognitive += entry.amount,
                EnergyType::Physical => physical += entry.amount,
                EnergyType::Emotional => emotional += entry.amount,
            }
        }

        if is_resting {
            let recovered = current.recovery_rate * hours;
            cognitive += recovered;
            physical += recovered;
            emotional += recovered;
        }

        let cognitive = clamp_unit(cognitive);
        let physical = clamp_unit(physical);
        let emotional = clamp_unit(emotional);
        let net_available = clamp_unit(blend(cognitive, physical, emotional));

        let burn_rate = BASE_BURN_RATE + drains.iter().map(DrainSource::weight).sum::<f64>();
        let estimated_depletion_minutes = if burn_rate > 0.0 {
            net_available / burn_rate * 60.0
        } else {
            f64::INFINITY
        };

        let last_updated = now.max(current.last_updated);
        let new_day = last_updated.date_naive() != current.last_updated.date_naive();
        let (daily_peak, daily_low) = if new_day {
            (net_available, net_available)
        } else {
            (
                current.daily_peak.max(net_available),
                current.daily_low.min(net_available),
            )
        };

        debug!(
            hours,
            net_available,
            burn_rate,
            drains = drains.len(),
            saved = saved.len(),
            is_resting,
            "Energy state updated"
        );

        EnergyState {
            cognitive,
            physical,
            emotional,
            net_available,
            burn_rate,
            recovery_rate: current.recovery_rate,
            estimated_depletion_minutes,
            optimal_rest_time: rest_label(net_available, estimated_depletion_minutes).to_string(),
            last_updated,
            daily_peak,
            daily_low,
        }
    }

    /// Classify the state and suggest what to do about the heaviest drains.
    pub fn analyze(state: &EnergyState, drains: &[DrainSource]) -> EnergyAnalysis {
        let status = EnergyStatus::from_level(state.net_available);

        let mut ranked: Vec<DrainSource> = drains.to_vec();
        ranked.sort_by(|a, b| b.weight().total_cmp(&a.weight()));
        ranked.truncate(3);

        let mut recommendations = vec![match status {
            EnergyStatus::Optimal => {
                "Energy is optimal: tackle your most demanding work now.".to_string()
            }
            EnergyStatus::Good => {
                "Energy is steady: batch shallow tasks to preserve focus.".to_string()
            }
            EnergyStatus::Low => {
                "Energy is low: schedule a recovery break within 30 minutes.".to_string()
            }
            EnergyStatus::Critical => {
                "Energy is critical: stop non-essential work and rest now.".to_string()
            }
        }];

        for drain in &ranked {
            if drain.can_automate {
                recommendations.push(format!(
                    "Delegate {} to the agents to cut {} drain.",
                    drain.source,
                    drain.drain_type.as_str()
                ));
            } else {
                recommendations.push(format!(
                    "Address {} directly: it cannot be automated.",
                    drain.source
                ));
            }
        }

        if state.burn_rate > HIGH_BURN_RATE {
            recommendations.push(format!(
                "Burn rate is high ({:.2}/h): reduce concurrent commitments.",
                state.burn_rate
            ));
        }

        EnergyAnalysis {
            status,
            net_available: state.net_available,
            burn_rate: state.burn_rate,
            automatable_drains: drains.iter().filter(|d| d.can_automate).count(),
            top_drains: ranked,
            recommendations,
        }
    }
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

fn rest_label(net: f64, depletion_minutes: f64) -> &'static str {
    if net < 0.15 {
        "immediately"
    } else if net < LOW_ENERGY_THRESHOLD {
        "within 30 minutes"
    } else if net < 0.5 {
        "within 2 hours"
    } else if depletion_minutes < 240.0 {
        "within 4 hours"
    } else {
        "this evening"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use proptest::prelude::*;
    use unburden_core::AgentType;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 8, 0, 0).unwrap()
    }

    fn saved(energy_type: EnergyType, amount: f64) -> EnergySaved {
        EnergySaved {
            id: "s1".to_string(),
            agent_type: AgentType::Decision,
            action_id: "a1".to_string(),
            energy_type,
            amount,
            description: "test".to_string(),
            timestamp: t0(),
        }
    }

    #[test]
    fn test_detect_thresholds() {
        let signals = Signals::new()
            .with(signal::CASH_PRESSURE, 0.8)
            .with(signal::RUNWAY_PRESSURE, 0.5)
            .with(signal::SLEEP_PRESSURE, 0.9);
        let drains = EnergyTracker::detect(&signals, 12, 3);

        let types: Vec<DrainType> = drains.iter().map(|d| d.drain_type).collect();
        assert_eq!(
            types,
            vec![DrainType::FinancialStress, DrainType::SleepDebt, DrainType::DecisionFatigue]
        );
        assert!(drains[0].can_automate);
        assert!(!drains[1].can_automate);
        assert_eq!(drains[0].signal.as_deref(), Some(signal::CASH_PRESSURE));
        assert!((drains[2].multiplier - 1.2).abs() < 1e-9);
    }

    #[test]
    fn test_detect_nothing_on_calm_signals() {
        assert!(EnergyTracker::detect(&Signals::new(), 0, 0).is_empty());
    }

    #[test]
    fn test_update_applies_decay_and_drains() {
        let state = EnergyState::initial(t0());
        let drains = vec![DrainSource {
            drain_type: DrainType::Workload,
            source: "workload".to_string(),
            signal: None,
            base_amount: 0.05,
            multiplier: 1.0,
            can_automate: true,
        }];
        let next = EnergyTracker::update(&state, &drains, &[], false, t0() + Duration::hours(2));

        assert!((next.cognitive - (0.8 - 0.04 - 0.1)).abs() < 1e-9);
        assert!((next.physical - (0.8 - 0.03)).abs() < 1e-9);
        assert!((next.emotional - (0.8 - 0.02)).abs() < 1e-9);
        assert!((next.burn_rate - 0.07).abs() < 1e-9);
        let expected_net = 0.5 * next.cognitive + 0.3 * next.physical + 0.2 * next.emotional;
        assert!((next.net_available - expected_net).abs() < 1e-9);
        assert!((next.estimated_depletion_minutes - next.net_available / 0.07 * 60.0).abs() < 1e-6);
        assert_eq!(next.daily_peak, state.daily_peak);
        assert!(next.daily_low <= next.net_available);
    }

    #[test]
    fn test_update_credits_saved_energy_and_rest() {
        let mut state = EnergyState::initial(t0());
        state.cognitive = 0.5;
        let next = EnergyTracker::update(
            &state,
            &[],
            &[saved(EnergyType::Cognitive, 0.1)],
            true,
            t0() + Duration::hours(1),
        );
        // 0.5 - 0.02 decay + 0.1 saved + 0.1 rest
        assert!((next.cognitive - 0.68).abs() < 1e-9);
        assert!((next.physical - 0.885).abs() < 1e-9);
    }

    #[test]
    fn test_update_zero_elapsed_changes_nothing_but_rates() {
        let state = EnergyState::initial(t0());
        let next = EnergyTracker::update(&state, &[], &[], false, t0());
        assert_eq!(next.cognitive, state.cognitive);
        assert_eq!(next.net_available, state.net_available);
        assert!((next.burn_rate - BASE_BURN_RATE).abs() < 1e-12);
    }

    #[test]
    fn test_clock_going_backwards_is_ignored() {
        let state = EnergyState::initial(t0());
        let next = EnergyTracker::update(&state, &[], &[], false, t0() - Duration::hours(5));
        assert_eq!(next.last_updated, t0());
        assert_eq!(next.cognitive, state.cognitive);
    }

    #[test]
    fn test_daily_extremes_reset_on_new_day() {
        let mut state = EnergyState::initial(t0());
        state.daily_peak = 0.95;
        state.daily_low = 0.1;
        let next = EnergyTracker::update(&state, &[], &[], false, t0() + Duration::hours(20));
        assert_eq!(next.daily_peak, next.net_available);
        assert_eq!(next.daily_low, next.net_available);
    }

    #[test]
    fn test_analyze_bands_and_top_drains() {
        let mut state = EnergyState::initial(t0());
        state.net_available = 0.2;
        state.burn_rate = 0.3;
        let drains = EnergyTracker::detect(
            &Signals::new()
                .with(signal::CASH_PRESSURE, 0.9)
                .with(signal::SLEEP_PRESSURE, 0.9)
                .with(signal::WORKLOAD_PRESSURE, 0.8)
                .with(signal::DELAY_MAGNITUDE, 0.6),
            0,
            0,
        );
        let analysis = EnergyTracker::analyze(&state, &drains);

        assert_eq!(analysis.status, EnergyStatus::Low);
        assert_eq!(analysis.top_drains.len(), 3);
        assert_eq!(analysis.top_drains[0].drain_type, DrainType::SleepDebt);
        assert_eq!(analysis.automatable_drains, 3);
        assert!(analysis.recommendations.iter().any(|r| r.contains("Burn rate is high")));
        assert!(analysis.recommendations[0].starts_with("Energy is low"));
    }

    #[test]
    fn test_status_bands() {
        assert_eq!(EnergyStatus::from_level(0.7), EnergyStatus::Optimal);
        assert_eq!(EnergyStatus::from_level(0.3), EnergyStatus::Good);
        assert_eq!(EnergyStatus::from_level(0.15), EnergyStatus::Low);
        assert_eq!(EnergyStatus::from_level(0.149), EnergyStatus::Critical);
    }

    #[test]
    fn test_analyze_is_idempotent() {
        let state = EnergyState::initial(t0());
        let drains = EnergyTracker::detect(
            &Signals::new().with(signal::DEADLINE_PRESSURE, 0.9),
            20,
            9,
        );
        assert_eq!(
            EnergyTracker::analyze(&state, &drains),
            EnergyTracker::analyze(&state, &drains)
        );
    }

    fn drain_strategy() -> impl Strategy<Value = DrainSource> {
        (0usize..7, 0.0f64..5.0, 0.0f64..20.0).prop_map(|(idx, base, multiplier)| {
            let drain_type = [
                DrainType::DecisionFatigue,
                DrainType::SocialInteraction,
                DrainType::FinancialStress,
                DrainType::Workload,
                DrainType::Deadline,
                DrainType::SleepDebt,
                DrainType::Waiting,
            ][idx];
            DrainSource {
                drain_type,
                source: drain_type.as_str().to_string(),
                signal: None,
                base_amount: base,
                multiplier,
                can_automate: idx % 2 == 0,
            }
        })
    }

    proptest! {
        #[test]
        fn property_energy_stays_bounded(
            steps in proptest::collection::vec(
                (
                    proptest::collection::vec(drain_strategy(), 0..4),
                    -3.0f64..3.0,
                    0usize..3,
                    any::<bool>(),
                    0i64..(36 * 60),
                ),
                1..20,
            )
        ) {
            let mut state = EnergyState::initial(t0());
            let mut now = t0();
            for (drains, saved_amount, axis, resting, minutes) in steps {
                now += Duration::minutes(minutes);
                let energy_type =
                    [EnergyType::Cognitive, EnergyType::Physical, EnergyType::Emotional][axis];
                state = EnergyTracker::update(
                    &state,
                    &drains,
                    &[saved(energy_type, saved_amount)],
                    resting,
                    now,
                );
                let axes = [state.cognitive, state.physical, state.emotional, state.net_available];
                for value in axes {
                    prop_assert!((0.0..=1.0).contains(&value));
                }
                prop_assert!(state.daily_peak >= state.net_available);
                prop_assert!(state.net_available >= state.daily_low);
            }
        }
    }
}
