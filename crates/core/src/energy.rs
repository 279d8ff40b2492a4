use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::action::AgentType;

/// One of the three energy axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnergyType {
    Cognitive,
    Physical,
    Emotional,
}

impl EnergyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnergyType::Cognitive => "cognitive",
            EnergyType::Physical => "physical",
            EnergyType::Emotional => "emotional",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnergyState {
    pub cognitive: f64,
    pub physical: f64,
    pub emotional: f64,
    pub net_available: f64,
    /// Energy units burned per hour.
    pub burn_rate: f64,
    /// Energy units recovered per hour of rest.
    pub recovery_rate: f64,
    /// `f64::INFINITY` when nothing is burning; serialized as `null`.
    #[serde(
        serialize_with = "serialize_minutes",
        deserialize_with = "deserialize_minutes"
    )]
    pub estimated_depletion_minutes: f64,
    pub optimal_rest_time: String,
    pub last_updated: DateTime<Utc>,
    pub daily_peak: f64,
    pub daily_low: f64,
}

impl EnergyState {
    pub const INITIAL_LEVEL: f64 = 0.8;

    /// Fresh gauge at the start of a service lifetime.
    pub fn initial(now: DateTime<Utc>) -> Self {
        let level = Self::INITIAL_LEVEL;
        let net = blend(level, level, level);
        Self {
            cognitive: level,
            physical: level,
            emotional: level,
            net_available: net,
            burn_rate: 0.0,
            recovery_rate: 0.1,
            estimated_depletion_minutes: f64::INFINITY,
            optimal_rest_time: "this evening".to_string(),
            last_updated: now,
            daily_peak: net,
            daily_low: net,
        }
    }
}

/// Fixed weighted blend of the three axes.
pub fn blend(cognitive: f64, physical: f64, emotional: f64) -> f64 {
    0.5 * cognitive + 0.3 * physical + 0.2 * emotional
}

fn serialize_minutes<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.is_finite() {
        serializer.serialize_some(value)
    } else {
        serializer.serialize_none()
    }
}

fn deserialize_minutes<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let value = Option::<f64>::deserialize(deserializer)?;
    Ok(value.unwrap_or(f64::INFINITY))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrainType {
    DecisionFatigue,
    SocialInteraction,
    FinancialStress,
    Workload,
    Deadline,
    SleepDebt,
    Waiting,
}

impl DrainType {
    /// The axis this kind of drain depletes.
    pub fn axis(&self) -> EnergyType {
        match self {
            DrainType::DecisionFatigue | DrainType::Workload | DrainType::Deadline => {
                EnergyType::Cognitive
            }
            DrainType::SleepDebt => EnergyType::Physical,
            DrainType::FinancialStress | DrainType::SocialInteraction | DrainType::Waiting => {
                EnergyType::Emotional
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DrainType::DecisionFatigue => "decision_fatigue",
            DrainType::SocialInteraction => "social_interaction",
            DrainType::FinancialStress => "financial_stress",
            DrainType::Workload => "workload",
            DrainType::Deadline => "deadline",
            DrainType::SleepDebt => "sleep_debt",
            DrainType::Waiting => "waiting",
        }
    }
}

/// A source of depletion derived from the current signal snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrainSource {
    pub drain_type: DrainType,
    pub source: String,
    #[serde(default)]
    pub signal: Option<String>,
    pub base_amount: f64,
    pub multiplier: f64,
    pub can_automate: bool,
}

impl DrainSource {
    /// Per-hour depletion this drain contributes.
    pub fn weight(&self) -> f64 {
        self.base_amount * self.multiplier
    }
}

/// Energy handed back to the user by an executed action.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnergySaved {
    pub id: String,
    pub agent_type: AgentType,
    pub action_id: String,
    pub energy_type: EnergyType,
    pub amount: f64,
    pub description: String,
    pub timestamp: DateTime<Utc>,
}
