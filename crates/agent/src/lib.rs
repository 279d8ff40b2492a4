pub mod decision;
pub mod energy;
pub mod financial;
pub mod intent;
pub mod render;
pub mod report;
pub mod service;
pub mod social;

pub use decision::{
    AutoDecisionResult, BatchOutcome, DecisionFilter, DecisionRecord, FilterOutcome, ScoredItem,
};
pub use energy::{EnergyAnalysis, EnergyStatus, EnergyTracker, HIGH_BURN_RATE, LOW_ENERGY_THRESHOLD};
pub use financial::FinancialAgent;
pub use intent::{IntentClassifier, MessageIntent};
pub use render::{format_minutes, render, render_metrics};
pub use report::{ReportGenerator, ReportInput};
pub use service::{AgentService, AgentServiceState, CycleOutcome, RunningTotals};
pub use social::{SocialBuffer, SocialOutcome};
