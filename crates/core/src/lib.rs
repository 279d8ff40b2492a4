pub mod action;
pub mod clock;
pub mod config;
pub mod energy;
pub mod error;
pub mod paths;
pub mod report;
pub mod types;

pub use action::{
    ActionDetails, ActionKind, ActionStatus, AgentAction, AgentType, DecisionDetails,
    FinancialDetails, PermissionLevel, SocialDetails,
};
pub use clock::{ActionIdGen, Clock, FixedClock, SystemClock};
pub use config::{
    Config, DecisionConfig, DecisionRules, FinancialConfig, PersonalityProfile, SocialConfig,
};
pub use energy::{DrainSource, DrainType, EnergySaved, EnergyState, EnergyType};
pub use error::{Error, Result};
pub use paths::Paths;
pub use report::{DailyAgentReport, EnergySavedSummary, FreedomMetrics, LeapfrogIndex, Trend};
pub use types::{
    signal, Bill, CycleInput, Decision, DecisionCategory, Expense, IncomingMessage,
    InformationItem, MeetingRequest, Signals,
};
