pub mod config_cmd;
pub mod metrics;
pub mod onboard;
pub mod run_cmd;
pub mod snapshot;
pub mod status;
