use std::path::Path;

use serde::Deserialize;
use tracing::info;
use unburden_agent::{AgentService, AgentServiceState, CycleOutcome};
use unburden_core::{Clock, Config, CycleInput, Paths, SystemClock};

#[derive(Deserialize)]
#[serde(untagged)]
enum SnapshotFile {
    Many(Vec<CycleInput>),
    One(Box<CycleInput>),
}

/// Read a snapshot file holding either one cycle input or a list of them.
pub fn load(path: &Path) -> anyhow::Result<Vec<CycleInput>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?;
    parse(&content)
}

pub fn parse(content: &str) -> anyhow::Result<Vec<CycleInput>> {
    let file: SnapshotFile = serde_json::from_str(content)
        .map_err(|e| anyhow::anyhow!("Failed to parse snapshot: {}", e))?;
    let inputs = match file {
        SnapshotFile::Many(inputs) => inputs,
        SnapshotFile::One(input) => vec![*input],
    };
    if inputs.is_empty() {
        anyhow::bail!("Snapshot contains no cycle inputs");
    }
    Ok(inputs)
}

/// Saved config, or defaults when none exists yet.
pub fn load_config() -> anyhow::Result<Config> {
    Ok(Config::load_or_default(&Paths::new())?)
}

/// Run every snapshot `cycles` times against a fresh state built from
/// `config`.
pub fn run_cycles(
    inputs: &[CycleInput],
    cycles: u32,
    config: Config,
) -> anyhow::Result<(AgentServiceState, Vec<CycleOutcome>)> {
    if cycles == 0 {
        anyhow::bail!("--cycles must be at least 1");
    }
    let service = AgentService::new(SystemClock);
    let mut state = AgentServiceState::new(config, SystemClock.now());
    let mut outcomes = Vec::new();

    info!(
        snapshots = inputs.len(),
        cycles,
        permission = state.config.permission_level.as_str(),
        "Running snapshot cycles"
    );

    for _ in 0..cycles {
        for input in inputs {
            outcomes.push(service.run_cycle(&mut state, input)?);
        }
    }
    Ok((state, outcomes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use unburden_core::PermissionLevel;

    #[test]
    fn test_parse_single_and_list() {
        let one = parse(r#"{"signals": {"cash_pressure": 0.7}, "isResting": true}"#).unwrap();
        assert_eq!(one.len(), 1);
        assert!(one[0].is_resting);

        let many = parse(r#"[{}, {"decisions": []}]"#).unwrap();
        assert_eq!(many.len(), 2);

        assert!(parse("[]").is_err());
        assert!(parse("not json").is_err());
    }

    #[test]
    fn test_zero_cycles_is_rejected() {
        let inputs = parse("{}").unwrap();
        let err = run_cycles(&inputs, 0, Config::default()).unwrap_err();
        assert!(err.to_string().contains("at least 1"));
    }

    #[test]
    fn test_runs_each_snapshot_per_cycle() {
        let inputs = parse("[{}, {}]").unwrap();
        let mut config = Config::default();
        config.permission_level = PermissionLevel::Observe;
        let (state, outcomes) = run_cycles(&inputs, 3, config).unwrap();
        assert_eq!(outcomes.len(), 6);
        assert_eq!(state.totals.cycles, 6);
        assert_eq!(state.config.permission_level, PermissionLevel::Observe);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load(&dir.path().join("missing.json")).is_err());
    }
}
