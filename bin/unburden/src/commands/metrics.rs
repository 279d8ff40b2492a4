use std::path::Path;

use unburden_agent::{render_metrics, AgentService};
use unburden_core::{PermissionLevel, Signals, SystemClock};

use super::snapshot;

/// Run cycles over a snapshot, then score the resulting report history.
pub fn run(
    input: &Path,
    cycles: u32,
    permission: Option<PermissionLevel>,
    json: bool,
) -> anyhow::Result<()> {
    let inputs = snapshot::load(input)?;
    let mut config = snapshot::load_config()?;
    if let Some(level) = permission {
        config.permission_level = level;
    }
    let (state, _) = snapshot::run_cycles(&inputs, cycles, config)?;
    let signals = inputs
        .last()
        .map(|i| i.signals.clone())
        .unwrap_or_else(Signals::new);
    let metrics = AgentService::<SystemClock>::freedom_metrics(&state, &signals);

    if json {
        println!("{}", serde_json::to_string_pretty(&metrics)?);
    } else {
        print!("{}", render_metrics(&metrics));
    }
    Ok(())
}
