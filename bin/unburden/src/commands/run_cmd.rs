use std::path::Path;

use unburden_agent::render;
use unburden_core::{Paths, PermissionLevel};

use super::snapshot;

/// Run cycles over a snapshot and print the last cycle's report.
pub fn run(
    input: &Path,
    cycles: u32,
    permission: Option<PermissionLevel>,
    json: bool,
    save: bool,
) -> anyhow::Result<()> {
    let inputs = snapshot::load(input)?;
    let mut config = snapshot::load_config()?;
    if let Some(level) = permission {
        config.permission_level = level;
    }
    let (state, outcomes) = snapshot::run_cycles(&inputs, cycles, config)?;
    let last = outcomes
        .last()
        .ok_or_else(|| anyhow::anyhow!("No cycles were run"))?;

    let text = render(&last.report);
    if json {
        println!("{}", serde_json::to_string_pretty(last)?);
    } else {
        print!("{}", text);
        println!();
        println!(
            "Energy: {} ({:.0}% available, burn {:.2}/h)",
            last.energy.status.as_str(),
            last.energy.net_available * 100.0,
            last.energy.burn_rate
        );
        for rec in &last.energy.recommendations {
            println!("  - {}", rec);
        }
        println!(
            "Totals: {} cycle(s), {} action(s), {} executed",
            state.totals.cycles, state.totals.actions, state.totals.executed_actions
        );
    }

    if save {
        let paths = Paths::new();
        paths.ensure_dirs()?;
        let file = paths.report_file(&last.report.date.to_string());
        std::fs::write(&file, &text)?;
        println!("✓ Saved report: {}", file.display());
    }

    Ok(())
}
