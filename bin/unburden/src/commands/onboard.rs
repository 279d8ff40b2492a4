use std::io::{self, Write};

use unburden_core::{Config, Paths};

pub fn run(force: bool) -> anyhow::Result<()> {
    let paths = Paths::new();

    // Check if config exists
    if paths.config_file().exists() && !force {
        print!("Config already exists. Overwrite? [y/N] ");
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;

        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Aborted.");
            return Ok(());
        }
    }

    paths.ensure_dirs()?;
    Config::default().save(&paths.config_file())?;
    println!("✓ Created config: {}", paths.config_file().display());
    println!("✓ Created reports dir: {}", paths.reports_dir().display());
    println!();
    println!("Next steps:");
    println!(
        "  1. Edit {} to set budgets, VIP contacts and the permission level",
        paths.config_file().display()
    );
    println!("  2. Run `unburden status` to verify configuration");
    println!("  3. Run `unburden run --input snapshot.json` to run a cycle");

    Ok(())
}
