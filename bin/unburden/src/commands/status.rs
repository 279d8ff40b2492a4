use unburden_core::{Config, Paths};

pub fn run() -> anyhow::Result<()> {
    let paths = Paths::new();

    println!("unburden status");
    println!("===============");
    println!();

    let config_path = paths.config_file();
    let config_exists = config_path.exists();
    println!(
        "Config:    {} {}",
        config_path.display(),
        if config_exists { "✓" } else { "✗ (not found)" }
    );

    let reports_dir = paths.reports_dir();
    let saved_reports = std::fs::read_dir(&reports_dir)
        .map(|entries| entries.filter_map(|e| e.ok()).count())
        .unwrap_or(0);
    println!(
        "Reports:   {} ({} saved)",
        reports_dir.display(),
        saved_reports
    );

    if !config_exists {
        println!();
        println!("Run `unburden onboard` to initialize.");
        return Ok(());
    }

    let config = Config::load(&config_path)?;

    println!("Permission: {}", config.permission_level.as_str());
    println!();

    println!("Financial:");
    println!(
        "  auto-pay:       {}",
        if config.financial.auto_pay_bills { "✓ on" } else { "✗ off" }
    );
    println!("  payment buffer: {} day(s)", config.financial.bill_payment_buffer_days);
    if config.financial.budget_limits.is_empty() {
        println!("  budgets:        none");
    } else {
        for (category, limit) in &config.financial.budget_limits {
            println!("  budget {:<12} {:.2}", category, limit);
        }
    }

    println!();
    println!("Decisions:");
    println!("  priority target: {}", config.decision.priority_target);
    println!("  top-N filter:    {}", config.decision.top_n_relevance_filter);
    println!(
        "  auto-decide:     {} (importance ≤ {:.2})",
        if config.decision.auto_decide_enabled { "✓ on" } else { "✗ off" },
        config.decision.auto_decide_threshold
    );

    println!();
    println!("Social:");
    println!("  VIP contacts:      {}", config.social.vip_contacts.len());
    println!("  priority contacts: {}", config.social.priority_contacts.len());
    println!("  reply templates:   {}", config.social.reply_templates.len());
    println!(
        "  auto-reply:        {}",
        if config.social.auto_reply_enabled { "✓ on" } else { "✗ off" }
    );
    println!(
        "  auto-decline:      {}",
        if config.social.auto_decline_enabled { "✓ on" } else { "✗ off" }
    );
    println!(
        "  personality:       {}",
        match &config.personality {
            Some(p) if config.social.mirror_personality => format!("{:?}", p.tone).to_lowercase(),
            Some(_) => "set (mirroring off)".to_string(),
            None => "none".to_string(),
        }
    );

    Ok(())
}
