use std::fmt::Write;

use unburden_core::{DailyAgentReport, FreedomMetrics};

/// `"Xh Ym"`, rounding to the nearest minute.
pub fn format_minutes(minutes: f64) -> String {
    let total = if minutes.is_finite() && minutes > 0.0 {
        minutes.round() as u64
    } else {
        0
    };
    format!("{}h {}m", total / 60, total % 60)
}

fn percent(value: f64) -> String {
    format!("{:.0}%", value * 100.0)
}

/// Plain-text daily report. Same report, same text.
pub fn render(report: &DailyAgentReport) -> String {
    let mut out = String::new();
    let e = &report.energy_saved;
    let lf = &report.leapfrog_index;

    let _ = writeln!(out, "Daily Report: {}", report.date);
    let _ = writeln!(out, "Freedom Score: {}/100", report.freedom_score);
    let _ = writeln!(out);

    let _ = writeln!(out, "Actions");
    let _ = writeln!(
        out,
        "  Total: {} (executed {}, pending {})",
        report.total_actions, report.executed_actions, report.pending_actions
    );
    let _ = writeln!(
        out,
        "  Financial: {}  Decision: {}  Social: {}",
        report.financial_actions, report.decision_actions, report.social_actions
    );
    let _ = writeln!(out, "  Success rate: {}", percent(report.success_rate));
    let _ = writeln!(out);

    let _ = writeln!(out, "Time Saved: {}", format_minutes(report.time_saved_minutes));
    let _ = writeln!(
        out,
        "Energy Saved: {} (cognitive {}, physical {}, emotional {})",
        percent(e.total),
        percent(e.cognitive),
        percent(e.physical),
        percent(e.emotional)
    );
    let _ = writeln!(out);

    let _ = writeln!(out, "Decisions");
    let _ = writeln!(out, "  Pure will: {}", report.pure_will_decisions);
    let _ = writeln!(out, "  Automated: {}", report.automated_decisions);
    let _ = writeln!(out);

    let _ = writeln!(out, "Leapfrog Index");
    let _ = writeln!(
        out,
        "  Efficiency: {:.2} / {:.2}",
        lf.current_efficiency, lf.target_efficiency
    );
    let _ = writeln!(out, "  Days to target: {}", lf.days_to_target);
    let _ = writeln!(out, "  Percentile: {}", lf.percentile_rank);

    for (title, lines) in [
        ("Deleted Worries", &report.deleted_worries),
        ("Insights", &report.insights),
        ("Recommendations", &report.recommendations),
    ] {
        if lines.is_empty() {
            continue;
        }
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", title);
        for line in lines {
            let _ = writeln!(out, "  - {}", line);
        }
    }

    out
}

pub fn render_metrics(metrics: &FreedomMetrics) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Freedom Metrics (last {} reports)", metrics.window_size);
    let _ = writeln!(out, "  Overall: {:.0}", metrics.overall_score);
    let _ = writeln!(out, "  Time: {:.0}", metrics.time_freedom);
    let _ = writeln!(out, "  Energy: {:.0}", metrics.energy_freedom);
    let _ = writeln!(out, "  Decision: {:.0}", metrics.decision_freedom);
    let _ = writeln!(out, "  Financial: {:.0}", metrics.financial_freedom);
    let _ = writeln!(out, "  Trend: {}", metrics.trend.as_str());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use unburden_core::{EnergySavedSummary, LeapfrogIndex, Trend};

    fn report() -> DailyAgentReport {
        DailyAgentReport {
            date: NaiveDate::from_ymd_opt(2026, 6, 1).unwrap(),
            financial_actions: 1,
            decision_actions: 1,
            social_actions: 0,
            total_actions: 2,
            executed_actions: 1,
            pending_actions: 1,
            success_rate: 0.5,
            time_saved_minutes: 65.4,
            energy_saved: EnergySavedSummary {
                cognitive: 0.05,
                total: 0.05,
                ..Default::default()
            },
            deleted_worries: vec!["No need to answer promo@shop".to_string()],
            freedom_score: 61,
            pure_will_decisions: 3,
            automated_decisions: 2,
            leapfrog_index: LeapfrogIndex {
                current_efficiency: 1.095,
                target_efficiency: 1.5,
                days_to_target: 41,
                percentile_rank: 55,
            },
            actions: Vec::new(),
            insights: Vec::new(),
            recommendations: Vec::new(),
        }
    }

    #[test]
    fn test_format_minutes() {
        assert_eq!(format_minutes(0.0), "0h 0m");
        assert_eq!(format_minutes(59.6), "1h 0m");
        assert_eq!(format_minutes(125.0), "2h 5m");
        assert_eq!(format_minutes(f64::NAN), "0h 0m");
    }

    #[test]
    fn test_render_sections() {
        let text = render(&report());
        assert!(text.starts_with("Daily Report: 2026-06-01\n"));
        assert!(text.contains("Freedom Score: 61/100"));
        assert!(text.contains("Success rate: 50%"));
        assert!(text.contains("Time Saved: 1h 5m"));
        assert!(text.contains("Energy Saved: 5% (cognitive 5%, physical 0%, emotional 0%)"));
        assert!(text.contains("Deleted Worries\n  - No need to answer promo@shop"));
        assert!(!text.contains("Insights"));
        assert_eq!(text, render(&report()));
    }

    #[test]
    fn test_render_metrics() {
        let text = render_metrics(&FreedomMetrics {
            overall_score: 62.4,
            time_freedom: 10.0,
            energy_freedom: 20.0,
            decision_freedom: 50.0,
            financial_freedom: 75.0,
            trend: Trend::Increasing,
            window_size: 7,
        });
        assert!(text.contains("last 7 reports"));
        assert!(text.contains("Overall: 62"));
        assert!(text.contains("Trend: increasing"));
    }
}
