use chrono::{DateTime, Datelike, NaiveDate, Utc};
use tracing::{debug, info};
use unburden_core::{
    signal, ActionDetails, ActionIdGen, ActionKind, ActionStatus, AgentAction, Bill, Expense,
    FinancialConfig, FinancialDetails, PermissionLevel, Signals,
};

/// Share of a budget limit at which a warning is raised.
const BUDGET_WARNING_RATIO: f64 = 0.8;

const BILL_PAYMENT_MINUTES: f64 = 5.0;
const BILL_PAYMENT_ENERGY: f64 = 0.02;
const ALERT_MINUTES: f64 = 2.0;
const ALERT_ENERGY: f64 = 0.01;

/// Output ordering: lower sorts first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Priority {
    Overdue,
    OverBudget,
    Other,
}

/// Turns bill and expense facts into payment and budget-alert actions.
pub struct FinancialAgent;

impl FinancialAgent {
    pub fn run(
        signals: &Signals,
        bills: &[Bill],
        expenses: &[Expense],
        config: &FinancialConfig,
        permission: PermissionLevel,
        now: DateTime<Utc>,
        ids: &mut ActionIdGen,
    ) -> Vec<AgentAction> {
        let today = now.date_naive();
        let mut available_cash = signals.get(signal::AVAILABLE_CASH);
        let mut ranked: Vec<(Priority, AgentAction)> = Vec::new();

        for bill in bills.iter().filter(|b| !b.is_paid) {
            let days_until_due = (bill.due_date - today).num_days();

            if days_until_due < 0 {
                let description = format!(
                    "Overdue: {} ({:.2}) was due {} day(s) ago",
                    bill.name, bill.amount, -days_until_due
                );
                let details = bill_details(bill, config);
                let action = Self::action(ids, now, ActionKind::BudgetAlert, description, details)
                    .with_targets([bill.id.clone()])
                    .with_savings(ALERT_MINUTES, ALERT_ENERGY)
                    .with_reasoning("Unpaid bill is past its due date", 1.0);
                ranked.push((Priority::Overdue, action));
                continue;
            }

            if days_until_due > config.bill_payment_buffer_days {
                continue;
            }

            if available_cash >= bill.amount {
                let can_auto_pay =
                    config.auto_pay_bills && bill.auto_pay && permission.can_execute();
                let (status, description) = if can_auto_pay {
                    available_cash -= bill.amount;
                    (
                        ActionStatus::Executed,
                        format!(
                            "Paid {} ({:.2}) due in {} day(s)",
                            bill.name, bill.amount, days_until_due
                        ),
                    )
                } else {
                    (
                        ActionStatus::Pending,
                        format!(
                            "Suggest paying {} ({:.2}) due in {} day(s)",
                            bill.name, bill.amount, days_until_due
                        ),
                    )
                };
                let details = bill_details(bill, config);
                let action = Self::action(ids, now, ActionKind::BillPayment, description, details)
                    .with_status(status)
                    .with_targets([bill.id.clone()])
                    .with_savings(BILL_PAYMENT_MINUTES, BILL_PAYMENT_ENERGY)
                    .with_reasoning(
                        format!(
                            "Due within the {}-day buffer and cash covers the amount",
                            config.bill_payment_buffer_days
                        ),
                        0.95,
                    );
                ranked.push((Priority::Other, action));
            } else {
                let shortfall = bill.amount - available_cash;
                let description = format!(
                    "Insufficient cash for {}: short by {:.2}",
                    bill.name, shortfall
                );
                let details = bill_details(bill, config);
                let action = Self::action(ids, now, ActionKind::BudgetAlert, description, details)
                    .with_targets([bill.id.clone()])
                    .with_savings(ALERT_MINUTES, ALERT_ENERGY)
                    .with_reasoning(
                        format!(
                            "Bill of {:.2} due in {} day(s) exceeds available cash {:.2}",
                            bill.amount, days_until_due, available_cash
                        ),
                        0.9,
                    );
                ranked.push((Priority::Other, action));
            }
        }

        for (category, limit) in &config.budget_limits {
            if *limit <= 0.0 {
                continue;
            }
            let spent = month_spend(expenses, category, today);
            let ratio = spent / limit;

            if ratio >= 1.0 {
                let description = format!(
                    "Over budget on {}: {:.2} of {:.2} ({:.0}%)",
                    category,
                    spent,
                    limit,
                    ratio * 100.0
                );
                let details = category_details(category, spent);
                let action = Self::action(ids, now, ActionKind::BudgetAlert, description, details)
                    .with_targets([category.clone()])
                    .with_savings(ALERT_MINUTES, ALERT_ENERGY)
                    .with_reasoning("Monthly spend reached the configured limit", 1.0);
                ranked.push((Priority::OverBudget, action));
            } else if ratio >= BUDGET_WARNING_RATIO {
                let status = if permission.is_autonomous() {
                    ActionStatus::Executed
                } else {
                    ActionStatus::Pending
                };
                let description = format!(
                    "Approaching budget on {}: {:.2} of {:.2} ({:.0}%)",
                    category,
                    spent,
                    limit,
                    ratio * 100.0
                );
                let details = category_details(category, spent);
                let action = Self::action(ids, now, ActionKind::BudgetAlert, description, details)
                    .with_status(status)
                    .with_targets([category.clone()])
                    .with_savings(ALERT_MINUTES, ALERT_ENERGY)
                    .with_reasoning("Monthly spend passed the warning level", 0.9);
                ranked.push((Priority::Other, action));
            }
        }

        ranked.sort_by_key(|(priority, _)| *priority);
        let actions: Vec<AgentAction> = ranked.into_iter().map(|(_, a)| a).collect();

        info!(
            actions = actions.len(),
            executed = actions.iter().filter(|a| a.is_executed()).count(),
            "Financial agent run complete"
        );
        actions
    }

    fn action(
        ids: &mut ActionIdGen,
        now: DateTime<Utc>,
        kind: ActionKind,
        description: String,
        details: FinancialDetails,
    ) -> AgentAction {
        AgentAction::new(ids.next("fin"), now, kind, description, ActionDetails::Financial(details))
    }
}

fn bill_details(bill: &Bill, config: &FinancialConfig) -> FinancialDetails {
    FinancialDetails {
        amount: Some(bill.amount),
        account: bill.account.clone().or_else(|| config.default_account.clone()),
        category: if bill.category.is_empty() {
            None
        } else {
            Some(bill.category.clone())
        },
    }
}

fn category_details(category: &str, spent: f64) -> FinancialDetails {
    FinancialDetails {
        amount: Some(spent),
        account: None,
        category: Some(category.to_string()),
    }
}

/// Total spent on `category` in the calendar month containing `today`.
fn month_spend(expenses: &[Expense], category: &str, today: NaiveDate) -> f64 {
    let total: f64 = expenses
        .iter()
        .filter(|e| e.category.eq_ignore_ascii_case(category))
        .filter(|e| e.date.year() == today.year() && e.date.month() == today.month())
        .map(|e| e.amount)
        .sum();
    debug!(category, total, "Computed month spend");
    total
}
