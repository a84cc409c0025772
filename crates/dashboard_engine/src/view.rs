//! Pure projection of the store into presentation-ready view models.

use models::{BudgetState, Category, Subscription, Transaction};
use serde::Serialize;

use crate::store::{DashboardStore, DataSources, GoalEntry, GoalForm, GoalId};

/// Number of rows the subscription list always shows.
pub const SUBSCRIPTION_SLOTS: usize = 4;

const BAR_OK_COLOR: &str = "#4CAF50";
const BAR_OVER_COLOR: &str = "#ff4d4d";
const CHART_EMPTY_COLOR: &str = "#eee";
const CONNECTED_COLOR: &str = "#4CAF50";
const DISCONNECTED_COLOR: &str = "#888";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub budget: BudgetView,
    pub subscriptions: Vec<SubscriptionRow>,
    pub spending: SpendingView,
    pub chart: ChartView,
    pub goals: Vec<GoalRow>,
    pub goal_editor: GoalEditorView,
    pub connection: ConnectionView,
    pub sources: DataSources,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetView {
    pub limit: String,
    pub spent: String,
    /// Whole percent in `[0, 100]`.
    pub percentage: u32,
    pub progress_text: String,
    pub bar_color: &'static str,
    pub editor_open: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubscriptionRow {
    pub name: String,
    pub icon: String,
    pub amount: String,
    pub date: String,
    pub placeholder: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpendingRow {
    pub name: String,
    pub icon: String,
    pub amount: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpendingView {
    pub rows: Vec<SpendingRow>,
    pub total: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSegment {
    pub color: String,
    /// Percent of the circle where the arc starts.
    pub start: f64,
    pub end: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendItem {
    pub color: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartView {
    pub total: String,
    pub segments: Vec<ChartSegment>,
    pub legend: Vec<LegendItem>,
}

impl ChartView {
    /// CSS `conic-gradient` matching the segments.
    pub fn gradient(&self) -> String {
        let stops: Vec<String> = self
            .segments
            .iter()
            .map(|s| format!("{} {}% {}%", s.color, s.start, s.end))
            .collect();
        format!("conic-gradient({})", stops.join(", "))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalRow {
    pub id: GoalId,
    pub name: String,
    pub date: String,
    pub monthly: String,
    pub total: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalEditorView {
    pub open: bool,
    pub form: GoalForm,
    /// Name of the goal being edited, if any.
    pub editing: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BankAction {
    Connect,
    Disconnect,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectionView {
    pub connected: bool,
    pub button_label: &'static str,
    pub status: &'static str,
    pub status_color: &'static str,
    /// What pressing the bank button does.
    pub action: BankAction,
}

pub fn project(store: &DashboardStore) -> DashboardView {
    DashboardView {
        budget: budget_view(&store.budget, store.budget_editor_open),
        subscriptions: subscription_rows(&store.subscriptions),
        spending: spending_view(&store.transactions),
        chart: chart_view(&store.categories),
        goals: store.goals().iter().map(goal_row).collect(),
        goal_editor: GoalEditorView {
            open: store.goal_editor.open,
            form: store.goal_editor.form.clone(),
            editing: store.goal_editor.editing().map(|e| e.goal.name.clone()),
        },
        connection: connection_view(store.connection.connected),
        sources: store.sources,
    }
}

pub fn budget_view(budget: &BudgetState, editor_open: bool) -> BudgetView {
    let percentage = budget.percentage().round() as u32;
    BudgetView {
        limit: plain(budget.limit),
        spent: format!("{:.2}", budget.spent),
        percentage,
        progress_text: format!("{percentage}%"),
        bar_color: if percentage >= 100 { BAR_OVER_COLOR } else { BAR_OK_COLOR },
        editor_open,
    }
}

pub fn subscription_rows(subscriptions: &[Subscription]) -> Vec<SubscriptionRow> {
    let mut rows: Vec<SubscriptionRow> = subscriptions
        .iter()
        .map(|sub| SubscriptionRow {
            name: sub.name.clone(),
            icon: sub.icon.clone(),
            amount: format!("${}", plain(sub.amount)),
            date: sub.date.clone(),
            placeholder: false,
        })
        .collect();

    while rows.len() < SUBSCRIPTION_SLOTS {
        rows.push(SubscriptionRow {
            name: String::new(),
            icon: String::new(),
            amount: String::new(),
            date: String::new(),
            placeholder: true,
        });
    }
    rows
}

pub fn spending_view(transactions: &[Transaction]) -> SpendingView {
    let total: f64 = transactions.iter().map(|t| t.amount).sum();
    SpendingView {
        rows: transactions
            .iter()
            .map(|t| SpendingRow {
                name: t.name.clone(),
                icon: t.icon.clone(),
                amount: format!("${:.2}", t.amount),
            })
            .collect(),
        total: format!("${total:.2}"),
    }
}

pub fn chart_view(categories: &[Category]) -> ChartView {
    let total: f64 = categories.iter().map(|c| c.amount).sum();
    let total_text = format!("${}", plain(total));

    if total <= 0.0 {
        return ChartView {
            total: total_text,
            segments: vec![ChartSegment {
                color: CHART_EMPTY_COLOR.to_string(),
                start: 0.0,
                end: 100.0,
            }],
            legend: Vec::new(),
        };
    }

    let mut cumulative = 0.0;
    let mut segments = Vec::with_capacity(categories.len());
    let mut legend = Vec::with_capacity(categories.len());
    for category in categories {
        let start = cumulative;
        cumulative += category.amount / total * 100.0;
        segments.push(ChartSegment {
            color: category.color.clone(),
            start,
            end: cumulative,
        });
        legend.push(LegendItem {
            color: category.color.clone(),
            label: format!("{}: ${}", category.name, plain(category.amount)),
        });
    }

    ChartView {
        total: total_text,
        segments,
        legend,
    }
}

fn goal_row(entry: &GoalEntry) -> GoalRow {
    GoalRow {
        id: entry.id,
        name: entry.goal.name.clone(),
        date: entry.goal.date.clone(),
        monthly: format!("${}/m", plain(entry.goal.monthly)),
        total: format!("${}", plain(entry.goal.total)),
    }
}

pub fn connection_view(connected: bool) -> ConnectionView {
    if connected {
        ConnectionView {
            connected,
            button_label: "Disconnect Bank",
            status: "Connected",
            status_color: CONNECTED_COLOR,
            action: BankAction::Disconnect,
        }
    } else {
        ConnectionView {
            connected,
            button_label: "Connect Bank",
            status: "Not connected",
            status_color: DISCONNECTED_COLOR,
            action: BankAction::Connect,
        }
    }
}

/// Shortest decimal form: `3000.0` prints as `3000`, `7.99` as `7.99`.
fn plain(value: f64) -> String {
    value.to_string()
}
