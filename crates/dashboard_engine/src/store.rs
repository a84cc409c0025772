use std::fmt;
use std::str::FromStr;

use api_client::Fetched;
use models::{
    BudgetState, Category, ConnectionStatus, Goal, Subscription, Transaction, DEFAULT_BUDGET_LIMIT,
};
use serde::Serialize;

use crate::error::{DashboardError, Result};

/// Page-local identity of a goal. Assigned when the goal enters the store
/// and never reused within a page session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct GoalId(u64);

impl fmt::Display for GoalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalEntry {
    pub id: GoalId,
    pub goal: Goal,
}

/// Where the data currently held for a domain came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    /// Not loaded yet.
    #[default]
    Pending,
    Live,
    Fallback,
}

impl<T> From<&Fetched<T>> for DataSource {
    fn from(fetched: &Fetched<T>) -> Self {
        if fetched.is_live() {
            DataSource::Live
        } else {
            DataSource::Fallback
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct DataSources {
    pub budget: DataSource,
    pub subscriptions: DataSource,
    pub transactions: DataSource,
    pub categories: DataSource,
    pub goals: DataSource,
    pub connection: DataSource,
}

impl DataSources {
    pub fn any_fallback(&self) -> bool {
        [
            self.budget,
            self.subscriptions,
            self.transactions,
            self.categories,
            self.goals,
            self.connection,
        ]
        .contains(&DataSource::Fallback)
    }
}

/// The goal form as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GoalForm {
    pub name: String,
    /// `YYYY-MM`
    pub month: String,
    pub monthly: String,
    pub total: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoalField {
    Name,
    Month,
    Monthly,
    Total,
}

impl FromStr for GoalField {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "name" => Ok(GoalField::Name),
            "month" | "date" => Ok(GoalField::Month),
            "monthly" => Ok(GoalField::Monthly),
            "total" => Ok(GoalField::Total),
            other => Err(DashboardError::InvalidInput(format!(
                "unknown goal field '{other}' (name, month, monthly, total)"
            ))),
        }
    }
}

impl GoalForm {
    pub fn from_goal(goal: &Goal) -> Self {
        Self {
            name: goal.name.clone(),
            month: models::month_input(&goal.date).unwrap_or_default(),
            monthly: goal.monthly.to_string(),
            total: goal.total.to_string(),
        }
    }

    pub fn set(&mut self, field: GoalField, value: &str) {
        let slot = match field {
            GoalField::Name => &mut self.name,
            GoalField::Month => &mut self.month,
            GoalField::Monthly => &mut self.monthly,
            GoalField::Total => &mut self.total,
        };
        *slot = value.to_string();
    }

    /// Validates the form and builds the goal to submit. Every field must be
    /// present; amounts are read from their leading number, which must not
    /// be zero.
    pub fn to_goal(&self) -> Result<Goal> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(DashboardError::InvalidInput("goal name is required".to_string()));
        }

        let date = models::month_label(&self.month).ok_or_else(|| {
            DashboardError::InvalidInput(format!("goal month must be YYYY-MM, got '{}'", self.month))
        })?;

        Ok(Goal {
            name: name.to_string(),
            date,
            monthly: parse_amount("monthly amount", &self.monthly)?,
            total: parse_amount("total amount", &self.total)?,
        })
    }
}

fn parse_amount(label: &str, raw: &str) -> Result<f64> {
    match models::coerce::parse_float_prefix(raw) {
        Some(value) if value != 0.0 => Ok(value),
        _ => Err(DashboardError::InvalidInput(format!(
            "{label} must be a non-zero number, got '{raw}'"
        ))),
    }
}

/// A goal taken out of the sequence while its edit form is open.
#[derive(Debug, Clone, PartialEq)]
struct PendingEdit {
    position: usize,
    entry: GoalEntry,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GoalEditor {
    pub open: bool,
    pub form: GoalForm,
    pending: Option<PendingEdit>,
}

impl GoalEditor {
    /// The goal currently being edited, hidden from the goal list.
    pub fn editing(&self) -> Option<&GoalEntry> {
        self.pending.as_ref().map(|p| &p.entry)
    }
}

/// Every entity shown on the dashboard for one page load.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardStore {
    pub budget: BudgetState,
    pub subscriptions: Vec<Subscription>,
    pub transactions: Vec<Transaction>,
    pub categories: Vec<Category>,
    goals: Vec<GoalEntry>,
    pub connection: ConnectionStatus,
    pub sources: DataSources,
    pub budget_editor_open: bool,
    pub goal_editor: GoalEditor,
    next_goal_id: u64,
}

impl Default for DashboardStore {
    fn default() -> Self {
        Self {
            budget: BudgetState {
                spent: 0.0,
                limit: DEFAULT_BUDGET_LIMIT,
            },
            subscriptions: Vec::new(),
            transactions: Vec::new(),
            categories: Vec::new(),
            goals: Vec::new(),
            connection: ConnectionStatus::default(),
            sources: DataSources::default(),
            budget_editor_open: false,
            goal_editor: GoalEditor::default(),
            next_goal_id: 1,
        }
    }
}

impl DashboardStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn goals(&self) -> &[GoalEntry] {
        &self.goals
    }

    pub fn goal(&self, id: GoalId) -> Option<&GoalEntry> {
        self.goals.iter().find(|entry| entry.id == id)
    }

    /// Identity of the goal currently shown at `position` (0-based).
    pub fn goal_id_at(&self, position: usize) -> Option<GoalId> {
        self.goals.get(position).map(|entry| entry.id)
    }

    pub fn replace_goals(&mut self, goals: Vec<Goal>) {
        let entries: Vec<GoalEntry> = goals
            .into_iter()
            .map(|goal| GoalEntry {
                id: self.allocate_goal_id(),
                goal,
            })
            .collect();
        self.goals = entries;
    }

    pub fn push_goal(&mut self, goal: Goal) -> GoalId {
        let id = self.allocate_goal_id();
        self.goals.push(GoalEntry { id, goal });
        id
    }

    /// Removes a goal, returning where it was and what it held.
    pub fn remove_goal(&mut self, id: GoalId) -> Option<(usize, GoalEntry)> {
        let position = self.goals.iter().position(|entry| entry.id == id)?;
        Some((position, self.goals.remove(position)))
    }

    /// Takes a goal out of the sequence and loads it into the edit form.
    pub fn begin_goal_edit(&mut self, id: GoalId) -> Result<()> {
        self.restore_pending_goal();
        let (position, entry) = self.remove_goal(id).ok_or(DashboardError::UnknownGoal(id))?;
        self.goal_editor.form = GoalForm::from_goal(&entry.goal);
        self.goal_editor.open = true;
        self.goal_editor.pending = Some(PendingEdit { position, entry });
        Ok(())
    }

    /// Puts a goal hidden by an abandoned edit back where it was.
    pub fn restore_pending_goal(&mut self) {
        if let Some(PendingEdit { position, entry }) = self.goal_editor.pending.take() {
            let position = position.min(self.goals.len());
            self.goals.insert(position, entry);
        }
    }

    /// Clears and closes the goal editor. Any goal under edit is dropped:
    /// the caller has replaced it.
    pub fn close_goal_editor(&mut self) {
        self.goal_editor = GoalEditor::default();
    }

    pub fn daily_total(&self) -> f64 {
        self.transactions.iter().map(|t| t.amount).sum()
    }

    pub fn category_total(&self) -> f64 {
        self.categories.iter().map(|c| c.amount).sum()
    }

    fn allocate_goal_id(&mut self) -> GoalId {
        let id = GoalId(self.next_goal_id);
        self.next_goal_id += 1;
        id
    }
}
