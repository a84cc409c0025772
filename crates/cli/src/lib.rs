//! Terminal front end for the dashboard: text rendering, the interactive
//! shell's command language, and a navigator that reports redirects.

use std::fmt::Write as _;
use std::io::Write as _;

use api_client::Navigator;
use dashboard_engine::{Confirm, Dashboard, DashboardError, DashboardView, GoalField, Renderer};

/// Prints every rendered view to stdout.
#[derive(Debug, Default)]
pub struct TextRenderer;

impl Renderer for TextRenderer {
    fn render(&mut self, view: &DashboardView) {
        let mut out = std::io::stdout().lock();
        let _ = writeln!(out, "{}", format_view(view));
    }
}

/// Reports the redirect on stderr; the binary exits once the flow stops.
#[derive(Debug, Default)]
pub struct TerminalNavigator;

impl Navigator for TerminalNavigator {
    fn redirect(&self, destination: &str) {
        eprintln!("Session expired. Redirecting to {destination}");
    }
}

pub fn format_view(view: &DashboardView) -> String {
    let mut out = String::new();
    let budget = &view.budget;
    let _ = writeln!(out, "== Budget ==");
    let _ = writeln!(
        out,
        "${} of ${} spent ({})",
        budget.spent, budget.limit, budget.progress_text
    );
    if budget.editor_open {
        let _ = writeln!(out, "   editing limit: budget <amount>");
    }

    let _ = writeln!(out, "\n== Subscriptions ==");
    for row in &view.subscriptions {
        if row.placeholder {
            let _ = writeln!(out, "   -");
        } else {
            let _ = writeln!(out, "{} {:<20} {:>10}  {}", row.icon, row.name, row.amount, row.date);
        }
    }

    let _ = writeln!(out, "\n== Daily spending ==");
    for row in &view.spending.rows {
        let _ = writeln!(out, "{} {:<20} {:>10}", row.icon, row.name, row.amount);
    }
    let _ = writeln!(out, "   {:<20} {:>10}", "Total", view.spending.total);

    let _ = writeln!(out, "\n== Categories ({}) ==", view.chart.total);
    if view.chart.legend.is_empty() {
        let _ = writeln!(out, "   no spending");
    }
    for (item, segment) in view.chart.legend.iter().zip(&view.chart.segments) {
        let _ = writeln!(
            out,
            "   {:<24} {:>5.1}%  {}",
            item.label,
            segment.end - segment.start,
            item.color
        );
    }

    let _ = writeln!(out, "\n== Goals ==");
    for (position, goal) in view.goals.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>2}. {:<20} {:>10}  {:<9} {}",
            position + 1,
            goal.name,
            goal.monthly,
            goal.date,
            goal.total
        );
    }
    let editor = &view.goal_editor;
    if editor.open {
        let title = match &editor.editing {
            Some(name) => format!("editing \"{name}\""),
            None => "new goal".to_string(),
        };
        let _ = writeln!(
            out,
            "   [{title}] name={:?} month={:?} monthly={:?} total={:?}",
            editor.form.name, editor.form.month, editor.form.monthly, editor.form.total
        );
    }

    let connection = &view.connection;
    let _ = writeln!(out, "\n== Bank ==");
    let _ = writeln!(
        out,
        "{} ({})",
        connection.status, connection.button_label
    );
    if view.sources.any_fallback() {
        let _ = writeln!(out, "\n(some sections show default data: API unavailable)");
    }
    out
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Show,
    /// `budget` alone toggles the limit editor.
    Budget(Option<String>),
    NewGoal,
    Edit(usize),
    Set(GoalField, String),
    Save,
    Cancel,
    Delete(usize),
    Connect,
    Disconnect,
    /// Whichever bank action the button currently offers.
    Bank,
    Logout,
    Help,
    Quit,
}

pub const HELP: &str = "\
commands:
  show                      print the dashboard
  budget [limit]            toggle the limit editor, or submit a new limit
  new                       open an empty goal form
  edit <n>                  edit goal n
  set <field> <value>       fill the goal form (name, month, monthly, total)
  save | cancel             submit or abandon the goal form
  delete <n>                delete goal n
  connect | disconnect      link or unlink the bank
  bank                      press the bank button
  logout | quit";

impl std::str::FromStr for ShellCommand {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let command = match word.to_ascii_lowercase().as_str() {
            "show" | "" => ShellCommand::Show,
            "budget" if rest.is_empty() => ShellCommand::Budget(None),
            "budget" => ShellCommand::Budget(Some(rest.to_string())),
            "new" => ShellCommand::NewGoal,
            "edit" => ShellCommand::Edit(position(rest)?),
            "set" => {
                let (field, value) = rest
                    .split_once(char::is_whitespace)
                    .unwrap_or((rest, ""));
                let field = field.parse::<GoalField>().map_err(|e| e.to_string())?;
                ShellCommand::Set(field, value.trim().to_string())
            }
            "save" => ShellCommand::Save,
            "cancel" => ShellCommand::Cancel,
            "delete" | "rm" => ShellCommand::Delete(position(rest)?),
            "connect" => ShellCommand::Connect,
            "disconnect" => ShellCommand::Disconnect,
            "bank" => ShellCommand::Bank,
            "logout" => ShellCommand::Logout,
            "help" | "?" => ShellCommand::Help,
            "quit" | "exit" | "q" => ShellCommand::Quit,
            other => return Err(format!("unknown command '{other}', try 'help'")),
        };
        Ok(command)
    }
}

/// Goal numbers are 1-based as printed by [`format_view`].
fn position(arg: &str) -> Result<usize, String> {
    match arg.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n - 1),
        _ => Err(format!("expected a goal number, got '{arg}'")),
    }
}

/// What the shell loop does after a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// Print this message and keep going.
    Notice(String),
    Quit,
    /// The session ended; exit after reporting the destination.
    Redirected(String),
}

/// Runs one shell command against the page session.
pub async fn execute(
    dashboard: &mut Dashboard,
    command: ShellCommand,
    confirm: &mut dyn Confirm,
) -> Flow {
    let outcome: Result<Flow, DashboardError> = match command {
        ShellCommand::Show => Ok(Flow::Notice(format_view(&dashboard.view()))),
        ShellCommand::Budget(None) => continued(dashboard.toggle_budget_editor()),
        ShellCommand::Budget(Some(limit)) => dashboard.update_budget(&limit).await.map(|_| Flow::Continue),
        ShellCommand::NewGoal => continued(dashboard.open_goal_form()),
        ShellCommand::Edit(position) => match dashboard.store().goal_id_at(position) {
            Some(id) => dashboard.begin_goal_edit(id).map(|_| Flow::Continue),
            None => Ok(no_goal(position)),
        },
        ShellCommand::Set(field, value) => continued(dashboard.set_goal_field(field, &value)),
        ShellCommand::Save => dashboard.save_goal().await.map(|_| Flow::Continue),
        ShellCommand::Cancel => continued(dashboard.cancel_goal_edit()),
        ShellCommand::Delete(position) => match dashboard.store().goal_id_at(position) {
            Some(id) => dashboard.delete_goal(id, confirm).map(|deleted| {
                if deleted {
                    Flow::Continue
                } else {
                    Flow::Notice("kept".to_string())
                }
            }),
            None => Ok(no_goal(position)),
        },
        ShellCommand::Connect => bank(dashboard.connect_bank().await),
        ShellCommand::Disconnect => bank(dashboard.disconnect_bank().await),
        ShellCommand::Bank => {
            let action = dashboard.view().connection.action;
            let result = dashboard.toggle_bank().await;
            tracing::debug!(?action, "bank button pressed");
            bank(result)
        }
        ShellCommand::Logout => Err(dashboard.logout().await.into()),
        ShellCommand::Help => Ok(Flow::Notice(HELP.to_string())),
        ShellCommand::Quit => Ok(Flow::Quit),
    };

    match outcome {
        Ok(flow) => flow,
        Err(DashboardError::Halted(halted)) => Flow::Redirected(halted.destination),
        Err(err) => Flow::Notice(err.to_string()),
    }
}

fn continued(result: Result<(), api_client::SessionHalted>) -> Result<Flow, DashboardError> {
    result?;
    Ok(Flow::Continue)
}

fn no_goal(position: usize) -> Flow {
    Flow::Notice(format!("no goal number {}", position + 1))
}

fn bank(result: Result<bool, api_client::SessionHalted>) -> Result<Flow, DashboardError> {
    match result? {
        true => Ok(Flow::Continue),
        false => Ok(Flow::Notice("bank request failed, nothing changed".to_string())),
    }
}
