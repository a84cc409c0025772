use api_client::{ApiClient, Endpoint, SessionHalted, Submitted, WriteMethod};
use models::{coerce, fallback, BudgetState, BudgetUpdate, Goal};

use crate::error::{DashboardError, Result};
use crate::render::{Confirm, Renderer};
use crate::store::{DashboardStore, DataSource, GoalField, GoalId};
use crate::view::{self, DashboardView};

/// One page session: the state store, the client every request goes
/// through, and the renderer that shows the result.
///
/// All mutation happens through `&mut self`, so the store has a single
/// writer. Concurrent reads in [`Dashboard::load_all`] are joined before any
/// of their results are applied.
pub struct Dashboard {
    client: ApiClient,
    store: DashboardStore,
    renderer: Box<dyn Renderer>,
}

impl Dashboard {
    pub fn new(client: ApiClient, renderer: Box<dyn Renderer>) -> Self {
        Self {
            client,
            store: DashboardStore::new(),
            renderer,
        }
    }

    pub fn store(&self) -> &DashboardStore {
        &self.store
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn view(&self) -> DashboardView {
        view::project(&self.store)
    }

    pub fn is_halted(&self) -> bool {
        self.client.guard().is_halted()
    }

    /// Full page load: session check, then bank status, then every domain.
    pub async fn init(&mut self) -> std::result::Result<(), SessionHalted> {
        self.client.require_auth().await?;
        self.check_connection_status().await?;
        self.load_all().await?;
        tracing::info!(
            goals = self.store.goals().len(),
            fallback = self.store.sources.any_fallback(),
            "dashboard loaded"
        );
        Ok(())
    }

    pub async fn check_connection_status(&mut self) -> std::result::Result<(), SessionHalted> {
        let fetched = self
            .client
            .fetch_entity(Endpoint::BankStatus, fallback::connection())
            .await;
        let source = DataSource::from(&fetched);
        let status = fetched.into_result()?;
        self.checkpoint()?;

        self.store.sources.connection = source;
        self.store.connection = status;
        self.render();
        Ok(())
    }

    /// Reads the five domains concurrently. Nothing is applied unless every
    /// read settled and the session is still live afterwards.
    pub async fn load_all(&mut self) -> std::result::Result<(), SessionHalted> {
        let client = &self.client;
        let (budget, subscriptions, transactions, categories, goals) = tokio::join!(
            client.fetch_entity(Endpoint::Budget, fallback::budget()),
            client.fetch_list(Endpoint::Subscriptions, fallback::subscriptions()),
            client.fetch_list(Endpoint::DailySpending, fallback::transactions()),
            client.fetch_list(Endpoint::Categories, fallback::categories()),
            client.fetch_list(Endpoint::Goals, fallback::goals()),
        );

        let mut sources = self.store.sources;
        sources.budget = DataSource::from(&budget);
        sources.subscriptions = DataSource::from(&subscriptions);
        sources.transactions = DataSource::from(&transactions);
        sources.categories = DataSource::from(&categories);
        sources.goals = DataSource::from(&goals);

        let budget = budget.into_result()?;
        let subscriptions = subscriptions.into_result()?;
        let transactions = transactions.into_result()?;
        let categories = categories.into_result()?;
        let goals = goals.into_result()?;
        self.checkpoint()?;

        self.store.budget = budget;
        self.store.subscriptions = subscriptions;
        self.store.transactions = transactions;
        self.store.categories = categories;
        self.store.restore_pending_goal();
        self.store.close_goal_editor();
        self.store.replace_goals(goals);
        self.store.sources = sources;
        self.render();
        Ok(())
    }

    pub fn toggle_budget_editor(&mut self) -> std::result::Result<(), SessionHalted> {
        self.checkpoint()?;
        self.store.budget_editor_open = !self.store.budget_editor_open;
        self.render();
        Ok(())
    }

    /// Submits a new budget limit typed by the user.
    pub async fn update_budget(&mut self, input: &str) -> Result<()> {
        let limit = match coerce::parse_int_prefix(input) {
            Some(limit) if limit >= 0 => limit,
            Some(_) => {
                return Err(DashboardError::InvalidInput(format!(
                    "budget limit must not be negative, got '{}'",
                    input.trim()
                )))
            }
            None => {
                return Err(DashboardError::InvalidInput(format!(
                    "budget limit must be a whole number, got '{}'",
                    input.trim()
                )))
            }
        };

        let expected = BudgetState {
            spent: self.store.budget.spent,
            limit: limit as f64,
        };
        let outcome: Submitted<BudgetState, BudgetUpdate> = self
            .client
            .submit(Endpoint::Budget, WriteMethod::Update, BudgetUpdate { limit }, expected)
            .await;
        match outcome {
            Submitted::Confirmed(budget) => self.store.budget = budget,
            Submitted::Local(update) => self.store.budget.limit = update.limit as f64,
            Submitted::Unauthorized(halted) => return Err(halted.into()),
        }
        self.checkpoint()?;

        self.store.budget_editor_open = false;
        self.render();
        Ok(())
    }

    /// Opens an empty goal form. A goal hidden by an unfinished edit is put
    /// back first.
    pub fn open_goal_form(&mut self) -> std::result::Result<(), SessionHalted> {
        self.checkpoint()?;
        self.store.restore_pending_goal();
        self.store.close_goal_editor();
        self.store.goal_editor.open = true;
        self.render();
        Ok(())
    }

    pub fn set_goal_field(&mut self, field: GoalField, value: &str) -> std::result::Result<(), SessionHalted> {
        self.checkpoint()?;
        self.store.goal_editor.form.set(field, value);
        Ok(())
    }

    /// Submits the goal form, appending the saved goal. When an edit was in
    /// progress the saved goal replaces the one being edited.
    pub async fn save_goal(&mut self) -> Result<GoalId> {
        let goal = self.store.goal_editor.form.to_goal()?;

        let saved = self
            .client
            .submit::<Goal, Goal>(Endpoint::Goals, WriteMethod::Create, goal.clone(), goal)
            .await
            .into_entity()?;
        self.checkpoint()?;

        self.store.close_goal_editor();
        let id = self.store.push_goal(saved);
        self.render();
        Ok(id)
    }

    pub fn begin_goal_edit(&mut self, id: GoalId) -> Result<()> {
        self.checkpoint()?;
        self.store.begin_goal_edit(id)?;
        self.render();
        Ok(())
    }

    pub fn cancel_goal_edit(&mut self) -> std::result::Result<(), SessionHalted> {
        self.checkpoint()?;
        self.store.restore_pending_goal();
        self.store.close_goal_editor();
        self.render();
        Ok(())
    }

    /// Removes a goal after confirmation. Returns whether it was removed.
    pub fn delete_goal(&mut self, id: GoalId, confirm: &mut dyn Confirm) -> Result<bool> {
        self.checkpoint()?;
        let name = self
            .store
            .goal(id)
            .map(|entry| entry.goal.name.clone())
            .ok_or(DashboardError::UnknownGoal(id))?;

        if !confirm.confirm(&format!("Delete goal \"{name}\"?")) {
            return Ok(false);
        }

        self.store.remove_goal(id);
        tracing::debug!(%id, %name, "goal deleted");
        self.render();
        Ok(true)
    }

    pub async fn connect_bank(&mut self) -> std::result::Result<bool, SessionHalted> {
        self.set_bank_connection(Endpoint::BankConnect, true).await
    }

    pub async fn disconnect_bank(&mut self) -> std::result::Result<bool, SessionHalted> {
        self.set_bank_connection(Endpoint::BankDisconnect, false).await
    }

    /// Runs whichever bank action the connection button currently offers.
    pub async fn toggle_bank(&mut self) -> std::result::Result<bool, SessionHalted> {
        if self.store.connection.connected {
            self.disconnect_bank().await
        } else {
            self.connect_bank().await
        }
    }

    /// Ends the session. The returned value is the redirect that followed.
    pub async fn logout(&mut self) -> SessionHalted {
        self.client.logout().await
    }

    async fn set_bank_connection(
        &mut self,
        endpoint: Endpoint,
        connected: bool,
    ) -> std::result::Result<bool, SessionHalted> {
        if !self.client.command(endpoint).await? {
            return Ok(false);
        }
        self.checkpoint()?;

        self.store.connection.connected = connected;
        self.render();
        self.load_all().await?;
        Ok(true)
    }

    fn checkpoint(&self) -> std::result::Result<(), SessionHalted> {
        self.client.guard().ensure_active()
    }

    fn render(&mut self) {
        if self.is_halted() {
            return;
        }
        let view = view::project(&self.store);
        self.renderer.render(&view);
    }
}

impl std::fmt::Debug for Dashboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dashboard")
            .field("client", &self.client)
            .field("store", &self.store)
            .finish()
    }
}
