//! Page-session state and orchestration for the finance dashboard.
//!
//! [`Dashboard`] owns the [`DashboardStore`] for one page load, drives every
//! request through [`api_client::ApiClient`], and hands a freshly projected
//! [`DashboardView`] to the [`Renderer`] after each change.

pub mod dashboard;
pub mod error;
pub mod render;
pub mod store;
pub mod view;

pub use dashboard::Dashboard;
pub use error::{DashboardError, Result};
pub use render::{Confirm, NullRenderer, Renderer};
pub use store::{DashboardStore, DataSource, DataSources, GoalEditor, GoalEntry, GoalField, GoalForm, GoalId};
pub use view::{project, DashboardView};
