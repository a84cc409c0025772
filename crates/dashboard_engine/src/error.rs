use api_client::SessionHalted;
use thiserror::Error;

use crate::store::GoalId;

pub type Result<T> = std::result::Result<T, DashboardError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DashboardError {
    /// The session was rejected; the page load is over.
    #[error(transparent)]
    Halted(#[from] SessionHalted),

    /// User input failed validation. Nothing was submitted or changed.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Goal not found: {0}")]
    UnknownGoal(GoalId),
}

impl DashboardError {
    pub fn is_halted(&self) -> bool {
        matches!(self, DashboardError::Halted(_))
    }
}
