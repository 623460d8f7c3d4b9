//! Error types for component business logic

use thiserror::Error;

use crate::id::ActionId;

/// Failure raised by a component's own logic
#[derive(Debug, Clone, Error)]
pub enum ComponentError {
    /// An action handler failed; no navigation is attempted for the call
    #[error("action '{action}' failed: {message}")]
    ActionFailed {
        /// The failing action
        action: ActionId,
        /// What went wrong
        message: String,
    },

    /// A component rejected an action it does not declare
    #[error("component does not handle action '{0}'")]
    UnknownAction(ActionId),

    /// The post-construction hook failed
    #[error("post-construct failed: {0}")]
    PostConstruct(String),
}

impl ComponentError {
    /// Convenience constructor for a failing action
    pub fn action_failed(action: impl Into<ActionId>, message: impl Into<String>) -> Self {
        Self::ActionFailed {
            action: action.into(),
            message: message.into(),
        }
    }
}
