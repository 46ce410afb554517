use serde::{Deserialize, Serialize};

/// The step type the chat history uses for messages typed by the user.
pub const USER_MESSAGE_STEP: &str = "user_message";

/// One step of a chat's server-side history.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HistoryStep {
    /// The kind of step, e.g. `user_message`.
    pub step_type: String,
    /// The text of the step. Tool steps may not have any.
    pub content: Option<String>,
    /// When the step was recorded.
    pub created_at: String,
}

impl HistoryStep {
    /// Returns `true` if the step is a message typed by the user.
    #[inline]
    pub fn is_user_message(&self) -> bool {
        self.step_type == USER_MESSAGE_STEP
    }
}
