pub mod id;
pub mod task;
pub mod user;

use serde::{Deserialize, Serialize};

pub use id::RecordId;
pub use task::{NewTask, Task, TaskDraft, TaskPatch, TaskPayload, TaskUpdatedResponse};
pub use user::{NewUser, PublicUser, Role, User};

/// Body of responses that only confirm an action.
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
