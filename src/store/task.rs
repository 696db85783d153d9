use serde::{Deserialize, Serialize};

/// Author stamp attached to a task. The storage service nests this under
/// `created_by`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskAuthor {
    pub name: String,
}

/// A task as the storage service returns it. The schema is owned by that
/// service; fields it may omit are defaulted rather than rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub scheduled_for: String,
    #[serde(default)]
    pub solved: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<TaskAuthor>,
}

/// Creation payload forwarded to the storage service. The client supplies
/// the id; the gateway fills in `created_by` from the authenticated user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTask {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub scheduled_for: String,
    #[serde(default)]
    pub solved: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<TaskAuthor>,
}

/// Partial update; only the supplied fields are forwarded upstream.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solved: Option<bool>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.solved.is_none()
    }
}
