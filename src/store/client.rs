use std::sync::OnceLock;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;

use super::task::{NewTask, Task, TaskPatch};
use crate::config;

/// Errors from the task storage client
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("request to task store failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("task not found in task store")]
    NotFound,

    #[error("task store returned status {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("task store response decode failed: {0}")]
    Decode(#[from] serde_json::Error),
}

/// HTTP client for the external task storage service.
///
/// Stateless apart from the connection pool; one instance serves the whole
/// process.
pub struct TaskStore {
    base_url: String,
    http: Client,
}

impl TaskStore {
    /// Process-wide client, built once from configuration.
    pub fn instance() -> &'static TaskStore {
        static INSTANCE: OnceLock<TaskStore> = OnceLock::new();
        INSTANCE.get_or_init(|| {
            let store = &config::config().store;
            TaskStore::new(
                &store.base_url,
                Duration::from_secs(store.request_timeout_secs),
            )
        })
    }

    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        }
    }

    /// GET {base}/tasks - fetch all tasks
    pub async fn list(&self) -> Result<Vec<Task>, StoreError> {
        let response = self
            .http
            .get(format!("{}/tasks", self.base_url))
            .send()
            .await?;
        Self::read_json(response).await
    }

    /// POST {base}/task - create a task
    pub async fn create(&self, task: &NewTask) -> Result<Task, StoreError> {
        let response = self
            .http
            .post(format!("{}/task", self.base_url))
            .json(task)
            .send()
            .await?;
        Self::read_json(response).await
    }

    /// PATCH {base}/task/:id - apply a partial update to a task
    pub async fn update(&self, id: i64, patch: &TaskPatch) -> Result<Task, StoreError> {
        let response = self
            .http
            .patch(format!("{}/task/{}", self.base_url, id))
            .json(patch)
            .send()
            .await?;
        Self::read_json(response).await
    }

    /// Reachability probe used by the health endpoint.
    pub async fn ping(&self) -> Result<(), StoreError> {
        self.list().await.map(|_| ())
    }

    async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, StoreError> {
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}
