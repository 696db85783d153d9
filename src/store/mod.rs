pub mod client;
pub mod task;

pub use client::{StoreError, TaskStore};
pub use task::{NewTask, Task, TaskAuthor, TaskPatch};
