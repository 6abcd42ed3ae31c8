//! Contract for the remote conversation-state service (assistants, threads, messages, runs).

use crate::error::CoreResult;
use crate::types::{AssistantSpec, FileObject, Run, RunStep, ThreadMessage};
use async_trait::async_trait;

/// Remote assistant backend. Every method is one remote call; implementations map transport,
/// auth, and rate-limit failures to `CoreError::Backend`.
#[async_trait]
pub trait AssistantBackend: Send + Sync {
    /// Create a knowledge-base bound assistant; returns its id.
    async fn create_assistant(&self, spec: &AssistantSpec) -> CoreResult<String>;

    /// Create an empty thread; returns its id.
    async fn create_thread(&self) -> CoreResult<String>;

    /// Append a user message to a thread.
    async fn add_user_message(&self, thread_id: &str, content: &str) -> CoreResult<()>;

    /// Start a run of `assistant_id` on `thread_id`.
    async fn create_run(&self, thread_id: &str, assistant_id: &str) -> CoreResult<Run>;

    async fn retrieve_run(&self, thread_id: &str, run_id: &str) -> CoreResult<Run>;

    /// Messages on the thread, newest first.
    async fn list_messages(&self, thread_id: &str) -> CoreResult<Vec<ThreadMessage>>;

    async fn retrieve_file(&self, file_id: &str) -> CoreResult<FileObject>;

    async fn list_run_steps(&self, thread_id: &str, run_id: &str) -> CoreResult<Vec<RunStep>>;

    /// Backend label for logs.
    fn name(&self) -> &str {
        "unknown"
    }
}
