//! Process-wide assistant handle: configured verbatim, or created once and memoized.

use crate::backend::AssistantBackend;
use crate::error::CoreResult;
use crate::types::AssistantSpec;
use tokio::sync::Mutex;
use tracing::info;

pub const ASSISTANT_NAME: &str = "Tome Librarian";

pub const ASSISTANT_INSTRUCTIONS: &str = "You are a knowledgeable reading companion. \
Answer questions using the documents in your knowledge base, searching them before you answer. \
Quote or paraphrase the relevant passages and say which document they come from. \
If the documents do not cover the question, say so plainly instead of guessing. \
Keep answers conversational and concise; they may be read aloud.";

/// Resolves the assistant handle for every turn.
///
/// A configured id seeds the slot and is used as-is. Otherwise the first caller creates the
/// assistant while holding the lock, so concurrent first turns share one remote assistant;
/// the id then lives for the rest of the process unless `recreate` replaces it.
pub struct AssistantHandle {
    spec: AssistantSpec,
    slot: Mutex<Option<String>>,
}

impl AssistantHandle {
    pub fn new(configured: Option<String>, spec: AssistantSpec) -> Self {
        let configured = configured
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty());
        Self {
            spec,
            slot: Mutex::new(configured),
        }
    }

    /// The default prompt and name with the given model and knowledge base.
    pub fn default_spec(model: impl Into<String>, vector_store_id: impl Into<String>) -> AssistantSpec {
        AssistantSpec {
            name: ASSISTANT_NAME.to_string(),
            model: model.into(),
            instructions: ASSISTANT_INSTRUCTIONS.to_string(),
            vector_store_id: vector_store_id.into(),
        }
    }

    /// Current id without any remote call.
    pub async fn current(&self) -> Option<String> {
        self.slot.lock().await.clone()
    }

    pub async fn resolve(&self, backend: &dyn AssistantBackend) -> CoreResult<String> {
        let mut slot = self.slot.lock().await;
        if let Some(id) = slot.as_ref() {
            return Ok(id.clone());
        }
        let id = backend.create_assistant(&self.spec).await?;
        info!(
            target: "tome::orchestrator",
            assistant_id = %id,
            vector_store_id = %self.spec.vector_store_id,
            "Created assistant"
        );
        *slot = Some(id.clone());
        Ok(id)
    }

    /// Create a fresh assistant and make it the handle for all later turns, replacing a
    /// configured id as well. On failure the previous handle stays in place.
    pub async fn recreate(&self, backend: &dyn AssistantBackend) -> CoreResult<String> {
        let mut slot = self.slot.lock().await;
        let id = backend.create_assistant(&self.spec).await?;
        info!(
            target: "tome::orchestrator",
            assistant_id = %id,
            previous = ?slot.as_deref(),
            "Recreated assistant"
        );
        *slot = Some(id.clone());
        Ok(id)
    }
}
