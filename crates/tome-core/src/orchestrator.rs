//! **Conversation Orchestrator**: one turn against the hosted assistant.
//!
//! Resolve assistant → resolve thread → append message → create run → poll → read the newest
//! assistant reply → resolve cited document names → strip citation markers.

use crate::assistant::AssistantHandle;
use crate::backend::AssistantBackend;
use crate::citation::strip_citations;
use crate::config::CoreConfig;
use crate::error::{CoreError, CoreResult};
use crate::run_state::{next_step, PollClock, PollPolicy, PollStep, RunPhase, TokioClock};
use crate::types::{Answer, Run, StepDetails, ThreadMessage};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Substituted when the thread has no assistant message after a completed run.
pub const NO_REPLY_FALLBACK: &str = "I wasn't able to find an answer to that. Please try asking again.";
/// Substituted when the reply carries no readable text.
pub const EMPTY_REPLY_FALLBACK: &str = "I found something, but couldn't put it into words. Please try rephrasing your question.";

pub struct Orchestrator {
    backend: Arc<dyn AssistantBackend>,
    clock: Arc<dyn PollClock>,
    assistant: AssistantHandle,
    policy: PollPolicy,
}

impl Orchestrator {
    pub fn new(backend: Arc<dyn AssistantBackend>, assistant: AssistantHandle) -> Self {
        Self {
            backend,
            clock: Arc::new(TokioClock),
            assistant,
            policy: PollPolicy::default(),
        }
    }

    /// Build from configuration with the default assistant prompt.
    pub fn from_config(backend: Arc<dyn AssistantBackend>, config: &CoreConfig) -> Self {
        let spec = AssistantHandle::default_spec(config.model.clone(), config.vector_store_id.clone());
        Self::new(backend, AssistantHandle::new(config.assistant_id.clone(), spec))
            .with_policy(config.poll_policy())
    }

    pub fn with_policy(mut self, policy: PollPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn PollClock>) -> Self {
        self.clock = clock;
        self
    }

    /// Currently resolved assistant id, if any.
    pub async fn assistant_id(&self) -> Option<String> {
        self.assistant.current().await
    }

    /// Force a new assistant for all later turns.
    pub async fn recreate_assistant(&self) -> CoreResult<String> {
        self.assistant.recreate(self.backend.as_ref()).await
    }

    /// Answer `message`, continuing `existing_thread` when given.
    pub async fn answer(&self, message: &str, existing_thread: Option<&str>) -> CoreResult<Answer> {
        let message = message.trim();
        if message.is_empty() {
            return Err(CoreError::InvalidInput("message must not be empty".to_string()));
        }

        let assistant_id = self.assistant.resolve(self.backend.as_ref()).await?;

        let thread_id = match existing_thread.map(str::trim).filter(|t| !t.is_empty()) {
            Some(id) => id.to_string(),
            None => {
                let id = self.backend.create_thread().await?;
                debug!(target: "tome::orchestrator", thread_id = %id, "Created thread");
                id
            }
        };

        // Message must land before the run starts.
        self.backend.add_user_message(&thread_id, message).await?;
        let run = self.backend.create_run(&thread_id, &assistant_id).await?;
        info!(
            target: "tome::orchestrator",
            thread_id = %thread_id,
            run_id = %run.id,
            backend = self.backend.name(),
            budget_ms = self.policy.budget().as_millis() as u64,
            "Run submitted"
        );

        let run = self.await_completion(&thread_id, &run.id).await?;

        let messages = self.backend.list_messages(&thread_id).await?;
        let (raw_text, cited) = match select_reply(&messages, &run.id) {
            Some(reply) => match reply.first_text() {
                Some(text) if !text.value.trim().is_empty() => (text.value.clone(), text.cited_file_ids()),
                _ => (EMPTY_REPLY_FALLBACK.to_string(), Vec::new()),
            },
            None => {
                warn!(target: "tome::orchestrator", run_id = %run.id, "No assistant message after completed run");
                (NO_REPLY_FALLBACK.to_string(), Vec::new())
            }
        };

        let sources = self.resolve_sources(&cited).await;
        let tools_used = self.tools_used(&thread_id, &run.id).await;
        let text = strip_citations(&raw_text).into_owned();

        Ok(Answer {
            text,
            thread_id,
            run_id: run.id,
            sources,
            tools_used,
        })
    }

    /// Poll the run at the fixed cadence until it leaves `Pending` or the cap is hit.
    async fn await_completion(&self, thread_id: &str, run_id: &str) -> CoreResult<Run> {
        let mut attempt = 0u32;
        loop {
            self.clock.wait(self.policy.interval).await;
            attempt += 1;
            let run = self.backend.retrieve_run(thread_id, run_id).await?;
            let phase = RunPhase::from_status(&run.status);
            match next_step(phase, run.failure_reason(), attempt, &self.policy) {
                PollStep::Continue => {
                    debug!(target: "tome::orchestrator", run_id, attempt, status = %run.status, "Run pending");
                }
                PollStep::Done => {
                    debug!(target: "tome::orchestrator", run_id, attempt, "Run completed");
                    return Ok(run);
                }
                PollStep::Abort { phase, reason } => {
                    warn!(target: "tome::orchestrator", run_id, %phase, %reason, "Run did not complete");
                    return Err(CoreError::RunFailed { phase, reason });
                }
                PollStep::TimedOut => {
                    warn!(target: "tome::orchestrator", run_id, attempt, "Run polling budget exhausted");
                    return Err(CoreError::Timeout {
                        attempts: attempt,
                        waited: self.policy.interval.saturating_mul(attempt),
                    });
                }
            }
        }
    }

    /// Look up document names for cited ids. Failed lookups are skipped; names are deduplicated.
    async fn resolve_sources(&self, file_ids: &[String]) -> Vec<String> {
        let mut sources: Vec<String> = Vec::new();
        for file_id in file_ids {
            match self.backend.retrieve_file(file_id).await {
                Ok(file) => {
                    let name = file.filename.trim().to_string();
                    if !name.is_empty() && !sources.contains(&name) {
                        sources.push(name);
                    }
                }
                Err(e) => {
                    warn!(target: "tome::orchestrator", file_id = %file_id, error = %e, "Citation lookup failed; skipping");
                }
            }
        }
        sources
    }

    /// Distinct tool kinds from the run's steps. Diagnostics only: failures yield an empty list.
    async fn tools_used(&self, thread_id: &str, run_id: &str) -> Vec<String> {
        match self.backend.list_run_steps(thread_id, run_id).await {
            Ok(steps) => {
                let mut kinds: Vec<String> = Vec::new();
                for step in steps {
                    if let StepDetails::ToolCalls { tool_calls } = step.step_details {
                        for call in tool_calls {
                            if !kinds.contains(&call.kind) {
                                kinds.push(call.kind);
                            }
                        }
                    }
                }
                kinds
            }
            Err(e) => {
                warn!(target: "tome::orchestrator", run_id, error = %e, "Run step listing failed");
                Vec::new()
            }
        }
    }
}

/// Newest assistant message produced by `run_id`, else the newest assistant message.
/// `messages` is newest first.
fn select_reply<'a>(messages: &'a [ThreadMessage], run_id: &str) -> Option<&'a ThreadMessage> {
    messages
        .iter()
        .find(|m| m.is_assistant() && m.run_id.as_deref() == Some(run_id))
        .or_else(|| messages.iter().find(|m| m.is_assistant()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(role: &str, run_id: Option<&str>, text: &str) -> ThreadMessage {
        serde_json::from_value(serde_json::json!({
            "id": format!("msg_{}", text),
            "role": role,
            "run_id": run_id,
            "content": [ { "type": "text", "text": { "value": text, "annotations": [] } } ]
        }))
        .unwrap()
    }

    #[test]
    fn selects_reply_for_current_run_first() {
        let messages = vec![
            msg("user", None, "q2"),
            msg("assistant", Some("run_old"), "stale"),
            msg("assistant", Some("run_new"), "fresh"),
        ];
        let reply = select_reply(&messages, "run_new").unwrap();
        assert_eq!(reply.first_text().unwrap().value, "fresh");
    }

    #[test]
    fn falls_back_to_newest_assistant_message() {
        let messages = vec![
            msg("user", None, "q"),
            msg("assistant", None, "newest"),
            msg("assistant", None, "older"),
        ];
        let reply = select_reply(&messages, "run_x").unwrap();
        assert_eq!(reply.first_text().unwrap().value, "newest");
        assert!(select_reply(&[msg("user", None, "q")], "run_x").is_none());
    }
}
