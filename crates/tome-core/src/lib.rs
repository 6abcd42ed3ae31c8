//! tome-core: grounded conversation orchestration over a hosted assistant backend.
//!
//! One turn = resolve the knowledge-base bound assistant, reuse or create a thread, submit the
//! message, poll the run to a terminal state, then read the reply with its cited sources and
//! strip citation markers for display.

pub mod assistant;
pub mod backend;
pub mod citation;
pub mod config;
pub mod error;
pub mod openai;
pub mod orchestrator;
pub mod run_state;
pub mod types;

pub use assistant::{AssistantHandle, ASSISTANT_INSTRUCTIONS, ASSISTANT_NAME};
pub use backend::AssistantBackend;
pub use citation::{has_citations, strip_citations};
pub use config::{CoreConfig, DEFAULT_VECTOR_STORE_ID};
pub use error::{CoreError, CoreResult};
pub use openai::OpenAiAssistants;
pub use orchestrator::{Orchestrator, EMPTY_REPLY_FALLBACK, NO_REPLY_FALLBACK};
pub use run_state::{next_step, PollClock, PollPolicy, PollStep, RunPhase, TokioClock};
pub use types::{Answer, AssistantSpec, FileObject, Run, RunStep, ThreadMessage};
