//! Wire types exchanged with the hosted assistant backend, and the `Answer` produced per turn.

use serde::{Deserialize, Serialize};

/// A run as reported by the backend.
#[derive(Debug, Clone, Deserialize)]
pub struct Run {
    pub id: String,
    #[serde(default)]
    pub thread_id: Option<String>,
    pub status: String,
    #[serde(default)]
    pub last_error: Option<RunError>,
    #[serde(default)]
    pub incomplete_details: Option<IncompleteDetails>,
}

impl Run {
    /// Upstream-reported reason for a non-success terminal state, if any.
    pub fn failure_reason(&self) -> Option<&str> {
        self.last_error
            .as_ref()
            .map(|e| e.message.as_str())
            .or_else(|| self.incomplete_details.as_ref().and_then(|d| d.reason.as_deref()))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RunError {
    #[serde(default)]
    pub code: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IncompleteDetails {
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObjectId {
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListResponse<T> {
    pub data: Vec<T>,
}

/// A single message on a thread.
#[derive(Debug, Clone, Deserialize)]
pub struct ThreadMessage {
    #[serde(default)]
    pub id: String,
    pub role: String,
    #[serde(default)]
    pub run_id: Option<String>,
    #[serde(default)]
    pub content: Vec<MessageContent>,
}

impl ThreadMessage {
    pub fn is_assistant(&self) -> bool {
        self.role == "assistant"
    }

    /// The first textual block, if any.
    pub fn first_text(&self) -> Option<&TextContent> {
        self.content.iter().find_map(|c| match c {
            MessageContent::Text { text } => Some(text),
            MessageContent::Other => None,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageContent {
    Text { text: TextContent },
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TextContent {
    pub value: String,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
}

impl TextContent {
    /// Distinct cited file ids, in first-seen order.
    pub fn cited_file_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = Vec::new();
        for annotation in &self.annotations {
            if let Annotation::FileCitation { file_citation } = annotation {
                if !ids.iter().any(|id| id == &file_citation.file_id) {
                    ids.push(file_citation.file_id.clone());
                }
            }
        }
        ids
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Annotation {
    FileCitation { file_citation: FileCitation },
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FileCitation {
    pub file_id: String,
}

/// Metadata for an uploaded knowledge-base document.
#[derive(Debug, Clone, Deserialize)]
pub struct FileObject {
    pub id: String,
    pub filename: String,
}

/// One execution step of a run.
#[derive(Debug, Clone, Deserialize)]
pub struct RunStep {
    pub step_details: StepDetails,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StepDetails {
    ToolCalls {
        #[serde(default)]
        tool_calls: Vec<ToolCall>,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ToolCall {
    #[serde(rename = "type")]
    pub kind: String,
}

/// Parameters for creating the knowledge-base bound assistant.
#[derive(Debug, Clone, Serialize)]
pub struct AssistantSpec {
    pub name: String,
    pub model: String,
    pub instructions: String,
    pub vector_store_id: String,
}

/// Finalized reply for one turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Answer {
    pub text: String,
    pub thread_id: String,
    pub run_id: String,
    pub sources: Vec<String>,
    pub tools_used: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_message_with_citations_and_unknown_blocks() {
        let raw = serde_json::json!({
            "id": "msg_1",
            "role": "assistant",
            "run_id": "run_1",
            "content": [
                { "type": "image_file", "image_file": { "file_id": "img" } },
                { "type": "text", "text": {
                    "value": "Answer【4:0†a.pdf】【4:1†a.pdf】",
                    "annotations": [
                        { "type": "file_citation", "text": "【4:0†a.pdf】", "file_citation": { "file_id": "file-a" } },
                        { "type": "file_citation", "text": "【4:1†a.pdf】", "file_citation": { "file_id": "file-a" } },
                        { "type": "file_path", "text": "x", "file_path": { "file_id": "file-b" } }
                    ]
                } }
            ]
        });
        let msg: ThreadMessage = serde_json::from_value(raw).unwrap();
        assert!(msg.is_assistant());
        let text = msg.first_text().unwrap();
        assert!(text.value.starts_with("Answer"));
        assert_eq!(text.cited_file_ids(), vec!["file-a".to_string()]);
    }

    #[test]
    fn run_reason_prefers_last_error() {
        let run: Run = serde_json::from_value(serde_json::json!({
            "id": "run_1",
            "status": "incomplete",
            "last_error": null,
            "incomplete_details": { "reason": "max_completion_tokens" }
        }))
        .unwrap();
        assert_eq!(run.failure_reason(), Some("max_completion_tokens"));

        let run: Run = serde_json::from_value(serde_json::json!({
            "id": "run_2",
            "status": "failed",
            "last_error": { "code": "server_error", "message": "Something went wrong" }
        }))
        .unwrap();
        assert_eq!(run.failure_reason(), Some("Something went wrong"));
    }

    #[test]
    fn parses_tool_call_steps() {
        let steps: ListResponse<RunStep> = serde_json::from_value(serde_json::json!({
            "data": [
                { "step_details": { "type": "tool_calls", "tool_calls": [ { "id": "c1", "type": "file_search", "file_search": {} } ] } },
                { "step_details": { "type": "message_creation", "message_creation": { "message_id": "m" } } }
            ]
        }))
        .unwrap();
        assert_eq!(steps.data.len(), 2);
        assert!(matches!(&steps.data[1].step_details, StepDetails::Other));
    }
}
