//! Hosted assistant backend: OpenAI Assistants API (v2) over reqwest.

use crate::backend::AssistantBackend;
use crate::error::{CoreError, CoreResult};
use crate::types::{AssistantSpec, FileObject, ListResponse, ObjectId, Run, RunStep, ThreadMessage};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
const ASSISTANTS_BETA: &str = "assistants=v2";
const MESSAGE_PAGE_LIMIT: u32 = 20;

#[derive(Serialize)]
struct CreateAssistantRequest<'a> {
    name: &'a str,
    model: &'a str,
    instructions: &'a str,
    tools: Vec<ToolSpec>,
    tool_resources: ToolResources<'a>,
}

#[derive(Serialize)]
struct ToolSpec {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Serialize)]
struct ToolResources<'a> {
    file_search: FileSearchResources<'a>,
}

#[derive(Serialize)]
struct FileSearchResources<'a> {
    vector_store_ids: Vec<&'a str>,
}

#[derive(Serialize)]
struct CreateMessageRequest<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct CreateRunRequest<'a> {
    assistant_id: &'a str,
}

/// Client for the hosted assistants service.
#[derive(Debug, Clone)]
pub struct OpenAiAssistants {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl OpenAiAssistants {
    /// Create a client with an explicit key. `base_url` has no trailing slash requirement.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> CoreResult<Self> {
        let api_key = api_key.into().trim().to_string();
        if api_key.is_empty() {
            return Err(CoreError::Config(
                "assistant backend requires OPENAI_API_KEY".to_string(),
            ));
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> CoreResult<T> {
        let res = self
            .client
            .get(self.url(path))
            .bearer_auth(&self.api_key)
            .header("OpenAI-Beta", ASSISTANTS_BETA)
            .send()
            .await?;
        Self::decode(res).await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> CoreResult<T> {
        let res = self
            .client
            .post(self.url(path))
            .bearer_auth(&self.api_key)
            .header("OpenAI-Beta", ASSISTANTS_BETA)
            .json(body)
            .send()
            .await?;
        Self::decode(res).await
    }

    async fn decode<T: DeserializeOwned>(res: reqwest::Response) -> CoreResult<T> {
        let status = res.status();
        let text = res.text().await?;
        if !status.is_success() {
            return Err(CoreError::backend(Some(status.as_u16()), upstream_message(&text)));
        }
        serde_json::from_str(&text)
            .map_err(|e| CoreError::backend(None, format!("malformed backend response: {}", e)))
    }
}

/// Pull `error.message` out of an upstream error body, else the raw body.
fn upstream_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.pointer("/error/message").and_then(|m| m.as_str()).map(String::from))
        .unwrap_or_else(|| body.trim().to_string())
}

#[async_trait]
impl AssistantBackend for OpenAiAssistants {
    async fn create_assistant(&self, spec: &AssistantSpec) -> CoreResult<String> {
        let body = CreateAssistantRequest {
            name: &spec.name,
            model: &spec.model,
            instructions: &spec.instructions,
            tools: vec![ToolSpec { kind: "file_search" }],
            tool_resources: ToolResources {
                file_search: FileSearchResources {
                    vector_store_ids: vec![spec.vector_store_id.as_str()],
                },
            },
        };
        let created: ObjectId = self.post("assistants", &body).await?;
        Ok(created.id)
    }

    async fn create_thread(&self) -> CoreResult<String> {
        let created: ObjectId = self.post("threads", &serde_json::json!({})).await?;
        Ok(created.id)
    }

    async fn add_user_message(&self, thread_id: &str, content: &str) -> CoreResult<()> {
        let body = CreateMessageRequest { role: "user", content };
        let _: ObjectId = self
            .post(&format!("threads/{}/messages", thread_id), &body)
            .await?;
        Ok(())
    }

    async fn create_run(&self, thread_id: &str, assistant_id: &str) -> CoreResult<Run> {
        let body = CreateRunRequest { assistant_id };
        self.post(&format!("threads/{}/runs", thread_id), &body).await
    }

    async fn retrieve_run(&self, thread_id: &str, run_id: &str) -> CoreResult<Run> {
        self.get(&format!("threads/{}/runs/{}", thread_id, run_id)).await
    }

    async fn list_messages(&self, thread_id: &str) -> CoreResult<Vec<ThreadMessage>> {
        let page: ListResponse<ThreadMessage> = self
            .get(&format!(
                "threads/{}/messages?order=desc&limit={}",
                thread_id, MESSAGE_PAGE_LIMIT
            ))
            .await?;
        Ok(page.data)
    }

    async fn retrieve_file(&self, file_id: &str) -> CoreResult<FileObject> {
        self.get(&format!("files/{}", file_id)).await
    }

    async fn list_run_steps(&self, thread_id: &str, run_id: &str) -> CoreResult<Vec<RunStep>> {
        let page: ListResponse<RunStep> = self
            .get(&format!("threads/{}/runs/{}/steps", thread_id, run_id))
            .await?;
        Ok(page.data)
    }

    fn name(&self) -> &str {
        "openai-assistants"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_blank_key() {
        let err = OpenAiAssistants::new(DEFAULT_API_BASE, "   ").unwrap_err();
        assert!(matches!(err, CoreError::Config(_)));
    }

    #[test]
    fn joins_paths_without_double_slashes() {
        let client = OpenAiAssistants::new("https://api.example.com/v1/", "sk-test").unwrap();
        assert_eq!(client.url("/threads"), "https://api.example.com/v1/threads");
        assert_eq!(client.url("files/f1"), "https://api.example.com/v1/files/f1");
        assert_eq!(client.name(), "openai-assistants");
    }

    #[test]
    fn extracts_upstream_error_message() {
        let body = r#"{"error":{"message":"No thread found with id 'thread_x'.","type":"invalid_request_error"}}"#;
        assert_eq!(upstream_message(body), "No thread found with id 'thread_x'.");
        assert_eq!(upstream_message("  gateway timeout "), "gateway timeout");
    }

    #[test]
    fn assistant_request_binds_vector_store() {
        let body = CreateAssistantRequest {
            name: "n",
            model: "m",
            instructions: "i",
            tools: vec![ToolSpec { kind: "file_search" }],
            tool_resources: ToolResources {
                file_search: FileSearchResources { vector_store_ids: vec!["vs_1"] },
            },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["tools"][0]["type"], "file_search");
        assert_eq!(json["tool_resources"]["file_search"]["vector_store_ids"][0], "vs_1");
    }
}
