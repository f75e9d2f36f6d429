//! OpenAI-compatible chat-completions backend.

use crate::model::{
    Backend, Message, ModelError, ModelRequest, ModelResponse, Part, Role, ToolCall, ToolResult,
    ToolSpec, Usage,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

const OPENAI_BASE_URL: &str = "https://api.openai.com";

// ─────────────────────────────────────────────────────────────────────────────
// API Wire Types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ApiRequest {
    model: String,
    temperature: f32,
    messages: Vec<ApiMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<ApiTool>,
}

#[derive(Debug, Serialize)]
struct ApiMessage {
    role: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tool_calls: Vec<ApiToolCall>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiToolCall {
    id: String,
    #[serde(rename = "type")]
    kind: String,
    function: ApiFunctionCall,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiFunctionCall {
    name: String,
    // The chat-completions protocol carries arguments as a JSON-encoded string.
    arguments: String,
}

#[derive(Debug, Serialize)]
struct ApiTool {
    #[serde(rename = "type")]
    kind: &'static str,
    function: ApiFunction,
}

#[derive(Debug, Serialize)]
struct ApiFunction {
    name: String,
    description: String,
    parameters: Value,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    choices: Vec<ApiChoice>,
    #[serde(default)]
    usage: ApiUsage,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ApiChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ApiChoiceMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Vec<ApiToolCall>,
}

#[derive(Debug, Default, Deserialize)]
struct ApiUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

// ─────────────────────────────────────────────────────────────────────────────
// Backend Implementation
// ─────────────────────────────────────────────────────────────────────────────

/// Builder for creating an OpenAI-compatible backend.
#[derive(Debug, Clone)]
pub struct OpenAiBackendBuilder {
    api_key: String,
    model: String,
    temperature: f32,
    base_url: String,
}

impl OpenAiBackendBuilder {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            temperature: 0.0,
            base_url: OPENAI_BASE_URL.to_string(),
        }
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Override the base URL (compatible providers, tests).
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn build(self) -> OpenAiBackend {
        OpenAiBackend {
            client: reqwest::Client::new(),
            api_key: self.api_key,
            model: self.model,
            temperature: self.temperature,
            base_url: self.base_url,
        }
    }
}

/// Backend speaking the OpenAI chat-completions wire format.
pub struct OpenAiBackend {
    client: reqwest::Client,
    api_key: String,
    model: String,
    temperature: f32,
    base_url: String,
}

impl OpenAiBackend {
    pub fn builder(
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> OpenAiBackendBuilder {
        OpenAiBackendBuilder::new(api_key, model)
    }

    fn role_to_api(role: Role) -> &'static str {
        match role {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }

    /// Flatten a transcript message into wire messages.
    ///
    /// Tool-result parts become individual `role:"tool"` messages; text and
    /// tool-call parts stay together under the message's own role.
    fn message_to_api(msg: &Message) -> Vec<ApiMessage> {
        let role = Self::role_to_api(msg.role);

        let mut text = String::new();
        let mut tool_calls = Vec::new();
        let mut results = Vec::new();

        for part in &msg.parts {
            match part {
                Part::Text(t) => text.push_str(t),
                Part::ToolCall(call) => tool_calls.push(ApiToolCall {
                    id: call.id.clone(),
                    kind: "function".to_string(),
                    function: ApiFunctionCall {
                        name: call.name.clone(),
                        arguments: call.input.to_string(),
                    },
                }),
                Part::ToolResult(result) => results.push(Self::result_to_api(result)),
            }
        }

        let mut messages = Vec::new();
        if !text.is_empty() || !tool_calls.is_empty() {
            messages.push(ApiMessage {
                role,
                content: if text.is_empty() { None } else { Some(text) },
                tool_calls,
                tool_call_id: None,
            });
        }
        messages.extend(results);
        messages
    }

    fn result_to_api(result: &ToolResult) -> ApiMessage {
        let (tool_call_id, content) = match result {
            ToolResult::Success {
                tool_call_id,
                output,
            } => {
                let content = match output {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (tool_call_id.clone(), content)
            }
            ToolResult::Failure {
                tool_call_id,
                error,
            } => (tool_call_id.clone(), error.to_string()),
        };

        ApiMessage {
            role: "tool",
            content: Some(content),
            tool_calls: Vec::new(),
            tool_call_id: Some(tool_call_id),
        }
    }

    fn tool_to_api(spec: &ToolSpec) -> ApiTool {
        ApiTool {
            kind: "function",
            function: ApiFunction {
                name: spec.name.clone(),
                description: spec.description.clone(),
                parameters: spec.schema.clone(),
            },
        }
    }

    fn choice_to_message(choice: ApiChoiceMessage) -> Result<Message, ModelError> {
        let mut parts = Vec::new();

        if let Some(content) = choice.content {
            if !content.is_empty() {
                parts.push(Part::Text(content));
            }
        }

        for call in choice.tool_calls {
            let input: Value = serde_json::from_str(&call.function.arguments)
                .map_err(|e| ModelError::InvalidResponse(format!("tool arguments: {e}")))?;
            parts.push(Part::ToolCall(ToolCall {
                id: call.id,
                name: call.function.name,
                input,
            }));
        }

        Ok(Message {
            role: Role::Assistant,
            parts,
        })
    }
}

impl std::fmt::Display for OpenAiBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "openai({})", self.model)
    }
}

impl Backend for OpenAiBackend {
    async fn call(&self, request: ModelRequest<'_>) -> Result<ModelResponse, ModelError> {
        let api_messages: Vec<ApiMessage> = request
            .messages
            .iter()
            .flat_map(Self::message_to_api)
            .collect();

        let tools: Vec<ApiTool> = request.tools.iter().map(Self::tool_to_api).collect();

        let api_request = ApiRequest {
            model: self.model.clone(),
            temperature: self.temperature,
            messages: api_messages,
            tools,
        };

        let url = format!("{}/v1/chat/completions", self.base_url);
        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("content-type", "application/json")
            .header("accept", "application/json")
            .json(&api_request)
            .send()
            .await
            .map_err(|e| ModelError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ModelError::Api(format!("{status}: {body}")));
        }

        let api_response: ApiResponse = response
            .json()
            .await
            .map_err(|e| ModelError::InvalidResponse(e.to_string()))?;

        let choice = api_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ModelError::InvalidResponse("no choices in response".into()))?;

        let message = Self::choice_to_message(choice.message)?;
        let usage = Usage {
            input_tokens: api_response.usage.prompt_tokens,
            output_tokens: api_response.usage.completion_tokens,
        };

        Ok(ModelResponse { message, usage })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn transcript_flattens_to_wire_messages() {
        let messages = vec![
            Message::system("sys"),
            Message::user("hi"),
            Message {
                role: Role::Assistant,
                parts: vec![Part::ToolCall(ToolCall {
                    id: "call_1".into(),
                    name: "get_weather".into(),
                    input: json!({"city": "Paris", "country_code": "FR"}),
                })],
            },
            Message::tool_results(vec![ToolResult::success(
                "call_1",
                Value::String("clear sky".into()),
            )]),
        ];

        let wire: Vec<ApiMessage> = messages.iter().flat_map(OpenAiBackend::message_to_api).collect();
        assert_eq!(wire.len(), 4);
        assert_eq!(wire[0].role, "system");
        assert_eq!(wire[1].role, "user");
        assert_eq!(wire[2].role, "assistant");
        assert_eq!(wire[2].tool_calls.len(), 1);
        assert_eq!(wire[2].tool_calls[0].function.name, "get_weather");
        assert_eq!(wire[3].role, "tool");
        assert_eq!(wire[3].tool_call_id.as_deref(), Some("call_1"));
        assert_eq!(wire[3].content.as_deref(), Some("clear sky"));
    }

    #[test]
    fn failure_results_carry_the_error_description() {
        let result = ToolResult::failure(
            "call_9",
            crate::tools::ToolError::Execution("upstream returned 404".into()),
        );
        let wire = OpenAiBackend::result_to_api(&result);
        assert_eq!(wire.role, "tool");
        assert!(wire.content.as_deref().unwrap().contains("upstream returned 404"));
    }

    #[tokio::test]
    async fn text_response_decodes() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("Authorization", "Bearer test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "chatcmpl-123",
                "object": "chat.completion",
                "choices": [{
                    "index": 0,
                    "message": {"role": "assistant", "content": "Hello!"},
                    "finish_reason": "stop"
                }],
                "usage": {"prompt_tokens": 9, "completion_tokens": 3, "total_tokens": 12}
            })))
            .mount(&server)
            .await;

        let backend = OpenAiBackend::builder("test-key", "gpt-4o-mini")
            .base_url(server.uri())
            .build();
        let messages = vec![Message::user("hi")];
        let response = backend
            .call(ModelRequest {
                messages: &messages,
                tools: &[],
            })
            .await
            .unwrap();

        assert_eq!(response.message.text(), "Hello!");
        assert!(response.message.tool_calls().is_empty());
        assert_eq!(response.usage.input_tokens, 9);
        assert_eq!(response.usage.output_tokens, 3);
    }

    #[tokio::test]
    async fn tool_call_response_decodes_with_ids_and_arguments() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{
                    "index": 0,
                    "message": {
                        "role": "assistant",
                        "content": null,
                        "tool_calls": [{
                            "id": "call_abc",
                            "type": "function",
                            "function": {
                                "name": "get_weather",
                                "arguments": "{\"city\":\"Paris\",\"country_code\":\"FR\"}"
                            }
                        }]
                    },
                    "finish_reason": "tool_calls"
                }]
            })))
            .mount(&server)
            .await;

        let backend = OpenAiBackend::builder("test-key", "gpt-4o-mini")
            .base_url(server.uri())
            .build();
        let messages = vec![Message::user("weather in Paris?")];
        let response = backend
            .call(ModelRequest {
                messages: &messages,
                tools: &[],
            })
            .await
            .unwrap();

        let calls = response.message.tool_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].id, "call_abc");
        assert_eq!(calls[0].name, "get_weather");
        assert_eq!(calls[0].input["city"], "Paris");
    }

    #[tokio::test]
    async fn api_error_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}
            })))
            .mount(&server)
            .await;

        let backend = OpenAiBackend::builder("bad-key", "gpt-4o-mini")
            .base_url(server.uri())
            .build();
        let messages = vec![Message::user("hi")];
        let err = backend
            .call(ModelRequest {
                messages: &messages,
                tools: &[],
            })
            .await
            .unwrap_err();

        assert!(matches!(err, ModelError::Api(_)));
    }

    #[tokio::test]
    async fn malformed_arguments_are_invalid_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{
                    "message": {
                        "role": "assistant",
                        "tool_calls": [{
                            "id": "call_1",
                            "type": "function",
                            "function": {"name": "get_weather", "arguments": "not json"}
                        }]
                    }
                }]
            })))
            .mount(&server)
            .await;

        let backend = OpenAiBackend::builder("test-key", "gpt-4o-mini")
            .base_url(server.uri())
            .build();
        let messages = vec![Message::user("hi")];
        let err = backend
            .call(ModelRequest {
                messages: &messages,
                tools: &[],
            })
            .await
            .unwrap_err();

        assert!(matches!(err, ModelError::InvalidResponse(_)));
    }
}
