//! Session management and the tool-call dispatch loop.

use crate::model::{Backend, Message, ModelError, ModelRequest, ToolResult};
use crate::tools::{ToolError, ToolHost};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A unique identifier for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A conversation session.
///
/// Owns the transcript: an append-only message log seeded with one system
/// message. Each [`chat`](Session::chat) call runs one full turn — at most
/// one round of tool calls, then a final answer. A turn that fails with an
/// unknown tool or a model error leaves the transcript exactly as it was
/// before the turn.
pub struct Session<B, H> {
    pub id: SessionId,
    backend: B,
    tools: H,
    messages: Vec<Message>,
}

impl<B: Backend, H: ToolHost> Session<B, H> {
    /// Create a new session with the given backend, tool host, and system
    /// prompt.
    pub fn new(backend: B, tools: H, system: impl Into<String>) -> Self {
        Self {
            id: SessionId::new(),
            backend,
            tools,
            messages: vec![Message::system(system)],
        }
    }

    /// The transcript so far.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Send a user message and get the assistant's answer.
    pub async fn chat(&mut self, user_input: &str) -> Result<String> {
        let turn_start = self.messages.len();
        self.messages.push(Message::user(user_input));

        match self.run_turn().await {
            Ok(answer) => Ok(answer),
            Err(err) => {
                self.messages.truncate(turn_start);
                Err(err)
            }
        }
    }

    async fn run_turn(&mut self) -> Result<String> {
        let response = self
            .backend
            .call(ModelRequest {
                messages: &self.messages,
                tools: self.tools.specs(),
            })
            .await?;

        let assistant = response.message;
        let calls = assistant.tool_calls();

        if calls.is_empty() {
            let answer = assistant.text();
            self.messages.push(assistant);
            return Ok(answer);
        }

        tracing::debug!(count = calls.len(), "model requested tool calls");

        // Execute sequentially, in request order, so each result lines up
        // with its correlation id. An unknown tool aborts the whole turn;
        // any other failure becomes a result the model can react to.
        let mut results = Vec::with_capacity(calls.len());
        for call in &calls {
            match self.tools.execute(call).await {
                Ok(output) => results.push(ToolResult::success(call.id.clone(), output)),
                Err(ToolError::NotFound(name)) => return Err(Error::UnknownTool(name)),
                Err(err) => results.push(ToolResult::failure(call.id.clone(), err)),
            }
        }

        self.messages.push(assistant);
        for result in results {
            self.messages.push(Message::tool_result(result));
        }

        // One tool round per turn: the follow-up request offers no tool
        // specs, so the model has to answer in text.
        let final_response = self
            .backend
            .call(ModelRequest {
                messages: &self.messages,
                tools: &[],
            })
            .await?;

        if !final_response.message.tool_calls().is_empty() {
            return Err(Error::Model(ModelError::InvalidResponse(
                "tool calls after the tool round".into(),
            )));
        }

        let answer = final_response.message.text();
        self.messages.push(final_response.message);
        Ok(answer)
    }
}
