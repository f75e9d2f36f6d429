//! Almanac runtime — session and model backend management.
//!
//! This crate provides the core runtime for the almanac assistant: the
//! provider-agnostic model protocol, the tool host that exposes the two
//! lookup adapters to the model, and the session that owns a conversation
//! transcript and runs the tool-call dispatch loop.
//!
//! # Overview
//!
//! The runtime is organized around these concepts:
//!
//! - **Session**: A conversation context that owns the transcript and
//!   turns user input into a final answer, executing at most one round of
//!   tool calls per turn.
//! - **Backend**: A trait abstracting chat-completion providers.
//! - **ToolHost**: A trait abstracting tool resolution and execution; the
//!   concrete [`LookupToolHost`] dispatches to the weather and stock
//!   lookup clients.
//!
//! # Example
//!
//! ```ignore
//! use lookup::{StocksClient, WeatherClient};
//! use runtime::{LookupToolHost, OpenAiBackend, Session};
//!
//! # async fn example() -> runtime::Result<()> {
//! let backend = OpenAiBackend::builder("sk-...", "gpt-4o-mini").build();
//! let tools = LookupToolHost::new(WeatherClient::new("..."), StocksClient::new("..."));
//!
//! let mut session = Session::new(backend, tools, "You answer weather and stock questions.");
//! let answer = session.chat("What's the weather in Paris, FR?").await?;
//! println!("{answer}");
//! # Ok(())
//! # }
//! ```

mod error;
pub mod model;
mod providers;
mod session;
pub mod tools;

// Model protocol types (provider-agnostic)
pub use model::{
    Backend, Message, ModelError, ModelRequest, ModelResponse, Part, Role, ToolCall, ToolResult,
    ToolSpec, Usage,
};

// Provider backends
pub use providers::{OpenAiBackend, OpenAiBackendBuilder};

// Error types
pub use error::{Error, Result};

// Tool hosts
pub use tools::{EmptyToolHost, LookupToolHost, ToolError, ToolHost};

// Session management
pub use session::{Session, SessionId};
