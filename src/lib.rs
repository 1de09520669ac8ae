//! langrig: LLM client orchestration.
//!
//! Text completion, multi-turn chat with function calling and embeddings over
//! an OpenAI-compatible provider, with streaming delivered to a caller sink
//! and a structured-output parser for checking model answers.
//!
//! # Quick Start
//!
//! ```no_run
//! use langrig::prelude::*;
//!
//! # async fn example() -> langrig::error::Result<()> {
//! let chat = ChatLlm::from_config(ClientConfig::from_env()?)?;
//! let reply = chat
//!     .call(
//!         &CallContext::new(),
//!         vec![ChatMessage::human("Hello!")],
//!         &CallOptions::default(),
//!     )
//!     .await?;
//! println!("{}", reply.content);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod llm;
pub mod logger;
pub mod output_parser;
pub mod prelude;
pub mod provider;
pub mod types;
