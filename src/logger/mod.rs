//! Request/response logging hooks.
//!
//! A logger is handed to each front end at construction time and observes
//! every request, response and error. It never changes control flow.

use tracing::{error, info};

use crate::error::LangrigError;

/// Observer invoked before each request and after each response or error.
pub trait LlmLogger: Send + Sync {
    fn log_request(&self, prompt: &str);
    fn log_response(&self, text: &str);
    fn log_error(&self, error: &LangrigError);
}

/// Emits `tracing` events under the `langrig::llm` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl LlmLogger for TracingLogger {
    fn log_request(&self, prompt: &str) {
        info!(target: "langrig::llm", prompt, "submitted query");
    }

    fn log_response(&self, text: &str) {
        info!(target: "langrig::llm", response = text, "received response");
    }

    fn log_error(&self, err: &LangrigError) {
        error!(target: "langrig::llm", error = %err, category = ?err.category(), "received error");
    }
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLogger;

impl LlmLogger for NoopLogger {
    fn log_request(&self, _prompt: &str) {}
    fn log_response(&self, _text: &str) {}
    fn log_error(&self, _error: &LangrigError) {}
}
