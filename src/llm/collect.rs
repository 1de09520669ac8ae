//! Non-streaming response collection.

use crate::error::{LangrigError, Result};
use crate::provider::{ChatCompletionResponse, CompletionResponse};
use crate::types::{FinishReason, FunctionCall, Usage};

/// What one response (or one fully consumed stream) produced, before it is
/// shaped into a [`Generation`](crate::types::Generation).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Collected {
    pub text: String,
    pub finish_reason: Option<FinishReason>,
    pub function_call: Option<FunctionCall>,
    pub usage: Option<Usage>,
}

pub fn collect_completion(response: CompletionResponse) -> Result<Collected> {
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or(LangrigError::EmptyResponse)?;

    Ok(Collected {
        text: choice.text,
        finish_reason: choice.finish_reason.as_deref().and_then(FinishReason::parse),
        function_call: None,
        usage: Some(response.usage),
    })
}

pub fn collect_chat(response: ChatCompletionResponse) -> Result<Collected> {
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or(LangrigError::EmptyResponse)?;

    let finish_reason = choice.finish_reason.as_deref().and_then(FinishReason::parse);
    let function_call = match finish_reason {
        Some(FinishReason::FunctionCall) => choice.message.function_call,
        _ => None,
    };

    Ok(Collected {
        text: choice.message.content.unwrap_or_default(),
        finish_reason,
        function_call,
        usage: Some(response.usage),
    })
}
