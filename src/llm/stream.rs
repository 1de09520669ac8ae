//! Streaming accumulation: drive a delta stream to completion while handing
//! each fragment to the caller's sink.

use futures::StreamExt;
use tracing::debug;

use crate::context::CallContext;
use crate::error::{LangrigError, Result};
use crate::provider::{
    ChatCompletionStreamResponse, CompletionStreamResponse, DeltaStream, FunctionCallDelta,
};
use crate::types::{FinishReason, FunctionCall, StreamingSink};

use super::collect::Collected;

/// The first choice of one delta, reduced to what accumulation needs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeltaParts {
    pub text: String,
    pub finish_reason: Option<String>,
    pub function_call: Option<FunctionCallDelta>,
}

/// A provider delta event. `None` means the event carried no choices.
pub trait StreamDelta: Send {
    fn into_parts(self) -> Option<DeltaParts>;
}

impl StreamDelta for CompletionStreamResponse {
    fn into_parts(self) -> Option<DeltaParts> {
        let choice = self.choices.into_iter().next()?;
        Some(DeltaParts {
            text: choice.text,
            finish_reason: choice.finish_reason,
            function_call: None,
        })
    }
}

impl StreamDelta for ChatCompletionStreamResponse {
    fn into_parts(self) -> Option<DeltaParts> {
        let choice = self.choices.into_iter().next()?;
        Some(DeltaParts {
            text: choice.delta.content.unwrap_or_default(),
            finish_reason: choice.finish_reason,
            function_call: choice.delta.function_call,
        })
    }
}

/// Running state of one stream.
///
/// Function-call argument fragments are concatenated across deltas; the call
/// is only surfaced if the final finish reason is `function_call`.
#[derive(Debug, Default)]
pub struct StreamAccumulator {
    text: String,
    finish_reason: Option<FinishReason>,
    function_name: Option<String>,
    arguments: String,
}

impl StreamAccumulator {
    pub fn push(&mut self, parts: DeltaParts) {
        self.text.push_str(&parts.text);

        if let Some(reason) = parts.finish_reason.as_deref().and_then(FinishReason::parse) {
            self.finish_reason = Some(reason);
        }

        if let Some(call) = parts.function_call {
            if let Some(name) = call.name.filter(|n| !n.is_empty()) {
                self.function_name.get_or_insert(name);
            }
            if let Some(fragment) = call.arguments {
                self.arguments.push_str(&fragment);
            }
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn finish(self) -> Collected {
        let function_call = match (&self.finish_reason, self.function_name) {
            (Some(FinishReason::FunctionCall), Some(name)) => Some(FunctionCall {
                name,
                arguments: self.arguments,
            }),
            _ => None,
        };

        Collected {
            text: self.text,
            finish_reason: self.finish_reason,
            function_call,
            usage: None,
        }
    }
}

/// Consume `stream` until it ends, forwarding every fragment to `sink`.
///
/// Stops at the first provider error, empty delta, sink error, cancellation
/// or deadline; partial text is discarded on those paths. The stream is
/// dropped (and its connection released) on every exit.
pub async fn accumulate<D>(
    ctx: &CallContext,
    mut stream: DeltaStream<D>,
    sink: &dyn StreamingSink,
) -> Result<Collected>
where
    D: StreamDelta + 'static,
{
    let mut acc = StreamAccumulator::default();
    let mut deltas = 0usize;

    loop {
        let next = ctx.run(async { Ok(stream.next().await) }).await?;
        let Some(delta) = next else {
            break;
        };

        let parts = delta?.into_parts().ok_or(LangrigError::EmptyResponse)?;

        sink.on_chunk(ctx, parts.text.as_bytes())
            .await
            .map_err(LangrigError::StreamAborted)?;

        acc.push(parts);
        deltas += 1;
    }

    let collected = acc.finish();
    debug!(
        deltas,
        finish_reason = ?collected.finish_reason,
        function_call = collected.function_call.is_some(),
        "stream finished"
    );
    Ok(collected)
}
