//! Streaming sink: the caller's view of a stream in progress.

use async_trait::async_trait;

use crate::context::CallContext;
use crate::error::BoxError;

/// Receives each text fragment of a streamed response, in arrival order.
///
/// Returning an error stops the stream: no further deltas are read and the
/// call fails with [`LangrigError::StreamAborted`](crate::error::LangrigError::StreamAborted).
/// Fragments may be empty (role-only or function-call-only deltas).
#[async_trait]
pub trait StreamingSink: Send + Sync {
    async fn on_chunk(&self, ctx: &CallContext, chunk: &[u8]) -> Result<(), BoxError>;
}

/// Adapter turning a synchronous closure into a [`StreamingSink`].
pub struct FnSink<F> {
    f: F,
}

impl<F> FnSink<F>
where
    F: Fn(&[u8]) -> Result<(), BoxError> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<F> StreamingSink for FnSink<F>
where
    F: Fn(&[u8]) -> Result<(), BoxError> + Send + Sync,
{
    async fn on_chunk(&self, _ctx: &CallContext, chunk: &[u8]) -> Result<(), BoxError> {
        (self.f)(chunk)
    }
}
