//! Shared test helpers: a scripted mock provider, a recording logger and a
//! recording sink.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures::StreamExt;

use langrig::context::CallContext;
use langrig::error::{BoxError, LangrigError};
use langrig::logger::LlmLogger;
use langrig::provider::*;
use langrig::types::{FunctionCall, StreamingSink, Usage};

/// A request as the mock provider saw it.
#[derive(Debug, Clone, PartialEq)]
pub enum Recorded {
    Completion(CompletionRequest),
    Chat(ChatCompletionRequest),
    Embedding(EmbeddingRequest),
}

/// A scripted stream: the deltas to yield, then either end or hang forever.
pub struct StreamScript<T> {
    pub events: Vec<Result<T, LangrigError>>,
    pub hang: bool,
}

impl<T> StreamScript<T> {
    pub fn ok(events: Vec<T>) -> Self {
        Self {
            events: events.into_iter().map(Ok).collect(),
            hang: false,
        }
    }

    pub fn hanging(events: Vec<T>) -> Self {
        Self {
            hang: true,
            ..Self::ok(events)
        }
    }
}

/// A provider that replays queued outcomes in order and records every
/// request it receives.
#[derive(Default)]
pub struct MockProvider {
    requests: Mutex<Vec<Recorded>>,
    completions: Mutex<VecDeque<Result<CompletionResponse, LangrigError>>>,
    chats: Mutex<VecDeque<Result<ChatCompletionResponse, LangrigError>>>,
    completion_streams: Mutex<VecDeque<StreamScript<CompletionStreamResponse>>>,
    chat_streams: Mutex<VecDeque<StreamScript<ChatCompletionStreamResponse>>>,
    embeddings: Mutex<VecDeque<Result<EmbeddingResponse, LangrigError>>>,
}

impl MockProvider {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn queue_completion(&self, response: Result<CompletionResponse, LangrigError>) {
        self.completions.lock().unwrap().push_back(response);
    }

    pub fn queue_chat(&self, response: Result<ChatCompletionResponse, LangrigError>) {
        self.chats.lock().unwrap().push_back(response);
    }

    pub fn queue_completion_stream(&self, script: StreamScript<CompletionStreamResponse>) {
        self.completion_streams.lock().unwrap().push_back(script);
    }

    pub fn queue_chat_stream(&self, script: StreamScript<ChatCompletionStreamResponse>) {
        self.chat_streams.lock().unwrap().push_back(script);
    }

    pub fn queue_embeddings(&self, response: Result<EmbeddingResponse, LangrigError>) {
        self.embeddings.lock().unwrap().push_back(response);
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn record(&self, request: Recorded) {
        self.requests.lock().unwrap().push(request);
    }
}

fn pop<T>(queue: &Mutex<VecDeque<T>>, what: &str) -> T {
    queue
        .lock()
        .unwrap()
        .pop_front()
        .unwrap_or_else(|| panic!("no scripted {what} left"))
}

fn into_stream<T: Send + 'static>(script: StreamScript<T>) -> DeltaStream<T> {
    let events = futures::stream::iter(script.events);
    if script.hang {
        events.chain(futures::stream::pending()).boxed()
    } else {
        events.boxed()
    }
}

#[async_trait]
impl CompletionProvider for MockProvider {
    fn provider_name(&self) -> &str {
        "mock"
    }

    async fn create_completion(
        &self,
        _ctx: &CallContext,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, LangrigError> {
        self.record(Recorded::Completion(request.clone()));
        pop(&self.completions, "completion")
    }

    async fn create_completion_stream(
        &self,
        _ctx: &CallContext,
        request: &CompletionRequest,
    ) -> Result<DeltaStream<CompletionStreamResponse>, LangrigError> {
        self.record(Recorded::Completion(request.clone()));
        Ok(into_stream(pop(&self.completion_streams, "completion stream")))
    }

    async fn create_chat_completion(
        &self,
        _ctx: &CallContext,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, LangrigError> {
        self.record(Recorded::Chat(request.clone()));
        pop(&self.chats, "chat completion")
    }

    async fn create_chat_completion_stream(
        &self,
        _ctx: &CallContext,
        request: &ChatCompletionRequest,
    ) -> Result<DeltaStream<ChatCompletionStreamResponse>, LangrigError> {
        self.record(Recorded::Chat(request.clone()));
        Ok(into_stream(pop(&self.chat_streams, "chat stream")))
    }

    async fn create_embeddings(
        &self,
        _ctx: &CallContext,
        request: &EmbeddingRequest,
    ) -> Result<EmbeddingResponse, LangrigError> {
        self.record(Recorded::Embedding(request.clone()));
        pop(&self.embeddings, "embedding response")
    }
}

/// One logger callback.
#[derive(Debug, Clone, PartialEq)]
pub enum LogEntry {
    Request(String),
    Response(String),
    Error(String),
}

/// Logger that keeps every callback for later inspection.
#[derive(Default)]
pub struct RecordingLogger {
    entries: Mutex<Vec<LogEntry>>,
}

impl RecordingLogger {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().unwrap().clone()
    }
}

impl LlmLogger for RecordingLogger {
    fn log_request(&self, prompt: &str) {
        self.entries
            .lock()
            .unwrap()
            .push(LogEntry::Request(prompt.to_string()));
    }

    fn log_response(&self, text: &str) {
        self.entries
            .lock()
            .unwrap()
            .push(LogEntry::Response(text.to_string()));
    }

    fn log_error(&self, error: &LangrigError) {
        self.entries
            .lock()
            .unwrap()
            .push(LogEntry::Error(error.to_string()));
    }
}

/// Sink that records every fragment and optionally fails on the n-th one
/// (1-based).
#[derive(Default)]
pub struct RecordingSink {
    chunks: Mutex<Vec<String>>,
    fail_on: Option<usize>,
}

impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing_on(n: usize) -> Arc<Self> {
        Arc::new(Self {
            chunks: Mutex::new(Vec::new()),
            fail_on: Some(n),
        })
    }

    pub fn chunks(&self) -> Vec<String> {
        self.chunks.lock().unwrap().clone()
    }

    pub fn joined(&self) -> String {
        self.chunks().concat()
    }
}

#[async_trait]
impl StreamingSink for RecordingSink {
    async fn on_chunk(&self, _ctx: &CallContext, chunk: &[u8]) -> Result<(), BoxError> {
        let mut chunks = self.chunks.lock().unwrap();
        chunks.push(String::from_utf8_lossy(chunk).into_owned());
        if Some(chunks.len()) == self.fail_on {
            return Err("sink refused fragment".into());
        }
        Ok(())
    }
}

pub fn usage(prompt: u32, completion: u32) -> Usage {
    Usage {
        prompt_tokens: prompt,
        completion_tokens: completion,
        total_tokens: prompt + completion,
    }
}

pub fn completion_response(text: &str, finish: &str, usage: Usage) -> CompletionResponse {
    CompletionResponse {
        choices: vec![CompletionChoice {
            text: text.to_string(),
            index: 0,
            finish_reason: Some(finish.to_string()),
        }],
        usage,
        ..Default::default()
    }
}

pub fn chat_response(content: &str, finish: &str, usage: Usage) -> ChatCompletionResponse {
    ChatCompletionResponse {
        choices: vec![ChatCompletionChoice {
            index: 0,
            message: ChatResponseMessage {
                role: Some(ChatRole::Assistant),
                content: Some(content.to_string()),
                function_call: None,
            },
            finish_reason: Some(finish.to_string()),
        }],
        usage,
        ..Default::default()
    }
}

pub fn chat_function_response(name: &str, arguments: &str) -> ChatCompletionResponse {
    ChatCompletionResponse {
        choices: vec![ChatCompletionChoice {
            index: 0,
            message: ChatResponseMessage {
                role: Some(ChatRole::Assistant),
                content: None,
                function_call: Some(FunctionCall {
                    name: name.to_string(),
                    arguments: arguments.to_string(),
                }),
            },
            finish_reason: Some("function_call".to_string()),
        }],
        usage: usage(12, 7),
        ..Default::default()
    }
}

pub fn completion_delta(text: &str, finish: Option<&str>) -> CompletionStreamResponse {
    CompletionStreamResponse {
        choices: vec![CompletionChoice {
            text: text.to_string(),
            index: 0,
            finish_reason: finish.map(str::to_string),
        }],
    }
}

pub fn chat_delta(
    content: Option<&str>,
    finish: Option<&str>,
    function_call: Option<FunctionCallDelta>,
) -> ChatCompletionStreamResponse {
    ChatCompletionStreamResponse {
        choices: vec![ChatCompletionStreamChoice {
            index: 0,
            delta: ChatDelta {
                role: None,
                content: content.map(str::to_string),
                function_call,
            },
            finish_reason: finish.map(str::to_string),
        }],
    }
}
