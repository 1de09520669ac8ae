//! Cancellation and deadline context threaded through every request.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::{LangrigError, Result};

/// Carries cancellation and an optional deadline for one call.
///
/// Cloning shares the cancellation token, so cancelling any clone cancels all
/// of them.
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    token: CancellationToken,
    deadline: Option<(Instant, Duration)>,
}

impl CallContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use an existing cancellation token (e.g. a child of a server-wide one).
    pub fn with_cancellation(token: CancellationToken) -> Self {
        Self {
            token,
            deadline: None,
        }
    }

    /// Fail every pending operation once `timeout` has elapsed from now.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Some((Instant::now() + timeout, timeout));
        self
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Run `operation` until it completes, the context is cancelled, or the
    /// deadline passes, whichever comes first.
    pub async fn run<F, T>(&self, operation: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let deadline = async {
            match self.deadline {
                Some((at, _)) => tokio::time::sleep_until(at).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(LangrigError::Cancelled),
            _ = deadline => {
                let budget = self.deadline.map(|(_, d)| d).unwrap_or_default();
                Err(LangrigError::Timeout(budget))
            }
            result = operation => result,
        }
    }
}
