//! CallContext - 呼び出し側から渡される締め切り（キャンセル信号）
//!
//! # 方針
//! - 締め切りなし（`background()`）は入力エラーではなく「無期限」として扱う
//! - 外部呼び出し（store / queue engine / stream）はすべて残り時間で打ち切る
//! - 打ち切られても補償処理はしない（retire 済み・未 publish のチケットはあり得る）
//! - 締め切りを過ぎた context では新しい外部呼び出しを始めない

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use ulid::Ulid;

use crate::domain::{DependencyError, ServiceError};

#[derive(Debug, Clone, Copy)]
pub struct CallContext {
    request_id: Ulid,
    deadline: Option<Instant>,
}

impl CallContext {
    /// No deadline.
    pub fn background() -> Self {
        Self {
            request_id: Ulid::new(),
            deadline: None,
        }
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            request_id: Ulid::new(),
            deadline: Some(deadline),
        }
    }

    /// `with_timeout` when a timeout is configured, `background` otherwise.
    pub fn from_timeout(timeout: Option<Duration>) -> Self {
        timeout.map_or_else(Self::background, Self::with_timeout)
    }

    /// Correlates log lines of one invocation.
    pub fn request_id(&self) -> Ulid {
        self.request_id
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    pub fn is_expired(&self) -> bool {
        self.remaining().is_some_and(|left| left.is_zero())
    }

    /// Run one external call under this context's deadline.
    pub async fn bound<T, E, F>(&self, operation: &'static str, call: F) -> Result<T, ServiceError>
    where
        F: Future<Output = Result<T, E>>,
        ServiceError: From<E>,
    {
        let outcome = match self.deadline {
            None => call.await,
            Some(_) if self.is_expired() => {
                return Err(DependencyError::DeadlineExceeded { operation }.into());
            }
            Some(deadline) => match tokio::time::timeout_at(deadline, call).await {
                Ok(outcome) => outcome,
                Err(_) => return Err(DependencyError::DeadlineExceeded { operation }.into()),
            },
        };
        outcome.map_err(ServiceError::from)
    }
}

impl Default for CallContext {
    fn default() -> Self {
        Self::background()
    }
}
