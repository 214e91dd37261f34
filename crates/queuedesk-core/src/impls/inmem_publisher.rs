//! InMemoryPublisher - 開発・テスト用の完了ストリーム
//!
//! `set_failing(true)` で publish を失敗させ、dequeue の非致命パスを再現できます。
//! `set_delay` は遅いストリーム（締め切り切れ）の再現用です。

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::TicketCompletionEvent;
use crate::ports::{EventPublisher, PublishError};

#[derive(Debug, Default)]
pub struct InMemoryPublisher {
    events: Mutex<Vec<TicketCompletionEvent>>,
    failing: AtomicBool,
    delay: Mutex<Option<Duration>>,
}

impl InMemoryPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap_or_else(|e| e.into_inner()) = Some(delay);
    }

    pub fn published(&self) -> Vec<TicketCompletionEvent> {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl EventPublisher for InMemoryPublisher {
    async fn publish(&self, event: &TicketCompletionEvent) -> Result<(), PublishError> {
        let delay = *self.delay.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(PublishError::Closed);
        }
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(event.clone());
        Ok(())
    }
}
