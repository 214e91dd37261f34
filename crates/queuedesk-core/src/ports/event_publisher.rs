//! EventPublisher port - 完了イベントを永続ストリームへ追記
//!
//! 成功/失敗以外の ack は使いません。配送保証はストリーム側の責務です。

use async_trait::async_trait;

use crate::domain::TicketCompletionEvent;

#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("failed to marshal message: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("failed to write message: {0}")]
    Io(#[from] std::io::Error),

    #[error("stream is closed")]
    Closed,
}

#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, event: &TicketCompletionEvent) -> Result<(), PublishError>;
}
