//! QueueGateway port - 外部キューイングエンジンへの同期呼び出し
//!
//! エンジン内部の挙動（採番、重複排除、ロック）はこのシステムの関心外です。
//! 同じ ID への同時 retire はエンジン側で競合し、こちらでは直列化しません。

use async_trait::async_trait;

use crate::domain::Ticket;

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("transport failure: {0}")]
    Transport(String),

    #[error("server returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("rejected by queue engine: {0}")]
    Rejected(String),
}

#[async_trait]
pub trait QueueGateway: Send + Sync {
    /// Issue a new ticket for the service point, labelled with its short code.
    async fn issue(&self, id: &str, short_code: &str) -> Result<Ticket, GatewayError>;

    /// Retire the next ticket of the service point.
    async fn retire(&self, id: &str) -> Result<Ticket, GatewayError>;
}
