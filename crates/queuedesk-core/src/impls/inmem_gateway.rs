//! InMemoryQueueGateway - 開発用のキューイングエンジン
//!
//! # 実装詳細
//! - HashMap<String, Lane> でサービスポイントごとに FIFO を管理
//! - チケットは `{short_code}{seq:03}`（サービスポイントごとの連番）
//! - 空のキューへの retire は Rejected

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::Ticket;
use crate::ports::{GatewayError, QueueGateway};

#[derive(Debug, Default)]
struct Lane {
    next_seq: u32,
    waiting: VecDeque<Ticket>,
}

#[derive(Debug, Default)]
pub struct InMemoryQueueGateway {
    lanes: Mutex<HashMap<String, Lane>>,
}

impl InMemoryQueueGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tickets currently waiting at a service point.
    pub async fn waiting(&self, id: &str) -> usize {
        self.lanes
            .lock()
            .await
            .get(id)
            .map_or(0, |lane| lane.waiting.len())
    }
}

#[async_trait]
impl QueueGateway for InMemoryQueueGateway {
    async fn issue(&self, id: &str, short_code: &str) -> Result<Ticket, GatewayError> {
        let mut lanes = self.lanes.lock().await;
        let lane = lanes.entry(id.to_string()).or_default();
        lane.next_seq += 1;
        let ticket = Ticket::new(format!("{short_code}{:03}", lane.next_seq));
        lane.waiting.push_back(ticket.clone());
        Ok(ticket)
    }

    async fn retire(&self, id: &str) -> Result<Ticket, GatewayError> {
        let mut lanes = self.lanes.lock().await;
        lanes
            .get_mut(id)
            .and_then(|lane| lane.waiting.pop_front())
            .ok_or_else(|| GatewayError::Rejected(format!("no tickets waiting for {id}")))
    }
}
