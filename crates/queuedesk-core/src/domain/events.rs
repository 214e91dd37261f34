//! Events - ドメインイベント
//!
//! EventSink に送る観測用レコードです。完了ストリーム（EventPublisher）とは別物で、
//! publish 失敗のような「結果には影響しないが記録したい」事象をここで運びます。

use super::ids::ServicePointId;
use super::ticket::Ticket;

/// DomainEvent はオーケストレーション中に発生したイベント
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainEvent {
    TicketIssued {
        id: ServicePointId,
        ticket: Ticket,
    },
    TicketRetired {
        id: ServicePointId,
        ticket: Ticket,
    },
    CompletionPublished {
        id: ServicePointId,
        ticket: Ticket,
        office_number: String,
    },
    /// dequeue は成功扱いのまま、完了イベントだけが失われた
    CompletionPublishFailed {
        id: ServicePointId,
        ticket: Ticket,
        office_number: String,
        reason: String,
    },
}

impl DomainEvent {
    pub fn name(&self) -> &'static str {
        match self {
            DomainEvent::TicketIssued { .. } => "ticket_issued",
            DomainEvent::TicketRetired { .. } => "ticket_retired",
            DomainEvent::CompletionPublished { .. } => "completion_published",
            DomainEvent::CompletionPublishFailed { .. } => "completion_publish_failed",
        }
    }

    pub fn service_point(&self) -> ServicePointId {
        match self {
            DomainEvent::TicketIssued { id, .. }
            | DomainEvent::TicketRetired { id, .. }
            | DomainEvent::CompletionPublished { id, .. }
            | DomainEvent::CompletionPublishFailed { id, .. } => *id,
        }
    }
}
