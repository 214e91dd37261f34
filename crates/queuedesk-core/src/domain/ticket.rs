//! Tickets and ticket-completion events.
//!
//! Ticket は不透明なトークンです。このシステムは中身を解釈せず、
//! QueueGateway から受け取った値をそのまま EventPublisher に渡します。

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One queue position, as minted by the queueing engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ticket {
    pub ticket: String,
}

impl Ticket {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            ticket: token.into(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.ticket
    }
}

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.ticket)
    }
}

/// Appended to the completion stream once per successful dequeue.
///
/// Wire shape: `{"ticket": "...", "officeNumber": "...", "timestamp": "2026-01-02T03:04:05Z"}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketCompletionEvent {
    pub ticket: String,
    pub office_number: String,
    /// RFC 3339, UTC, second precision.
    pub timestamp: String,
}

impl TicketCompletionEvent {
    pub fn new(ticket: &Ticket, office_number: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            ticket: ticket.ticket.clone(),
            office_number: office_number.into(),
            timestamp: at.to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }
}
