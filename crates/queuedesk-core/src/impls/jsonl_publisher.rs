//! JsonLinesPublisher - 追記専用ファイルを完了ストリームとして使う
//!
//! 1 イベント 1 行の JSON。publish が返る前に flush + sync_data するので、
//! Ok が返ったイベントはディスクに載っています。

use std::path::Path;

use async_trait::async_trait;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::domain::TicketCompletionEvent;
use crate::ports::{EventPublisher, PublishError};

pub struct JsonLinesPublisher {
    /// None after `close()`
    file: Mutex<Option<File>>,
}

impl JsonLinesPublisher {
    /// Open (or create) the stream file in append mode, creating parent directories.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, PublishError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await?;
        Ok(Self {
            file: Mutex::new(Some(file)),
        })
    }

    /// Flush and release the file; later publishes fail with `Closed`.
    pub async fn close(&self) -> Result<(), PublishError> {
        if let Some(mut file) = self.file.lock().await.take() {
            file.flush().await?;
        }
        Ok(())
    }
}

#[async_trait]
impl EventPublisher for JsonLinesPublisher {
    async fn publish(&self, event: &TicketCompletionEvent) -> Result<(), PublishError> {
        let mut line = serde_json::to_vec(event)?;
        line.push(b'\n');

        let mut guard = self.file.lock().await;
        let file = guard.as_mut().ok_or(PublishError::Closed)?;
        file.write_all(&line).await?;
        file.flush().await?;
        file.sync_data().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Ticket;
    use chrono::{TimeZone, Utc};

    fn event(ticket: &str, office: &str) -> TicketCompletionEvent {
        let at = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        TicketCompletionEvent::new(&Ticket::new(ticket), office, at)
    }

    #[tokio::test]
    async fn appends_one_json_object_per_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stream/completed.jsonl");
        let publisher = JsonLinesPublisher::open(&path).await.unwrap();

        publisher.publish(&event("A001", "101")).await.unwrap();
        publisher.publish(&event("A002", "102")).await.unwrap();

        let content = tokio::fs::read_to_string(&path).await.unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: TicketCompletionEvent = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first, event("A001", "101"));
        assert!(lines[1].contains(r#""officeNumber":"102""#));
    }

    #[tokio::test]
    async fn reopening_appends_instead_of_truncating() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("completed.jsonl");

        let first = JsonLinesPublisher::open(&path).await.unwrap();
        first.publish(&event("A001", "101")).await.unwrap();
        first.close().await.unwrap();

        let second = JsonLinesPublisher::open(&path).await.unwrap();
        second.publish(&event("A002", "101")).await.unwrap();

        let content = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(content.lines().count(), 2);
    }

    #[tokio::test]
    async fn publish_after_close_fails() {
        let dir = tempfile::tempdir().unwrap();
        let publisher = JsonLinesPublisher::open(dir.path().join("c.jsonl")).await.unwrap();
        publisher.close().await.unwrap();

        let err = publisher.publish(&event("A001", "101")).await.unwrap_err();
        assert!(matches!(err, PublishError::Closed));
    }
}
