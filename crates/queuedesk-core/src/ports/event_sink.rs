//! EventSink port - 観測用イベントの記録
//!
//! dequeue の publish 失敗はプロセス全体のログ出力ではなく、
//! 注入された EventSink に構造化イベントとして送ります。
//! これによりテストで出力ストリームをキャプチャせずに検証できます。
//!
//! # 実装
//! - TracingEventSink: tracing へ出力（本番用）
//! - RecordingEventSink: メモリに蓄積（テスト用）

use crate::domain::DomainEvent;

/// EventSink は DomainEvent を受け取る。失敗しない（戻り値なし）
pub trait EventSink: Send + Sync {
    fn emit(&self, event: DomainEvent);
}
