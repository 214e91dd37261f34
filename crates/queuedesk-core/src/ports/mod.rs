//! Ports - 抽象化レイヤー
//!
//! オーケストレーションが依存する外部システムへのインターフェースです。
//! 実装の詳細（PostgreSQL, HTTP, Kafka, メモリ）は impls 側に隠蔽します。
//!
//! # 外部協調者
//! - RecordStore: パーティション分割されたサービスポイントの正本
//! - QueueGateway: リモートのキューイングエンジン
//! - EventPublisher: 完了イベントのストリーム
//! - EventSink: 観測用のサイドチャネル

pub mod clock;
pub mod event_publisher;
pub mod event_sink;
pub mod queue_gateway;
pub mod record_store;

// 主要な trait を再エクスポート
pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::event_publisher::{EventPublisher, PublishError};
pub use self::event_sink::EventSink;
pub use self::queue_gateway::{GatewayError, QueueGateway};
pub use self::record_store::{RecordStore, StoreError};
