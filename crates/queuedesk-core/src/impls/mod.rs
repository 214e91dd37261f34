//! Impls - ports の実装
//!
//! # 含まれる実装
//! - **InMemoryPartitionedStore**: N 分割ストア（N = 1 で単一パーティション）
//! - **FilePartitionedStore**: 同じ N 分割をパーティションごとのファイルへ永続化
//! - **InMemoryQueueGateway** / **HttpQueueGateway**: キューイングエンジン
//! - **JsonLinesPublisher** / **InMemoryPublisher**: 完了ストリーム
//! - **TracingEventSink** / **RecordingEventSink**: 観測用サイドチャネル

pub mod event_sinks;
pub mod file_partitioned;
pub mod http_gateway;
pub mod inmem_gateway;
pub mod inmem_publisher;
pub mod jsonl_publisher;
pub mod partitioned_memory;

// 主要な型を再エクスポート
pub use self::event_sinks::{RecordingEventSink, TracingEventSink};
pub use self::file_partitioned::FilePartitionedStore;
pub use self::http_gateway::HttpQueueGateway;
pub use self::inmem_gateway::InMemoryQueueGateway;
pub use self::inmem_publisher::InMemoryPublisher;
pub use self::jsonl_publisher::JsonLinesPublisher;
pub use self::partitioned_memory::InMemoryPartitionedStore;
