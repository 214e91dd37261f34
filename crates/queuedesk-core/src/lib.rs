//! queuedesk-core
//!
//! Service point records and ticket orchestration over a partitioned store.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（ids, service_point, ticket, errors, events）
//! - **sharding**: FNV-1a によるパーティション割り当て
//! - **ports**: 抽象化レイヤー（RecordStore, QueueGateway, EventPublisher, EventSink, Clock）
//! - **impls**: 実装（パーティション分割ストア、HTTP / インメモリのキューイングエンジン、ストリーム）
//! - **app**: オーケストレーション（ServicePointService, ServiceBuilder, CallContext）
//! - **config**: YAML 設定

pub mod app;
pub mod config;
pub mod domain;
pub mod impls;
pub mod ports;
pub mod sharding;

pub use app::{CallContext, ServiceBuilder, ServicePointService};
pub use domain::{ErrorKind, ServiceError};
