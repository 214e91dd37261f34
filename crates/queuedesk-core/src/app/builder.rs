//! ServiceBuilder - サービスの構築とワイヤリング
//!
//! # 方針
//! - 協調者（store / gateway / publisher）は必須。欠けていれば build() で失敗
//! - clock と event sink は省略可能（SystemClock / TracingEventSink）
//! - `from_config` は設定から本番用の実装を組み立てる。個別の差し替えも可能

use std::sync::Arc;
use std::time::Duration;

use super::service::ServicePointService;
use crate::config::{Config, ConfigError, StorageBackend};
use crate::impls::{
    FilePartitionedStore, HttpQueueGateway, InMemoryPartitionedStore, JsonLinesPublisher,
    TracingEventSink,
};
use crate::ports::{
    Clock, EventPublisher, EventSink, GatewayError, PublishError, QueueGateway, RecordStore,
    StoreError, SystemClock,
};
use crate::sharding::ShardRouter;

/// ServiceBuilder は ServicePointService を構築
///
/// # 使用例
/// ```ignore
/// let service = ServiceBuilder::from_config(&config)
///     .await?
///     .gateway(Arc::new(InMemoryQueueGateway::new()))
///     .build()?;
/// ```
#[derive(Default)]
pub struct ServiceBuilder {
    store: Option<Arc<dyn RecordStore>>,
    gateway: Option<Arc<dyn QueueGateway>>,
    publisher: Option<Arc<dyn EventPublisher>>,
    sink: Option<Arc<dyn EventSink>>,
    clock: Option<Arc<dyn Clock>>,
    request_timeout: Option<Duration>,
}

/// BuildError はサービス構築時のエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Missing collaborators: {0:?}. These must be provided before build().")]
    MissingCollaborators(Vec<&'static str>),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to open record store: {0}")]
    Store(#[from] StoreError),

    #[error("failed to set up queue engine client: {0}")]
    Gateway(#[from] GatewayError),

    #[error("failed to open event stream: {0}")]
    Publisher(#[from] PublishError),
}

impl ServiceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// 設定から本番用の協調者を組み立てる
    ///
    /// - store: `storage.shard_count` 分割。`storage.backend` が file なら
    ///   `storage.data_dir` 配下の shard ファイル、memory ならプロセス内のみ
    /// - gateway: `queue_engine.base_url` への HTTP クライアント
    /// - publisher: `stream.path` への JSON Lines 追記
    pub async fn from_config(config: &Config) -> Result<Self, BuildError> {
        config.validate()?;

        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let router = ShardRouter::new(config.storage.shard_count)?;
        let store: Arc<dyn RecordStore> = match config.storage.backend {
            StorageBackend::File => Arc::new(
                FilePartitionedStore::open_with_clock(
                    router,
                    &config.storage.data_dir,
                    clock.clone(),
                )
                .await?,
            ),
            StorageBackend::Memory => {
                Arc::new(InMemoryPartitionedStore::with_clock(router, clock.clone()))
            }
        };
        let gateway = HttpQueueGateway::from_config(&config.queue_engine)?;
        let publisher = JsonLinesPublisher::open(&config.stream.path).await?;

        Ok(Self::new()
            .store(store)
            .gateway(Arc::new(gateway))
            .publisher(Arc::new(publisher))
            .clock(clock)
            .request_timeout(config.service.request_timeout()))
    }

    pub fn store(mut self, store: Arc<dyn RecordStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn gateway(mut self, gateway: Arc<dyn QueueGateway>) -> Self {
        self.gateway = Some(gateway);
        self
    }

    pub fn publisher(mut self, publisher: Arc<dyn EventPublisher>) -> Self {
        self.publisher = Some(publisher);
        self
    }

    pub fn event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Clock used for completion event timestamps.
    ///
    /// A store built by `from_config` keeps the clock it was created with.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn build(self) -> Result<ServicePointService, BuildError> {
        let mut missing = Vec::new();
        if self.store.is_none() {
            missing.push("store");
        }
        if self.gateway.is_none() {
            missing.push("gateway");
        }
        if self.publisher.is_none() {
            missing.push("publisher");
        }

        match (self.store, self.gateway, self.publisher) {
            (Some(store), Some(gateway), Some(publisher)) => Ok(ServicePointService::new(
                store,
                gateway,
                publisher,
                self.sink.unwrap_or_else(|| Arc::new(TracingEventSink)),
                self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            )
            .with_request_timeout(self.request_timeout)),
            _ => Err(BuildError::MissingCollaborators(missing)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::CallContext;
    use crate::config::{Config, StorageConfig, StreamConfig};
    use crate::domain::ServicePointRequest;
    use crate::impls::{InMemoryPublisher, InMemoryQueueGateway};

    fn config_in(dir: &std::path::Path, backend: StorageBackend) -> Config {
        Config {
            storage: StorageConfig {
                backend,
                data_dir: dir.join("records"),
                ..StorageConfig::default()
            },
            stream: StreamConfig {
                path: dir.join("nested").join("completed.jsonl"),
            },
            ..Config::default()
        }
    }

    #[test]
    fn build_reports_every_missing_collaborator() {
        let result = ServiceBuilder::new()
            .gateway(Arc::new(InMemoryQueueGateway::new()))
            .build();
        assert!(matches!(
            result,
            Err(BuildError::MissingCollaborators(missing)) if missing == vec!["store", "publisher"]
        ));
    }

    #[test]
    fn build_with_defaults_for_optional_parts() {
        let router = ShardRouter::new(2).unwrap();
        let service = ServiceBuilder::new()
            .store(Arc::new(InMemoryPartitionedStore::new(router)))
            .gateway(Arc::new(InMemoryQueueGateway::new()))
            .publisher(Arc::new(InMemoryPublisher::new()))
            .request_timeout(Some(Duration::from_secs(1)))
            .build();
        assert!(service.is_ok());
    }

    #[tokio::test]
    async fn from_config_opens_stream_and_carries_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path(), StorageBackend::Memory);

        let service = ServiceBuilder::from_config(&config)
            .await
            .unwrap()
            .gateway(Arc::new(InMemoryQueueGateway::new()))
            .build()
            .unwrap();

        assert!(dir.path().join("nested").join("completed.jsonl").exists());
        assert!(service.context().deadline().is_some());
    }

    #[tokio::test]
    async fn file_backend_keeps_records_across_rebuilds() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path(), StorageBackend::File);
        let request = ServicePointRequest::new("Front desk", "FD", "101");

        let first = ServiceBuilder::from_config(&config)
            .await
            .unwrap()
            .gateway(Arc::new(InMemoryQueueGateway::new()))
            .build()
            .unwrap();
        first
            .upsert(&CallContext::background(), "42", &request)
            .await
            .unwrap();
        drop(first);

        let second = ServiceBuilder::from_config(&config)
            .await
            .unwrap()
            .gateway(Arc::new(InMemoryQueueGateway::new()))
            .build()
            .unwrap();
        let record = second.get(&CallContext::background(), "42").await.unwrap();
        assert_eq!(record.short_name, "FD");
        // "42" routes to shard_4 with the default N = 4
        assert!(dir.path().join("records").join("shard_4.json").exists());
    }

    #[tokio::test]
    async fn from_config_rejects_zero_shards() {
        let mut config = Config::default();
        config.storage.shard_count = 0;

        let result = ServiceBuilder::from_config(&config).await;
        assert!(matches!(
            result,
            Err(BuildError::Config(ConfigError::InvalidShardCount(0)))
        ));
    }
}
