//! Test doubles for service tests.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use super::service::ServicePointService;
use crate::domain::{ServicePointRecord, ServicePointRequest, Ticket};
use crate::impls::{InMemoryPartitionedStore, InMemoryPublisher, RecordingEventSink};
use crate::ports::{FixedClock, GatewayError, QueueGateway, RecordStore, StoreError};
use crate::sharding::ShardRouter;

/// Partitioned store that records which operations were called and can
/// be switched into an outage or slowed down.
pub struct SpyStore {
    inner: InMemoryPartitionedStore,
    calls: Mutex<Vec<&'static str>>,
    unavailable: AtomicBool,
    delay: Mutex<Option<Duration>>,
}

impl SpyStore {
    pub fn new(shard_count: u32) -> Self {
        Self {
            inner: InMemoryPartitionedStore::new(ShardRouter::new(shard_count).unwrap()),
            calls: Mutex::new(Vec::new()),
            unavailable: AtomicBool::new(false),
            delay: Mutex::new(None),
        }
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    async fn enter(&self, op: &'static str) -> Result<(), StoreError> {
        self.calls.lock().unwrap().push(op);
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("connection refused".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl RecordStore for SpyStore {
    async fn create(
        &self,
        request: &ServicePointRequest,
    ) -> Result<ServicePointRecord, StoreError> {
        self.enter("create").await?;
        self.inner.create(request).await
    }

    async fn update(
        &self,
        id: &str,
        request: &ServicePointRequest,
    ) -> Result<ServicePointRecord, StoreError> {
        self.enter("update").await?;
        self.inner.update(id, request).await
    }

    async fn upsert(
        &self,
        id: &str,
        request: &ServicePointRequest,
    ) -> Result<ServicePointRecord, StoreError> {
        self.enter("upsert").await?;
        self.inner.upsert(id, request).await
    }

    async fn delete(&self, id: &str) -> Result<ServicePointRecord, StoreError> {
        self.enter("delete").await?;
        self.inner.delete(id).await
    }

    async fn get_by_id(&self, id: &str) -> Result<ServicePointRecord, StoreError> {
        self.enter("get_by_id").await?;
        self.inner.get_by_id(id).await
    }

    async fn get_short_name_by_id(&self, id: &str) -> Result<String, StoreError> {
        self.enter("get_short_name_by_id").await?;
        self.inner.get_short_name_by_id(id).await
    }

    async fn get_office_number_by_id(&self, id: &str) -> Result<String, StoreError> {
        self.enter("get_office_number_by_id").await?;
        self.inner.get_office_number_by_id(id).await
    }
}

/// Queue engine stand-in: issue mints `{short}-{n}`, retire always yields `T9`.
#[derive(Default)]
pub struct ScriptedGateway {
    issued: Mutex<Vec<(String, String)>>,
    retired: Mutex<Vec<String>>,
    seq: AtomicU32,
    failing: AtomicBool,
    delay: Mutex<Option<Duration>>,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    pub fn issued(&self) -> Vec<(String, String)> {
        self.issued.lock().unwrap().clone()
    }

    pub fn retired(&self) -> Vec<String> {
        self.retired.lock().unwrap().clone()
    }

    async fn script(&self) -> Result<(), GatewayError> {
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(GatewayError::Transport("connection reset".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl QueueGateway for ScriptedGateway {
    async fn issue(&self, id: &str, short_code: &str) -> Result<Ticket, GatewayError> {
        self.script().await?;
        self.issued
            .lock()
            .unwrap()
            .push((id.to_string(), short_code.to_string()));
        let n = self.seq.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(Ticket::new(format!("{short_code}-{n}")))
    }

    async fn retire(&self, id: &str) -> Result<Ticket, GatewayError> {
        self.script().await?;
        self.retired.lock().unwrap().push(id.to_string());
        Ok(Ticket::new("T9"))
    }
}

/// Service wired to spies, with the clock pinned at 2026-01-02T03:04:05Z.
pub struct Fixture {
    pub service: ServicePointService,
    pub store: Arc<SpyStore>,
    pub gateway: Arc<ScriptedGateway>,
    pub publisher: Arc<InMemoryPublisher>,
    pub sink: Arc<RecordingEventSink>,
}

impl Fixture {
    pub fn new() -> Self {
        Self::build(Arc::new(SpyStore::new(4)), Arc::new(ScriptedGateway::new()))
    }

    pub fn with_store(store: Arc<SpyStore>) -> Self {
        Self::build(store, Arc::new(ScriptedGateway::new()))
    }

    pub fn with_gateway(gateway: ScriptedGateway) -> Self {
        Self::build(Arc::new(SpyStore::new(4)), Arc::new(gateway))
    }

    fn build(store: Arc<SpyStore>, gateway: Arc<ScriptedGateway>) -> Self {
        let publisher = Arc::new(InMemoryPublisher::new());
        let sink = Arc::new(RecordingEventSink::new());
        let clock = Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap(),
        ));
        let service = ServicePointService::builder()
            .store(store.clone())
            .gateway(gateway.clone())
            .publisher(publisher.clone())
            .event_sink(sink.clone())
            .clock(clock)
            .build()
            .unwrap();
        Self {
            service,
            store,
            gateway,
            publisher,
            sink,
        }
    }

    pub async fn seed(&self, id: &str, name: &str, short_name: &str, office_number: &str) {
        self.store
            .upsert(id, &ServicePointRequest::new(name, short_name, office_number))
            .await
            .unwrap();
    }
}
