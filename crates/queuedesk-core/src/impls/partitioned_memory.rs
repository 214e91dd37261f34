//! InMemoryPartitionedStore - N 分割されたサービスポイントストア
//!
//! 単一パーティション版と N パーティション版を一つに畳んだ実装です。
//! N = 1 では `hash % 1 + 1 == 1` となり、自然に単一パーティションへ退化します。
//!
//! # 実装詳細
//! - パーティションごとに独立したセグメント（HashMap）を持ち、それぞれ別の Mutex で保護
//! - 操作は ShardRouter で決まった 1 セグメントだけをロックする
//! - create の採番はストア全体のシーケンス。upsert で指定された ID より後ろへ進める

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use crate::domain::{ServicePointId, ServicePointRecord, ServicePointRequest};
use crate::ports::{Clock, RecordStore, StoreError, SystemClock};
use crate::sharding::{PartitionNumber, ShardRouter};

/// One partition's isolated data segment.
#[derive(Debug, Default)]
struct PartitionSegment {
    rows: HashMap<ServicePointId, ServicePointRecord>,
}

pub struct InMemoryPartitionedStore {
    router: ShardRouter,
    /// index = partition number - 1
    partitions: Vec<Mutex<PartitionSegment>>,
    next_id: AtomicI64,
    clock: Arc<dyn Clock>,
}

impl InMemoryPartitionedStore {
    pub fn new(router: ShardRouter) -> Self {
        Self::with_clock(router, Arc::new(SystemClock))
    }

    pub fn with_clock(router: ShardRouter, clock: Arc<dyn Clock>) -> Self {
        let partitions = router
            .partitions()
            .map(|_| Mutex::new(PartitionSegment::default()))
            .collect();
        Self {
            router,
            partitions,
            next_id: AtomicI64::new(1),
            clock,
        }
    }

    pub fn router(&self) -> &ShardRouter {
        &self.router
    }

    /// Partition an identifier resolves to (fails fast on unparsable ids).
    pub fn partition_of(&self, id: &str) -> Result<PartitionNumber, StoreError> {
        let id: ServicePointId = id.parse()?;
        Ok(self.router.shard_for(&id.routing_key()))
    }

    /// Record count per partition, in partition order.
    pub async fn partition_sizes(&self) -> Vec<usize> {
        let mut sizes = Vec::with_capacity(self.partitions.len());
        for segment in &self.partitions {
            sizes.push(segment.lock().await.rows.len());
        }
        sizes
    }

    fn resolve(&self, id: &str) -> Result<(ServicePointId, &Mutex<PartitionSegment>), StoreError> {
        let id: ServicePointId = id.parse()?;
        let segment = self.segment_for(id)?;
        Ok((id, segment))
    }

    fn segment_for(&self, id: ServicePointId) -> Result<&Mutex<PartitionSegment>, StoreError> {
        let partition = self.router.shard_for(&id.routing_key());
        self.partitions.get(partition.index()).ok_or_else(|| {
            StoreError::Unavailable(format!("{partition} has no data segment"))
        })
    }

    /// Take the next store-assigned id; never wraps past `i64::MAX`.
    fn allocate_id(&self) -> Result<i64, StoreError> {
        self.next_id
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_add(1))
            .map_err(|_| StoreError::Constraint("id sequence exhausted".into()))
    }

    fn advance_sequence_past(&self, id: ServicePointId) {
        self.next_id
            .fetch_max(id.value().saturating_add(1), Ordering::SeqCst);
    }

    /// Records currently held by one partition, ordered by id.
    pub(crate) async fn snapshot(&self, partition: PartitionNumber) -> Vec<ServicePointRecord> {
        let Some(segment) = self.partitions.get(partition.index()) else {
            return Vec::new();
        };
        let mut records: Vec<_> = segment.lock().await.rows.values().cloned().collect();
        records.sort_by_key(|record| record.id);
        records
    }

    /// Load previously persisted records into `partition`.
    ///
    /// Every record must route to `partition` under the current shard count;
    /// a mismatch means N changed without an offline migration.
    pub(crate) async fn restore(
        &self,
        partition: PartitionNumber,
        records: Vec<ServicePointRecord>,
    ) -> Result<(), StoreError> {
        let segment = self
            .partitions
            .get(partition.index())
            .ok_or_else(|| StoreError::Unavailable(format!("{partition} has no data segment")))?;
        let mut segment = segment.lock().await;
        for record in records {
            let routed = self.router.shard_for(&record.id.routing_key());
            if routed != partition {
                return Err(StoreError::Constraint(format!(
                    "service point {} stored in {partition} but routes to {routed}",
                    record.id
                )));
            }
            self.advance_sequence_past(record.id);
            segment.rows.insert(record.id, record);
        }
        Ok(())
    }

    fn check_constraints(request: &ServicePointRequest) -> Result<(), StoreError> {
        request
            .validate()
            .map_err(|e| StoreError::Constraint(e.to_string()))
    }
}

#[async_trait]
impl RecordStore for InMemoryPartitionedStore {
    async fn create(
        &self,
        request: &ServicePointRequest,
    ) -> Result<ServicePointRecord, StoreError> {
        Self::check_constraints(request)?;
        loop {
            let id = ServicePointId::new(self.allocate_id()?);
            let mut segment = self.segment_for(id)?.lock().await;
            // a concurrent upsert may have claimed this id before the sequence moved past it
            if segment.rows.contains_key(&id) {
                continue;
            }
            let record = ServicePointRecord::new(id, request, self.clock.now());
            segment.rows.insert(id, record.clone());
            debug!(%id, partition = %self.router.shard_for(&id.routing_key()), "created service point");
            return Ok(record);
        }
    }

    async fn update(
        &self,
        id: &str,
        request: &ServicePointRequest,
    ) -> Result<ServicePointRecord, StoreError> {
        Self::check_constraints(request)?;
        let (id, segment) = self.resolve(id)?;
        let mut segment = segment.lock().await;
        let record = segment.rows.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        record.replace_fields(request, self.clock.now());
        Ok(record.clone())
    }

    async fn upsert(
        &self,
        id: &str,
        request: &ServicePointRequest,
    ) -> Result<ServicePointRecord, StoreError> {
        Self::check_constraints(request)?;
        let (id, segment) = self.resolve(id)?;
        let now = self.clock.now();
        let record = {
            let mut segment = segment.lock().await;
            let record = segment
                .rows
                .entry(id)
                .and_modify(|existing| existing.replace_fields(request, now))
                .or_insert_with(|| ServicePointRecord::new(id, request, now));
            record.clone()
        };
        self.advance_sequence_past(id);
        debug!(%id, partition = %self.router.shard_for(&id.routing_key()), "upserted service point");
        Ok(record)
    }

    async fn delete(&self, id: &str) -> Result<ServicePointRecord, StoreError> {
        let (id, segment) = self.resolve(id)?;
        let removed = segment.lock().await.rows.remove(&id);
        removed.ok_or(StoreError::NotFound(id))
    }

    async fn get_by_id(&self, id: &str) -> Result<ServicePointRecord, StoreError> {
        let (id, segment) = self.resolve(id)?;
        let segment = segment.lock().await;
        segment.rows.get(&id).cloned().ok_or(StoreError::NotFound(id))
    }

    async fn get_short_name_by_id(&self, id: &str) -> Result<String, StoreError> {
        let (id, segment) = self.resolve(id)?;
        let segment = segment.lock().await;
        segment
            .rows
            .get(&id)
            .map(|record| record.short_name.clone())
            .ok_or(StoreError::NotFound(id))
    }

    async fn get_office_number_by_id(&self, id: &str) -> Result<String, StoreError> {
        let (id, segment) = self.resolve(id)?;
        let segment = segment.lock().await;
        segment
            .rows
            .get(&id)
            .map(|record| record.office_number.clone())
            .ok_or(StoreError::NotFound(id))
    }
}
