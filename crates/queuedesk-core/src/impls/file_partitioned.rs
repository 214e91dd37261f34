//! FilePartitionedStore - パーティションごとにファイルへ永続化するストア
//!
//! `{data_dir}/shard_{n}.json` が 1 パーティション分のレコード（JSON 配列）です。
//! 読み書きは InMemoryPartitionedStore に任せ、変更のあったパーティションだけを
//! ファイルへ書き戻します。
//!
//! # 実装詳細
//! - 書き戻しは `.json.tmp` に書いてから rename（途中でクラッシュしても元ファイルは無傷）
//! - パーティションごとの書き込みロックの中でスナップショットを取るので、
//!   後から書かれたファイルほど新しい状態になる
//! - 起動時に全ファイルを読み込み、各レコードが現在の N で同じパーティションに
//!   ルーティングされることを確認する（N を変えたらオフライン移行が必要）
//! - ファイル書き込みが失敗した場合はメモリ側が先行したまま Unavailable を返す

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::partitioned_memory::InMemoryPartitionedStore;
use crate::domain::{ServicePointId, ServicePointRecord, ServicePointRequest};
use crate::ports::{Clock, RecordStore, StoreError, SystemClock};
use crate::sharding::{PartitionNumber, ShardRouter};

pub struct FilePartitionedStore {
    data_dir: PathBuf,
    inner: InMemoryPartitionedStore,
    /// index = partition number - 1
    writers: Vec<Mutex<()>>,
}

impl FilePartitionedStore {
    pub async fn open(router: ShardRouter, data_dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        Self::open_with_clock(router, data_dir, Arc::new(SystemClock)).await
    }

    pub async fn open_with_clock(
        router: ShardRouter,
        data_dir: impl AsRef<Path>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, StoreError> {
        let data_dir = data_dir.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&data_dir)
            .await
            .map_err(|e| io_unavailable("create", &data_dir, e))?;

        reject_orphan_shard_files(&data_dir, router).await?;

        let inner = InMemoryPartitionedStore::with_clock(router, clock);
        let mut loaded = 0;
        for partition in router.partitions() {
            let records = read_shard_file(&shard_path(&data_dir, partition)).await?;
            loaded += records.len();
            inner.restore(partition, records).await?;
        }
        info!(data_dir = %data_dir.display(), shards = router.shard_count(), loaded, "opened partitioned store");

        let writers = router.partitions().map(|_| Mutex::new(())).collect();
        Ok(Self {
            data_dir,
            inner,
            writers,
        })
    }

    /// File backing one partition.
    pub fn shard_file(&self, partition: PartitionNumber) -> PathBuf {
        shard_path(&self.data_dir, partition)
    }

    pub async fn partition_sizes(&self) -> Vec<usize> {
        self.inner.partition_sizes().await
    }

    /// Write the current contents of the partition holding `id` back to disk.
    async fn persist(&self, id: ServicePointId) -> Result<(), StoreError> {
        let partition = self.inner.router().shard_for(&id.routing_key());
        let writer = self.writers.get(partition.index()).ok_or_else(|| {
            StoreError::Unavailable(format!("{partition} has no shard file"))
        })?;
        let _guard = writer.lock().await;

        let records = self.inner.snapshot(partition).await;
        let body = serde_json::to_vec_pretty(&records)
            .map_err(|e| StoreError::Unavailable(format!("failed to encode {partition}: {e}")))?;

        let path = self.shard_file(partition);
        let tmp_path = path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, body)
            .await
            .map_err(|e| io_unavailable("write", &tmp_path, e))?;
        tokio::fs::rename(&tmp_path, &path)
            .await
            .map_err(|e| io_unavailable("replace", &path, e))?;
        debug!(%partition, records = records.len(), "persisted shard file");
        Ok(())
    }
}

fn shard_path(data_dir: &Path, partition: PartitionNumber) -> PathBuf {
    data_dir.join(format!("{partition}.json"))
}

fn io_unavailable(action: &str, path: &Path, err: std::io::Error) -> StoreError {
    StoreError::Unavailable(format!("failed to {action} {}: {err}", path.display()))
}

/// A `shard_{k}.json` with k > N was written under a larger shard count.
async fn reject_orphan_shard_files(data_dir: &Path, router: ShardRouter) -> Result<(), StoreError> {
    let mut entries = tokio::fs::read_dir(data_dir)
        .await
        .map_err(|e| io_unavailable("list", data_dir, e))?;
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| io_unavailable("list", data_dir, e))?
    {
        let name = entry.file_name();
        let shard = name
            .to_str()
            .and_then(|n| n.strip_prefix("shard_"))
            .and_then(|n| n.strip_suffix(".json"))
            .and_then(|n| n.parse::<u32>().ok());
        if let Some(k) = shard.filter(|&k| k > router.shard_count()) {
            return Err(StoreError::Constraint(format!(
                "found shard_{k}.json but shard count is {}",
                router.shard_count()
            )));
        }
    }
    Ok(())
}

async fn read_shard_file(path: &Path) -> Result<Vec<ServicePointRecord>, StoreError> {
    match tokio::fs::read(path).await {
        Ok(body) => serde_json::from_slice(&body).map_err(|e| {
            StoreError::Unavailable(format!("corrupt shard file {}: {e}", path.display()))
        }),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(io_unavailable("read", path, e)),
    }
}

#[async_trait]
impl RecordStore for FilePartitionedStore {
    async fn create(
        &self,
        request: &ServicePointRequest,
    ) -> Result<ServicePointRecord, StoreError> {
        let record = self.inner.create(request).await?;
        self.persist(record.id).await?;
        Ok(record)
    }

    async fn update(
        &self,
        id: &str,
        request: &ServicePointRequest,
    ) -> Result<ServicePointRecord, StoreError> {
        let record = self.inner.update(id, request).await?;
        self.persist(record.id).await?;
        Ok(record)
    }

    async fn upsert(
        &self,
        id: &str,
        request: &ServicePointRequest,
    ) -> Result<ServicePointRecord, StoreError> {
        let record = self.inner.upsert(id, request).await?;
        self.persist(record.id).await?;
        Ok(record)
    }

    async fn delete(&self, id: &str) -> Result<ServicePointRecord, StoreError> {
        let record = self.inner.delete(id).await?;
        self.persist(record.id).await?;
        Ok(record)
    }

    async fn get_by_id(&self, id: &str) -> Result<ServicePointRecord, StoreError> {
        self.inner.get_by_id(id).await
    }

    async fn get_short_name_by_id(&self, id: &str) -> Result<String, StoreError> {
        self.inner.get_short_name_by_id(id).await
    }

    async fn get_office_number_by_id(&self, id: &str) -> Result<String, StoreError> {
        self.inner.get_office_number_by_id(id).await
    }
}
