//! RecordStore port - パーティション分割されたサービスポイントの正本
//!
//! # 設計原則
//! - 各操作はまず ShardRouter で対象パーティションを決め、そのパーティションだけを操作する
//! - 複数パーティションへのファンアウトはしない（横断読み取りパスは存在しない）
//! - ストアはリトライしない。エラーはそのまま呼び出し側へ返す
//! - upsert はレコード単位で原子的。可変フィールドは常に全置換

use async_trait::async_trait;

use crate::domain::{InvalidIdentifier, ServicePointId, ServicePointRecord, ServicePointRequest};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("service point {0} not found")]
    NotFound(ServicePointId),

    #[error(transparent)]
    InvalidIdentifier(#[from] InvalidIdentifier),

    #[error("constraint violation: {0}")]
    Constraint(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// CRUD + two scalar projections over service point records.
///
/// Identifiers arrive as strings; an implementation must reject ones it
/// cannot route with `StoreError::InvalidIdentifier` instead of scanning.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert a new record with a store-assigned id.
    async fn create(&self, request: &ServicePointRequest)
        -> Result<ServicePointRecord, StoreError>;

    /// Replace every mutable field of an existing record.
    async fn update(
        &self,
        id: &str,
        request: &ServicePointRequest,
    ) -> Result<ServicePointRecord, StoreError>;

    /// Create the record if absent, otherwise replace every mutable field.
    async fn upsert(
        &self,
        id: &str,
        request: &ServicePointRequest,
    ) -> Result<ServicePointRecord, StoreError>;

    /// Remove and return the record.
    async fn delete(&self, id: &str) -> Result<ServicePointRecord, StoreError>;

    async fn get_by_id(&self, id: &str) -> Result<ServicePointRecord, StoreError>;

    async fn get_short_name_by_id(&self, id: &str) -> Result<String, StoreError>;

    async fn get_office_number_by_id(&self, id: &str) -> Result<String, StoreError>;
}
