//! Errors - エラー型と分類
//!
//! # 分類
//! - Validation: 入力不備（I/O の前に拒否）
//! - NotFound: ID に対応するレコードが割り当てパーティションに存在しない
//! - Dependency: store / queue engine / stream の接続・応答エラー
//! - Configuration: 起動時に致命的な設定エラー
//!
//! コア内に自動リトライはありません。Dependency を一時的なものとして
//! 再試行するかどうかは呼び出し側が決めます。

use thiserror::Error;

use super::ids::{InvalidIdentifier, ServicePointId};
use crate::config::ConfigError;
use crate::ports::{GatewayError, PublishError, StoreError};

/// ErrorKind は ServiceError の運用分類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Dependency,
    Configuration,
}

/// Request rejected before any I/O.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error(transparent)]
    InvalidIdentifier(#[from] InvalidIdentifier),
}

/// Failure of one of the three external collaborators.
#[derive(Debug, Error)]
pub enum DependencyError {
    #[error("record store: {0}")]
    Store(StoreError),

    #[error("queue engine: {0}")]
    Gateway(#[from] GatewayError),

    #[error("event stream: {0}")]
    Publisher(#[from] PublishError),

    #[error("deadline exceeded during {operation}")]
    DeadlineExceeded { operation: &'static str },
}

/// Error surfaced by `ServicePointService`.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("service point {0} not found")]
    NotFound(ServicePointId),

    #[error(transparent)]
    Dependency(#[from] DependencyError),

    #[error(transparent)]
    Configuration(#[from] ConfigError),
}

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ServiceError::Validation(_) => ErrorKind::Validation,
            ServiceError::NotFound(_) => ErrorKind::NotFound,
            ServiceError::Dependency(_) => ErrorKind::Dependency,
            ServiceError::Configuration(_) => ErrorKind::Configuration,
        }
    }

    /// Only dependency failures may succeed on a later attempt.
    pub fn is_transient(&self) -> bool {
        self.kind() == ErrorKind::Dependency
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => ServiceError::NotFound(id),
            StoreError::InvalidIdentifier(e) => ServiceError::Validation(e.into()),
            other => ServiceError::Dependency(DependencyError::Store(other)),
        }
    }
}

impl From<GatewayError> for ServiceError {
    fn from(err: GatewayError) -> Self {
        ServiceError::Dependency(err.into())
    }
}

impl From<PublishError> for ServiceError {
    fn from(err: PublishError) -> Self {
        ServiceError::Dependency(err.into())
    }
}

impl From<InvalidIdentifier> for ServiceError {
    fn from(err: InvalidIdentifier) -> Self {
        ServiceError::Validation(err.into())
    }
}
