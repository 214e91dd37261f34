//! App - オーケストレーション層
//!
//! # 構成
//! - **ServicePointService**: CRUD と enqueue / dequeue のワークフロー
//! - **ServiceBuilder**: 協調者のワイヤリングと起動時検証
//! - **CallContext**: 呼び出しごとの締め切りと request id

pub mod builder;
pub mod context;
pub mod service;

#[cfg(test)]
pub(crate) mod test_support;

pub use self::builder::{BuildError, ServiceBuilder};
pub use self::context::CallContext;
pub use self::service::ServicePointService;
