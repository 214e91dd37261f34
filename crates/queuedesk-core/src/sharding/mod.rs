//! Hash-based shard routing.

mod fnv;
mod router;

pub use self::fnv::fnv1a_32;
pub use self::router::{PartitionNumber, ShardRouter};
