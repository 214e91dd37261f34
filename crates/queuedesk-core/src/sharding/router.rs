//! ShardRouter - ID からパーティション番号への純粋関数
//!
//! `shard_for(key) = fnv1a_32(key) % N + 1`
//!
//! # 制約
//! - すべてのエンティティで同じ関数を使う（仮想ノードやリングは無し）
//! - N を変えるとほぼ全キーが再配置される。再シャーディングはオフラインの
//!   データ移行で行い、稼働中のリバランスはしない
//! - N = 0 は起動時の設定エラー（リクエスト時には発生しない）

use std::fmt;
use std::num::NonZeroU32;

use super::fnv::fnv1a_32;
use crate::config::ConfigError;

/// 1-based partition number in `[1, N]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PartitionNumber(NonZeroU32);

impl PartitionNumber {
    pub fn new(n: u32) -> Option<Self> {
        NonZeroU32::new(n).map(Self)
    }

    pub fn get(&self) -> u32 {
        self.0.get()
    }

    /// 0-based slot for indexing partition segments.
    pub fn index(&self) -> usize {
        (self.0.get() - 1) as usize
    }
}

impl fmt::Display for PartitionNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "shard_{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShardRouter {
    shard_count: NonZeroU32,
}

impl ShardRouter {
    pub fn new(shard_count: u32) -> Result<Self, ConfigError> {
        let shard_count =
            NonZeroU32::new(shard_count).ok_or(ConfigError::InvalidShardCount(shard_count))?;
        Ok(Self { shard_count })
    }

    pub fn shard_count(&self) -> u32 {
        self.shard_count.get()
    }

    pub fn shard_for(&self, key: &str) -> PartitionNumber {
        let slot = fnv1a_32(key.as_bytes()) % self.shard_count.get();
        // slot + 1 <= N <= u32::MAX, so this never overflows or hits zero
        PartitionNumber(NonZeroU32::MIN.saturating_add(slot))
    }

    /// Iterate over every partition number `1..=N`.
    pub fn partitions(&self) -> impl Iterator<Item = PartitionNumber> + use<> {
        (1..=self.shard_count.get()).filter_map(PartitionNumber::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn zero_shards_is_a_configuration_error() {
        assert!(matches!(
            ShardRouter::new(0),
            Err(ConfigError::InvalidShardCount(0))
        ));
    }

    #[rstest]
    #[case::id_123_of_4("123", 4, 4)]
    #[case::id_42_of_4("42", 4, 4)]
    #[case::id_7_of_4("7", 4, 3)]
    #[case::id_1_of_4("1", 4, 1)]
    #[case::id_2_of_4("2", 4, 2)]
    #[case::id_7_of_3("7", 3, 1)]
    #[case::empty_of_4("", 4, 2)]
    fn routes_known_keys(#[case] key: &str, #[case] shards: u32, #[case] expected: u32) {
        let router = ShardRouter::new(shards).unwrap();
        assert_eq!(router.shard_for(key).get(), expected);
    }

    #[test]
    fn single_shard_degenerates_to_one() {
        let router = ShardRouter::new(1).unwrap();
        for key in ["", "1", "42", "abc", "999999999"] {
            assert_eq!(router.shard_for(key).get(), 1);
        }
    }

    #[rstest]
    #[case(1)]
    #[case(2)]
    #[case(7)]
    #[case(64)]
    fn every_key_lands_in_range(#[case] shards: u32) {
        let router = ShardRouter::new(shards).unwrap();
        for i in 0..2_000 {
            let p = router.shard_for(&i.to_string()).get();
            assert!((1..=shards).contains(&p), "key {i} -> {p}");
        }
    }

    #[test]
    fn equal_hash_residue_means_equal_partition() {
        let router = ShardRouter::new(4).unwrap();
        // "1", "5" and "9" all have fnv1a_32 % 4 == 0
        let a = router.shard_for("1");
        assert_eq!(a, router.shard_for("5"));
        assert_eq!(a, router.shard_for("9"));
    }

    #[test]
    fn routing_is_deterministic_across_instances() {
        let first = ShardRouter::new(4).unwrap();
        let second = ShardRouter::new(4).unwrap();
        for i in 0..500 {
            let key = i.to_string();
            assert_eq!(first.shard_for(&key), second.shard_for(&key));
        }
    }

    #[test]
    fn large_shard_count_does_not_overflow() {
        let router = ShardRouter::new(u32::MAX).unwrap();
        let p = router.shard_for("a");
        assert_eq!(p.get(), 0xe40c_292c + 1);
    }

    #[test]
    fn partitions_lists_every_number() {
        let router = ShardRouter::new(3).unwrap();
        let numbers: Vec<u32> = router.partitions().map(|p| p.get()).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert_eq!(PartitionNumber::new(3).unwrap().index(), 2);
        assert_eq!(PartitionNumber::new(3).unwrap().to_string(), "shard_3");
    }
}
