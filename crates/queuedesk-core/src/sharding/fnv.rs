//! 32-bit FNV-1a.
//!
//! 既存データのパーティション配置と互換にするため、Go の `hash/fnv.New32a`
//! とビット単位で一致する必要があります。別のハッシュに置き換えないこと。

const OFFSET_BASIS: u32 = 0x811c_9dc5;
const PRIME: u32 = 0x0100_0193;

pub fn fnv1a_32(bytes: &[u8]) -> u32 {
    bytes.iter().fold(OFFSET_BASIS, |hash, &byte| {
        (hash ^ u32::from(byte)).wrapping_mul(PRIME)
    })
}
