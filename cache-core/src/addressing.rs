//! 地址译码
//!
//! 组索引 = 地址 mod 组数，标签 = 完整地址。
//! 标签不剥离组索引位，与缓存类型无关，因此每个地址在组内都有唯一标签。
//! 这是一种简化，而非教科书式的 tag/index/offset 拆分。

use serde::Serialize;

/// 译码结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct DecodedAddress {
    pub set_index: usize,
    pub tag: u64,
}

/// 将地址译码为 (组索引, 标签)
///
/// 对任何 `num_sets >= 1` 都是全函数；`num_sets` 的范围由配置阶段保证。
#[inline]
pub fn decode(address: u64, num_sets: usize) -> DecodedAddress {
    debug_assert!(num_sets >= 1, "decode requires at least one set");
    DecodedAddress {
        set_index: (address % num_sets as u64) as usize,
        tag: address,
    }
}
