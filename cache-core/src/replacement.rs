//! 替换策略：在组内选择被淘汰的行
//!
//! 无效（从未使用）的行与有效行一视同仁，不会被优先选中。

use crate::policy::{CacheType, ReplacementPolicy};
use crate::state::CacheSet;
use rand::Rng;

/// 选择组内的淘汰行
///
/// # 参数
/// - `set`: 目标组
/// - `cache_type`: 直接映射时恒为第0行，不查询策略
/// - `policy`: LRU 或随机
/// - `rng`: 随机策略使用的随机数源
///
/// # 返回
/// 被淘汰行在组内的下标
pub fn select_victim<R: Rng + ?Sized>(
    set: &CacheSet,
    cache_type: CacheType,
    policy: ReplacementPolicy,
    rng: &mut R,
) -> usize {
    match cache_type {
        CacheType::DirectMapped => 0,
        CacheType::SetAssociative => match policy {
            ReplacementPolicy::Lru => select_lru(set),
            ReplacementPolicy::Random => select_random(set, rng),
        },
    }
}

/// LRU：最近使用计数最大的行；并列时取下标最小者
pub fn select_lru(set: &CacheSet) -> usize {
    let mut victim = 0;
    let mut max_recency = 0;
    for (way, line) in set.lines().iter().enumerate() {
        if way == 0 || line.recency() > max_recency {
            victim = way;
            max_recency = line.recency();
        }
    }
    victim
}

/// 随机替换：[0, 行数) 内均匀分布
pub fn select_random<R: Rng + ?Sized>(set: &CacheSet, rng: &mut R) -> usize {
    rng.gen_range(0..set.ways())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Cache, CacheLine};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn four_way_set(recency: [u64; 4]) -> CacheSet {
        let mut cache = Cache::new(1, CacheType::SetAssociative).unwrap();
        let set = cache.set_mut(0);
        for (way, r) in recency.into_iter().enumerate() {
            let mut line = CacheLine::filled(way as u64, format!("d{way}"), false);
            line.recency = r;
            set.replace(way, line);
        }
        set.clone()
    }

    #[test]
    fn test_direct_mapped_always_line_zero() {
        let cache = Cache::new(1, CacheType::DirectMapped).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        for policy in [ReplacementPolicy::Lru, ReplacementPolicy::Random] {
            assert_eq!(
                select_victim(&cache.sets()[0], CacheType::DirectMapped, policy, &mut rng),
                0
            );
        }
    }

    #[test]
    fn test_lru_picks_max_recency() {
        let set = four_way_set([1, 3, 0, 2]);
        assert_eq!(select_lru(&set), 1);
    }

    #[test]
    fn test_lru_tie_prefers_lowest_index() {
        let set = four_way_set([2, 5, 5, 1]);
        assert_eq!(select_lru(&set), 1);

        let fresh = Cache::new(1, CacheType::SetAssociative).unwrap();
        assert_eq!(select_lru(&fresh.sets()[0]), 0);
    }

    #[test]
    fn test_random_stays_in_range_and_covers_all_ways() {
        let set = four_way_set([0, 0, 0, 0]);
        let mut rng = StdRng::seed_from_u64(42);
        let mut seen = [false; 4];
        for _ in 0..256 {
            let way =
                select_victim(&set, CacheType::SetAssociative, ReplacementPolicy::Random, &mut rng);
            assert!(way < 4);
            seen[way] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }
}
