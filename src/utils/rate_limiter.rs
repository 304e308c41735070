//! 进程内速率限制
//!
//! 计数表通过 [`RateLimitStore`] 注入，默认实现 [`MemoryRateLimitStore`] 使用 DashMap，
//! 每个键的读-改-写在 entry 锁内完成，不会丢失并发计数。
//! 计数不持久化，进程重启即清空；只在单实例内有效。

use dashmap::DashMap;
use std::sync::Arc;

/// 单个键的计数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitCounter {
    pub count: u32,
    /// 窗口重置时间（Unix 毫秒）
    pub window_reset_at: i64,
}

/// 计数表存储
pub trait RateLimitStore: Send + Sync {
    /// 记录一次请求并返回是否放行
    fn hit(&self, key: &str, max_requests: u32, window_millis: i64, now_millis: i64) -> bool;

    /// 查看当前计数（不修改）
    fn peek(&self, key: &str) -> Option<RateLimitCounter>;
}

#[derive(Default)]
pub struct MemoryRateLimitStore {
    counters: DashMap<String, RateLimitCounter>,
}

impl MemoryRateLimitStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RateLimitStore for MemoryRateLimitStore {
    fn hit(&self, key: &str, max_requests: u32, window_millis: i64, now_millis: i64) -> bool {
        let fresh = RateLimitCounter {
            count: 1,
            window_reset_at: now_millis.saturating_add(window_millis),
        };

        let mut entry = self.counters.entry(key.to_string()).or_insert_with(|| RateLimitCounter {
            count: 0,
            window_reset_at: i64::MIN,
        });

        let counter = entry.value_mut();
        if counter.count == 0 || now_millis > counter.window_reset_at {
            *counter = fresh;
            return true;
        }

        if counter.count >= max_requests {
            return false;
        }

        counter.count += 1;
        true
    }

    fn peek(&self, key: &str) -> Option<RateLimitCounter> {
        self.counters.get(key).map(|c| *c)
    }
}

/// 速率限制器
#[derive(Clone)]
pub struct RateLimiter {
    store: Arc<dyn RateLimitStore>,
}

impl RateLimiter {
    pub fn new(store: Arc<dyn RateLimitStore>) -> Self {
        Self { store }
    }

    /// 使用进程内计数表
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryRateLimitStore::new()))
    }

    /// 按当前时间检查
    ///
    /// 首次调用或窗口已过期时计数重置为 1 并放行；窗口内最多放行 `max_requests` 次。
    pub fn check_rate_limit(&self, key: &str, max_requests: u32, window_millis: i64) -> bool {
        self.check_rate_limit_at(
            key,
            max_requests,
            window_millis,
            chrono::Utc::now().timestamp_millis(),
        )
    }

    /// 使用显式时间检查
    pub fn check_rate_limit_at(
        &self,
        key: &str,
        max_requests: u32,
        window_millis: i64,
        now_millis: i64,
    ) -> bool {
        self.store.hit(key, max_requests, window_millis, now_millis)
    }

    pub fn counter(&self, key: &str) -> Option<RateLimitCounter> {
        self.store.peek(key)
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::in_memory()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: i64 = 900_000;

    #[test]
    fn test_allows_exactly_max_in_window() {
        let limiter = RateLimiter::in_memory();
        let start = 1_000_000;
        for i in 0..5 {
            assert!(
                limiter.check_rate_limit_at("login:ip:1.2.3.4", 5, WINDOW, start + i),
                "call {i}"
            );
        }
        assert!(!limiter.check_rate_limit_at("login:ip:1.2.3.4", 5, WINDOW, start + 10));
        assert!(!limiter.check_rate_limit_at("login:ip:1.2.3.4", 5, WINDOW, start + WINDOW));
    }

    #[test]
    fn test_resets_after_window() {
        let limiter = RateLimiter::in_memory();
        let start = 5_000;
        for _ in 0..6 {
            limiter.check_rate_limit_at("k", 5, WINDOW, start);
        }
        assert!(!limiter.check_rate_limit_at("k", 5, WINDOW, start + WINDOW));

        // 严格大于重置时间才重置
        assert!(limiter.check_rate_limit_at("k", 5, WINDOW, start + WINDOW + 1));
        let counter = limiter.counter("k").unwrap();
        assert_eq!(counter.count, 1);
        assert_eq!(counter.window_reset_at, start + 2 * WINDOW + 1);
    }

    #[test]
    fn test_keys_are_independent() {
        let limiter = RateLimiter::in_memory();
        assert!(limiter.check_rate_limit_at("a", 1, WINDOW, 0));
        assert!(!limiter.check_rate_limit_at("a", 1, WINDOW, 1));
        assert!(limiter.check_rate_limit_at("b", 1, WINDOW, 1));
    }

    #[test]
    fn test_concurrent_hits_are_not_lost() {
        let limiter = RateLimiter::in_memory();
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let limiter = limiter.clone();
                std::thread::spawn(move || {
                    (0..50)
                        .filter(|_| limiter.check_rate_limit_at("shared", 100, WINDOW, 42))
                        .count()
                })
            })
            .collect();

        let allowed: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(allowed, 100);
        assert_eq!(limiter.counter("shared").unwrap().count, 100);
    }
}
