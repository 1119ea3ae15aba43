//! Report and balance caching using Moka.
//!
//! Memoizes idempotent report reads keyed by report type and parameters.
//! The cache is best-effort: posting and voiding invalidate the affected
//! prefixes, and a miss simply recomputes from the posted ledger.

use moka::sync::Cache;
use std::time::Duration;

use ledgerly_shared::config::CacheConfig;

/// Key prefix for report payloads.
pub const REPORT_PREFIX: &str = "report:";

/// Key prefix for transaction/balance reads.
pub const BALANCE_PREFIX: &str = "balance:";

/// Cache for computed report payloads.
///
/// Thread-safe and suitable for concurrent access from request handlers.
#[derive(Clone)]
pub struct ReportCache {
    cache: Cache<String, serde_json::Value>,
}

impl ReportCache {
    /// Creates a cache from the application cache configuration.
    #[must_use]
    pub fn new(config: &CacheConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.max_capacity)
            .time_to_live(Duration::from_secs(config.report_ttl_secs))
            .build();

        Self { cache }
    }

    /// Builds the cache key for a report read.
    #[must_use]
    pub fn report_key(report_type: &str, params: &str) -> String {
        format!("{REPORT_PREFIX}{report_type}:{params}")
    }

    /// Looks up a cached payload.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<serde_json::Value> {
        self.cache.get(key)
    }

    /// Stores a payload.
    pub fn set(&self, key: String, value: serde_json::Value) {
        self.cache.insert(key, value);
    }

    /// Invalidates a single key.
    pub fn invalidate(&self, key: &str) {
        self.cache.invalidate(key);
    }

    /// Invalidates every entry whose key starts with `prefix`.
    ///
    /// Used by post/void: any cached report may now be stale.
    pub fn invalidate_prefix(&self, prefix: &str) {
        let keys: Vec<String> = self
            .cache
            .iter()
            .filter(|(k, _)| k.starts_with(prefix))
            .map(|(k, _)| k.as_ref().clone())
            .collect();

        for key in keys {
            self.cache.invalidate(&key);
        }
    }

    /// Invalidates everything.
    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }

    /// Returns the number of cached entries.
    ///
    /// Runs pending maintenance first so the count reflects recent
    /// invalidations.
    #[must_use]
    pub fn entry_count(&self) -> u64 {
        self.cache.run_pending_tasks();
        self.cache.entry_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn test_cache() -> ReportCache {
        ReportCache::new(&CacheConfig {
            report_ttl_secs: 60,
            transaction_ttl_secs: 60,
            max_capacity: 100,
        })
    }

    #[test]
    fn test_set_and_get() {
        let cache = test_cache();
        let key = ReportCache::report_key("trial_balance", "2026-08-01");
        cache.set(key.clone(), json!({"total_debit": "100.00"}));

        let value = cache.get(&key).expect("cached value");
        assert_eq!(value["total_debit"], "100.00");
    }

    #[test]
    fn test_miss_returns_none() {
        let cache = test_cache();
        assert!(cache.get("report:balance_sheet:2026-08-01").is_none());
    }

    #[test]
    fn test_invalidate_prefix() {
        let cache = test_cache();
        cache.set(
            ReportCache::report_key("trial_balance", "2026-08-01"),
            json!(1),
        );
        cache.set(
            ReportCache::report_key("balance_sheet", "2026-08-01"),
            json!(2),
        );
        cache.set(format!("{BALANCE_PREFIX}acct-1"), json!(3));

        cache.invalidate_prefix(REPORT_PREFIX);

        assert!(cache
            .get(&ReportCache::report_key("trial_balance", "2026-08-01"))
            .is_none());
        assert!(cache
            .get(&ReportCache::report_key("balance_sheet", "2026-08-01"))
            .is_none());
        // Balance entries survive a report-prefix flush.
        assert!(cache.get(&format!("{BALANCE_PREFIX}acct-1")).is_some());
    }

    #[test]
    fn test_invalidate_all() {
        let cache = test_cache();
        cache.set("report:a".to_string(), json!(1));
        cache.set("balance:b".to_string(), json!(2));

        cache.invalidate_all();

        assert!(cache.get("report:a").is_none());
        assert!(cache.get("balance:b").is_none());
    }

    #[test]
    fn test_report_key_format() {
        assert_eq!(
            ReportCache::report_key("trial_balance", "2026-08-01"),
            "report:trial_balance:2026-08-01"
        );
    }
}
