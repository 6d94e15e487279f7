// Shared test helpers
#![allow(dead_code)]

use opcache_dashboard::config::AppConfig;
use opcache_dashboard::models::*;
use opcache_dashboard::runtime_repo::{CacheRuntime, FixtureRuntime, RuntimeError};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

pub const TEST_CONFIG: &str = r#"
[server]
port = 8081
host = "127.0.0.1"

[runtime]
kind = "fixture"
fixture_path = "demos/snapshot.json"

[presenter]
refresh_time_ms = 1000
debounce_rate_ms = 50
"#;

pub fn test_app_config() -> AppConfig {
    AppConfig::load_from_str(TEST_CONFIG).unwrap()
}

pub fn script(path: &str, hits: u64, timestamp: Option<i64>) -> RawScript {
    RawScript {
        full_path: path.to_string(),
        hits,
        memory_consumption: 2048,
        last_used_timestamp: 1_700_000_000,
        timestamp,
    }
}

/// A fully populated snapshot: 3 scripts, JIT, interned strings, preload.
pub fn sample_snapshot() -> RawSnapshot {
    let mut directives = BTreeMap::new();
    directives.insert("opcache.enable".to_string(), RawDirective::Bool(true));
    directives.insert(
        "opcache.memory_consumption".to_string(),
        RawDirective::Int(134_217_728),
    );
    directives.insert(
        "opcache.optimization_level".to_string(),
        RawDirective::Int(0),
    );
    directives.insert(
        "opcache.jit".to_string(),
        RawDirective::Text("tracing".to_string()),
    );
    RawSnapshot {
        version: RawVersion {
            runtime_version: "8.3.4".into(),
            host_version: "8.3.4".into(),
            server_identity: "nginx/1.25".into(),
            host_name: "web-1".into(),
            gui_version: "3.5.5".into(),
        },
        status: RawStatus {
            enabled: true,
            ..RawStatus::default()
        },
        file_cache_only: false,
        memory: Some(RawMemory {
            total: 134_217_728,
            used: 33_554_432,
            free: 100_663_296,
            wasted: 0,
            current_wasted_percentage: 0.0,
        }),
        statistics: Some(RawStatistics {
            hits: 900,
            misses: 100,
            blacklist_misses: 0,
            num_cached_scripts: 3,
            num_cached_keys: 5,
            max_cached_keys: 10,
            start_time: 1_700_000_000,
            last_restart_time: 0,
            oom_restarts: 0,
            hash_restarts: 0,
            manual_restarts: 0,
        }),
        interned_strings: Some(RawInternedStrings {
            buffer_size: 8_388_608,
            used_memory: 4_194_304,
            free_memory: 4_194_304,
            number_of_strings: 12_345,
        }),
        jit: Some(RawJit {
            enabled: true,
            buffer_size: 1_048_576,
            buffer_free: 786_432,
            mode: "tracing".into(),
        }),
        scripts: vec![
            script("/var/www/app/index.php", 10, Some(1_700_000_100)),
            script("C:\\www\\Lib\\Util.php", 50, Some(1_700_000_200)),
            script("/var/www/app/config.php", 10, Some(1_700_000_300)),
        ],
        preload: Some(RawPreload {
            scripts: vec!["/var/www/preload/b.php".into(), "/var/www/preload/a.php".into()],
            memory_consumption: Some(4096),
        }),
        directives,
        functions: vec!["zeta".into(), "alpha".into()],
    }
}

/// Sample snapshot with reporting limited to the file cache.
pub fn file_cache_only_snapshot() -> RawSnapshot {
    RawSnapshot {
        file_cache_only: true,
        memory: None,
        statistics: None,
        ..sample_snapshot()
    }
}

/// Fixture runtime that counts calls and can be told to refuse invalidations.
pub struct CountingRuntime {
    inner: FixtureRuntime,
    pub snapshots: AtomicUsize,
    pub invalidations: AtomicUsize,
    refuse_invalidate: bool,
}

impl CountingRuntime {
    pub fn new(snapshot: RawSnapshot) -> Self {
        Self {
            inner: FixtureRuntime::new(snapshot),
            snapshots: AtomicUsize::new(0),
            invalidations: AtomicUsize::new(0),
            refuse_invalidate: false,
        }
    }

    pub fn refusing(snapshot: RawSnapshot) -> Self {
        Self {
            refuse_invalidate: true,
            ..Self::new(snapshot)
        }
    }

    pub fn snapshot_calls(&self) -> usize {
        self.snapshots.load(Ordering::SeqCst)
    }
}

impl CacheRuntime for CountingRuntime {
    fn snapshot(&self) -> Result<RawSnapshot, RuntimeError> {
        self.snapshots.fetch_add(1, Ordering::SeqCst);
        self.inner.snapshot()
    }

    fn reset_all(&self) -> Result<bool, RuntimeError> {
        self.inner.reset_all()
    }

    fn invalidate(&self, path: &str) -> Result<bool, RuntimeError> {
        self.invalidations.fetch_add(1, Ordering::SeqCst);
        if self.refuse_invalidate {
            return Ok(false);
        }
        self.inner.invalidate(path)
    }
}
