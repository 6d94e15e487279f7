// In-memory runtime seeded from a snapshot JSON file (demo and tests).

use std::path::Path;
use std::sync::Mutex;

use super::{CacheRuntime, RuntimeError};
use crate::models::RawSnapshot;
use crate::normalizer::normalize_path;

pub struct FixtureRuntime {
    state: Mutex<RawSnapshot>,
}

impl FixtureRuntime {
    pub fn new(snapshot: RawSnapshot) -> Self {
        Self {
            state: Mutex::new(snapshot),
        }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, RuntimeError> {
        let data = std::fs::read(path)?;
        Ok(Self::new(serde_json::from_slice(&data)?))
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut RawSnapshot) -> T) -> Result<T, RuntimeError> {
        let mut state = self.state.lock().map_err(|_| RuntimeError::Poisoned)?;
        Ok(f(&mut state))
    }
}

fn now_secs() -> i64 {
    chrono::Utc::now().timestamp()
}

impl CacheRuntime for FixtureRuntime {
    fn snapshot(&self) -> Result<RawSnapshot, RuntimeError> {
        self.with_state(|s| s.clone())
    }

    fn reset_all(&self) -> Result<bool, RuntimeError> {
        self.with_state(|s| {
            s.scripts.clear();
            if let Some(mem) = s.memory.as_mut() {
                mem.free = mem.total;
                mem.used = 0;
                mem.wasted = 0;
                mem.current_wasted_percentage = 0.0;
            }
            if let Some(stats) = s.statistics.as_mut() {
                stats.num_cached_scripts = 0;
                stats.num_cached_keys = 0;
                stats.last_restart_time = now_secs();
                stats.manual_restarts += 1;
            }
            true
        })
    }

    /// Paths compare after separator normalization, so the forward-slash form shown
    /// on the dashboard finds entries stored with backslashes.
    fn invalidate(&self, path: &str) -> Result<bool, RuntimeError> {
        let wanted = normalize_path(path);
        self.with_state(|s| match s
            .scripts
            .iter_mut()
            .find(|x| normalize_path(&x.full_path) == wanted)
        {
            Some(script) => {
                script.timestamp = Some(0);
                true
            }
            None => false,
        })
    }
}
