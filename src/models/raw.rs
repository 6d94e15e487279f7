// Raw snapshot as reported by the cache runtime (collaborator wire format)

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawVersion {
    pub runtime_version: String,
    pub host_version: String,
    pub server_identity: String,
    pub host_name: String,
    pub gui_version: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawStatus {
    pub enabled: bool,
    pub cache_full: bool,
    pub restart_pending: bool,
    pub restart_in_progress: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMemory {
    pub total: u64,
    pub used: u64,
    pub free: u64,
    pub wasted: u64,
    #[serde(default)]
    pub current_wasted_percentage: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawStatistics {
    pub hits: u64,
    pub misses: u64,
    pub blacklist_misses: u64,
    pub num_cached_scripts: u64,
    pub num_cached_keys: u64,
    pub max_cached_keys: u64,
    pub start_time: i64,
    /// 0 means the cache was never restarted.
    pub last_restart_time: i64,
    #[serde(default)]
    pub oom_restarts: u64,
    #[serde(default)]
    pub hash_restarts: u64,
    #[serde(default)]
    pub manual_restarts: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawInternedStrings {
    pub buffer_size: u64,
    pub used_memory: u64,
    pub free_memory: u64,
    pub number_of_strings: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawJit {
    #[serde(default)]
    pub enabled: bool,
    pub buffer_size: u64,
    pub buffer_free: u64,
    /// Packed mode descriptor ("tracing", "1255", ...).
    #[serde(default)]
    pub mode: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawScript {
    pub full_path: String,
    pub hits: u64,
    pub memory_consumption: u64,
    pub last_used_timestamp: i64,
    /// Last-modified time seen by the runtime; 0 once the entry has been invalidated.
    #[serde(default)]
    pub timestamp: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPreload {
    #[serde(default)]
    pub scripts: Vec<String>,
    #[serde(default)]
    pub memory_consumption: Option<u64>,
}

/// Directive value exactly as the runtime reports it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawDirective {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<String>),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSnapshot {
    pub version: RawVersion,
    #[serde(default)]
    pub status: RawStatus,
    #[serde(default)]
    pub file_cache_only: bool,
    #[serde(default)]
    pub memory: Option<RawMemory>,
    #[serde(default)]
    pub statistics: Option<RawStatistics>,
    #[serde(default)]
    pub interned_strings: Option<RawInternedStrings>,
    #[serde(default)]
    pub jit: Option<RawJit>,
    #[serde(default)]
    pub scripts: Vec<RawScript>,
    #[serde(default)]
    pub preload: Option<RawPreload>,
    #[serde(default)]
    pub directives: BTreeMap<String, RawDirective>,
    #[serde(default)]
    pub functions: Vec<String>,
}

impl RawSnapshot {
    /// Top-level section by its wire name (e.g. "memory", "scripts"), if present.
    pub fn section(&self, name: &str) -> Option<serde_json::Value> {
        let value = serde_json::to_value(self).ok()?;
        match value.get(name) {
            Some(serde_json::Value::Null) | None => None,
            Some(v) => Some(v.clone()),
        }
    }
}
