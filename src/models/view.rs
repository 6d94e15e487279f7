// Display-ready projection of a raw snapshot

use serde::{Deserialize, Serialize};

use super::{RawStatus, RawVersion};

/// A displayed value together with its pre-formatted text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Formatted<T> {
    pub value: T,
    pub display: String,
}

/// Explicit presence of every conditional section, so renderers never branch on `Option`s.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Presence {
    pub overview: bool,
    pub file_cache_only: bool,
    pub interned_strings: bool,
    pub jit: bool,
    pub preload: bool,
}

/// Effective highlight toggles (JIT is forced off without a JIT buffer).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Highlight {
    pub memory: bool,
    pub hits: bool,
    pub keys: bool,
    pub jit: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryView {
    pub total: Formatted<u64>,
    pub used: Formatted<u64>,
    pub free: Formatted<u64>,
    pub wasted: Formatted<u64>,
    pub wasted_percentage: Formatted<f64>,
    pub used_percentage: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsView {
    pub hits: Formatted<u64>,
    pub misses: Formatted<u64>,
    pub blacklist_misses: Formatted<u64>,
    pub cached_scripts: Formatted<u64>,
    pub cached_keys: Formatted<u64>,
    pub max_cached_keys: Formatted<u64>,
    pub oom_restarts: Formatted<u64>,
    pub hash_restarts: Formatted<u64>,
    pub manual_restarts: Formatted<u64>,
    pub hit_rate_percentage: u32,
    pub used_key_percentage: u32,
    pub start_time: Formatted<i64>,
    pub last_restart_time: Formatted<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewView {
    pub memory: MemoryView,
    pub statistics: StatisticsView,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InternedStringsView {
    pub buffer_size: Formatted<u64>,
    pub used_memory: Formatted<u64>,
    pub free_memory: Formatted<u64>,
    pub number_of_strings: Formatted<u64>,
    pub used_percentage: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JitView {
    pub enabled: bool,
    pub buffer_size: Formatted<u64>,
    pub buffer_free: Formatted<u64>,
    pub buffer_used_percentage: u32,
    pub mode: DirectiveValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptView {
    /// Path with forward slashes only.
    pub full_path: String,
    pub hits: Formatted<u64>,
    pub memory_consumption: Formatted<u64>,
    pub last_used: Formatted<i64>,
    pub last_modified: Option<Formatted<i64>>,
    pub invalidated: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreloadView {
    pub scripts: Vec<String>,
    pub memory_consumption: Option<Formatted<u64>>,
}

/// Decoded directive value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum DirectiveValue {
    Bool(bool),
    Text(String),
    NoValue,
    List(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectiveView {
    pub name: String,
    pub value: DirectiveValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewModel {
    pub version: RawVersion,
    pub status: RawStatus,
    pub presence: Presence,
    pub highlight: Highlight,
    pub overview: Option<OverviewView>,
    pub interned_strings: Option<InternedStringsView>,
    pub jit: Option<JitView>,
    /// Ordered by descending hits; pagination relies on this order.
    pub scripts: Vec<ScriptView>,
    pub scripts_count: Formatted<u64>,
    pub preload: Option<PreloadView>,
    pub directives: Vec<DirectiveView>,
    pub functions: Vec<String>,
}

impl ViewModel {
    /// Top-level section of the serialized model (e.g. "overview", "scripts"), if present.
    pub fn section(&self, name: &str) -> Option<serde_json::Value> {
        let value = serde_json::to_value(self).ok()?;
        match value.get(name) {
            Some(serde_json::Value::Null) | None => None,
            Some(v) => Some(v.clone()),
        }
    }
}
