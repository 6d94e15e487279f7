// Snapshot normalizer: raw runtime snapshot -> display-ready view model.
// Pure and deterministic apart from the local timezone used for timestamps.

pub mod directives;
pub mod format;

use thiserror::Error;

use crate::config::DisplayConfig;
use crate::models::*;
use format::{format_percentage, format_size, format_timestamp, number_format, percentage};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NormalizeError {
    /// Required section missing while memory/statistics reporting is active.
    #[error("malformed snapshot: `{0}` is missing but file-cache-only mode is off")]
    MalformedSnapshot(&'static str),
}

struct Fmt<'a>(&'a DisplayConfig);

impl Fmt<'_> {
    fn count(&self, n: u64) -> Formatted<u64> {
        Formatted {
            value: n,
            display: number_format(n),
        }
    }

    fn size(&self, bytes: u64) -> Formatted<u64> {
        Formatted {
            value: bytes,
            display: format_size(bytes, self.0.size_precision, self.0.size_space),
        }
    }

    fn time(&self, secs: i64) -> Formatted<i64> {
        Formatted {
            value: secs,
            display: format_timestamp(secs, &self.0.datetime_format),
        }
    }

    /// Like `time`, but 0 renders the localized "never".
    fn time_or_never(&self, secs: i64) -> Formatted<i64> {
        if secs == 0 {
            Formatted {
                value: 0,
                display: self.0.text("never").to_string(),
            }
        } else {
            self.time(secs)
        }
    }
}

/// Backslash separators become forward slashes.
pub fn normalize_path(path: &str) -> String {
    path.replace('\\', "/")
}

fn overview(raw: &RawSnapshot, f: &Fmt<'_>) -> Result<Option<OverviewView>, NormalizeError> {
    if raw.file_cache_only {
        return Ok(None);
    }
    let mem = raw
        .memory
        .as_ref()
        .ok_or(NormalizeError::MalformedSnapshot("memory"))?;
    let stats = raw
        .statistics
        .as_ref()
        .ok_or(NormalizeError::MalformedSnapshot("statistics"))?;

    let memory = MemoryView {
        total: f.size(mem.total),
        used: f.size(mem.used),
        free: f.size(mem.free),
        wasted: f.size(mem.wasted),
        wasted_percentage: Formatted {
            value: mem.current_wasted_percentage,
            display: format_percentage(mem.current_wasted_percentage),
        },
        used_percentage: percentage(mem.used.saturating_add(mem.wasted), mem.total),
    };
    let statistics = StatisticsView {
        hits: f.count(stats.hits),
        misses: f.count(stats.misses),
        blacklist_misses: f.count(stats.blacklist_misses),
        cached_scripts: f.count(stats.num_cached_scripts),
        cached_keys: f.count(stats.num_cached_keys),
        max_cached_keys: f.count(stats.max_cached_keys),
        oom_restarts: f.count(stats.oom_restarts),
        hash_restarts: f.count(stats.hash_restarts),
        manual_restarts: f.count(stats.manual_restarts),
        hit_rate_percentage: percentage(stats.hits, stats.hits.saturating_add(stats.misses)),
        used_key_percentage: percentage(stats.num_cached_keys, stats.max_cached_keys),
        start_time: f.time(stats.start_time),
        last_restart_time: f.time_or_never(stats.last_restart_time),
    };
    Ok(Some(OverviewView { memory, statistics }))
}

fn scripts(raw: &[RawScript], f: &Fmt<'_>) -> Vec<ScriptView> {
    let mut out: Vec<ScriptView> = raw
        .iter()
        .map(|s| ScriptView {
            full_path: normalize_path(&s.full_path),
            hits: f.count(s.hits),
            memory_consumption: f.size(s.memory_consumption),
            last_used: f.time(s.last_used_timestamp),
            last_modified: s.timestamp.filter(|t| *t != 0).map(|t| f.time(t)),
            invalidated: s.timestamp == Some(0),
        })
        .collect();
    // sort_by is stable: equal hit counts keep snapshot order
    out.sort_by(|a, b| b.hits.value.cmp(&a.hits.value));
    out
}

fn jit(raw: Option<&RawJit>, f: &Fmt<'_>) -> Option<JitView> {
    raw.map(|j| JitView {
        enabled: j.enabled,
        buffer_size: f.size(j.buffer_size),
        buffer_free: f.size(j.buffer_free),
        buffer_used_percentage: percentage(
            j.buffer_size.saturating_sub(j.buffer_free),
            j.buffer_size,
        ),
        mode: directives::decode_jit_mode(&j.mode),
    })
}

/// Normalize a raw snapshot into a view model.
///
/// Optional sections (interned strings, JIT, preload) are simply absent when the runtime
/// does not report them. Fails only when memory or statistics are missing outside of
/// file-cache-only mode.
pub fn normalize(raw: &RawSnapshot, config: &DisplayConfig) -> Result<ViewModel, NormalizeError> {
    let f = Fmt(config);
    let overview = overview(raw, &f)?;

    let interned_strings = raw.interned_strings.as_ref().map(|s| InternedStringsView {
        buffer_size: f.size(s.buffer_size),
        used_memory: f.size(s.used_memory),
        free_memory: f.size(s.free_memory),
        number_of_strings: f.count(s.number_of_strings),
        used_percentage: percentage(s.used_memory, s.buffer_size),
    });

    let jit = jit(raw.jit.as_ref(), &f);
    let has_jit_buffer = jit.as_ref().is_some_and(|j| j.buffer_size.value > 0);

    let preload = raw.preload.as_ref().map(|p| {
        let mut scripts: Vec<String> = p.scripts.iter().map(|s| normalize_path(s)).collect();
        scripts.sort();
        PreloadView {
            scripts,
            memory_consumption: p.memory_consumption.map(|m| f.size(m)),
        }
    });

    let mut functions = raw.functions.clone();
    functions.sort();

    let scripts = scripts(&raw.scripts, &f);
    let scripts_count = f.count(scripts.len() as u64);

    Ok(ViewModel {
        version: raw.version.clone(),
        status: raw.status,
        presence: Presence {
            overview: overview.is_some(),
            file_cache_only: raw.file_cache_only,
            interned_strings: interned_strings.is_some(),
            jit: jit.is_some(),
            preload: preload.is_some(),
        },
        highlight: Highlight {
            memory: config.highlight.memory,
            hits: config.highlight.hits,
            keys: config.highlight.keys,
            jit: config.highlight.jit && has_jit_buffer,
        },
        overview,
        interned_strings,
        jit,
        scripts,
        scripts_count,
        preload,
        directives: directives::decode_all(&raw.directives, config),
        functions,
    })
}
