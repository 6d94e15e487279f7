// Built-in English strings; `[display.language_pack]` overrides any of them by key.

pub fn default_text(key: &str) -> Option<&'static str> {
    let text = match key {
        "never" => "never",
        "none" => "none",
        "yes" => "Yes",
        "no" => "No",
        "tab_overview" => "Overview",
        "tab_files" => "Cached",
        "tab_reset" => "Reset cache",
        "tab_realtime_enable" => "Enable real-time update",
        "tab_realtime_disable" => "Disable real-time update",
        "general_info" => "General info",
        "directives" => "Directives",
        "functions" => "Available functions",
        "preload" => "Preloaded files",
        "memory" => "memory",
        "hit_rate" => "hit rate",
        "keys" => "keys",
        "jit_buffer" => "jit buffer",
        "memory_usage" => "Memory usage",
        "statistics" => "Statistics",
        "interned_strings" => "Interned strings usage",
        "jit" => "JIT",
        "total_memory" => "total memory",
        "used_memory" => "used memory",
        "free_memory" => "free memory",
        "wasted_memory" => "wasted memory",
        "number_of_strings" => "number of strings",
        "buffer_size" => "buffer size",
        "buffer_free" => "buffer free",
        "hits" => "hits",
        "misses" => "misses",
        "blacklist_misses" => "blacklist misses",
        "cached_scripts" => "number of cached files",
        "cached_keys" => "number of cached keys",
        "max_cached_keys" => "max cached keys",
        "oom_restarts" => "out of memory restarts",
        "hash_restarts" => "hash table restarts",
        "manual_restarts" => "manual restarts",
        "start_time" => "start time",
        "last_restart_time" => "last restart time",
        "file_cache_only" => {
            "You have opcache.file_cache_only turned on. As a result, the memory information \
             and statistics are not available."
        }
        "filter_placeholder" => "Start typing to filter on script path",
        "filtered_count" => "showing {0} due to filter",
        "files_cached" => "{0} files cached",
        "no_files" => "No files have been cached or you have opcache.file_cache_only turned on",
        "script_path" => "Script",
        "script_hits" => "Hits",
        "script_memory" => "Memory",
        "script_last_used" => "Last used",
        "script_last_modified" => "Last modified",
        "script_invalidated" => "has been invalidated",
        "invalidate" => "force file invalidation",
        "invalidate_all_matching" => "Invalidate all matching files",
        "action_failed" => "The request could not be completed",
        "page" => "page {0} of {1}",
        _ => return None,
    };
    Some(text)
}

/// Substitute `{0}`, `{1}`, ... placeholders in `template`.
pub fn fill(template: &str, args: &[&str]) -> String {
    let mut out = template.to_string();
    for (i, arg) in args.iter().enumerate() {
        out = out.replace(&format!("{{{}}}", i), arg);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_replaces_positional_placeholders() {
        assert_eq!(fill("page {0} of {1}", &["2", "7"]), "page 2 of 7");
        assert_eq!(fill("no placeholders", &["x"]), "no placeholders");
    }

    #[test]
    fn unknown_key_has_no_default() {
        assert!(default_text("does_not_exist").is_none());
        assert_eq!(default_text("never"), Some("never"));
    }
}
