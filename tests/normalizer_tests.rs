// Snapshot normalizer: formatting, ordering and decoding on whole snapshots

mod common;

use common::{file_cache_only_snapshot, sample_snapshot, script};
use opcache_dashboard::config::DisplayConfig;
use opcache_dashboard::models::{DirectiveValue, RawDirective};
use opcache_dashboard::normalizer::format::{format_size, number_format, percentage, scale};
use opcache_dashboard::normalizer::{NormalizeError, normalize};
use proptest::prelude::*;

#[test]
fn test_formats_sizes_and_counts() {
    assert_eq!(format_size(1536, 2, false), "1.50KB");
    assert_eq!(format_size(1536, 2, true), "1.50 KB");
    assert_eq!(format_size(512, 0, false), "512b");
    assert_eq!(format_size(1024, 2, false), "1.00KB");
    assert_eq!(format_size(134_217_728, 2, false), "128.00MB");
    assert_eq!(number_format(0), "0");
    assert_eq!(number_format(999), "999");
    assert_eq!(number_format(1_234_567), "1,234,567");
}

#[test]
fn test_percentages_round_and_guard_zero() {
    assert_eq!(percentage(1, 3), 33);
    assert_eq!(percentage(2, 3), 67);
    assert_eq!(percentage(5, 0), 0);
    assert_eq!(percentage(0, 0), 0);
}

#[test]
fn test_overview_values() {
    let vm = normalize(&sample_snapshot(), &DisplayConfig::default()).unwrap();
    let ov = vm.overview.as_ref().expect("overview present");
    assert_eq!(ov.memory.total.display, "128.00MB");
    assert_eq!(ov.memory.used.display, "32.00MB");
    assert_eq!(ov.memory.used_percentage, 25);
    assert_eq!(ov.statistics.hits.display, "900");
    assert_eq!(ov.statistics.hit_rate_percentage, 90);
    assert_eq!(ov.statistics.used_key_percentage, 50);
    assert_eq!(ov.statistics.last_restart_time.display, "never");
    assert_eq!(vm.jit.as_ref().unwrap().buffer_used_percentage, 25);
    assert_eq!(vm.interned_strings.as_ref().unwrap().used_percentage, 50);
    assert_eq!(vm.scripts_count.value, 3);
}

#[test]
fn test_scripts_sorted_by_hits_and_paths_normalized() {
    let vm = normalize(&sample_snapshot(), &DisplayConfig::default()).unwrap();
    let paths: Vec<&str> = vm.scripts.iter().map(|s| s.full_path.as_str()).collect();
    // ties keep snapshot order
    assert_eq!(
        paths,
        vec![
            "C:/www/Lib/Util.php",
            "/var/www/app/index.php",
            "/var/www/app/config.php"
        ]
    );
}

#[test]
fn test_invalidated_script_has_no_last_modified() {
    let mut raw = sample_snapshot();
    raw.scripts = vec![
        script("/a.php", 3, Some(0)),
        script("/b.php", 2, None),
        script("/c.php", 1, Some(1_700_000_000)),
    ];
    let vm = normalize(&raw, &DisplayConfig::default()).unwrap();
    assert!(vm.scripts[0].invalidated);
    assert!(vm.scripts[0].last_modified.is_none());
    assert!(!vm.scripts[1].invalidated);
    assert!(vm.scripts[1].last_modified.is_none());
    assert!(!vm.scripts[2].invalidated);
    assert!(vm.scripts[2].last_modified.is_some());
}

#[test]
fn test_file_cache_only_omits_overview() {
    let vm = normalize(&file_cache_only_snapshot(), &DisplayConfig::default()).unwrap();
    assert!(vm.overview.is_none());
    assert!(vm.presence.file_cache_only);
    assert!(!vm.presence.overview);
    assert_eq!(vm.scripts.len(), 3);
}

#[test]
fn test_missing_statistics_is_malformed() {
    let mut raw = sample_snapshot();
    raw.statistics = None;
    let err = normalize(&raw, &DisplayConfig::default()).unwrap_err();
    assert_eq!(err, NormalizeError::MalformedSnapshot("statistics"));
}

#[test]
fn test_optional_sections_absent() {
    let mut raw = sample_snapshot();
    raw.jit = None;
    raw.interned_strings = None;
    raw.preload = None;
    let vm = normalize(&raw, &DisplayConfig::default()).unwrap();
    assert!(!vm.presence.jit);
    assert!(!vm.presence.interned_strings);
    assert!(!vm.presence.preload);
    assert!(!vm.highlight.jit);
    assert!(vm.section("jit").is_none());
}

#[test]
fn test_jit_highlight_requires_buffer() {
    let mut raw = sample_snapshot();
    if let Some(jit) = raw.jit.as_mut() {
        jit.buffer_size = 0;
        jit.buffer_free = 0;
    }
    let vm = normalize(&raw, &DisplayConfig::default()).unwrap();
    assert!(!vm.highlight.jit);
    assert_eq!(vm.jit.as_ref().unwrap().buffer_used_percentage, 0);
}

#[test]
fn test_directives_decoded_in_key_order() {
    let vm = normalize(&sample_snapshot(), &DisplayConfig::default()).unwrap();
    let names: Vec<&str> = vm.directives.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "opcache.enable",
            "opcache.jit",
            "opcache.memory_consumption",
            "opcache.optimization_level"
        ]
    );
    assert_eq!(vm.directives[0].value, DirectiveValue::Bool(true));
    let DirectiveValue::List(jit) = &vm.directives[1].value else {
        panic!("expected flag list, got {:?}", vm.directives[1].value);
    };
    assert!(jit[2].starts_with("Trigger: Use tracing JIT"));
    assert_eq!(
        vm.directives[2].value,
        DirectiveValue::Text("128.00MB (134,217,728)".into())
    );
    assert_eq!(vm.directives[3].value, DirectiveValue::Text("none".into()));
}

#[test]
fn test_numeric_jit_mode_is_expanded() {
    let mut raw = sample_snapshot();
    raw.directives
        .insert("opcache.jit".into(), RawDirective::Text("1255".into()));
    let vm = normalize(&raw, &DisplayConfig::default()).unwrap();
    let jit = vm
        .directives
        .iter()
        .find(|d| d.name == "opcache.jit")
        .unwrap();
    let DirectiveValue::List(flags) = &jit.value else {
        panic!("expected flag list, got {:?}", jit.value);
    };
    assert_eq!(flags.len(), 4);
    assert_eq!(
        flags[0],
        "CPU-specific optimization: Enable use of AVX, if the CPU supports it"
    );
    assert_eq!(
        flags[1],
        "Register allocation: Perform global register allocation"
    );
    assert!(flags[2].starts_with("Trigger: Use tracing JIT"));
    assert_eq!(flags[3], "Optimization level: Optimize whole script");
}

#[test]
fn test_preload_and_functions_sorted() {
    let vm = normalize(&sample_snapshot(), &DisplayConfig::default()).unwrap();
    let preload = vm.preload.as_ref().unwrap();
    assert_eq!(
        preload.scripts,
        vec!["/var/www/preload/a.php", "/var/www/preload/b.php"]
    );
    assert_eq!(preload.memory_consumption.as_ref().unwrap().display, "4.00KB");
    assert_eq!(vm.functions, vec!["alpha", "zeta"]);
}

#[test]
fn test_language_pack_applies_to_never() {
    let mut display = DisplayConfig::default();
    display
        .language_pack
        .insert("never".into(), "jamais".into());
    let vm = normalize(&sample_snapshot(), &display).unwrap();
    assert_eq!(
        vm.overview.unwrap().statistics.last_restart_time.display,
        "jamais"
    );
}

#[test]
fn test_normalize_is_deterministic() {
    let raw = sample_snapshot();
    let display = DisplayConfig::default();
    assert_eq!(normalize(&raw, &display), normalize(&raw, &display));
}

proptest! {
    #[test]
    fn prop_scale_keeps_value_in_unit_range(bytes in any::<u64>()) {
        let (value, unit) = scale(bytes);
        prop_assert!(value >= 0.0);
        prop_assert!(value < 1024.0 || unit == 8);
        if bytes >= 1024 {
            prop_assert!(unit >= 1);
            prop_assert!(value >= 1.0);
        }
    }

    #[test]
    fn prop_percentage_bounded(whole in 0u64..1_000_000, part_frac in 0.0f64..=1.0) {
        let part = (whole as f64 * part_frac) as u64;
        prop_assert!(percentage(part, whole) <= 100);
    }

    #[test]
    fn prop_scripts_sorted_and_stable(hits in proptest::collection::vec(0u64..5, 0..30)) {
        let mut raw = sample_snapshot();
        raw.scripts = hits
            .iter()
            .enumerate()
            .map(|(i, h)| script(&format!("/s{:02}.php", i), *h, Some(1)))
            .collect();
        let vm = normalize(&raw, &DisplayConfig::default()).unwrap();
        prop_assert_eq!(vm.scripts.len(), hits.len());
        for pair in vm.scripts.windows(2) {
            prop_assert!(pair[0].hits.value >= pair[1].hits.value);
            if pair[0].hits.value == pair[1].hits.value {
                prop_assert!(pair[0].full_path < pair[1].full_path);
            }
        }
    }
}
