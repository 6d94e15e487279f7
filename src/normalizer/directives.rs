// Directive decoding: each key maps to one rule in a static table.

use crate::config::DisplayConfig;
use crate::models::{DirectiveValue, DirectiveView, RawDirective};

use super::format::{format_size, number_format};

/// How a directive's raw value is turned into a `DirectiveValue`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeRule {
    Plain,
    ByteSize,
    OptimizationLevel,
    JitMode,
}

const RULES: &[(&str, DecodeRule)] = &[
    ("opcache.memory_consumption", DecodeRule::ByteSize),
    ("opcache.jit_buffer_size", DecodeRule::ByteSize),
    ("opcache.optimization_level", DecodeRule::OptimizationLevel),
    ("opcache.jit", DecodeRule::JitMode),
];

pub fn rule_for(key: &str) -> DecodeRule {
    RULES
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, r)| *r)
        .unwrap_or(DecodeRule::Plain)
}

/// Optimizer passes, indexed by bit position of `opcache.optimization_level`.
pub const OPTIMIZATION_PASSES: [&str; 16] = [
    "[CSE, STRING] Constants subexpressions elimination, string construction",
    "[CSE, BINARY] Constant binary operations",
    "[JMP] Jump optimization",
    "[CALL] Call optimization",
    "[CFG] Control flow graph based optimization",
    "[DFA] Data flow analysis (SSA)",
    "[CALL GRAPH] Call graph analysis",
    "[SCCP] Sparse conditional constant propagation",
    "[TMP VAR] Temporary variable optimization",
    "[NOP] Removal of NOPs",
    "[LITERALS] Literal compaction",
    "[STACK] Adjust used stack",
    "[UNUSED VAR] Unused variable removal",
    "[DCE] Dead code elimination",
    "[COLLECT CONSTANTS] Collect constants",
    "[INLINE] Inline functions",
];

/// Flag name and value labels for each digit of a numeric JIT mode (CRTO).
pub const JIT_FLAGS: [(&str, &[&str]); 4] = [
    (
        "CPU-specific optimization",
        &["Disable CPU-specific optimization", "Enable use of AVX, if the CPU supports it"],
    ),
    (
        "Register allocation",
        &[
            "Do not perform register allocation",
            "Perform block-local register allocation",
            "Perform global register allocation",
        ],
    ),
    (
        "Trigger",
        &[
            "Compile all functions on script load",
            "Compile functions on first execution",
            "Profile functions on first request and compile the hottest functions afterwards",
            "Profile on the fly and compile hot functions",
            "Currently unused",
            "Use tracing JIT. Profile on the fly and compile traces for hot code segments",
        ],
    ),
    (
        "Optimization level",
        &[
            "No JIT",
            "Minimal JIT (call standard VM handlers)",
            "Inline VM handlers",
            "Use type inference",
            "Use call graph",
            "Optimize whole script",
        ],
    ),
];

/// Set bits of `level` mapped to pass names, ascending; `None` when no known bit is set.
pub fn decode_optimization_level(level: u64) -> Option<Vec<String>> {
    let passes: Vec<String> = OPTIMIZATION_PASSES
        .iter()
        .enumerate()
        .filter(|(bit, _)| level & (1u64 << bit) != 0)
        .map(|(_, name)| (*name).to_string())
        .collect();
    if passes.is_empty() { None } else { Some(passes) }
}

fn parse_level(raw: &RawDirective) -> Option<u64> {
    match raw {
        RawDirective::Int(n) => u64::try_from(*n).ok(),
        RawDirective::Text(s) => {
            let s = s.trim();
            match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
                Some(hex) => u64::from_str_radix(hex, 16).ok(),
                None => s.parse().ok(),
            }
        }
        _ => None,
    }
}

/// CRTO codes behind the named JIT modes. `on` stays literal.
const JIT_MODE_ALIASES: [(&str, &str); 2] = [("tracing", "1254"), ("function", "1205")];

/// Decode a JIT mode descriptor: on/off normalization, named modes, or a CRTO digit code.
pub fn decode_jit_mode(mode: &str) -> DirectiveValue {
    let mode = mode.trim();
    let mode = JIT_MODE_ALIASES
        .iter()
        .find(|(name, _)| mode.eq_ignore_ascii_case(name))
        .map_or(mode, |(_, code)| *code);
    if mode.is_empty()
        || mode.eq_ignore_ascii_case("off")
        || mode == "0"
        || mode.eq_ignore_ascii_case("disable")
    {
        return DirectiveValue::Text("Off".into());
    }
    if mode == "1" {
        return DirectiveValue::Text("on".into());
    }
    if mode.len() <= 4 && mode.bytes().all(|b| b.is_ascii_digit()) {
        let padded = format!("{:0>4}", mode);
        let flags = padded
            .bytes()
            .zip(JIT_FLAGS.iter())
            .map(|(digit, (flag, labels))| {
                let d = (digit - b'0') as usize;
                match labels.get(d) {
                    Some(label) => format!("{}: {}", flag, label),
                    None => format!("{}: unknown ({})", flag, d),
                }
            })
            .collect();
        return DirectiveValue::List(flags);
    }
    DirectiveValue::Text(mode.to_string())
}

fn plain(raw: &RawDirective) -> DirectiveValue {
    match raw {
        RawDirective::Bool(b) => DirectiveValue::Bool(*b),
        RawDirective::Int(n) => DirectiveValue::Text(n.to_string()),
        RawDirective::Float(f) => DirectiveValue::Text(f.to_string()),
        RawDirective::Text(s) if s.is_empty() => DirectiveValue::NoValue,
        RawDirective::Text(s) => DirectiveValue::Text(s.clone()),
        RawDirective::List(items) => DirectiveValue::List(items.clone()),
    }
}

fn byte_count(raw: &RawDirective) -> Option<u64> {
    match raw {
        RawDirective::Int(n) => u64::try_from(*n).ok(),
        RawDirective::Text(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Decode one directive according to its rule.
pub fn decode(key: &str, raw: &RawDirective, config: &DisplayConfig) -> DirectiveValue {
    match rule_for(key) {
        DecodeRule::Plain => plain(raw),
        DecodeRule::ByteSize => match byte_count(raw) {
            Some(bytes) => DirectiveValue::Text(format!(
                "{} ({})",
                format_size(bytes, config.size_precision, config.size_space),
                number_format(bytes)
            )),
            None => plain(raw),
        },
        DecodeRule::OptimizationLevel => match parse_level(raw) {
            Some(level) => match decode_optimization_level(level) {
                Some(passes) => DirectiveValue::List(passes),
                None => DirectiveValue::Text(config.text("none").to_string()),
            },
            None => plain(raw),
        },
        DecodeRule::JitMode => match raw {
            RawDirective::Text(s) => decode_jit_mode(s),
            RawDirective::Int(n) => decode_jit_mode(&n.to_string()),
            RawDirective::Bool(true) => DirectiveValue::Text("on".into()),
            RawDirective::Bool(false) => DirectiveValue::Text("Off".into()),
            other => plain(other),
        },
    }
}

/// Decode every directive, keeping the map's key order.
pub fn decode_all<'a>(
    directives: impl IntoIterator<Item = (&'a String, &'a RawDirective)>,
    config: &DisplayConfig,
) -> Vec<DirectiveView> {
    directives
        .into_iter()
        .map(|(name, raw)| DirectiveView {
            name: name.clone(),
            value: decode(name, raw, config),
        })
        .collect()
}
