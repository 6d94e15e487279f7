// Radial gauge math and animation plans.

use serde::{Deserialize, Serialize};

use crate::models::ViewModel;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GaugeMetric {
    Memory,
    HitRate,
    Keys,
    Jit,
}

pub fn percent_to_degrees(percent: u32) -> u32 {
    (3.6 * percent as f64).round() as u32
}

pub fn degrees_to_percent(degrees: u32) -> u32 {
    (degrees as f64 / 360.0 * 100.0).round() as u32
}

/// One-degree-per-step interpolation from `from` to `to`, played by the client.
///
/// Steps are spaced `1000 / |to - from|` ms apart, so every animation lasts about a second.
/// `percent` is the label the gauge settles on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GaugeAnimation {
    pub from: u32,
    pub to: u32,
    pub step_interval_ms: f64,
    pub percent: u32,
}

impl GaugeAnimation {
    pub fn new(from: u32, to: u32) -> Self {
        let delta = from.abs_diff(to);
        Self {
            from,
            to,
            step_interval_ms: if delta == 0 {
                0.0
            } else {
                1000.0 / delta as f64
            },
            percent: degrees_to_percent(to),
        }
    }

    pub fn step_count(&self) -> u32 {
        self.from.abs_diff(self.to)
    }
}

/// Gauge percentages for the highlighted metrics of `view` (nothing without an overview).
pub fn gauge_values(view: &ViewModel) -> Vec<(GaugeMetric, u32)> {
    let Some(overview) = view.overview.as_ref() else {
        return Vec::new();
    };
    let mut out = Vec::with_capacity(4);
    if view.highlight.memory {
        out.push((GaugeMetric::Memory, overview.memory.used_percentage));
    }
    if view.highlight.hits {
        out.push((GaugeMetric::HitRate, overview.statistics.hit_rate_percentage));
    }
    if view.highlight.keys {
        out.push((GaugeMetric::Keys, overview.statistics.used_key_percentage));
    }
    if let (true, Some(jit)) = (view.highlight.jit, view.jit.as_ref()) {
        out.push((GaugeMetric::Jit, jit.buffer_used_percentage));
    }
    out
}
