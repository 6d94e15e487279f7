// HTML rendering of the dashboard page and of each live-updated region

mod assets;

use std::fmt::Write;

use crate::config::{DisplayConfig, PresenterConfig};
use crate::lang::fill;
use crate::models::{DirectiveValue, Formatted, ViewModel};
use crate::presenter::filelist::FilePage;
use crate::presenter::gauge::{GaugeMetric, gauge_values};
use crate::presenter::{PollState, Region, Tab};

pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn row(out: &mut String, label: &str, value: &str) {
    let _ = write!(
        out,
        "<tr><th>{}</th><td>{}</td></tr>",
        escape(label),
        escape(value)
    );
}

fn metric_label(metric: GaugeMetric, display: &DisplayConfig) -> &str {
    match metric {
        GaugeMetric::Memory => display.text("memory"),
        GaugeMetric::HitRate => display.text("hit_rate"),
        GaugeMetric::Keys => display.text("keys"),
        GaugeMetric::Jit => display.text("jit_buffer"),
    }
}

fn gauge_id(metric: GaugeMetric) -> &'static str {
    match metric {
        GaugeMetric::Memory => "gauge-memory",
        GaugeMetric::HitRate => "gauge-hit-rate",
        GaugeMetric::Keys => "gauge-keys",
        GaugeMetric::Jit => "gauge-jit",
    }
}

/// Highlight widgets. In chart mode the values arrive as gauge animations, so the
/// markup is value-free and only changes when the set of highlighted metrics changes.
pub fn highlights(view: &ViewModel, display: &DisplayConfig) -> String {
    let mut out = String::from("<div class=\"highlights\">");
    for (metric, percent) in gauge_values(view) {
        let label = escape(metric_label(metric, display));
        if display.charts {
            let _ = write!(
                out,
                "<div class=\"widget\"><h3>{label}</h3><div class=\"gauge\" id=\"{}\" data-degrees=\"0\"><span>0%</span></div></div>",
                gauge_id(metric)
            );
        } else {
            let _ = write!(
                out,
                "<div class=\"widget\"><h3>{label}</h3><p class=\"big\">{percent}%</p></div>"
            );
        }
    }
    out.push_str("</div>");
    out
}

pub fn overview(view: &ViewModel, display: &DisplayConfig) -> String {
    if view.presence.file_cache_only {
        return format!(
            "<p class=\"notice file-cache-only\">{}</p>",
            escape(display.text("file_cache_only"))
        );
    }
    let Some(ov) = view.overview.as_ref() else {
        return String::new();
    };
    let mut out = highlights(view, display);

    out.push_str("<table class=\"memory\"><caption>");
    out.push_str(&escape(display.text("memory_usage")));
    out.push_str("</caption>");
    let m = &ov.memory;
    row(&mut out, display.text("total_memory"), &m.total.display);
    row(&mut out, display.text("used_memory"), &m.used.display);
    row(&mut out, display.text("free_memory"), &m.free.display);
    row(
        &mut out,
        display.text("wasted_memory"),
        &format!("{} ({})", m.wasted.display, m.wasted_percentage.display),
    );
    out.push_str("</table>");

    out.push_str("<table class=\"statistics\"><caption>");
    out.push_str(&escape(display.text("statistics")));
    out.push_str("</caption>");
    let s = &ov.statistics;
    let counts: [(&str, &Formatted<u64>); 9] = [
        ("cached_scripts", &s.cached_scripts),
        ("cached_keys", &s.cached_keys),
        ("max_cached_keys", &s.max_cached_keys),
        ("hits", &s.hits),
        ("misses", &s.misses),
        ("blacklist_misses", &s.blacklist_misses),
        ("oom_restarts", &s.oom_restarts),
        ("hash_restarts", &s.hash_restarts),
        ("manual_restarts", &s.manual_restarts),
    ];
    for (key, value) in counts {
        row(&mut out, display.text(key), &value.display);
    }
    row(&mut out, display.text("start_time"), &s.start_time.display);
    row(
        &mut out,
        display.text("last_restart_time"),
        &s.last_restart_time.display,
    );
    out.push_str("</table>");

    if let Some(interned) = view.interned_strings.as_ref() {
        out.push_str("<table class=\"interned\"><caption>");
        out.push_str(&escape(display.text("interned_strings")));
        out.push_str("</caption>");
        row(&mut out, display.text("buffer_size"), &interned.buffer_size.display);
        row(&mut out, display.text("used_memory"), &interned.used_memory.display);
        row(&mut out, display.text("free_memory"), &interned.free_memory.display);
        row(
            &mut out,
            display.text("number_of_strings"),
            &interned.number_of_strings.display,
        );
        out.push_str("</table>");
    }

    if let Some(jit) = view.jit.as_ref() {
        out.push_str("<table class=\"jit\"><caption>");
        out.push_str(&escape(display.text("jit")));
        out.push_str("</caption>");
        row(&mut out, display.text("buffer_size"), &jit.buffer_size.display);
        row(&mut out, display.text("buffer_free"), &jit.buffer_free.display);
        let _ = write!(
            out,
            "<tr><th>mode</th><td>{}</td></tr>",
            directive_value(&jit.mode, display)
        );
        out.push_str("</table>");
    }
    out
}

fn directive_value(value: &DirectiveValue, display: &DisplayConfig) -> String {
    match value {
        DirectiveValue::Bool(true) => escape(display.text("yes")),
        DirectiveValue::Bool(false) => escape(display.text("no")),
        DirectiveValue::Text(t) => escape(t),
        DirectiveValue::NoValue => "<i>no value</i>".into(),
        DirectiveValue::List(items) => {
            let mut out = String::from("<ul>");
            for item in items {
                let _ = write!(out, "<li>{}</li>", escape(item));
            }
            out.push_str("</ul>");
            out
        }
    }
}

pub fn general(view: &ViewModel, display: &DisplayConfig) -> String {
    let mut out = String::from("<table class=\"general\"><caption>");
    out.push_str(&escape(display.text("general_info")));
    out.push_str("</caption>");
    let v = &view.version;
    row(&mut out, "runtime", &v.runtime_version);
    row(&mut out, "host", &v.host_version);
    row(&mut out, "server", &v.server_identity);
    row(&mut out, "hostname", &v.host_name);
    row(&mut out, "gui", &v.gui_version);
    let flag = |b: bool| display.text(if b { "yes" } else { "no" }).to_string();
    row(&mut out, "enabled", &flag(view.status.enabled));
    row(&mut out, "cache full", &flag(view.status.cache_full));
    row(&mut out, "restart pending", &flag(view.status.restart_pending));
    row(
        &mut out,
        "restart in progress",
        &flag(view.status.restart_in_progress),
    );
    out.push_str("</table>");

    out.push_str("<table class=\"directives\"><caption>");
    out.push_str(&escape(display.text("directives")));
    out.push_str("</caption>");
    for d in &view.directives {
        let _ = write!(
            out,
            "<tr><th>{}</th><td>{}</td></tr>",
            escape(&d.name),
            directive_value(&d.value, display)
        );
    }
    out.push_str("</table>");

    let _ = write!(
        out,
        "<h3>{}</h3><ul class=\"functions\">",
        escape(display.text("functions"))
    );
    for f in &view.functions {
        let _ = write!(out, "<li>{}</li>", escape(f));
    }
    out.push_str("</ul>");
    out
}

pub fn files(page: &FilePage<'_>, display: &DisplayConfig, options: &PresenterConfig) -> String {
    let mut out = String::new();
    let total = page.total.to_string();
    let _ = write!(
        out,
        "<p class=\"file-count\">{}",
        escape(&fill(display.text("files_cached"), &[&total]))
    );
    if page.filtered {
        let matching = page.matching.to_string();
        let _ = write!(
            out,
            " <span class=\"filtered\">({})</span>",
            escape(&fill(display.text("filtered_count"), &[&matching]))
        );
    }
    out.push_str("</p>");
    if page.total == 0 {
        let _ = write!(out, "<p>{}</p>", escape(display.text("no_files")));
        return out;
    }
    let _ = write!(
        out,
        "<table class=\"files\"><thead><tr><th>{}</th><th>{}</th><th>{}</th><th>{}</th><th>{}</th></tr></thead><tbody>",
        escape(display.text("script_path")),
        escape(display.text("script_hits")),
        escape(display.text("script_memory")),
        escape(display.text("script_last_used")),
        escape(display.text("script_last_modified")),
    );
    for r in &page.rows {
        let s = r.script;
        let path = escape(&s.full_path);
        let _ = write!(out, "<tr class=\"{}\"><td>{path}", r.zebra.class());
        if s.invalidated {
            let _ = write!(
                out,
                " <span class=\"invalidated\">{}</span>",
                escape(display.text("script_invalidated"))
            );
        } else if options.allow_invalidate {
            let _ = write!(
                out,
                " <a href=\"?invalidate={}\" data-invalidate=\"{path}\">{}</a>",
                escape(&urlencoding::encode(&s.full_path)),
                escape(display.text("invalidate"))
            );
        }
        let modified = s
            .last_modified
            .as_ref()
            .map(|m| m.display.as_str())
            .unwrap_or("");
        let _ = write!(
            out,
            "</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape(&s.hits.display),
            escape(&s.memory_consumption.display),
            escape(&s.last_used.display),
            escape(modified),
        );
    }
    out.push_str("</tbody></table>");
    if page.pages > 1 {
        let _ = write!(
            out,
            "<p class=\"pager\" data-page=\"{}\" data-pages=\"{}\">{}</p>",
            page.page,
            page.pages,
            escape(&fill(
                display.text("page"),
                &[&page.page.to_string(), &page.pages.to_string()]
            ))
        );
    }
    out
}

pub fn preload(view: &ViewModel, display: &DisplayConfig) -> String {
    let Some(p) = view.preload.as_ref() else {
        return String::new();
    };
    let mut out = format!("<h3>{}</h3>", escape(display.text("preload")));
    if let Some(mem) = p.memory_consumption.as_ref() {
        let _ = write!(out, "<p>{}</p>", escape(&mem.display));
    }
    out.push_str("<ul class=\"preload\">");
    for script in &p.scripts {
        let _ = write!(out, "<li>{}</li>", escape(script));
    }
    out.push_str("</ul>");
    out
}

pub fn region_id(region: Region) -> &'static str {
    match region {
        Region::Overview => "region-overview",
        Region::General => "region-general",
        Region::Files => "region-files",
        Region::Preload => "region-preload",
    }
}

/// Everything the full page needs besides the view model.
pub struct PageContext<'a> {
    pub display: &'a DisplayConfig,
    pub options: &'a PresenterConfig,
    pub tab: Tab,
    pub poll: PollState,
    pub filter: &'a str,
    pub regions: Vec<(Region, String)>,
}

pub fn page(ctx: &PageContext<'_>) -> String {
    let d = ctx.display;
    let mut out = String::from("<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\">");
    out.push_str("<meta name=\"viewport\" content=\"width=device-width,initial-scale=1\">");
    out.push_str("<title>Bytecode cache</title><style>");
    out.push_str(assets::STYLE);
    out.push_str("</style></head>");
    let _ = write!(
        out,
        "<body data-realtime=\"{}\" data-active-tab=\"{}\">",
        ctx.poll == PollState::Polling,
        ctx.tab.as_str()
    );

    out.push_str("<nav>");
    let mut tab = |t: Tab, label: &str, href: &str| {
        let active = if ctx.tab == t { " active" } else { "" };
        let _ = write!(
            out,
            "<a class=\"tab{active}\" data-tab=\"{}\" href=\"{href}\">{}</a>",
            t.as_str(),
            escape(label)
        );
    };
    tab(Tab::Overview, d.text("tab_overview"), "#overview");
    if ctx.options.allow_filelist {
        tab(Tab::Files, d.text("tab_files"), "#files");
    }
    if ctx.options.allow_reset {
        tab(Tab::Reset, d.text("tab_reset"), "?reset=1");
    }
    if ctx.options.allow_realtime {
        let label = if ctx.poll == PollState::Polling {
            d.text("tab_realtime_disable")
        } else {
            d.text("tab_realtime_enable")
        };
        tab(Tab::Realtime, label, "#realtime");
    }
    out.push_str("</nav><p id=\"notice\" class=\"notice\" hidden></p>");

    for (region, html) in &ctx.regions {
        if *region == Region::Files {
            let _ = write!(
                out,
                "<input id=\"filter\" type=\"search\" value=\"{}\" placeholder=\"{}\">",
                escape(ctx.filter),
                escape(d.text("filter_placeholder"))
            );
            if ctx.options.allow_invalidate {
                let _ = write!(
                    out,
                    "<button id=\"invalidate-searched\">{}</button>",
                    escape(d.text("invalidate_all_matching"))
                );
            }
        }
        let _ = write!(
            out,
            "<section id=\"{}\">{}</section>",
            region_id(*region),
            html
        );
    }

    out.push_str("<script>");
    out.push_str(assets::CLIENT);
    out.push_str("</script></body></html>");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_html_specials() {
        assert_eq!(escape("<a href='x'>&\"</a>"), "&lt;a href=&#39;x&#39;&gt;&amp;&quot;&lt;/a&gt;");
    }

    #[test]
    fn invalidate_link_encodes_path() {
        let formatted = |value: u64| Formatted {
            value,
            display: value.to_string(),
        };
        let scripts = vec![crate::models::ScriptView {
            full_path: "/var/www/a b&c.php".into(),
            hits: formatted(1),
            memory_consumption: formatted(1024),
            last_used: Formatted {
                value: 0,
                display: "never".into(),
            },
            last_modified: None,
            invalidated: false,
        }];
        let page = crate::presenter::filelist::file_page(&scripts, "", 1, 10);
        let html = files(&page, &DisplayConfig::default(), &PresenterConfig::default());
        assert!(html.contains("href=\"?invalidate=%2Fvar%2Fwww%2Fa%20b%26c.php\""));
    }
}
