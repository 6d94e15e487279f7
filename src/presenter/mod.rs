// Per-client dashboard state: tabs, filter, pagination, polling, region diffing

pub mod filelist;
pub mod gauge;
pub mod preference;
pub mod session;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::config::{DisplayConfig, PresenterConfig};
use crate::models::{RawSnapshot, ViewModel};
use crate::normalizer::normalize;
use crate::render;
use gauge::{GaugeAnimation, GaugeMetric, gauge_values, percent_to_degrees};
use preference::PreferenceStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    Overview,
    Files,
    Reset,
    Realtime,
}

impl Tab {
    pub fn as_str(self) -> &'static str {
        match self {
            Tab::Overview => "overview",
            Tab::Files => "files",
            Tab::Reset => "reset",
            Tab::Realtime => "realtime",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PollState {
    Idle,
    Polling,
}

/// Independently re-rendered parts of the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    Overview,
    General,
    Files,
    Preload,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminAction {
    Reset,
    Invalidate(String),
    InvalidateSearched(String),
}

/// Message sent to the client.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum RegionUpdate {
    Region {
        region: Region,
        id: &'static str,
        html: String,
    },
    #[serde(rename_all = "camelCase")]
    Gauge {
        metric: GaugeMetric,
        animation: GaugeAnimation,
    },
    Tab {
        active: Tab,
    },
    #[serde(rename_all = "camelCase")]
    Realtime {
        enabled: bool,
        set_cookie: Option<String>,
    },
    Notice {
        message: String,
        success: bool,
    },
}

/// Issued per snapshot request. `seq` grows with every request; `epoch` with every
/// state change that makes earlier requests irrelevant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    pub epoch: u64,
    pub seq: u64,
}

/// Outcome of offering a fetched snapshot to the presenter.
#[derive(Debug, Clone, PartialEq)]
pub enum Applied {
    /// The snapshot was requested before a newer state change, or a newer one is
    /// already applied; dropped.
    Stale,
    /// The snapshot could not be normalized; the previous view model is kept.
    Rejected(String),
    Updated(Vec<RegionUpdate>),
}

pub struct Presenter<P: PreferenceStore> {
    display: DisplayConfig,
    options: PresenterConfig,
    prefs: P,
    tab: Tab,
    filter: String,
    page: usize,
    poll: PollState,
    view: Option<Arc<ViewModel>>,
    rendered: HashMap<Region, String>,
    gauges: HashMap<GaugeMetric, u32>,
    epoch: u64,
    issued: u64,
    applied: u64,
    refresh_owed: bool,
}

impl<P: PreferenceStore> Presenter<P> {
    /// Starts polling right away when realtime is allowed and the stored preference is on.
    pub fn new(display: DisplayConfig, options: PresenterConfig, prefs: P) -> Self {
        let poll = if options.allow_realtime && prefs.get() == Some(true) {
            PollState::Polling
        } else {
            PollState::Idle
        };
        Self {
            display,
            options,
            prefs,
            tab: Tab::Overview,
            filter: String::new(),
            page: 1,
            poll,
            view: None,
            rendered: HashMap::new(),
            gauges: HashMap::new(),
            epoch: 0,
            issued: 0,
            applied: 0,
            refresh_owed: false,
        }
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn poll_state(&self) -> PollState {
        self.poll
    }

    pub fn is_polling(&self) -> bool {
        self.poll == PollState::Polling
    }

    pub fn view(&self) -> Option<Arc<ViewModel>> {
        self.view.clone()
    }

    pub fn options(&self) -> &PresenterConfig {
        &self.options
    }

    pub fn display(&self) -> &DisplayConfig {
        &self.display
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Ticket for a new snapshot request.
    pub fn request_snapshot(&mut self) -> FetchTicket {
        self.issued += 1;
        FetchTicket {
            epoch: self.epoch,
            seq: self.issued,
        }
    }

    /// A successful admin action has not been reflected by a fetched snapshot yet.
    pub fn refresh_owed(&self) -> bool {
        self.refresh_owed
    }

    fn supersede_pending(&mut self) {
        self.epoch += 1;
    }

    fn tab_allowed(&self, tab: Tab) -> bool {
        match tab {
            Tab::Overview => true,
            Tab::Files => self.options.allow_filelist,
            Tab::Reset => self.options.allow_reset,
            Tab::Realtime => self.options.allow_realtime,
        }
    }

    /// Pure UI-state change; no refetch. In-flight snapshots are superseded.
    pub fn select_tab(&mut self, tab: Tab) -> Vec<RegionUpdate> {
        if !self.tab_allowed(tab) || self.tab == tab {
            return Vec::new();
        }
        self.tab = tab;
        self.supersede_pending();
        vec![RegionUpdate::Tab { active: tab }]
    }

    /// Idle <-> Polling. The preference store follows the switch.
    pub fn set_realtime(&mut self, enabled: bool) -> Vec<RegionUpdate> {
        if !self.options.allow_realtime {
            return Vec::new();
        }
        let target = if enabled {
            PollState::Polling
        } else {
            PollState::Idle
        };
        if target == self.poll {
            return Vec::new();
        }
        self.poll = target;
        if enabled {
            self.prefs.set(true);
        } else {
            self.prefs.clear();
            self.supersede_pending();
        }
        tracing::debug!(poll = ?self.poll, "realtime update toggled");
        vec![RegionUpdate::Realtime {
            enabled,
            set_cookie: self.prefs.take_set_cookie(),
        }]
    }

    /// Same filter twice is a no-op; a new filter returns to page 1.
    pub fn set_filter(&mut self, text: &str) -> Vec<RegionUpdate> {
        if self.filter == text {
            return Vec::new();
        }
        self.filter = text.to_string();
        self.page = 1;
        self.render_changed(&[Region::Files])
    }

    pub fn set_page(&mut self, page: usize) -> Vec<RegionUpdate> {
        let pages = self.view.as_ref().map_or(1, |v| {
            filelist::page_count(
                filelist::filter_scripts(&v.scripts, &self.filter).len(),
                self.options.per_page,
            )
        });
        let page = page.clamp(1, pages);
        if page == self.page {
            return Vec::new();
        }
        self.page = page;
        self.render_changed(&[Region::Files])
    }

    pub fn authorize(&self, action: &AdminAction) -> bool {
        match action {
            AdminAction::Reset => self.options.allow_reset,
            AdminAction::Invalidate(_) | AdminAction::InvalidateSearched(_) => {
                self.options.allow_invalidate
            }
        }
    }

    /// Called when an admin action is dispatched; snapshots fetched before it are stale.
    pub fn begin_action(&mut self) -> u64 {
        self.supersede_pending();
        self.epoch
    }

    /// Report the collaborator's answer. Displayed data is left untouched either way;
    /// on success a refresh is owed until a snapshot requested afterwards is applied.
    pub fn finish_action(&mut self, action: &AdminAction, success: bool) -> Vec<RegionUpdate> {
        if success {
            tracing::info!(action = ?action, "admin action succeeded");
            self.refresh_owed = true;
            return Vec::new();
        }
        tracing::warn!(action = ?action, "admin action failed");
        vec![RegionUpdate::Notice {
            message: self.display.text("action_failed").to_string(),
            success: false,
        }]
    }

    /// Offer a snapshot fetched for `ticket`; stale or malformed snapshots leave state as is.
    pub fn apply_snapshot(&mut self, ticket: FetchTicket, raw: &RawSnapshot) -> Applied {
        if ticket.epoch != self.epoch || ticket.seq <= self.applied {
            tracing::debug!(
                epoch = ticket.epoch,
                seq = ticket.seq,
                current = self.epoch,
                applied = self.applied,
                "discarding stale snapshot"
            );
            return Applied::Stale;
        }
        match normalize(raw, &self.display) {
            Ok(view) => {
                self.applied = ticket.seq;
                self.refresh_owed = false;
                Applied::Updated(self.replace_view(Arc::new(view)))
            }
            Err(e) => {
                tracing::warn!(error = %e, operation = "normalize", "keeping previous view model");
                Applied::Rejected(e.to_string())
            }
        }
    }

    /// Install a new view model and return updates for the regions that changed.
    pub fn replace_view(&mut self, view: Arc<ViewModel>) -> Vec<RegionUpdate> {
        self.view = Some(view);
        let mut updates = self.render_changed(&[
            Region::Overview,
            Region::General,
            Region::Files,
            Region::Preload,
        ]);
        updates.extend(self.gauge_updates());
        updates
    }

    /// Current HTML of a region, or `None` when it is not shown.
    pub fn render_region(&self, region: Region) -> Option<String> {
        let view = self.view.as_ref()?;
        match region {
            Region::Overview => Some(render::overview(view, &self.display)),
            Region::General => Some(render::general(view, &self.display)),
            Region::Files if self.options.allow_filelist => {
                let page = filelist::file_page(
                    &view.scripts,
                    &self.filter,
                    self.page,
                    self.options.per_page,
                );
                Some(render::files(&page, &self.display, &self.options))
            }
            Region::Files => None,
            Region::Preload => Some(render::preload(view, &self.display)),
        }
    }

    fn render_changed(&mut self, regions: &[Region]) -> Vec<RegionUpdate> {
        let mut out = Vec::new();
        for &region in regions {
            let Some(html) = self.render_region(region) else {
                continue;
            };
            if self.rendered.get(&region) == Some(&html) {
                continue;
            }
            self.rendered.insert(region, html.clone());
            out.push(RegionUpdate::Region {
                region,
                id: render::region_id(region),
                html,
            });
        }
        out
    }

    fn gauge_updates(&mut self) -> Vec<RegionUpdate> {
        if !self.display.charts {
            return Vec::new();
        }
        let Some(view) = self.view.clone() else {
            return Vec::new();
        };
        let mut out = Vec::new();
        for (metric, percent) in gauge_values(&view) {
            let to = percent_to_degrees(percent);
            let from = self.gauges.insert(metric, to);
            if from == Some(to) {
                continue;
            }
            out.push(RegionUpdate::Gauge {
                metric,
                animation: GaugeAnimation::new(from.unwrap_or(0), to),
            });
        }
        out
    }

    /// Forget what was sent so the next render emits every region (e.g. client reconnect).
    pub fn reset_rendered(&mut self) {
        self.rendered.clear();
        self.gauges.clear();
    }

    /// Render the initial page for the current state.
    pub fn render_page(&mut self) -> String {
        self.reset_rendered();
        let mut regions = Vec::new();
        for region in [
            Region::Overview,
            Region::General,
            Region::Files,
            Region::Preload,
        ] {
            if let Some(html) = self.render_region(region) {
                regions.push((region, html));
            }
        }
        render::page(&render::PageContext {
            display: &self.display,
            options: &self.options,
            tab: self.tab,
            poll: self.poll,
            filter: &self.filter,
            regions,
        })
    }
}
