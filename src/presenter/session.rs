// Per-client event loop: client events, refresh ticks, filter debounce and snapshot
// completions are all handled on one task, so presenter state needs no locking.

use serde::Deserialize;
use std::future;
use tokio::sync::mpsc;
use tokio::time::{Duration, Instant, Interval, MissedTickBehavior};
use tracing::Instrument;

use super::preference::PreferenceStore;
use super::{AdminAction, Applied, FetchTicket, Presenter, RegionUpdate, Tab};
use crate::models::RawSnapshot;
use crate::runtime_repo::RuntimeRepo;

/// Event sent by the client.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientEvent {
    SelectTab { tab: Tab },
    Filter { text: String },
    Page { page: usize },
    Realtime { enabled: bool },
    Refresh,
    Reset,
    Invalidate { path: String },
    InvalidateSearched { text: String },
}

type FetchResult = (FetchTicket, anyhow::Result<RawSnapshot>);

pub struct Session<P: PreferenceStore> {
    presenter: Presenter<P>,
    repo: RuntimeRepo,
}

fn poll_interval(period: Duration) -> Interval {
    let mut tick = tokio::time::interval_at(Instant::now() + period, period);
    tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
    tick
}

async fn next_tick(poll: &mut Option<Interval>) {
    match poll {
        Some(tick) => {
            tick.tick().await;
        }
        None => future::pending::<()>().await,
    }
}

/// Forward updates; false once the client side is gone.
async fn send_all(out: &mpsc::Sender<RegionUpdate>, updates: Vec<RegionUpdate>) -> bool {
    for update in updates {
        if out.send(update).await.is_err() {
            return false;
        }
    }
    true
}

impl<P: PreferenceStore + 'static> Session<P> {
    pub fn new(presenter: Presenter<P>, repo: RuntimeRepo) -> Self {
        Self { presenter, repo }
    }

    pub fn presenter(&self) -> &Presenter<P> {
        &self.presenter
    }

    pub fn spawn(
        self,
        events: mpsc::Receiver<ClientEvent>,
        updates: mpsc::Sender<RegionUpdate>,
    ) -> tokio::task::JoinHandle<()> {
        let span = tracing::debug_span!(
            "session",
            refresh_ms = self.presenter.options().refresh_time_ms
        );
        tokio::spawn(self.run(events, updates).instrument(span))
    }

    /// Request a snapshot under a fresh ticket; completes on `tx`.
    fn fetch(&mut self, tx: &mpsc::Sender<FetchResult>) {
        let repo = self.repo.clone();
        let tx = tx.clone();
        let ticket = self.presenter.request_snapshot();
        tokio::spawn(async move {
            let result = repo.snapshot().await;
            let _ = tx.send((ticket, result)).await;
        });
    }

    async fn dispatch(
        &mut self,
        action: AdminAction,
        fetch_tx: &mpsc::Sender<FetchResult>,
    ) -> Vec<RegionUpdate> {
        if !self.presenter.authorize(&action) {
            tracing::warn!(action = ?action, "admin action not allowed by configuration");
            return self.presenter.finish_action(&action, false);
        }
        self.presenter.begin_action();
        let result = match &action {
            AdminAction::Reset => self.repo.reset_all().await,
            AdminAction::Invalidate(path) => self.repo.invalidate(path).await,
            AdminAction::InvalidateSearched(text) => self.repo.invalidate_matching(text).await,
        };
        let success = result.unwrap_or_else(|e| {
            tracing::warn!(error = %e, action = ?action, "admin action errored");
            false
        });
        let out = self.presenter.finish_action(&action, success);
        if success {
            self.fetch(fetch_tx);
        }
        out
    }

    /// Runs until the client closes its event channel or stops reading updates.
    pub async fn run(
        mut self,
        mut events: mpsc::Receiver<ClientEvent>,
        updates: mpsc::Sender<RegionUpdate>,
    ) {
        let refresh = Duration::from_millis(self.presenter.options().refresh_time_ms);
        let debounce = Duration::from_millis(self.presenter.options().debounce_rate_ms);
        let (fetch_tx, mut fetch_rx) = mpsc::channel::<FetchResult>(8);

        self.fetch(&fetch_tx);
        let mut poll = self.presenter.is_polling().then(|| poll_interval(refresh));
        let mut pending_filter: Option<String> = None;
        let debounce_timer = tokio::time::sleep(debounce);
        tokio::pin!(debounce_timer);

        loop {
            let out = tokio::select! {
                event = events.recv() => {
                    let Some(event) = event else {
                        break;
                    };
                    match event {
                        ClientEvent::SelectTab { tab } => self.presenter.select_tab(tab),
                        ClientEvent::Filter { text } => {
                            pending_filter = Some(text);
                            debounce_timer.as_mut().reset(Instant::now() + debounce);
                            Vec::new()
                        }
                        ClientEvent::Page { page } => self.presenter.set_page(page),
                        ClientEvent::Realtime { enabled } => {
                            let out = self.presenter.set_realtime(enabled);
                            poll = self.presenter.is_polling().then(|| poll_interval(refresh));
                            out
                        }
                        ClientEvent::Refresh => {
                            self.fetch(&fetch_tx);
                            Vec::new()
                        }
                        ClientEvent::Reset => self.dispatch(AdminAction::Reset, &fetch_tx).await,
                        ClientEvent::Invalidate { path } => {
                            self.dispatch(AdminAction::Invalidate(path), &fetch_tx).await
                        }
                        ClientEvent::InvalidateSearched { text } => {
                            self.dispatch(AdminAction::InvalidateSearched(text), &fetch_tx).await
                        }
                    }
                }
                _ = next_tick(&mut poll) => {
                    self.fetch(&fetch_tx);
                    Vec::new()
                }
                _ = &mut debounce_timer, if pending_filter.is_some() => {
                    match pending_filter.take() {
                        Some(text) => self.presenter.set_filter(&text),
                        None => Vec::new(),
                    }
                }
                Some((ticket, result)) = fetch_rx.recv() => {
                    match result {
                        Ok(raw) => match self.presenter.apply_snapshot(ticket, &raw) {
                            Applied::Updated(out) => out,
                            Applied::Stale => {
                                // nothing on screen yet, or an admin result still unseen:
                                // ask again under the current epoch
                                let owed = self.presenter.refresh_owed();
                                if owed || self.presenter.view().is_none() {
                                    self.fetch(&fetch_tx);
                                }
                                Vec::new()
                            }
                            Applied::Rejected(_) => Vec::new(),
                        },
                        Err(e) => {
                            tracing::warn!(
                                error = %e,
                                operation = "snapshot",
                                "snapshot fetch failed; retrying on next tick"
                            );
                            Vec::new()
                        }
                    }
                }
            };
            if !send_all(&updates, out).await {
                break;
            }
        }
        tracing::debug!("session closed");
    }
}
