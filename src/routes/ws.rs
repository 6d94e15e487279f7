// WebSocket handler: bridges one socket to one dashboard session

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::{HeaderMap, Uri},
    response::IntoResponse,
};
use bytes::Bytes;
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::time::{Duration, timeout};

use super::{AppState, preference_store};
use crate::presenter::session::{ClientEvent, Session};
use crate::presenter::{Presenter, RegionUpdate};

pub(super) const WS_PING_INTERVAL: Duration = Duration::from_secs(30);
pub(super) const WS_SEND_TIMEOUT: Duration = Duration::from_secs(10);

const CHANNEL_CAPACITY: usize = 32;

/// Path of the page that owns this socket (`/opcache/ws` -> `/opcache/`).
fn page_path(uri: &Uri) -> &str {
    match uri.path().strip_suffix("ws") {
        Some(p) if !p.is_empty() => p,
        _ => "/",
    }
}

pub(super) async fn ws_dashboard(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    headers: HeaderMap,
    uri: Uri,
) -> impl IntoResponse {
    let prefs = preference_store(&state, &headers, page_path(&uri));
    let presenter = Presenter::new(
        state.config.display.clone(),
        state.config.presenter.clone(),
        prefs,
    );
    let session = Session::new(presenter, state.repo.clone());
    ws.on_upgrade(move |socket| async move {
        let (events_tx, events_rx) = mpsc::channel(CHANNEL_CAPACITY);
        let (updates_tx, updates_rx) = mpsc::channel(CHANNEL_CAPACITY);
        let handle = session.spawn(events_rx, updates_tx);
        if let Err(e) = stream_dashboard(socket, events_tx, updates_rx).await {
            tracing::info!("Dashboard stream error: {}", e);
        }
        handle.abort();
    })
}

type WsSink = SplitSink<WebSocket, Message>;

async fn send_message(sink: &mut WsSink, message: Message) -> bool {
    let r = timeout(WS_SEND_TIMEOUT, sink.send(message)).await;
    matches!(r, Ok(Ok(())))
}

async fn stream_dashboard(
    socket: WebSocket,
    events: mpsc::Sender<ClientEvent>,
    mut updates: mpsc::Receiver<RegionUpdate>,
) -> anyhow::Result<()> {
    tracing::info!("Client connected to dashboard stream");
    let (mut sink, mut stream) = socket.split();
    let mut ping_interval = tokio::time::interval(WS_PING_INTERVAL);
    ping_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    loop {
        tokio::select! {
            update = updates.recv() => {
                let Some(update) = update else {
                    break;
                };
                let json = serde_json::to_string(&update)?;
                if !send_message(&mut sink, Message::Text(json.into())).await {
                    break;
                }
            }
            incoming = stream.next() => {
                match incoming {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<ClientEvent>(text.as_str()) {
                            Ok(event) => {
                                if events.send(event).await.is_err() {
                                    break;
                                }
                            }
                            Err(e) => tracing::debug!(error = %e, "ignoring malformed client event"),
                        }
                    }
                    Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
                    Some(Ok(_)) => {}
                }
            }
            _ = ping_interval.tick() => {
                if !send_message(&mut sink, Message::Ping(Bytes::new())).await {
                    break;
                }
            }
        }
    }
    tracing::info!("Client disconnected from dashboard stream");
    Ok(())
}
