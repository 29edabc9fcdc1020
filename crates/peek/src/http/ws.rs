//! `/logs` stream protocol (§6.2): a plain JSON WebSocket, not a GraphQL
//! subscription transport — the protocol only needs subscribe/unsubscribe and
//! three server message shapes, so a raw handler mirrors the shell socket's
//! split/select shape without dragging in a schema layer.

use std::time::Instant;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use engine::{Outbound, Record};

use super::query::DEFAULT_LIMIT;
use super::state::AppState;
use super::util::{parse_time_range, with_fresh_mode};

#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
enum ClientMessage {
    Subscribe {
        query: String,
        #[serde(default)]
        start: Option<String>,
        #[serde(default)]
        end: Option<String>,
    },
    Unsubscribe,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ServerMessage {
    Results { logs: Vec<Record>, total: usize, took_ms: u64 },
    Log { entry: Record },
    Heartbeat,
}

impl From<Outbound> for ServerMessage {
    fn from(outbound: Outbound) -> Self {
        match outbound {
            Outbound::Results { records, total, took_ms } => ServerMessage::Results { logs: records, total, took_ms },
            Outbound::Log(entry) => ServerMessage::Log { entry },
            Outbound::Heartbeat => ServerMessage::Heartbeat,
        }
    }
}

pub async fn logs_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_logs_socket(socket, state))
}

type Subscription = (mpsc::Receiver<Outbound>, CancellationToken);

async fn handle_logs_socket(socket: WebSocket, state: AppState) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let mut current: Option<Subscription> = None;

    loop {
        tokio::select! {
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<ClientMessage>(&text) {
                            Ok(ClientMessage::Subscribe { query, start, end }) => {
                                if let Some(sub) = subscribe(&state, &query, start.as_deref(), end.as_deref()).await {
                                    replace_subscription(&mut current, Some(sub));
                                }
                                // else: invalid query, logged inside `subscribe`, previous subscription kept
                            }
                            Ok(ClientMessage::Unsubscribe) => {
                                replace_subscription(&mut current, None);
                            }
                            Err(e) => {
                                warn!(error = %e, "ignoring malformed /logs frame");
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {} // ping/pong/binary ignored
                    Some(Err(e)) => {
                        warn!(error = %e, "/logs websocket error");
                        break;
                    }
                }
            }
            out = recv_current(&mut current) => {
                match out {
                    Some(outbound) => {
                        let msg: ServerMessage = outbound.into();
                        let Ok(text) = serde_json::to_string(&msg) else { continue };
                        if ws_tx.send(Message::Text(text.into())).await.is_err() {
                            break;
                        }
                    }
                    None => {
                        // subscriber channel closed from the broadcaster side
                        current = None;
                    }
                }
            }
        }
    }

    replace_subscription(&mut current, None);
}

/// Compiles the query, ANDs in fresh-mode, fetches the initial snapshot, and
/// registers a new subscription. Returns `None` (logging the reason) on a
/// query parse failure per §6.2's "invalid query silently ignored" rule.
async fn subscribe(state: &AppState, query: &str, start: Option<&str>, end: Option<&str>) -> Option<Subscription> {
    let filter = match engine::compile(query) {
        Ok(f) => f,
        Err(e) => {
            warn!(query, error = %e, "rejected /logs subscribe: invalid query");
            return None;
        }
    };
    let filter = with_fresh_mode(filter, state.fresh_cutoff);
    let time_range = parse_time_range(start, end);

    let started = Instant::now();
    let snapshot = match state.store.query(filter.clone(), time_range, DEFAULT_LIMIT, 0).await {
        Ok((records, total)) => Some((records, total, started.elapsed().as_millis() as u64)),
        Err(e) => {
            warn!(error = %e, "failed to fetch /logs subscribe snapshot");
            None
        }
    };

    let (rx, cancel) = state.broadcaster.subscribe(filter, time_range, snapshot);
    Some((rx, cancel))
}

fn replace_subscription(current: &mut Option<Subscription>, new: Option<Subscription>) {
    if let Some((_, cancel)) = current.take() {
        cancel.cancel();
    }
    *current = new;
}

async fn recv_current(current: &mut Option<Subscription>) -> Option<Outbound> {
    match current {
        Some((rx, _)) => rx.recv().await,
        None => std::future::pending().await,
    }
}
