//! Websocket sessions.

use super::AppState;
use crate::matches::{Identity, MatchId};
use crate::room::{ClientEvent, ServerEvent};
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use std::collections::BTreeSet;
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Deserialize)]
pub(super) struct SessionQuery {
    user: Identity,
}

/// `GET /ws?user=<id>`
pub(super) async fn upgrade(
    ws: WebSocketUpgrade,
    Query(query): Query<SessionQuery>,
    State(state): State<AppState>,
) -> Response {
    ws.on_upgrade(move |socket| run_session(socket, state, query.user))
}

/// Pumps events between one socket and the rooms it joined. Rooms are left
/// when the socket closes; the matches themselves stay resumable.
#[instrument(skip(socket, state))]
async fn run_session(socket: WebSocket, state: AppState, identity: Identity) {
    let registry = state.service.registry().clone();
    let session = registry.new_session();
    info!(session, "Session connected");

    let (outbox, mut inbox) = mpsc::channel::<ServerEvent>(state.subscriber_buffer);
    let (mut sink, mut stream) = socket.split();

    let writer = tokio::spawn(async move {
        while let Some(event) = inbox.recv().await {
            let text = match serde_json::to_string(&event) {
                Ok(text) => text,
                Err(e) => {
                    warn!(error = %e, "Failed to encode event");
                    continue;
                }
            };
            if sink.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    let mut joined = BTreeSet::<MatchId>::new();
    while let Some(frame) = stream.next().await {
        let text = match frame {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) => break,
            Ok(_) => continue,
            Err(e) => {
                debug!(error = %e, "Socket error");
                break;
            }
        };

        let event: ClientEvent = match serde_json::from_str(text.as_str()) {
            Ok(event) => event,
            Err(e) => {
                debug!(error = %e, "Malformed event");
                let _ = outbox.try_send(ServerEvent::Error {
                    code: "BadRequest".to_string(),
                    message: e.to_string(),
                });
                continue;
            }
        };

        let match_id = event.match_id().clone();
        let membership = match &event {
            ClientEvent::JoinGame { .. } => Some(true),
            ClientEvent::LeaveGame { .. } => Some(false),
            _ => None,
        };

        match registry.dispatch(session, &identity, event, &outbox).await {
            Ok(()) => match membership {
                Some(true) => {
                    joined.insert(match_id);
                }
                Some(false) => {
                    joined.remove(&match_id);
                }
                None => {}
            },
            Err(e) => {
                debug!(%match_id, code = e.code(), "Event rejected");
                let _ = outbox.try_send(ServerEvent::from(&e));
            }
        }
    }

    for match_id in joined {
        if let Some(room) = registry.live(&match_id) {
            let _ = room.leave(session).await;
        }
    }
    drop(outbox);
    let _ = writer.await;
    info!(session, "Session closed");
}
