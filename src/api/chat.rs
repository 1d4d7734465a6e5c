use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::api::response::QueryParams;
use crate::app::AppState;
use crate::services::chat::{parse_frame, ChatRelay};

#[derive(Debug, Default, Deserialize)]
pub struct ChatParams {
    pub token: Option<String>,
}

/// `/ws/chat`. A valid `token` query parameter attributes stored messages to
/// its user; without one the socket still relays.
pub async fn chat_socket(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    QueryParams(params): QueryParams<ChatParams>,
) -> Response {
    let sender_id = params
        .token
        .as_deref()
        .and_then(|token| state.jwt_service.user_id(token).ok());
    let relay = state.chat_relay.clone();

    ws.on_upgrade(move |socket| handle_socket(socket, relay, sender_id))
}

async fn handle_socket(socket: WebSocket, relay: ChatRelay, sender_id: Option<i32>) {
    let (mut sink, mut stream) = socket.split();
    let mut receiver = relay.subscribe();
    info!(?sender_id, subscribers = relay.subscriber_count(), "chat client connected");

    let send_task = tokio::spawn(async move {
        loop {
            match receiver.recv().await {
                Ok(message) => {
                    if sink.send(Message::Text(message.to_string().into())).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!(skipped, "chat subscriber lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    while let Some(frame) = stream.next().await {
        match frame {
            Ok(Message::Text(text)) => match parse_frame(text.as_str()) {
                Some(frame) => {
                    if let Err(e) = relay.publish(frame, sender_id).await {
                        warn!(error = %e, "dropping chat frame");
                    }
                }
                None => warn!("ignoring malformed chat frame"),
            },
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                debug!(error = %e, "chat socket error");
                break;
            }
        }
    }

    send_task.abort();
    info!(?sender_id, "chat client disconnected");
}

pub async fn chat_test() -> &'static str {
    "chat relay is running"
}
