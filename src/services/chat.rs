//! Single-topic chat fan-out.
//!
//! Every published message goes to all current subscribers of one broadcast
//! channel. Storing the message is attempted afterwards and a storage failure
//! never takes a message back from the subscribers.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use serde_json::{Map, Value};
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::entities::chat_message;
use crate::error::{AppError, AppResult};

pub const CHAT_CHANNEL_CAPACITY: usize = 256;

#[derive(Clone)]
pub struct ChatRelay {
    db: DatabaseConnection,
    sender: broadcast::Sender<Value>,
    last_id: Arc<AtomicI64>,
}

impl ChatRelay {
    pub fn new(db: DatabaseConnection) -> Self {
        Self::with_capacity(db, CHAT_CHANNEL_CAPACITY)
    }

    pub fn with_capacity(db: DatabaseConnection, capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            db,
            sender,
            last_id: Arc::new(AtomicI64::new(0)),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Value> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Millisecond clock, bumped past the last issued id so ids never repeat.
    pub fn next_id(&self) -> i64 {
        let now = Utc::now().timestamp_millis();
        let previous = self
            .last_id
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(now.max(last + 1))
            })
            .unwrap_or_else(|last| last);
        now.max(previous + 1)
    }

    /// Broadcast `{id, text, sender, timestamp}` built from an inbound frame,
    /// then store it. `text` is relayed as received; non-string values are
    /// stored as their JSON text. `sender_id` attributes the stored row to a user.
    pub async fn publish(&self, frame: Map<String, Value>, sender_id: Option<i32>) -> AppResult<Value> {
        let text = frame
            .get("text")
            .cloned()
            .ok_or_else(|| AppError::Validation("chat message needs a text field".into()))?;
        let message = match &text {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        };

        let mut outbound = Map::new();
        outbound.insert("id".into(), Value::from(self.next_id()));
        outbound.insert("text".into(), text);
        outbound.insert("sender".into(), frame.get("sender").cloned().unwrap_or(Value::Null));
        outbound.insert(
            "timestamp".into(),
            frame.get("timestamp").cloned().unwrap_or(Value::Null),
        );
        let outbound = Value::Object(outbound);

        match self.sender.send(outbound.clone()) {
            Ok(receivers) => debug!(receivers, "chat message broadcast"),
            Err(_) => debug!("chat message broadcast with no subscribers"),
        }

        let receiver_id = frame
            .get("receiverId")
            .and_then(Value::as_i64)
            .and_then(|id| i32::try_from(id).ok());
        let record = chat_message::ActiveModel {
            sender_id: Set(sender_id),
            receiver_id: Set(receiver_id),
            message: Set(message),
            send_time: Set(Utc::now().into()),
            ..Default::default()
        };
        if let Err(e) = record.insert(&self.db).await {
            warn!(error = %e, "failed to store chat message");
        }

        Ok(outbound)
    }
}

/// Decode an inbound text frame. Anything other than a JSON object is `None`.
pub fn parse_frame(raw: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}
