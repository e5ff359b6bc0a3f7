use actix_web::web::Bytes;
use chrono::Utc;
use futures::channel::mpsc::{self, UnboundedReceiver, UnboundedSender};
use serde_json::json;
use std::sync::RwLock;
use strum_macros::Display;

#[derive(Debug, Copy, Clone, Display)]
#[strum(serialize_all = "snake_case")]
pub enum ChangeOp {
    Insert,
    Update,
    Delete,
}

/// In-process notification channel backing the `/events` stream and the
/// auth-state feed. Subscribers get pre-rendered SSE frames; the contract
/// is "something changed in this table, refetch it"; row payloads are
/// never pushed.
pub struct EventHub {
    subscribers: RwLock<Vec<UnboundedSender<Bytes>>>,
}

impl EventHub {
    pub fn new() -> Self {
        Self {
            subscribers: RwLock::new(Vec::new()),
        }
    }

    pub fn subscribe(&self) -> UnboundedReceiver<Bytes> {
        let (tx, rx) = mpsc::unbounded();
        self.subscribers
            .write()
            .expect("event hub poisoned")
            .push(tx);
        rx
    }

    /// Row-change notification for a watched table
    pub fn publish_change(&self, table: &'static str, op: ChangeOp, id: u64) {
        let payload = json!({
            "table": table,
            "op": op.to_string(),
            "id": id,
            "at": Utc::now(),
        });
        self.send_frame("change", &payload);
    }

    /// Auth-state notification (SIGNED_IN / SIGNED_OUT)
    pub fn publish_auth(&self, event: &'static str, user_id: u64) {
        let payload = json!({
            "event": event,
            "user_id": user_id,
            "at": Utc::now(),
        });
        self.send_frame("auth", &payload);
    }

    fn send_frame(&self, kind: &str, payload: &serde_json::Value) {
        let frame = Bytes::from(format!("event: {}\ndata: {}\n\n", kind, payload));

        // closed receivers are dropped on the way through
        let mut subs = self.subscribers.write().expect("event hub poisoned");
        subs.retain(|tx| tx.unbounded_send(frame.clone()).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().expect("event hub poisoned").len()
    }
}

impl Default for EventHub {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::StreamExt;

    #[actix_web::test]
    async fn subscribers_receive_change_frames() {
        let hub = EventHub::new();
        let mut rx = hub.subscribe();

        hub.publish_change("tickets", ChangeOp::Insert, 12);

        let frame = rx.next().await.unwrap();
        let text = std::str::from_utf8(&frame).unwrap();
        assert!(text.starts_with("event: change\n"));
        assert!(text.contains("\"table\":\"tickets\""));
        assert!(text.contains("\"op\":\"insert\""));
        assert!(text.contains("\"id\":12"));
        assert!(text.ends_with("\n\n"));
    }

    #[actix_web::test]
    async fn auth_frames_carry_the_event_name() {
        let hub = EventHub::new();
        let mut rx = hub.subscribe();

        hub.publish_auth("SIGNED_OUT", 3);

        let frame = rx.next().await.unwrap();
        let text = std::str::from_utf8(&frame).unwrap();
        assert!(text.starts_with("event: auth\n"));
        assert!(text.contains("\"event\":\"SIGNED_OUT\""));
    }

    #[actix_web::test]
    async fn every_subscriber_gets_every_frame() {
        let hub = EventHub::new();
        let mut a = hub.subscribe();
        let mut b = hub.subscribe();

        hub.publish_change("attendance", ChangeOp::Update, 5);

        assert!(a.next().await.is_some());
        assert!(b.next().await.is_some());
    }

    #[actix_web::test]
    async fn dropped_subscribers_are_pruned() {
        let hub = EventHub::new();
        let rx = hub.subscribe();
        assert_eq!(hub.subscriber_count(), 1);

        drop(rx);
        hub.publish_change("tickets", ChangeOp::Delete, 1);

        assert_eq!(hub.subscriber_count(), 0);
    }
}
