//! In-process "open this file" channel between the file tree and the editor.
//!
//! One topic, one payload type. Delivery is synchronous on the publishing thread, at
//! most once per subscriber per publish, with no replay for late subscribers.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use crate::models::FileNode;

/// Payload of an open-file notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenFileEvent {
    pub file_id: String,
    pub name: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl From<&FileNode> for OpenFileEvent {
    fn from(node: &FileNode) -> Self {
        Self {
            file_id: node.id.clone(),
            name: node.name.clone(),
            content: node.content.clone(),
            language: node.language.clone(),
        }
    }
}

/// Handle returned by [`OpenFileChannel::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Handler = Arc<dyn Fn(&OpenFileEvent) + Send + Sync>;

/// Publish/subscribe channel for [`OpenFileEvent`]s.
#[derive(Default)]
pub struct OpenFileChannel {
    next_id: AtomicU64,
    subscribers: Mutex<Vec<(SubscriptionId, Handler)>>,
}

impl OpenFileChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for every subsequent publish.
    pub fn subscribe<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&OpenFileEvent) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, Arc::new(handler)));
        id
    }

    /// Remove a handler. Returns whether it was registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let before = subscribers.len();
        subscribers.retain(|(sub_id, _)| *sub_id != id);
        subscribers.len() != before
    }

    /// Deliver `event` to every current subscriber and return how many received it.
    ///
    /// Handlers run after the subscriber lock is released, so a handler may itself
    /// subscribe, unsubscribe or publish.
    pub fn publish(&self, event: &OpenFileEvent) -> usize {
        let handlers: Vec<Handler> = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, handler)| Arc::clone(handler))
            .collect();

        tracing::trace!(file_id = %event.file_id, "Dispatching open-file event to {} subscriber(s)", handlers.len());
        for handler in &handlers {
            handler(event);
        }
        handlers.len()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn event(id: &str) -> OpenFileEvent {
        OpenFileEvent {
            file_id: id.to_string(),
            name: format!("{}.rs", id),
            content: String::new(),
            language: Some("rust".to_string()),
        }
    }

    #[test]
    fn test_publish_reaches_each_subscriber_once() {
        let channel = OpenFileChannel::new();
        let hits = Arc::new(AtomicUsize::new(0));

        for _ in 0..2 {
            let hits = Arc::clone(&hits);
            channel.subscribe(move |_| {
                hits.fetch_add(1, Ordering::SeqCst);
            });
        }

        assert_eq!(channel.publish(&event("a")), 2);
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_no_replay_for_late_subscribers() {
        let channel = OpenFileChannel::new();
        channel.publish(&event("early"));

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        channel.subscribe(move |e| sink.lock().unwrap().push(e.file_id.clone()));
        channel.publish(&event("late"));

        assert_eq!(*seen.lock().unwrap(), vec!["late".to_string()]);
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let channel = OpenFileChannel::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let id = channel.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert!(channel.unsubscribe(id));
        assert!(!channel.unsubscribe(id));
        assert_eq!(channel.publish(&event("a")), 0);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert_eq!(channel.subscriber_count(), 0);
    }

    #[test]
    fn test_event_from_node_keeps_language() {
        let node = crate::tree::test_support::file("f", "/src/main.py", "root");
        let e = OpenFileEvent::from(&node);
        assert_eq!(e.file_id, "f");
        assert_eq!(e.name, "main.py");
        assert_eq!(e.language, None);

        let json = serde_json::to_value(&event("x")).unwrap();
        assert_eq!(json["fileId"], "x");
    }
}
