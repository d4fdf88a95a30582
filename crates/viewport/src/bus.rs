//! In-process "markup completed" event bus backed by a
//! `tokio::sync::broadcast` channel.
//!
//! The viewport publishes one [`MarkupCompleted`] per finished markup; each
//! study session subscribes its own capture listener. Dropping the receiver
//! is the unsubscribe.

use radmark_core::MarkupData;
use serde::Deserialize;
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// MarkupCompleted
// ---------------------------------------------------------------------------

/// A viewport tool finished drawing a markup.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkupCompleted {
    /// Stable identity of the markup inside the viewport.
    #[serde(rename = "markupUID")]
    pub markup_uid: String,

    /// Name of the tool that produced it, e.g. `"Length"`.
    pub tool_kind: String,

    /// Tool-internal data (handles, cached statistics, text, style).
    #[serde(default)]
    pub data: MarkupData,

    /// Locator of the frame the markup was drawn on.
    #[serde(default)]
    pub image_locator: String,
}

impl MarkupCompleted {
    pub fn new(
        markup_uid: impl Into<String>,
        tool_kind: impl Into<String>,
        data: MarkupData,
        image_locator: impl Into<String>,
    ) -> Self {
        Self {
            markup_uid: markup_uid.into(),
            tool_kind: tool_kind.into(),
            data,
            image_locator: image_locator.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// MarkupEventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 256;

/// Fan-out bus for [`MarkupCompleted`] events.
///
/// Shared via `Arc<MarkupEventBus>` between the viewport adapter (publisher)
/// and the study sessions (subscribers).
pub struct MarkupEventBus {
    sender: broadcast::Sender<MarkupCompleted>,
}

impl MarkupEventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed events are dropped
    /// and slow receivers observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// With no subscribers (no study open) the event is dropped.
    pub fn publish(&self, event: MarkupCompleted) {
        // Ignore the SendError, it only means there are zero receivers.
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<MarkupCompleted> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for MarkupEventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn publish_and_receive() {
        let bus = MarkupEventBus::default();
        let mut rx = bus.subscribe();

        bus.publish(MarkupCompleted::new("m-1", "Length", MarkupData::default(), "loc"));

        let received = rx.recv().await.unwrap();
        assert_eq!(received.markup_uid, "m-1");
        assert_eq!(received.tool_kind, "Length");
    }

    #[tokio::test]
    async fn every_subscriber_sees_every_event() {
        let bus = MarkupEventBus::default();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(MarkupCompleted::new("m-1", "Probe", MarkupData::default(), "loc"));

        assert_eq!(rx1.recv().await.unwrap().markup_uid, "m-1");
        assert_eq!(rx2.recv().await.unwrap().markup_uid, "m-1");
        assert_eq!(bus.subscriber_count(), 2);
    }

    #[test]
    fn publish_without_subscribers_is_silent() {
        let bus = MarkupEventBus::default();
        bus.publish(MarkupCompleted::new("m-1", "Pan", MarkupData::default(), ""));
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn raw_event_deserializes() {
        let event: MarkupCompleted = serde_json::from_value(json!({
            "markupUID": "abc",
            "toolKind": "Length",
            "imageLocator": "wadors:/x/instances/SOP1/frames/1",
            "data": {
                "handles": {"start": [10, 20, 0], "end": [50, 20, 0]},
                "cachedStats": {"img": {"length": 40.0}}
            }
        }))
        .unwrap();
        assert_eq!(event.markup_uid, "abc");
        assert_eq!(event.data.points().len(), 2);
    }
}
