//! Bounded hand-off from the MQTT task to the control loop.
//!
//! The ESP-IDF client runs its event callback on its own FreeRTOS task.
//! That task is the only producer; the control loop is the only consumer.
//! Configuration is never touched from the MQTT task, only queued here.
//!
//! ```text
//! ┌──────────────┐  InboundMessage  ┌──────────────┐
//! │  MQTT task   │─────────────────▶│ Control loop │
//! │  (callback)  │                  │  (consumer)  │
//! └──────────────┘                  └──────────────┘
//! ```

use core::sync::atomic::{AtomicU32, Ordering};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use log::warn;

use crate::app::ports::InboundMessage;

/// Pending-message capacity.  Power readings arrive every few seconds, so
/// eight covers a burst of retained config messages on subscribe.
pub const INBOX_DEPTH: usize = 8;

pub struct Inbox {
    channel: Channel<CriticalSectionRawMutex, InboundMessage, INBOX_DEPTH>,
    dropped: AtomicU32,
}

impl Default for Inbox {
    fn default() -> Self {
        Self::new()
    }
}

impl Inbox {
    pub const fn new() -> Self {
        Self {
            channel: Channel::new(),
            dropped: AtomicU32::new(0),
        }
    }

    /// Queue a received message.  Returns `false` (and counts a drop) when
    /// the message is oversized or the inbox is full.
    pub fn push(&self, topic: &str, payload: &[u8]) -> bool {
        let Some(msg) = InboundMessage::new(topic, payload) else {
            warn!(
                "Inbox: dropping oversized message on '{}' ({} bytes)",
                topic,
                payload.len()
            );
            self.dropped.fetch_add(1, Ordering::Relaxed);
            return false;
        };
        if self.channel.try_send(msg).is_err() {
            warn!("Inbox: full, dropping message on '{}'", topic);
            self.dropped.fetch_add(1, Ordering::Relaxed);
            return false;
        }
        true
    }

    /// Next queued message, oldest first.
    pub fn pop(&self) -> Option<InboundMessage> {
        self.channel.try_receive().ok()
    }

    pub fn len(&self) -> usize {
        self.channel.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channel.is_empty()
    }

    /// Discard everything queued (stale messages from a dead session).
    pub fn clear(&self) {
        self.channel.clear();
    }

    /// Messages dropped since boot.
    pub fn dropped(&self) -> u32 {
        self.dropped.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fifo_order() {
        let inbox = Inbox::new();
        assert!(inbox.push("a", b"1"));
        assert!(inbox.push("b", b"2"));
        assert_eq!(inbox.pop().unwrap().topic.as_str(), "a");
        assert_eq!(inbox.pop().unwrap().topic.as_str(), "b");
        assert!(inbox.pop().is_none());
    }

    #[test]
    fn full_inbox_drops() {
        let inbox = Inbox::new();
        for _ in 0..INBOX_DEPTH {
            assert!(inbox.push("t", b"1"));
        }
        assert!(!inbox.push("t", b"overflow"));
        assert_eq!(inbox.len(), INBOX_DEPTH);
        assert_eq!(inbox.dropped(), 1);
    }

    #[test]
    fn oversized_payload_dropped() {
        let inbox = Inbox::new();
        assert!(!inbox.push("t", &[b'9'; 200]));
        assert!(inbox.is_empty());
        assert_eq!(inbox.dropped(), 1);
    }

    #[test]
    fn clear_empties() {
        let inbox = Inbox::new();
        inbox.push("t", b"1");
        inbox.clear();
        assert!(inbox.is_empty());
    }
}
