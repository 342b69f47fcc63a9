//! Per-entity mailbox: outbox for sending, inbox for delivery.
//!
//! The communication phase drains outboxes and delivers into inboxes,
//! directly by receiver id, or as a broadcast to everyone within the
//! configured radius. Inboxes trim messages past the retention window.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::types::EntityId;

/// Seconds a delivered message survives in an inbox.
pub const INBOX_RETENTION: f64 = 60.0;

/// A message queued for delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutgoingMessage {
    /// Receiver; `None` broadcasts within the broadcast radius.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<EntityId>,
    /// Message body.
    pub content: String,
    /// World time the message was queued.
    pub sent_at: f64,
}

/// A delivered message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InboxMessage {
    /// Sender.
    pub from: EntityId,
    /// Message body.
    pub content: String,
    /// World time of delivery.
    pub delivered_at: f64,
    /// Whether the owner has read it.
    pub read: bool,
}

/// One entity's message queues.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Mailbox {
    outbox: Vec<OutgoingMessage>,
    inbox: VecDeque<InboxMessage>,
}

impl Mailbox {
    /// Creates an empty mailbox.
    #[must_use]
    pub fn new() -> Self {
        Mailbox::default()
    }

    /// Queues a message for the next communication phase.
    pub fn send(&mut self, to: Option<EntityId>, content: impl Into<String>, now: f64) {
        self.outbox.push(OutgoingMessage {
            to,
            content: content.into(),
            sent_at: now,
        });
    }

    /// Takes every queued outgoing message.
    pub fn drain_outbox(&mut self) -> Vec<OutgoingMessage> {
        std::mem::take(&mut self.outbox)
    }

    /// Delivers a message into the inbox.
    pub fn deliver(&mut self, from: EntityId, content: impl Into<String>, now: f64) {
        self.inbox.push_back(InboxMessage {
            from,
            content: content.into(),
            delivered_at: now,
            read: false,
        });
    }

    /// Returns the oldest unread message, marking it read.
    pub fn read_next(&mut self) -> Option<InboxMessage> {
        let message = self.inbox.iter_mut().find(|m| !m.read)?;
        message.read = true;
        Some(message.clone())
    }

    /// Returns whether any unread messages are waiting.
    #[must_use]
    pub fn has_unread(&self) -> bool {
        self.inbox.iter().any(|m| !m.read)
    }

    /// Number of messages currently held, read or not.
    #[must_use]
    pub fn inbox_len(&self) -> usize {
        self.inbox.len()
    }

    /// Number of queued outgoing messages.
    #[must_use]
    pub fn outbox_len(&self) -> usize {
        self.outbox.len()
    }

    /// Drops messages delivered more than `retention` seconds ago.
    pub fn trim(&mut self, retention: f64, now: f64) {
        self.inbox.retain(|m| now - m.delivered_at <= retention);
    }
}
