//! Per-order message reconciliation.
//!
//! The timeline is a disposable client-side cache of one order's
//! conversation. It is eventually consistent with the server log: the
//! user's own sends appear instantly as temporary entries, and every
//! authoritative message that arrives (push, acknowledgment, snapshot,
//! or poll) supersedes its optimistic counterpart and is inserted with
//! keyed-map semantics, never list-append semantics.

use renraku_shared::types::{Message, MessageKind, OrderId, UserId, TEMP_ID_PREFIX};

/// Locally reconciled view of one order's conversation.
pub struct OrderTimeline {
    order_id: OrderId,
    messages: Vec<Message>,
    next_temp: u64,
    /// Unix millis of the last successful snapshot/poll, if any.
    last_refresh_at: Option<i64>,
    /// Consecutive reconnection attempts since the last live session.
    reconnect_attempts: u32,
}

impl OrderTimeline {
    pub fn new(order_id: OrderId) -> Self {
        Self {
            order_id,
            messages: Vec::new(),
            next_temp: 1,
            last_refresh_at: None,
            reconnect_attempts: 0,
        }
    }

    pub fn order_id(&self) -> &OrderId {
        &self.order_id
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last_refresh_at(&self) -> Option<i64> {
        self.last_refresh_at
    }

    pub fn reconnect_attempts(&self) -> u32 {
        self.reconnect_attempts
    }

    pub fn record_reconnect_attempt(&mut self) -> u32 {
        self.reconnect_attempts += 1;
        self.reconnect_attempts
    }

    pub fn reset_reconnect_attempts(&mut self) {
        self.reconnect_attempts = 0;
    }

    /// Append an optimistic entry for a message the user just typed.
    ///
    /// The entry carries a client-generated `tmp-` id and is visible
    /// immediately; it lives only until the matching acknowledgment or
    /// authoritative push arrives, or until [`fail_send`] drops it.
    ///
    /// [`fail_send`]: OrderTimeline::fail_send
    pub fn push_optimistic(
        &mut self,
        sender_id: UserId,
        body: String,
        kind: MessageKind,
        now_millis: i64,
    ) -> String {
        let temp_id = format!("{}{}", TEMP_ID_PREFIX, self.next_temp);
        self.next_temp += 1;

        self.messages.push(Message {
            id: temp_id.clone(),
            order_id: self.order_id.clone(),
            sender_id,
            body,
            kind,
            delivered: false,
            read: false,
            created_at: now_millis,
        });
        self.sort();

        temp_id
    }

    /// Insert or overwrite one authoritative message.
    ///
    /// Any temporary entry matching (order, sender, body) is dropped
    /// first, so the optimistic placeholder never coexists with its
    /// authoritative counterpart. A duplicate server id updates the
    /// existing entry in place instead of appending.
    pub fn apply_authoritative(&mut self, message: Message) {
        if message.order_id != self.order_id || message.is_temporary() {
            return;
        }

        self.messages.retain(|m| {
            !(m.is_temporary() && m.sender_id == message.sender_id && m.body == message.body)
        });

        match self.messages.iter_mut().find(|m| m.id == message.id) {
            Some(existing) => *existing = message,
            None => self.messages.push(message),
        }
        self.sort();
    }

    /// Reconcile the acknowledgment of the caller's own send: the
    /// placeholder with `temp_id` is removed and the authoritative
    /// record takes its place.
    pub fn acknowledge(&mut self, temp_id: &str, message: Message) {
        self.messages.retain(|m| m.id != temp_id);
        self.apply_authoritative(message);
    }

    /// Drop the placeholder of a send that ultimately failed. A failed
    /// send must never stay visible as if it were delivered.
    pub fn fail_send(&mut self, temp_id: &str) -> bool {
        let before = self.messages.len();
        self.messages.retain(|m| m.id != temp_id);
        self.messages.len() != before
    }

    /// Merge a freshly fetched authoritative page into the cache.
    ///
    /// Takes all of the fetched set, then the cached non-temporary
    /// entries the page might have missed, keyed by id, sorted by
    /// timestamp ascending. Temporary entries are excluded from the
    /// result so no limbo duplicate can outlive a refresh.
    pub fn merge(&mut self, fetched: Vec<Message>, refreshed_at: i64) {
        let mut merged: Vec<Message> = fetched
            .into_iter()
            .filter(|m| m.order_id == self.order_id && !m.is_temporary())
            .collect();

        for cached in self.messages.drain(..) {
            if !cached.is_temporary() && !merged.iter().any(|m| m.id == cached.id) {
                merged.push(cached);
            }
        }

        self.messages = merged;
        self.sort();
        self.last_refresh_at = Some(refreshed_at);
    }

    /// Count of messages not authored by `me` and not yet read.
    pub fn unread_count(&self, me: Option<&UserId>) -> usize {
        self.messages
            .iter()
            .filter(|m| Some(&m.sender_id) != me && !m.read)
            .count()
    }

    /// Apply a read receipt: everything not authored by the reader is
    /// now read. Monotonic; once read, never unread by this flow.
    pub fn mark_read_by(&mut self, reader: &UserId) {
        for message in &mut self.messages {
            if &message.sender_id != reader {
                message.read = true;
            }
        }
    }

    /// Latest authoritative id, used as the poll cursor.
    pub fn last_authoritative_id(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| !m.is_temporary())
            .map(|m| m.id.as_str())
    }

    fn sort(&mut self) {
        self.messages
            .sort_by(|a, b| (a.created_at, &a.id).cmp(&(b.created_at, &b.id)));
    }
}
