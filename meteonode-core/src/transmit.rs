//! Transmission Buffer
//!
//! ## Overview
//!
//! A bounded FIFO of records that could not be delivered. Insertion order is
//! transmission priority; when the buffer is full the *oldest* entry is
//! dropped to make room, never the newest.
//!
//! ```text
//! capacity 3, push E:
//!   [A, B, C]  ──►  [B, C, E]   (A evicted)
//! ```
//!
//! ## Drain Semantics
//!
//! [`TransmissionBuffer::flush`] offers entries to the sender, oldest
//! first. Entries that fail stay behind in their original order; nothing is
//! duplicated and nothing is reordered.
//!
//! A rejected entry does not stop the pass, so one bad record cannot block
//! the rest. A link failure ([`NodeError::is_link_down`]) does: every
//! further send would wait out its own connect timeout, so the untried
//! remainder stays queued for the next cycle.
//!
//! [`TransmissionBuffer::send_or_buffer`] drains first, then sends the new
//! record, and buffers it only if that send fails. When the drain found the
//! link down the new record is buffered without an attempt. Buffering on
//! failure is unconditional; the consecutive-failure counter is diagnostic
//! only.
//!
//! ## Transport Independence
//!
//! The buffer sees nothing but [`Sender`]. Query-string GET, JSON POST or a
//! test double are all the same to it.

use heapless::Deque;

use crate::constants::DEFAULT_BUFFER_CAPACITY;
use crate::errors::NodeError;
use crate::ports::Sender;
use crate::record::{BufferedEntry, StationRecord};
use crate::time::Timestamp;

/// Outcome of one send attempt, for logging by the caller
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SendOutcome {
    /// Delivered immediately
    Sent,
    /// Delivery failed; the record is now buffered
    Buffered(NodeError),
}

impl SendOutcome {
    /// True if the record was delivered
    pub fn is_sent(&self) -> bool {
        matches!(self, Self::Sent)
    }
}

/// Bounded FIFO of undelivered records
#[derive(Debug, Clone)]
pub struct TransmissionBuffer<const N: usize = DEFAULT_BUFFER_CAPACITY> {
    entries: Deque<BufferedEntry, N>,
    consecutive_failures: u32,
    evicted: u32,
    last_error: Option<NodeError>,
}

impl<const N: usize> TransmissionBuffer<N> {
    /// Empty buffer
    pub const fn new() -> Self {
        Self {
            entries: Deque::new(),
            consecutive_failures: 0,
            evicted: 0,
            last_error: None,
        }
    }

    /// Append an entry, evicting the oldest when full
    ///
    /// Returns the evicted entry, if any.
    pub fn push(&mut self, entry: BufferedEntry) -> Option<BufferedEntry> {
        if N == 0 {
            return Some(entry);
        }

        let evicted = if self.entries.is_full() {
            self.evicted = self.evicted.saturating_add(1);
            self.entries.pop_front()
        } else {
            None
        };

        if let Some(_old) = &evicted {
            node_warn!("Transmission buffer full, dropped entry captured at {} ms", _old.timestamp);
        }

        // capacity is guaranteed by the eviction above
        let _ = self.entries.push_back(entry);
        node_debug!("Buffered entry, {} of {} slots used", self.entries.len(), N);
        evicted
    }

    /// Offer buffered entries to `sender`, oldest first
    ///
    /// Returns how many were delivered. Failures remain buffered in order;
    /// the pass stops at the first link failure.
    pub fn flush<S: Sender>(&mut self, sender: &mut S) -> usize {
        self.drain(sender).0
    }

    /// Drain the backlog, then send `record`; buffer it on failure
    pub fn send_or_buffer<S: Sender>(
        &mut self,
        record: StationRecord,
        timestamp: Timestamp,
        sender: &mut S,
    ) -> SendOutcome {
        let entry = BufferedEntry::new(timestamp, record);

        if let (_, Some(link_error)) = self.drain(sender) {
            node_warn!("Link down ({}), buffering without a send", link_error);
            self.push(entry);
            return SendOutcome::Buffered(link_error);
        }

        match sender.send(&entry) {
            Ok(()) => {
                self.record_success();
                SendOutcome::Sent
            }
            Err(e) => {
                node_warn!("Transmission failed: {}", e);
                self.record_failure(e);
                self.push(entry);
                SendOutcome::Buffered(e)
            }
        }
    }

    /// One pass over the queue; also reports the link failure that ended it
    fn drain<S: Sender>(&mut self, sender: &mut S) -> (usize, Option<NodeError>) {
        if self.entries.is_empty() {
            return (0, None);
        }

        let pending = self.entries.len();
        let mut sent = 0;
        let mut link_error = None;

        // rotate through the queue once: delivered entries are dropped,
        // failures go back on the tail in the order they were taken off
        for taken in 1..=pending {
            let Some(entry) = self.entries.pop_front() else { break };
            match sender.send(&entry) {
                Ok(()) => {
                    sent += 1;
                    self.record_success();
                }
                Err(e) => {
                    self.record_failure(e);
                    let _ = self.entries.push_back(entry);
                    if e.is_link_down() {
                        // finish the rotation untried so the order holds
                        for _ in taken..pending {
                            if let Some(untried) = self.entries.pop_front() {
                                let _ = self.entries.push_back(untried);
                            }
                        }
                        link_error = Some(e);
                        break;
                    }
                }
            }
        }

        node_info!("Drained {} of {} buffered entries, {} remaining", sent, pending, self.entries.len());
        (sent, link_error)
    }

    /// Number of buffered entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if buffer is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Configured capacity
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Buffered entries, oldest first
    pub fn iter(&self) -> impl Iterator<Item = &BufferedEntry> {
        self.entries.iter()
    }

    /// Oldest buffered entry
    pub fn oldest(&self) -> Option<&BufferedEntry> {
        self.entries.front()
    }

    /// Failed sends since the last success
    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// Entries lost to eviction over the buffer's lifetime
    pub fn evicted(&self) -> u32 {
        self.evicted
    }

    /// Most recent send error
    pub fn last_error(&self) -> Option<NodeError> {
        self.last_error
    }

    /// Drop everything
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn record_success(&mut self) {
        self.consecutive_failures = 0;
    }

    fn record_failure(&mut self, error: NodeError) {
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        self.last_error = Some(error);
    }
}

impl<const N: usize> Default for TransmissionBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}
