//! Event types for the rating event system
//!
//! The result accumulator emits these so a presentation layer can re-render
//! when a snapshot settles instead of polling.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// How a fetch merges into the accumulated result set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchMode {
    /// New filter generation: page 1, replaces everything on success
    Reset,
    /// Next page of the current generation, appended to the records
    Append,
}

impl std::fmt::Display for FetchMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchMode::Reset => write!(f, "reset"),
            FetchMode::Append => write!(f, "append"),
        }
    }
}

/// Rating event types
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RatingEvent {
    /// A fetch was issued to the provider
    FetchStarted {
        generation: u64,
        mode: FetchMode,
        page: u32,
        timestamp: DateTime<Utc>,
    },

    /// A page was merged and a new snapshot settled
    PageApplied {
        generation: u64,
        mode: FetchMode,
        page: u32,
        /// Records in the snapshot after the merge
        records: usize,
        has_next: bool,
        timestamp: DateTime<Utc>,
    },

    /// A fetch failed; the previous snapshot was kept
    FetchFailed {
        generation: u64,
        mode: FetchMode,
        message: String,
        timestamp: DateTime<Utc>,
    },

    /// A response arrived for a superseded generation and was discarded
    StaleResponseDropped {
        generation: u64,
        current_generation: u64,
        timestamp: DateTime<Utc>,
    },

    /// A "load more" request was ignored
    AppendSkipped {
        generation: u64,
        reason: String,
        timestamp: DateTime<Utc>,
    },
}

impl RatingEvent {
    /// Generation the event refers to
    pub fn generation(&self) -> u64 {
        match self {
            RatingEvent::FetchStarted { generation, .. }
            | RatingEvent::PageApplied { generation, .. }
            | RatingEvent::FetchFailed { generation, .. }
            | RatingEvent::StaleResponseDropped { generation, .. }
            | RatingEvent::AppendSkipped { generation, .. } => *generation,
        }
    }
}

/// Broadcast bus for [`RatingEvent`]s
///
/// # Examples
///
/// ```
/// use gat_common::events::EventBus;
///
/// let event_bus = EventBus::new(100);
/// let _rx = event_bus.subscribe();
/// assert_eq!(event_bus.subscriber_count(), 1);
/// ```
pub struct EventBus {
    tx: broadcast::Sender<RatingEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus buffering up to `capacity` events per subscriber
    ///
    /// A capacity of 0 is raised to 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<RatingEvent> {
        self.tx.subscribe()
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: RatingEvent) {
        let _ = self.tx.send(event);
    }

    /// Get the current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Get the configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
