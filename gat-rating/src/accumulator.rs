//! Result accumulator: fetch lifecycle, page merging and stale-response suppression
//!
//! One accumulator is one query session. Every `reset` starts a new
//! generation; a response is applied only if the generation captured when
//! its fetch was issued is still current when it resolves. Older responses are
//! dropped on arrival, no transport cancellation needed.
//!
//! The lock is held only for the "begin" and "settle" steps, never across the
//! provider await, so a newer `reset` can start while an older fetch is still
//! outstanding.
//!
//! Readers only ever see a fully-settled [`Snapshot`].

use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use gat_common::events::{EventBus, FetchMode, RatingEvent};

use crate::filter::{compile, CanonicalRequest, FilterState};
use crate::model::{Leader, PageEnvelope, ResultRecord, Stats};
use crate::options::FilterOptions;
use crate::provider::{ProviderError, RatingProvider};

/// Lifecycle state of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchState {
    /// Nothing requested yet
    Idle,
    /// A fetch for the current generation is outstanding
    Fetching,
    /// Last fetch for the current generation resolved (success or failure)
    Settled,
}

/// Immutable, externally visible accumulated result set
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// Generation this data belongs to (0 = nothing loaded yet)
    pub generation: u64,
    /// Request that produced the first page of this generation
    pub request: Option<CanonicalRequest>,
    /// Accumulated records in authoritative rank order
    pub records: Vec<ResultRecord>,
    /// Last page merged
    pub page: u32,
    pub has_next: bool,
    /// Total matching records reported by the latest page
    pub total: u64,
    pub stats: Stats,
    pub leader: Leader,
    pub options: FilterOptions,
    /// Message of the last failed fetch; cleared by the next success
    pub error: Option<String>,
    pub settled_at: Option<DateTime<Utc>>,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            generation: 0,
            request: None,
            records: Vec::new(),
            page: 0,
            has_next: false,
            total: 0,
            stats: Stats::default(),
            leader: Leader::default(),
            options: FilterOptions::default(),
            error: None,
            settled_at: None,
        }
    }
}

impl Snapshot {
    /// True once any page has been applied
    pub fn is_loaded(&self) -> bool {
        self.generation > 0
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// First page of a new generation; replaces everything
    fn from_first_page(generation: u64, request: &CanonicalRequest, page: PageEnvelope) -> Self {
        let (page_number, has_next, total) = page_position(request, &page, 0);
        let mut seen = HashSet::new();
        let records = merge_records(Vec::new(), page.data, &mut seen, total, generation);

        Self {
            generation,
            request: Some(request.clone()),
            records,
            page: page_number,
            has_next,
            total,
            stats: page.stats,
            leader: page.leader,
            options: page.meta.options,
            error: None,
            settled_at: Some(Utc::now()),
        }
    }

    /// Next page of the same generation; stats, leader and options stay untouched
    fn with_next_page(&self, request: &CanonicalRequest, page: PageEnvelope) -> Self {
        let (page_number, has_next, total) = page_position(request, &page, self.records.len());
        let mut seen: HashSet<u64> = self.records.iter().map(|r| r.id).collect();
        let records = merge_records(self.records.clone(), page.data, &mut seen, total, self.generation);

        Self {
            records,
            page: page_number,
            has_next,
            total,
            error: None,
            settled_at: Some(Utc::now()),
            ..self.clone()
        }
    }

    fn with_error(&self, message: String) -> Self {
        Self {
            error: Some(message),
            settled_at: Some(Utc::now()),
            ..self.clone()
        }
    }
}

/// Page number, has-next flag and total for a received page
///
/// Without a pagination block the page is assumed to be the last one. A
/// missing page number means the requested page; a missing total means the
/// records received so far.
fn page_position(request: &CanonicalRequest, page: &PageEnvelope, already: usize) -> (u32, bool, u64) {
    let received = (already + page.data.len()) as u64;
    match &page.meta.pagination {
        Some(p) => (
            p.page.unwrap_or(request.page).max(1),
            p.has_next,
            p.total.unwrap_or(received),
        ),
        None => (request.page, false, received),
    }
}

/// Append records whose id is new, then cap the set at `total`
fn merge_records(
    mut records: Vec<ResultRecord>,
    incoming: Vec<ResultRecord>,
    seen: &mut HashSet<u64>,
    total: u64,
    generation: u64,
) -> Vec<ResultRecord> {
    let mut duplicates = 0usize;
    for record in incoming {
        if seen.insert(record.id) {
            records.push(record);
        } else {
            duplicates += 1;
        }
    }
    if duplicates > 0 {
        warn!(generation, duplicates, "Dropped records already present in this generation");
    }

    let cap = usize::try_from(total).unwrap_or(usize::MAX);
    if records.len() > cap {
        warn!(generation, records = records.len(), total, "Result set exceeds reported total, truncating");
        records.truncate(cap);
    }
    records
}

/// Why a request was not issued
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// A "load more" for this generation is already outstanding
    AppendInFlight,
    /// A reset is outstanding; there is nothing to append to yet
    ResetPending,
    /// No page of the current generation has been applied
    NotLoaded,
    /// The current generation reported no further pages
    NoMorePages,
    /// The filter passed to append differs from the current generation's
    FilterChanged,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            SkipReason::AppendInFlight => "append already in flight",
            SkipReason::ResetPending => "reset pending",
            SkipReason::NotLoaded => "current generation not loaded",
            SkipReason::NoMorePages => "no more pages",
            SkipReason::FilterChanged => "filter changed since last reset",
        };
        f.write_str(text)
    }
}

/// Result of one [`ResultAccumulator::request`] call
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    /// The page was merged; this is the new snapshot
    Applied(Arc<Snapshot>),
    /// The fetch failed; the snapshot kept its data and carries the error message
    Failed {
        error: ProviderError,
        snapshot: Arc<Snapshot>,
    },
    /// The response belonged to a superseded generation and was discarded
    Stale { generation: u64, current_generation: u64 },
    /// No fetch was issued
    Skipped(SkipReason),
}

impl FetchOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, FetchOutcome::Applied(_))
    }

    pub fn snapshot(&self) -> Option<&Arc<Snapshot>> {
        match self {
            FetchOutcome::Applied(snapshot) | FetchOutcome::Failed { snapshot, .. } => Some(snapshot),
            _ => None,
        }
    }
}

/// Fetch issued under a captured generation
#[derive(Debug)]
struct Ticket {
    generation: u64,
    mode: FetchMode,
    request: CanonicalRequest,
}

struct Inner {
    generation: u64,
    state: FetchState,
    /// Request of the current generation (page 1)
    active: Option<CanonicalRequest>,
    reset_in_flight: bool,
    append_in_flight: bool,
    snapshot: Arc<Snapshot>,
}

/// Owns the accumulated result set of one query session
pub struct ResultAccumulator {
    provider: Arc<dyn RatingProvider>,
    inner: RwLock<Inner>,
    events: Option<Arc<EventBus>>,
}

impl ResultAccumulator {
    pub fn new(provider: Arc<dyn RatingProvider>) -> Self {
        Self {
            provider,
            inner: RwLock::new(Inner {
                generation: 0,
                state: FetchState::Idle,
                active: None,
                reset_in_flight: false,
                append_in_flight: false,
                snapshot: Arc::new(Snapshot::default()),
            }),
            events: None,
        }
    }

    /// Emit lifecycle events on `bus`
    pub fn with_events(mut self, bus: Arc<EventBus>) -> Self {
        self.events = Some(bus);
        self
    }

    /// Latest settled snapshot
    pub async fn snapshot(&self) -> Arc<Snapshot> {
        self.inner.read().await.snapshot.clone()
    }

    pub async fn state(&self) -> FetchState {
        self.inner.read().await.state
    }

    pub async fn generation(&self) -> u64 {
        self.inner.read().await.generation
    }

    /// Fetch a page and merge it
    ///
    /// `Reset` starts a new generation at page 1 (use it for every filter or
    /// locale change). `Append` fetches the page after the current snapshot's
    /// and is a no-op unless the current generation is loaded, reports more
    /// pages and has no fetch outstanding.
    pub async fn request(&self, filter: &FilterState, mode: FetchMode) -> FetchOutcome {
        let ticket = match self.begin(filter, mode).await {
            Ok(ticket) => ticket,
            Err((generation, reason)) => {
                debug!(generation, %reason, "Append skipped");
                self.emit(RatingEvent::AppendSkipped {
                    generation,
                    reason: reason.to_string(),
                    timestamp: Utc::now(),
                });
                return FetchOutcome::Skipped(reason);
            }
        };

        debug!(
            generation = ticket.generation,
            mode = %ticket.mode,
            page = ticket.request.page,
            "Fetch started"
        );
        self.emit(RatingEvent::FetchStarted {
            generation: ticket.generation,
            mode: ticket.mode,
            page: ticket.request.page,
            timestamp: Utc::now(),
        });

        let result = self.provider.fetch_page(&ticket.request).await;
        self.settle(ticket, result).await
    }

    /// Validate the request and capture its generation
    async fn begin(&self, filter: &FilterState, mode: FetchMode) -> Result<Ticket, (u64, SkipReason)> {
        let mut inner = self.inner.write().await;

        match mode {
            FetchMode::Reset => {
                inner.generation += 1;
                let request = compile(filter).with_page(1);
                inner.active = Some(request.clone());
                inner.reset_in_flight = true;
                // Any outstanding append now belongs to a stale generation
                inner.append_in_flight = false;
                inner.state = FetchState::Fetching;

                Ok(Ticket {
                    generation: inner.generation,
                    mode,
                    request,
                })
            }
            FetchMode::Append => {
                let generation = inner.generation;
                if inner.append_in_flight {
                    return Err((generation, SkipReason::AppendInFlight));
                }
                if inner.reset_in_flight {
                    return Err((generation, SkipReason::ResetPending));
                }
                if !inner.snapshot.is_loaded() || inner.snapshot.generation != generation {
                    return Err((generation, SkipReason::NotLoaded));
                }
                if !inner.snapshot.has_next {
                    return Err((generation, SkipReason::NoMorePages));
                }
                let active = match &inner.active {
                    Some(active) => active,
                    None => return Err((generation, SkipReason::NotLoaded)),
                };
                if !active.same_filter(&compile(filter)) {
                    return Err((generation, SkipReason::FilterChanged));
                }

                let request = active.with_page(inner.snapshot.page + 1);
                inner.append_in_flight = true;
                inner.state = FetchState::Fetching;

                Ok(Ticket {
                    generation,
                    mode,
                    request,
                })
            }
        }
    }

    /// Apply a resolved fetch if its generation is still current
    async fn settle(&self, ticket: Ticket, result: Result<PageEnvelope, ProviderError>) -> FetchOutcome {
        let mut inner = self.inner.write().await;

        if ticket.generation != inner.generation {
            debug!(
                generation = ticket.generation,
                current_generation = inner.generation,
                mode = %ticket.mode,
                "Dropping stale response"
            );
            let current_generation = inner.generation;
            drop(inner);
            self.emit(RatingEvent::StaleResponseDropped {
                generation: ticket.generation,
                current_generation,
                timestamp: Utc::now(),
            });
            return FetchOutcome::Stale {
                generation: ticket.generation,
                current_generation,
            };
        }

        match ticket.mode {
            FetchMode::Reset => inner.reset_in_flight = false,
            FetchMode::Append => inner.append_in_flight = false,
        }
        inner.state = FetchState::Settled;

        match result {
            Ok(page) => {
                let snapshot = match ticket.mode {
                    FetchMode::Reset => Snapshot::from_first_page(ticket.generation, &ticket.request, page),
                    FetchMode::Append => inner.snapshot.with_next_page(&ticket.request, page),
                };
                let snapshot = Arc::new(snapshot);
                inner.snapshot = snapshot.clone();
                drop(inner);

                info!(
                    generation = ticket.generation,
                    mode = %ticket.mode,
                    page = snapshot.page,
                    records = snapshot.records.len(),
                    has_next = snapshot.has_next,
                    "Page applied"
                );
                self.emit(RatingEvent::PageApplied {
                    generation: ticket.generation,
                    mode: ticket.mode,
                    page: snapshot.page,
                    records: snapshot.records.len(),
                    has_next: snapshot.has_next,
                    timestamp: Utc::now(),
                });

                FetchOutcome::Applied(snapshot)
            }
            Err(error) => {
                let snapshot = Arc::new(inner.snapshot.with_error(error.to_string()));
                inner.snapshot = snapshot.clone();
                drop(inner);

                warn!(
                    generation = ticket.generation,
                    mode = %ticket.mode,
                    error = %error,
                    "Fetch failed, keeping previous results"
                );
                self.emit(RatingEvent::FetchFailed {
                    generation: ticket.generation,
                    mode: ticket.mode,
                    message: error.to_string(),
                    timestamp: Utc::now(),
                });

                FetchOutcome::Failed { error, snapshot }
            }
        }
    }

    fn emit(&self, event: RatingEvent) {
        if let Some(bus) = &self.events {
            bus.emit_lossy(event);
        }
    }
}
