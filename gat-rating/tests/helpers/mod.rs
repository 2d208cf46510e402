//! Shared test helpers: record builders and scripted providers

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::sync::{mpsc, oneshot};

use gat_rating::model::{PageMeta, Pagination};
use gat_rating::options::FilterOptions;
use gat_rating::{
    CanonicalRequest, Leader, PageEnvelope, ProviderError, RatingProvider, ResultRecord, Stats,
};

/// Record ranked by id: lower id, higher score
pub fn record(id: u64, school_id: u64) -> ResultRecord {
    ResultRecord {
        id,
        name: format!("Student {}", id),
        first_name: format!("First{}", id),
        last_name: format!("Last{}", id),
        school_name: format!("School {}", school_id),
        school_id,
        grade: 10,
        section: "А".to_string(),
        exam_code: "GAT-1".to_string(),
        day_number: Some(1),
        score: 1000.0 - id as f64,
        badges: vec![],
        avatar: None,
    }
}

/// Records 1..=n spread round-robin over `schools` schools (ids 1..=schools)
pub fn ranked_records(n: u64, schools: u64) -> Vec<ResultRecord> {
    (1..=n).map(|id| record(id, (id - 1) % schools + 1)).collect()
}

/// Page `page` of `all`, with pagination and whole-set aggregates
pub fn page_of(all: &[ResultRecord], page: u32, limit: u32) -> PageEnvelope {
    let start = ((page.max(1) - 1) * limit) as usize;
    let end = (start + limit as usize).min(all.len());
    let data = if start < all.len() { all[start..end].to_vec() } else { Vec::new() };
    let total = all.len() as u64;
    let avg = if all.is_empty() {
        0.0
    } else {
        all.iter().map(|r| r.score).sum::<f64>() / all.len() as f64
    };

    PageEnvelope {
        data,
        meta: PageMeta {
            options: FilterOptions {
                available_grades: vec![9, 10, 11],
                ..Default::default()
            },
            pagination: Some(Pagination {
                page: Some(page),
                limit,
                total: Some(total),
                has_next: (end as u64) < total,
            }),
        },
        stats: Stats {
            participants: total,
            avg_score: avg.round(),
        },
        leader: Leader {
            value: all.first().map(|r| r.school_name.clone()).unwrap_or_else(|| "-".to_string()),
            ..Default::default()
        },
    }
}

/// Serves pages sliced from a fixed ranked dataset and counts calls
pub struct PagingProvider {
    records: Vec<ResultRecord>,
    calls: AtomicUsize,
    fail_next: AtomicBool,
    omit_cursor: bool,
    requests: Mutex<Vec<CanonicalRequest>>,
}

impl PagingProvider {
    pub fn new(records: Vec<ResultRecord>) -> Self {
        Self {
            records,
            calls: AtomicUsize::new(0),
            fail_next: AtomicBool::new(false),
            omit_cursor: false,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Leave `page` and `total` out of every pagination block
    pub fn without_cursor(mut self) -> Self {
        self.omit_cursor = true;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Make the next fetch fail with a network error
    pub fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    pub fn requests(&self) -> Vec<CanonicalRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl RatingProvider for PagingProvider {
    async fn fetch_page(&self, request: &CanonicalRequest) -> Result<PageEnvelope, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());

        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(ProviderError::Network("connection reset".to_string()));
        }

        let mut page = page_of(&self.records, request.page, request.limit);
        if self.omit_cursor {
            if let Some(pagination) = page.meta.pagination.as_mut() {
                pagination.page = None;
                pagination.total = None;
            }
        }
        Ok(page)
    }
}

pub type Responder = oneshot::Sender<Result<PageEnvelope, ProviderError>>;

/// Provider whose responses are released by the test
///
/// Every fetch is reported on the channel returned by [`GatedProvider::new`]
/// together with a responder; the fetch resolves when the test answers.
pub struct GatedProvider {
    calls: mpsc::UnboundedSender<(CanonicalRequest, Responder)>,
}

impl GatedProvider {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<(CanonicalRequest, Responder)>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { calls: tx }, rx)
    }
}

#[async_trait]
impl RatingProvider for GatedProvider {
    async fn fetch_page(&self, request: &CanonicalRequest) -> Result<PageEnvelope, ProviderError> {
        let (tx, rx) = oneshot::channel();
        self.calls
            .send((request.clone(), tx))
            .map_err(|_| ProviderError::Network("test harness gone".to_string()))?;
        rx.await
            .map_err(|_| ProviderError::Network("responder dropped".to_string()))?
    }
}
