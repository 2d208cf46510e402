//! Podium and global rank assignment
//!
//! Input order is authoritative (server-sorted, ties already broken); nothing
//! here re-sorts. A record's rank is its 1-based position in the whole
//! accumulated list, so ranks stay continuous across page boundaries.

use crate::accumulator::Snapshot;
use crate::model::ResultRecord;

/// Number of podium places
pub const PODIUM_SIZE: usize = 3;

/// A record with its global rank
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankedRecord<'a> {
    pub rank: usize,
    pub record: &'a ResultRecord,
}

/// One podium place; vacant when there are fewer than three participants
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PodiumSlot<'a> {
    Occupied(RankedRecord<'a>),
    Vacant { rank: usize },
}

impl<'a> PodiumSlot<'a> {
    pub fn rank(&self) -> usize {
        match self {
            PodiumSlot::Occupied(entry) => entry.rank,
            PodiumSlot::Vacant { rank } => *rank,
        }
    }

    /// Score of the occupant, 0 for a vacant slot
    pub fn score(&self) -> f64 {
        match self {
            PodiumSlot::Occupied(entry) => entry.record.score,
            PodiumSlot::Vacant { .. } => 0.0,
        }
    }

    pub fn record(&self) -> Option<&'a ResultRecord> {
        match self {
            PodiumSlot::Occupied(entry) => Some(entry.record),
            PodiumSlot::Vacant { .. } => None,
        }
    }

    pub fn is_vacant(&self) -> bool {
        matches!(self, PodiumSlot::Vacant { .. })
    }

    /// Name to render; "-" for a vacant slot
    pub fn display_name(&self) -> String {
        self.record()
            .map(|r| r.display_name())
            .unwrap_or_else(|| "-".to_string())
    }
}

/// Podium plus the ranked remainder
#[derive(Debug, Clone, PartialEq)]
pub struct Leaderboard<'a> {
    pub podium: [PodiumSlot<'a>; PODIUM_SIZE],
    pub rest: Vec<RankedRecord<'a>>,
}

impl<'a> Leaderboard<'a> {
    /// True when not even the first podium place is occupied
    pub fn is_empty(&self) -> bool {
        self.podium[0].is_vacant()
    }
}

/// Rank an ordered list of records
pub fn rank_records(records: &[ResultRecord]) -> Leaderboard<'_> {
    let slot = move |index: usize| match records.get(index) {
        Some(record) => PodiumSlot::Occupied(RankedRecord {
            rank: index + 1,
            record,
        }),
        None => PodiumSlot::Vacant { rank: index + 1 },
    };

    let rest = records
        .iter()
        .enumerate()
        .skip(PODIUM_SIZE)
        .map(|(index, record)| RankedRecord {
            rank: index + 1,
            record,
        })
        .collect();

    Leaderboard {
        podium: [slot(0), slot(1), slot(2)],
        rest,
    }
}

/// Rank a settled snapshot
pub fn rank(snapshot: &Snapshot) -> Leaderboard<'_> {
    rank_records(&snapshot.records)
}
