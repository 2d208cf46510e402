//! View projection of the ranked remainder
//!
//! Switching view mode is a pure re-projection over already ranked data:
//! records are borrowed, never copied or re-ranked, and nothing is fetched.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

use crate::leaderboard::RankedRecord;
use crate::theme::{theme_of, Theme};

/// How the ranked remainder is presented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    /// One flat, globally ranked list
    #[default]
    Global,
    /// Partitioned by school
    #[serde(alias = "school")]
    Group,
}

impl FromStr for ViewMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "global" => Ok(ViewMode::Global),
            "group" | "school" => Ok(ViewMode::Group),
            other => Err(format!("unknown view mode: {}", other)),
        }
    }
}

/// Ranked records of one school, in global rank order
#[derive(Debug, Clone, PartialEq)]
pub struct SchoolGroup<'a> {
    pub school_id: u64,
    pub school_name: &'a str,
    pub theme: Theme,
    pub entries: Vec<RankedRecord<'a>>,
}

/// Projection handed to the presentation layer
#[derive(Debug, Clone, PartialEq)]
pub enum PresentationModel<'a> {
    Global(Vec<RankedRecord<'a>>),
    Grouped(Vec<SchoolGroup<'a>>),
}

impl<'a> PresentationModel<'a> {
    /// Number of ranked records across the whole projection
    pub fn record_count(&self) -> usize {
        match self {
            PresentationModel::Global(entries) => entries.len(),
            PresentationModel::Grouped(groups) => groups.iter().map(|g| g.entries.len()).sum(),
        }
    }
}

/// Project the ranked remainder for `mode`
///
/// Groups are ordered by the first appearance of their school in the flat
/// ranked order; each entry keeps its global rank.
pub fn project<'a>(rest: &[RankedRecord<'a>], mode: ViewMode) -> PresentationModel<'a> {
    match mode {
        ViewMode::Global => PresentationModel::Global(rest.to_vec()),
        ViewMode::Group => {
            let mut groups: Vec<SchoolGroup<'a>> = Vec::new();
            let mut index_of: HashMap<u64, usize> = HashMap::new();

            for entry in rest {
                let record = entry.record;
                let index = match index_of.get(&record.school_id) {
                    Some(index) => *index,
                    None => {
                        groups.push(SchoolGroup {
                            school_id: record.school_id,
                            school_name: record.school_name.as_str(),
                            theme: theme_of(record.school_id, None, Some(record.school_name.as_str())),
                            entries: Vec::new(),
                        });
                        index_of.insert(record.school_id, groups.len() - 1);
                        groups.len() - 1
                    }
                };
                groups[index].entries.push(*entry);
            }

            PresentationModel::Grouped(groups)
        }
    }
}
