//! gat-rating library - multi-school exam leaderboard engine
//!
//! Data flow:
//! filter state → [`filter::compile`] → provider → page →
//! [`accumulator::ResultAccumulator`] → [`leaderboard::rank`] →
//! [`projector::project`] → presentation layer.

pub mod accumulator;
pub mod client;
pub mod export;
pub mod filter;
pub mod leaderboard;
pub mod model;
pub mod options;
pub mod projector;
pub mod provider;
pub mod theme;

pub use accumulator::{FetchOutcome, FetchState, ResultAccumulator, SkipReason, Snapshot};
pub use client::HttpRatingProvider;
pub use filter::{compile, CanonicalRequest, FilterState};
pub use gat_common::FetchMode;
pub use leaderboard::{rank, Leaderboard, PodiumSlot, RankedRecord};
pub use model::{Badge, Leader, PageEnvelope, ResultRecord, Stats, SubScore};
pub use projector::{project, PresentationModel, SchoolGroup, ViewMode};
pub use provider::{ProviderError, RatingProvider};
pub use theme::{theme_of, Theme, PALETTE};
