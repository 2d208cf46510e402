//! # GAT Common Library
//!
//! Shared code for the GAT rating tools including:
//! - Error types
//! - Configuration loading (TOML + environment + CLI overrides)
//! - Rating event types and the EventBus

pub mod config;
pub mod error;
pub mod events;

pub use error::{Error, Result};
pub use events::{EventBus, FetchMode, RatingEvent};
