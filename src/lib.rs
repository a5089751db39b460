// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod cache;
pub mod classify;
pub mod clock;
pub mod config;
pub mod decision;
pub mod dedup;
pub mod error;
pub mod item;
pub mod normalize;
pub mod signature;
pub mod similarity;

// Batch flow and collaborators
pub mod pipeline;
pub mod reducer;
pub mod store;
pub mod webhook;

// Service surface
pub mod api;
pub mod history;
pub mod metrics;

// ---- Re-exports for stable public API ----
pub use crate::api::create_router;
pub use crate::decision::{FilterVerdict, ReasonCode};
pub use crate::error::{Error, ErrorKind};
pub use crate::item::{CandidateItem, RecentWindowItem};
pub use crate::pipeline::{filter_batch, run_batch, BatchStatistics};
pub use crate::reducer::{ReducerHandle, VolumeReducer};
