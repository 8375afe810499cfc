//! Violation classification and batch analysis for landwatch.
//!
//! - [`classifier`]: the ordered rule chain turning a snapshot into one verdict
//! - [`rules`]: the individual rule strategies (encroachment, illegal
//!   construction, suspicious change, unused land, compliant)
//! - [`provider`]: async interfaces to inference and footprint sources
//! - [`provider_file`]: a provider reading per-parcel observation files
//! - [`retry`]: per-attempt timeouts with exponential backoff
//! - [`pipeline`]: the single-parcel evaluation pipeline
//! - [`job`]: job state transitions and run claims
//! - [`coordinator`]: bounded, cancellable batch runs over a job's scope
//! - [`types`]: command results shared with the output formatters

pub mod classifier;
pub mod coordinator;
pub mod job;
pub mod pipeline;
pub mod provider;
pub mod provider_file;
pub mod retry;
pub mod rules;
pub mod types;

pub use classifier::ViolationClassifier;
pub use coordinator::{BatchCoordinator, CancelToken, RunReport};
