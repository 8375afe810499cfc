//! Core types, storage, and configuration for landwatch.
//!
//! This crate provides the foundational data structures used across all landwatch crates:
//! - [`types`]: Parcels, geometries, verdicts, jobs, and error types
//! - [`snapshot`]: Immutable, validated detection snapshots
//! - [`store`]: The [`ParcelStore`](store::ParcelStore) persistence trait
//! - [`sqlite`]: SQLite-backed implementation of `ParcelStore`
//! - [`config`]: Configuration loading from `.landwatch/landwatch.json`
//! - [`hash`]: Deterministic content fingerprints (base62 of xxhash64)
//! - [`logging`]: Tracing subscriber setup

pub mod config;
pub mod hash;
pub mod logging;
pub mod snapshot;
pub mod sqlite;
pub mod sqlite_queries;
pub mod store;
pub mod types;
