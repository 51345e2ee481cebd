//! # vigil-core
//!
//! Core types shared across all vigil crates.
//!
//! This crate provides:
//! - Log records, per-check tallies, and the persisted [`entities::RunResult`]
//! - Status enums for log levels, run lifecycle, and overall outcome
//! - Check unit descriptors produced by discovery
//! - Declarative rule definitions understood by the built-in rule unit
//! - The read-only data-access boundary ([`data::DataSource`]) and an
//!   in-memory JSON snapshot implementation
//! - Qualified name helpers and cross-cutting error types

pub mod data;
pub mod entities;
pub mod enums;
pub mod errors;
pub mod names;
pub mod rules;
