//! # objsync
//!
//! Core library for the objsync copy and mirror client.
//!
//! The interesting part of copying between a filesystem and object storage is
//! deciding *what* to transfer. This library provides:
//! - URL parsing and the recursive `...` marker rules
//! - A [`storage::Storage`] abstraction with filesystem and in-memory object
//!   store backends
//! - The copy planner, which classifies `(sources, target)` into a
//!   [`plan::ShapeVariant`] and expands it into single-object copies
//! - The mirror delta engine, which merge-joins one source listing against N
//!   sorted target listings and emits only what each target is missing
//! - A thin transfer executor and configuration loading used by the CLI

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod entry;
pub mod error;
pub mod location;

/// Storage backends and the listing contract
pub mod storage;

/// Channel-backed listing streams
pub mod listing;

/// Copy shape classification and copy plan generation
pub mod plan;

/// Mirror delta engine
pub mod mirror;

/// Configuration file discovery, merging and validation
pub mod config;

/// Byte-copy executor and run statistics
pub mod transfer;

pub use entry::{Entry, EntryKind};
pub use error::{PlanError, Result};
pub use mirror::{MirrorInstruction, MirrorPlan};
pub use plan::{CopyInstruction, CopyPlanner, ShapeVariant};
pub use location::ObjectUrl;
