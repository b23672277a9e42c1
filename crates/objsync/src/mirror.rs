//! Mirror delta engine
//!
//! A mirror lists the source tree once and every target tree once, all
//! concurrently, and merges them in a single forward pass. Each target is
//! wrapped in a [`TargetCursor`] that answers "is this object already there
//! and up to date?" for suffixes asked in ascending order.

mod delta;
mod oracle;

pub use delta::{MirrorInstruction, MirrorPlan, mirror};
pub use oracle::TargetCursor;
