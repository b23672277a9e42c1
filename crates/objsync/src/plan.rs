//! Copy planning
//!
//! Every copy command reduces to single-object copies:
//!
//! - A: `copy(f, f)` stays as is
//! - B: `copy(f, d)` becomes `copy(f, d/f)`, then A
//! - C: `copy(d..., d2)` becomes one A per regular file under `d`
//! - D: `copy([f | d...], d2)` becomes B or C per source, in order
//!
//! Arguments are classified and validated up front; problems found while
//! expanding the plan are carried inside the instruction stream.

mod copy;
mod shape;

pub use copy::{CopyInstruction, CopyPlan, CopyPlanner};
pub use shape::{ShapeVariant, check_copy_syntax, check_mirror_syntax, classify, is_existing_dir};
