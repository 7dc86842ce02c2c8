//! Partitioned parallel directory traversal.
//!
//! ## Architecture
//!
//! A root is split into independently dispatchable units in two phases:
//! 1. **Collapse** (`start_directories`): follow single-child chains, reporting
//!    each visited directory's files, until a directory has zero or several
//!    subdirectories. Its subdirectories are the next starting points.
//! 2. **Fan-out**: each starting point is collapsed again, for
//!    `fan_out_depth` generations, with every generation dispatched on the
//!    rayon pool and joined before returning.
//!
//! The last generation is walked sequentially in post-order inside its unit.
//!
//! ## Module Structure
//!
//! - `listing` - Single-directory listing and fault classification
//! - `partition` - Collapse, fan-out and sequential walk
//! - `progress` - Atomic session counters

mod listing;
mod partition;
mod progress;

pub use listing::{read_listing, DirListing};
pub use partition::{BatchSink, Walker};
pub use progress::WalkProgress;
