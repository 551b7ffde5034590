//! af-core: stable foundation for aerofoam.
//!
//! Contains:
//! - error (shared error taxonomy for the whole pipeline)
//! - exec (external-tool invocation: outcome capture, process runner)
//! - plan (partition planning from requested/detected core counts)

pub mod error;
pub mod exec;
pub mod plan;

// Re-exports: nice ergonomics for downstream crates
pub use error::{AfError, AfResult};
pub use exec::{ExitOutcome, ProcessRunner, ToolInvocation, ToolRunner};
pub use plan::{detect_cores, plan, ExecutionPlan, PartitionPolicy};
