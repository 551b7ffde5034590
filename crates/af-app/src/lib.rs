//! af-app: service layer tying the pipeline crates together.
//!
//! Hosts the workflow configuration schema, the single-case pipeline, the
//! sweep coordinator and the sweep summary persistence, so the CLI stays a
//! thin argument-parsing shell.

pub mod config;
pub mod error;
pub mod geometry;
pub mod pipeline;
pub mod sweep;

pub use config::{load_config, WorkflowConfig};
pub use error::{AppError, AppResult};
pub use geometry::{CopyStager, GeometryStager};
pub use pipeline::{run_case, CaseRequest, CaseSummary};
pub use sweep::{run_sweep, write_summary, SweepEntry, SweepRequest, SweepSummary};
