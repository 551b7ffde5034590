//! Shared error taxonomy for the case pipeline.
//!
//! External-tool failures carry the tool's own diagnostic tail verbatim;
//! that text is usually the only actionable signal for a failed CFD run.

use std::path::PathBuf;
use thiserror::Error;

pub type AfResult<T> = Result<T, AfError>;

#[derive(Error, Debug)]
pub enum AfError {
    #[error("case destination is not empty: {path}")]
    AlreadyExists { path: PathBuf },

    #[error("case template missing or incomplete: {path} (missing: {missing})")]
    TemplateMissing { path: PathBuf, missing: String },

    #[error("invalid case at {path}: missing {missing}")]
    InvalidCase { path: PathBuf, missing: String },

    #[error("no compute resources detected on host")]
    NoResourcesDetected,

    #[error("requested {requested} partitions, only {detected} cores detected")]
    InsufficientResources { requested: usize, detected: usize },

    #[error("no geometry input present in case: {path}")]
    GeometryMissing { path: PathBuf },

    #[error("mesh generation failed ({tool}) in {case}:\n{diagnostics}")]
    MeshGenerationFailed {
        tool: String,
        case: PathBuf,
        diagnostics: String,
    },

    #[error("invalid stage transition: cannot {operation} from state {state}")]
    InvalidStageTransition {
        operation: &'static str,
        state: String,
    },

    #[error("domain decomposition failed in {case}:\n{diagnostics}")]
    DecompositionFailed { case: PathBuf, diagnostics: String },

    #[error("main solve failed in {case}:\n{diagnostics}")]
    SolveFailed { case: PathBuf, diagnostics: String },

    #[error("result reconstruction failed ({tool}) in {case}:\n{diagnostics}")]
    ReconstructionFailed {
        tool: String,
        case: PathBuf,
        diagnostics: String,
    },

    #[error("insufficient data: need {needed} records, have {available}")]
    InsufficientData { needed: usize, available: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
