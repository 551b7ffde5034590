//! Angle-of-attack sweep coordination.
//!
//! Sweeps are exploratory: one divergent angle must not discard the
//! others, so a failed case degrades to a failed entry and the sweep
//! continues. The result table preserves the input parameter order.

use std::path::Path;

use serde::Serialize;

use af_core::ToolRunner;

use crate::config::WorkflowConfig;
use crate::error::AppResult;
use crate::geometry::GeometryStager;
use crate::pipeline::{run_case, CaseRequest, CaseSummary};

/// One row of the sweep result table.
#[derive(Debug, Clone, Serialize)]
pub struct SweepEntry {
    pub aoa_deg: f64,
    pub case: String,
    /// Present only for a completed case.
    pub summary: Option<CaseSummary>,
    /// Failure description for a missing result.
    pub error: Option<String>,
}

impl SweepEntry {
    pub fn succeeded(&self) -> bool {
        self.summary.is_some()
    }
}

/// Request to sweep a workflow config's angle list.
pub struct SweepRequest<'a> {
    pub config: &'a WorkflowConfig,
    /// Directory receiving one case sub-directory per angle.
    pub sweep_root: &'a Path,
    /// Detected core count override; unset means ask the OS.
    pub detected_cores: Option<usize>,
}

/// Case directory name for one swept angle.
fn case_name(aoa_deg: f64) -> String {
    format!("aoa_{aoa_deg}")
}

/// Run the full pipeline for every angle in the config, in order.
///
/// Cases run sequentially on the calling thread; each case gets its own
/// directory, so no two invocations ever share case state.
pub fn run_sweep(
    runner: &dyn ToolRunner,
    stager: &dyn GeometryStager,
    request: &SweepRequest,
) -> Vec<SweepEntry> {
    let mut entries = Vec::with_capacity(request.config.angles_deg.len());

    for &aoa_deg in &request.config.angles_deg {
        let case_root = request.sweep_root.join(case_name(aoa_deg));
        let case_label = case_root.display().to_string();

        let result = run_case(
            runner,
            stager,
            &CaseRequest {
                case_root,
                template: &request.config.template,
                geometry: &request.config.geometry,
                aoa_deg,
                cores: request.config.cores,
                detected_cores: request.detected_cores,
                window: request.config.window,
            },
        );

        let entry = match result {
            Ok(summary) => SweepEntry {
                aoa_deg,
                case: case_label,
                summary: Some(summary),
                error: None,
            },
            Err(err) => {
                tracing::warn!(aoa_deg, error = %err, "sweep case failed, continuing");
                SweepEntry {
                    aoa_deg,
                    case: case_label,
                    summary: None,
                    error: Some(err.to_string()),
                }
            }
        };
        entries.push(entry);
    }

    entries
}

/// Persisted sweep result table.
#[derive(Debug, Clone, Serialize)]
pub struct SweepSummary {
    /// RFC 3339 creation timestamp.
    pub created: String,
    pub window: usize,
    pub entries: Vec<SweepEntry>,
}

/// Write the sweep table as pretty JSON.
pub fn write_summary(path: &Path, window: usize, entries: &[SweepEntry]) -> AppResult<()> {
    let summary = SweepSummary {
        created: chrono::Utc::now().to_rfc3339(),
        window,
        entries: entries.to_vec(),
    };
    let json = serde_json::to_string_pretty(&summary)?;
    std::fs::write(path, json)?;
    Ok(())
}
