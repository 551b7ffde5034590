//! Single-case pipeline: template to reconstructed results with a force
//! summary.

use std::path::{Path, PathBuf};

use serde::Serialize;

use af_case::CaseDirectory;
use af_core::{detect_cores, plan, AfError, PartitionPolicy, ToolRunner};
use af_forces::{parse, wind_axis, WindForces};
use af_mesh::MeshStage;
use af_solve::SolverOrchestrator;

use crate::error::AppResult;
use crate::geometry::GeometryStager;

/// Request to run one case end to end.
pub struct CaseRequest<'a> {
    /// Destination case root; must be absent or empty.
    pub case_root: PathBuf,
    pub template: &'a Path,
    pub geometry: &'a Path,
    pub aoa_deg: f64,
    /// Requested partition count; unset means all detected cores.
    pub cores: Option<usize>,
    /// Detected core count override; unset means ask the OS. Tests and
    /// sweep budgeting use this.
    pub detected_cores: Option<usize>,
    /// Trailing-window length for the converged-force mean.
    pub window: usize,
}

/// Converged-force summary for one completed case.
#[derive(Debug, Clone, Serialize)]
pub struct CaseSummary {
    pub case: String,
    pub aoa_deg: f64,
    /// Records the trailing mean was taken over.
    pub samples: usize,
    /// Malformed force-log lines dropped during parsing.
    pub skipped_lines: usize,
    /// Body-axis mean totals.
    pub drag: f64,
    pub lift: f64,
    /// Wind-axis (aircraft frame) means.
    pub wind: WindForces,
}

/// Run the full pipeline on one case.
///
/// Create from template, stage geometry, plan partitions, mesh in two
/// stages, solve and reconstruct, then parse the force history into a
/// trailing-window summary. When fewer records exist than the requested
/// window, the mean falls back to all available records; an empty force
/// log remains fatal.
pub fn run_case(
    runner: &dyn ToolRunner,
    stager: &dyn GeometryStager,
    request: &CaseRequest,
) -> AppResult<CaseSummary> {
    let case = CaseDirectory::create(request.template, &request.case_root)?;
    stager.stage(request.geometry, request.aoa_deg, &case.geometry_path())?;

    let detected = request.detected_cores.unwrap_or_else(detect_cores);
    let exec_plan = plan(request.cores, detected, PartitionPolicy::Clamp)?;
    tracing::info!(
        case = %case.root().display(),
        aoa_deg = request.aoa_deg,
        partitions = exec_plan.effective,
        "starting case pipeline"
    );

    let mut mesh = MeshStage::new(&case, runner);
    mesh.build_base_domain()?;
    mesh.refine_around_geometry()?;

    let mut orchestrator = SolverOrchestrator::new(&case, runner, &exec_plan);
    orchestrator.run()?;

    let series = parse(&case.forces_log())?;
    if series.is_empty() {
        return Err(AfError::InsufficientData {
            needed: request.window,
            available: 0,
        }
        .into());
    }
    let window = request.window.min(series.len());
    let average = series.tail_average(window)?;
    let wind = wind_axis(request.aoa_deg, average.drag, average.lift);

    Ok(CaseSummary {
        case: case.root().display().to_string(),
        aoa_deg: request.aoa_deg,
        samples: average.samples,
        skipped_lines: series.skipped_lines,
        drag: average.drag,
        lift: average.lift,
        wind,
    })
}
