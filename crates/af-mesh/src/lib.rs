//! af-mesh: two-stage mesh generation over a case directory.
//!
//! Base-domain generation first, geometry-conforming refinement second.
//! Mesh generation is expensive and the external tools are not assumed
//! idempotent, so the stage order is enforced by an explicit state machine
//! carried per case instance; out-of-order calls fail before any process is
//! spawned.

use std::fmt;

use af_case::CaseDirectory;
use af_core::{AfError, AfResult, ExitOutcome, ToolInvocation, ToolRunner};

/// Mesh progress for one case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshState {
    Untouched,
    BaseDomainBuilt,
    Refined,
}

impl fmt::Display for MeshState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MeshState::Untouched => "untouched",
            MeshState::BaseDomainBuilt => "base-domain-built",
            MeshState::Refined => "refined",
        };
        f.write_str(name)
    }
}

/// Drives mesh generation against one case.
pub struct MeshStage<'a> {
    case: &'a CaseDirectory,
    runner: &'a dyn ToolRunner,
    state: MeshState,
}

impl<'a> MeshStage<'a> {
    pub fn new(case: &'a CaseDirectory, runner: &'a dyn ToolRunner) -> Self {
        Self {
            case,
            runner,
            state: MeshState::Untouched,
        }
    }

    pub fn state(&self) -> MeshState {
        self.state
    }

    /// Generate the base domain: `blockMesh`, then feature-edge extraction
    /// for the refinement stage.
    pub fn build_base_domain(&mut self) -> AfResult<()> {
        if self.state != MeshState::Untouched {
            return Err(AfError::InvalidStageTransition {
                operation: "build base domain",
                state: self.state.to_string(),
            });
        }

        self.run_mesh_tool("blockMesh", &[])?;
        self.run_mesh_tool("surfaceFeatureExtract", &[])?;

        self.state = MeshState::BaseDomainBuilt;
        tracing::info!(case = %self.case.root().display(), "base domain built");
        Ok(())
    }

    /// Refine the mesh around the case's geometry input.
    pub fn refine_around_geometry(&mut self) -> AfResult<()> {
        if self.state != MeshState::BaseDomainBuilt {
            return Err(AfError::InvalidStageTransition {
                operation: "refine around geometry",
                state: self.state.to_string(),
            });
        }

        let geometry = self.case.geometry_path();
        if !geometry.is_file() {
            return Err(AfError::GeometryMissing { path: geometry });
        }

        self.run_mesh_tool("snappyHexMesh", &["-overwrite"])?;

        self.state = MeshState::Refined;
        tracing::info!(case = %self.case.root().display(), "mesh refined around geometry");
        Ok(())
    }

    /// Best-effort external-viewer launch; never fatal.
    pub fn preview(&self) {
        let invocation = ToolInvocation::serial("paraview", self.case.root());
        match self.runner.run(&invocation) {
            Ok(outcome) if outcome.success => {}
            Ok(outcome) => {
                tracing::warn!(
                    diagnostics = %outcome.diagnostics(),
                    "mesh preview unavailable"
                );
            }
            Err(err) => tracing::warn!(error = %err, "mesh preview unavailable"),
        }
    }

    fn run_mesh_tool(&self, tool: &str, args: &[&str]) -> AfResult<()> {
        let mut invocation = ToolInvocation::serial(tool, self.case.root());
        for arg in args {
            invocation = invocation.arg(arg);
        }
        let outcome = self.runner.run(&invocation)?;
        self.check(tool, outcome)
    }

    fn check(&self, tool: &str, outcome: ExitOutcome) -> AfResult<()> {
        if outcome.success {
            Ok(())
        } else {
            Err(AfError::MeshGenerationFailed {
                tool: tool.to_string(),
                case: self.case.root().to_path_buf(),
                diagnostics: outcome.diagnostics(),
            })
        }
    }
}
