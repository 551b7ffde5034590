//! af-solve: end-to-end flow-solver orchestration.
//!
//! Runs the solver toolchain on a refined case under a fixed execution
//! plan: decompose, potential-flow initialize, main solve, reconstruct.
//! Every stage blocks on its external process and checks the exit status
//! before the next stage starts; no stage is retried. Partial artifacts
//! (partition directories, logs) are left on disk on failure; they are the
//! primary debugging aid for a failed run.

use std::fmt;

use af_case::{set_number_of_subdomains, CaseDirectory};
use af_core::{AfError, AfResult, ExecutionPlan, ExitOutcome, ToolInvocation, ToolRunner};

/// Solve progress for one case. `Failed` absorbs from any non-terminal
/// state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveState {
    Ready,
    Decomposed,
    Initialized,
    Solved,
    Reconstructed,
    Failed,
}

impl fmt::Display for SolveState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SolveState::Ready => "ready",
            SolveState::Decomposed => "decomposed",
            SolveState::Initialized => "initialized",
            SolveState::Solved => "solved",
            SolveState::Reconstructed => "reconstructed",
            SolveState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Sequences one solve invocation over one case.
pub struct SolverOrchestrator<'a> {
    case: &'a CaseDirectory,
    runner: &'a dyn ToolRunner,
    plan: &'a ExecutionPlan,
    state: SolveState,
}

impl<'a> SolverOrchestrator<'a> {
    pub fn new(
        case: &'a CaseDirectory,
        runner: &'a dyn ToolRunner,
        plan: &'a ExecutionPlan,
    ) -> Self {
        Self {
            case,
            runner,
            plan,
            state: SolveState::Ready,
        }
    }

    pub fn state(&self) -> SolveState {
        self.state
    }

    /// Run the full sequence to `Reconstructed`.
    pub fn run(&mut self) -> AfResult<()> {
        self.decompose()?;
        self.initialize();
        self.solve()?;
        self.reconstruct()
    }

    /// Split the domain into the plan's partition count.
    ///
    /// Serial plans need no decomposition; the state still advances.
    pub fn decompose(&mut self) -> AfResult<()> {
        self.expect(SolveState::Ready, "decompose")?;

        if !self.plan.is_parallel() {
            tracing::info!(case = %self.case.root().display(), "serial plan, decomposition skipped");
            self.state = SolveState::Decomposed;
            return Ok(());
        }

        if let Err(err) = set_number_of_subdomains(self.case, self.plan.effective) {
            return self.fail(err);
        }

        let invocation = ToolInvocation::serial("decomposePar", self.case.root()).arg("-force");
        match self.runner.run(&invocation) {
            Ok(outcome) if outcome.success => {
                self.state = SolveState::Decomposed;
                Ok(())
            }
            Ok(outcome) => self.fail(AfError::DecompositionFailed {
                case: self.case.root().to_path_buf(),
                diagnostics: outcome.diagnostics(),
            }),
            Err(err) => self.fail(err),
        }
    }

    /// Potential-flow pass to seed the main solver's starting field.
    ///
    /// Failure here is logged and swallowed: the pass is an optimization
    /// against divergence, not a correctness requirement. This is the one
    /// sub-step in the pipeline whose failure does not stop it. An
    /// out-of-order call is likewise logged and ignored since the step has
    /// no result to invalidate.
    pub fn initialize(&mut self) {
        if self.state != SolveState::Decomposed {
            tracing::warn!(state = %self.state, "initialize called out of order, ignored");
            return;
        }

        let outcome = self
            .runner
            .run(&self.solver_invocation("potentialFoam").arg("-noFunctionObjects"));
        match outcome {
            Ok(ExitOutcome { success: true, .. }) => {}
            Ok(outcome) => tracing::warn!(
                case = %self.case.root().display(),
                diagnostics = %outcome.diagnostics(),
                "potential-flow initialization failed, continuing with unseeded field"
            ),
            Err(err) => tracing::warn!(
                case = %self.case.root().display(),
                error = %err,
                "potential-flow initialization failed, continuing with unseeded field"
            ),
        }
        self.state = SolveState::Initialized;
    }

    /// Main iterative solve. The external tool's own convergence policy
    /// decides when it stops; only the exit status is checked here.
    pub fn solve(&mut self) -> AfResult<()> {
        self.expect(SolveState::Initialized, "solve")?;

        match self.runner.run(&self.solver_invocation("simpleFoam")) {
            Ok(outcome) if outcome.success => {
                self.state = SolveState::Solved;
                Ok(())
            }
            Ok(outcome) => self.fail(AfError::SolveFailed {
                case: self.case.root().to_path_buf(),
                diagnostics: outcome.diagnostics(),
            }),
            Err(err) => self.fail(err),
        }
    }

    /// Merge per-partition results into a single time-indexed tree.
    ///
    /// No-op for serial plans. On failure the partition directories stay on
    /// disk so the user can reconstruct manually.
    pub fn reconstruct(&mut self) -> AfResult<()> {
        self.expect(SolveState::Solved, "reconstruct")?;

        if !self.plan.is_parallel() {
            self.state = SolveState::Reconstructed;
            return Ok(());
        }

        let mesh = ToolInvocation::serial("reconstructParMesh", self.case.root())
            .arg("-mergeTol")
            .arg("1e-6")
            .arg("-constant");
        self.run_reconstruction_tool(mesh)?;

        let fields = ToolInvocation::serial("reconstructPar", self.case.root());
        self.run_reconstruction_tool(fields)?;

        self.state = SolveState::Reconstructed;
        tracing::info!(case = %self.case.root().display(), "results reconstructed");
        Ok(())
    }

    fn run_reconstruction_tool(&mut self, invocation: ToolInvocation) -> AfResult<()> {
        let tool = invocation.tool.clone();
        match self.runner.run(&invocation) {
            Ok(outcome) if outcome.success => Ok(()),
            Ok(outcome) => self.fail(AfError::ReconstructionFailed {
                tool,
                case: self.case.root().to_path_buf(),
                diagnostics: outcome.diagnostics(),
            }),
            Err(err) => self.fail(err),
        }
    }

    fn solver_invocation(&self, tool: &str) -> ToolInvocation {
        if self.plan.is_parallel() {
            ToolInvocation::parallel(tool, self.plan.effective, self.case.root())
        } else {
            ToolInvocation::serial(tool, self.case.root())
        }
    }

    fn expect(&self, state: SolveState, operation: &'static str) -> AfResult<()> {
        if self.state == state {
            Ok(())
        } else {
            Err(AfError::InvalidStageTransition {
                operation,
                state: self.state.to_string(),
            })
        }
    }

    fn fail<T>(&mut self, err: AfError) -> AfResult<T> {
        self.state = SolveState::Failed;
        Err(err)
    }
}
