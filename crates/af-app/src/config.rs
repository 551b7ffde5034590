//! Workflow configuration schema.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// One YAML workflow document: template, geometry, resources and the sweep
/// parameter list.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WorkflowConfig {
    /// Template case tree to instantiate per run.
    pub template: PathBuf,
    /// Surface-mesh input handed to the geometry collaborator.
    pub geometry: PathBuf,
    /// Requested partition count; unset means all detected cores.
    #[serde(default)]
    pub cores: Option<usize>,
    /// Trailing-window length for converged-force averaging.
    #[serde(default = "default_window")]
    pub window: usize,
    /// Angles of attack to sweep, in degrees.
    #[serde(default)]
    pub angles_deg: Vec<f64>,
}

fn default_window() -> usize {
    15
}

/// Load a workflow config from a YAML file.
pub fn load_config(path: &Path) -> AppResult<WorkflowConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| AppError::ConfigRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    let config: WorkflowConfig = serde_yaml::from_str(&content)
        .map_err(|e| AppError::Config(format!("failed to parse workflow YAML: {e}")))?;

    if config.window == 0 {
        return Err(AppError::Config("window must be at least 1".to_string()));
    }

    Ok(config)
}
