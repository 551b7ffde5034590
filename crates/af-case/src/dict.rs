//! Minimal OpenFOAM dictionary edits.
//!
//! The orchestrator only ever rewrites one scalar entry before decomposing;
//! full dictionary parsing stays with the external toolchain.

use std::fs;

use af_core::{AfError, AfResult};

use crate::case::CaseDirectory;

/// Rewrite the `numberOfSubdomains` entry of `system/decomposeParDict`.
///
/// Fails with `InvalidCase` if the entry is absent; the template is expected
/// to carry it.
pub fn set_number_of_subdomains(case: &CaseDirectory, n: usize) -> AfResult<()> {
    let path = case.decompose_par_dict();
    let content = fs::read_to_string(&path)?;

    let mut replaced = false;
    let rewritten: Vec<String> = content
        .lines()
        .map(|line| {
            if line.trim_start().starts_with("numberOfSubdomains") {
                replaced = true;
                format!("numberOfSubdomains {n};")
            } else {
                line.to_string()
            }
        })
        .collect();

    if !replaced {
        return Err(AfError::InvalidCase {
            path: case.root().to_path_buf(),
            missing: "numberOfSubdomains entry in system/decomposeParDict".to_string(),
        });
    }

    fs::write(&path, rewritten.join("\n") + "\n")?;
    tracing::debug!(n, case = %case.root().display(), "decomposeParDict updated");
    Ok(())
}
