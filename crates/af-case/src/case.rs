//! Case directory representation.
//!
//! A case is a directory tree with the fixed sub-structure the wrapped
//! toolchain expects: `0/` boundary conditions, `constant/triSurface/`
//! geometry, `system/` solver configuration, `processorN/` decomposition
//! output and numeric time directories for results. The core never alters
//! that layout and never deletes anything inside it.

use std::fs;
use std::path::{Path, PathBuf};

use af_core::{AfError, AfResult};

/// Sub-paths that must exist in every template and every valid case.
const REQUIRED_PATHS: &[&str] = &[
    "0",
    "constant/triSurface",
    "system/controlDict",
    "system/decomposeParDict",
];

/// Canonical geometry file name inside `constant/triSurface`.
pub const GEOMETRY_FILE: &str = "aircraft.stl";

/// A validated case root.
///
/// A case is either *templated* (required sub-paths present, no results) or
/// *populated* (at least one time-step result directory). Construction goes
/// through [`CaseDirectory::create`] or [`CaseDirectory::open`]; both
/// validate, so every holder of a `CaseDirectory` has a structurally sound
/// case. Nothing is created on access.
#[derive(Debug, Clone)]
pub struct CaseDirectory {
    root: PathBuf,
}

impl CaseDirectory {
    /// Instantiate a case from a template tree.
    ///
    /// All-or-nothing: the template is checked before any copy, the
    /// destination must be absent or an empty directory, and a failed copy
    /// removes the partial destination before the error propagates.
    pub fn create(template: &Path, destination: &Path) -> AfResult<Self> {
        if let Some(missing) = first_missing(template) {
            return Err(AfError::TemplateMissing {
                path: template.to_path_buf(),
                missing,
            });
        }

        if destination.is_file() || (destination.is_dir() && !is_empty_dir(destination)?) {
            return Err(AfError::AlreadyExists {
                path: destination.to_path_buf(),
            });
        }

        if let Err(err) = copy_tree(template, destination) {
            let _ = fs::remove_dir_all(destination);
            return Err(err);
        }

        tracing::info!(
            template = %template.display(),
            case = %destination.display(),
            "case created from template"
        );
        Self::open(destination)
    }

    /// Open and validate an existing case root.
    pub fn open(root: &Path) -> AfResult<Self> {
        let case = Self {
            root: root.to_path_buf(),
        };
        case.validate()?;
        Ok(case)
    }

    /// Check that all required sub-paths are present, naming the first
    /// missing one otherwise.
    pub fn validate(&self) -> AfResult<()> {
        match first_missing(&self.root) {
            None => Ok(()),
            Some(missing) => Err(AfError::InvalidCase {
                path: self.root.clone(),
                missing,
            }),
        }
    }

    /// True once at least one time-step result directory exists.
    ///
    /// Time directories are numeric-named; `0` holds initial conditions and
    /// does not count as a result.
    pub fn is_populated(&self) -> AfResult<bool> {
        Ok(self.time_dirs()?.iter().any(|(t, _)| *t > 0.0))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Geometry input path: `constant/triSurface/aircraft.stl`.
    pub fn geometry_path(&self) -> PathBuf {
        self.root.join("constant").join("triSurface").join(GEOMETRY_FILE)
    }

    pub fn system_dir(&self) -> PathBuf {
        self.root.join("system")
    }

    pub fn decompose_par_dict(&self) -> PathBuf {
        self.root.join("system").join("decomposeParDict")
    }

    /// Force log emitted by the main solver's forces function object.
    pub fn forces_log(&self) -> PathBuf {
        self.root
            .join("postProcessing")
            .join("forces")
            .join("0")
            .join("forces.dat")
    }

    /// Per-partition decomposition directories (`processor0`, `processor1`, ...).
    pub fn processor_dirs(&self) -> AfResult<Vec<PathBuf>> {
        let mut dirs = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().to_string();
            if entry.path().is_dir()
                && name.strip_prefix("processor").is_some_and(|n| n.parse::<u32>().is_ok())
            {
                dirs.push(entry.path());
            }
        }
        dirs.sort();
        Ok(dirs)
    }

    /// Numeric-named time directories, ascending.
    pub fn time_dirs(&self) -> AfResult<Vec<(f64, PathBuf)>> {
        let mut dirs = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.path().is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_string();
            if let Ok(t) = name.parse::<f64>() {
                dirs.push((t, entry.path()));
            }
        }
        dirs.sort_by(|a, b| a.0.total_cmp(&b.0));
        Ok(dirs)
    }
}

/// First required sub-path missing under `root`, if any.
fn first_missing(root: &Path) -> Option<String> {
    if !root.is_dir() {
        return Some(".".to_string());
    }
    REQUIRED_PATHS
        .iter()
        .find(|rel| !root.join(rel).exists())
        .map(|rel| rel.to_string())
}

fn is_empty_dir(path: &Path) -> AfResult<bool> {
    Ok(fs::read_dir(path)?.next().is_none())
}

fn copy_tree(src: &Path, dst: &Path) -> AfResult<()> {
    fs::create_dir_all(dst)?;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let target = dst.join(entry.file_name());
        if entry.path().is_dir() {
            copy_tree(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(name);
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn make_template(root: &Path) {
        fs::create_dir_all(root.join("0")).unwrap();
        fs::create_dir_all(root.join("constant/triSurface")).unwrap();
        fs::create_dir_all(root.join("system")).unwrap();
        fs::write(root.join("system/controlDict"), "application simpleFoam;\n").unwrap();
        fs::write(
            root.join("system/decomposeParDict"),
            "numberOfSubdomains 2;\n\nmethod scotch;\n",
        )
        .unwrap();
        fs::write(root.join("0/U"), "internalField uniform (18 0 0);\n").unwrap();
    }

    #[test]
    fn create_then_validate_reports_unpopulated() {
        let base = scratch("af_case_create");
        let template = base.join("template");
        make_template(&template);

        let case = CaseDirectory::create(&template, &base.join("run")).unwrap();
        case.validate().unwrap();
        assert!(!case.is_populated().unwrap());
        assert!(case.decompose_par_dict().is_file());
    }

    #[test]
    fn create_into_empty_dir_is_allowed() {
        let base = scratch("af_case_empty_dest");
        let template = base.join("template");
        make_template(&template);
        let dest = base.join("run");
        fs::create_dir_all(&dest).unwrap();

        CaseDirectory::create(&template, &dest).unwrap();
    }

    #[test]
    fn create_refuses_nonempty_destination() {
        let base = scratch("af_case_nonempty");
        let template = base.join("template");
        make_template(&template);
        let dest = base.join("run");
        fs::create_dir_all(&dest).unwrap();
        fs::write(dest.join("stale"), "x").unwrap();

        let err = CaseDirectory::create(&template, &dest).unwrap_err();
        assert!(matches!(err, AfError::AlreadyExists { .. }));
        // The stale content survives: creation is never destructive.
        assert!(dest.join("stale").is_file());
    }

    #[test]
    fn create_rejects_incomplete_template() {
        let base = scratch("af_case_bad_template");
        let template = base.join("template");
        make_template(&template);
        fs::remove_file(template.join("system/controlDict")).unwrap();

        let err = CaseDirectory::create(&template, &base.join("run")).unwrap_err();
        match err {
            AfError::TemplateMissing { missing, .. } => {
                assert_eq!(missing, "system/controlDict")
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!base.join("run").exists());
    }

    #[test]
    fn populated_once_a_result_time_dir_exists() {
        let base = scratch("af_case_populated");
        let template = base.join("template");
        make_template(&template);
        let case = CaseDirectory::create(&template, &base.join("run")).unwrap();

        assert!(!case.is_populated().unwrap());
        fs::create_dir_all(case.root().join("250")).unwrap();
        assert!(case.is_populated().unwrap());
    }

    #[test]
    fn processor_dirs_are_sorted_and_filtered() {
        let base = scratch("af_case_procs");
        let template = base.join("template");
        make_template(&template);
        let case = CaseDirectory::create(&template, &base.join("run")).unwrap();

        fs::create_dir_all(case.root().join("processor1")).unwrap();
        fs::create_dir_all(case.root().join("processor0")).unwrap();
        fs::create_dir_all(case.root().join("processorX")).unwrap();

        let dirs = case.processor_dirs().unwrap();
        assert_eq!(dirs.len(), 2);
        assert!(dirs[0].ends_with("processor0"));
        assert!(dirs[1].ends_with("processor1"));
    }
}
