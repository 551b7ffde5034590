//! End-to-end pipeline and sweep tests against a scripted tool runner.

use std::fs;
use std::path::{Path, PathBuf};

use af_app::{run_case, run_sweep, write_summary, CaseRequest, CopyStager, SweepRequest, WorkflowConfig};
use af_core::{AfResult, ExitOutcome, ToolInvocation, ToolRunner};

/// Scripted toolchain: succeeds everything, and on `simpleFoam` writes a
/// force log plus a result time directory the way the real solver would.
/// Cases whose path contains `fail_marker` get a failing main solve.
struct SolverSim {
    records: usize,
    fail_marker: Option<&'static str>,
}

impl SolverSim {
    fn write_forces(&self, case_dir: &Path) {
        let forces_dir = case_dir.join("postProcessing/forces/0");
        fs::create_dir_all(&forces_dir).unwrap();
        let mut log = String::from("# Time forces(pressure viscous porous)\n");
        for i in 1..=self.records {
            let v = i as f64;
            log.push_str(&format!(
                "{i} (({v} 0 {lift}) (0 0 0) (0 0 0))\n",
                lift = 2.0 * v
            ));
        }
        fs::write(forces_dir.join("forces.dat"), log).unwrap();
        fs::create_dir_all(case_dir.join("500")).unwrap();
    }
}

impl ToolRunner for SolverSim {
    fn run(&self, invocation: &ToolInvocation) -> AfResult<ExitOutcome> {
        if invocation.tool == "simpleFoam" {
            let case_str = invocation.case_dir.display().to_string();
            if self.fail_marker.is_some_and(|m| case_str.contains(m)) {
                return Ok(ExitOutcome {
                    success: false,
                    code: Some(1),
                    diagnostic_tail: vec!["--> FOAM FATAL ERROR: divergence detected".to_string()],
                });
            }
            self.write_forces(&invocation.case_dir);
        }
        Ok(ExitOutcome {
            success: true,
            code: Some(0),
            diagnostic_tail: Vec::new(),
        })
    }
}

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
        "numberOfSubdomains 2;\nmethod scotch;\n",
    )
    .unwrap();
}

fn make_geometry(base: &Path) -> PathBuf {
    let path = base.join("benchmark.stl");
    fs::write(&path, "solid aircraft\nendsolid aircraft\n").unwrap();
    path
}

#[test]
fn single_case_pipeline_produces_summary() {
    let base = scratch("af_app_single_case");
    let template = base.join("template");
    make_template(&template);
    let geometry = make_geometry(&base);

    let runner = SolverSim {
        records: 20,
        fail_marker: None,
    };
    let summary = run_case(
        &runner,
        &CopyStager,
        &CaseRequest {
            case_root: base.join("run"),
            template: &template,
            geometry: &geometry,
            aoa_deg: 0.0,
            cores: Some(1),
            detected_cores: Some(4),
            window: 15,
        },
    )
    .unwrap();

    assert_eq!(summary.samples, 15);
    assert_eq!(summary.skipped_lines, 0);
    // Drag is 1..=20 with a 15-record tail: mean 13; lift is doubled.
    assert!((summary.drag - 13.0).abs() < 1e-12);
    assert!((summary.lift - 26.0).abs() < 1e-12);
    assert!((summary.wind.drag - 13.0).abs() < 1e-12);

    let case = af_case::CaseDirectory::open(&base.join("run")).unwrap();
    assert!(case.is_populated().unwrap());
}

#[test]
fn short_force_history_falls_back_to_available_records() {
    let base = scratch("af_app_short_series");
    let template = base.join("template");
    make_template(&template);
    let geometry = make_geometry(&base);

    let runner = SolverSim {
        records: 5,
        fail_marker: None,
    };
    let summary = run_case(
        &runner,
        &CopyStager,
        &CaseRequest {
            case_root: base.join("run"),
            template: &template,
            geometry: &geometry,
            aoa_deg: 2.0,
            cores: Some(1),
            detected_cores: Some(4),
            window: 15,
        },
    )
    .unwrap();

    assert_eq!(summary.samples, 5);
    assert!((summary.drag - 3.0).abs() < 1e-12);
}

#[test]
fn sweep_keeps_parameter_order_and_degrades_failures() {
    let base = scratch("af_app_sweep");
    let template = base.join("template");
    make_template(&template);
    let geometry = make_geometry(&base);

    let config = WorkflowConfig {
        template: template.clone(),
        geometry,
        cores: Some(1),
        window: 15,
        angles_deg: vec![-6.0, 0.0, 6.0],
    };
    let runner = SolverSim {
        records: 20,
        fail_marker: Some("aoa_0"),
    };

    let entries = run_sweep(
        &runner,
        &CopyStager,
        &SweepRequest {
            config: &config,
            sweep_root: &base.join("sweep"),
            detected_cores: Some(4),
        },
    );

    assert_eq!(entries.len(), 3);
    let angles: Vec<f64> = entries.iter().map(|e| e.aoa_deg).collect();
    assert_eq!(angles, vec![-6.0, 0.0, 6.0]);

    assert!(entries[0].succeeded());
    assert!(!entries[1].succeeded());
    assert!(entries[2].succeeded());
    assert!(entries[1]
        .error
        .as_deref()
        .unwrap()
        .contains("divergence detected"));
}

#[test]
fn sweep_summary_round_trips_as_json() {
    let base = scratch("af_app_summary_json");
    let template = base.join("template");
    make_template(&template);
    let geometry = make_geometry(&base);

    let config = WorkflowConfig {
        template,
        geometry,
        cores: Some(1),
        window: 15,
        angles_deg: vec![-4.0, 4.0],
    };
    let runner = SolverSim {
        records: 20,
        fail_marker: None,
    };
    let entries = run_sweep(
        &runner,
        &CopyStager,
        &SweepRequest {
            config: &config,
            sweep_root: &base.join("sweep"),
            detected_cores: Some(2),
        },
    );

    let summary_path = base.join("sweep_summary.json");
    write_summary(&summary_path, config.window, &entries).unwrap();

    let value: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&summary_path).unwrap()).unwrap();
    assert_eq!(value["window"], 15);
    assert_eq!(value["entries"].as_array().unwrap().len(), 2);
    assert_eq!(value["entries"][0]["aoa_deg"], -4.0);
    assert!(value["created"].as_str().unwrap().contains('T'));
}
