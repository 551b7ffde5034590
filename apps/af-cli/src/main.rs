use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::{Path, PathBuf};

use af_app::{
    load_config, run_case, run_sweep, write_summary, AppResult, CaseRequest, CopyStager,
    SweepRequest,
};
use af_core::{detect_cores, plan, PartitionPolicy, ProcessRunner};

#[derive(Parser)]
#[command(name = "af-cli")]
#[command(about = "aerofoam CLI - CFD case orchestration for aircraft geometries", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one case end to end: template, mesh, solve, reconstruct, forces
    Run {
        /// Destination case directory (must be absent or empty)
        case_root: PathBuf,
        /// Template case tree
        #[arg(long)]
        template: PathBuf,
        /// Surface-mesh geometry file
        #[arg(long)]
        geometry: PathBuf,
        /// Angle of attack in degrees
        #[arg(long, default_value_t = 0.0)]
        aoa: f64,
        /// Partition count (defaults to all detected cores)
        #[arg(long)]
        cores: Option<usize>,
        /// Trailing-window length for force averaging
        #[arg(long, default_value_t = 15)]
        window: usize,
    },
    /// Run an angle-of-attack sweep from a workflow YAML
    Sweep {
        /// Path to the workflow YAML file
        config_path: PathBuf,
        /// Directory receiving one case per angle plus the JSON summary
        #[arg(long, default_value = "sweep")]
        out: PathBuf,
    },
    /// Parse a force log and print the trailing-window average
    Forces {
        /// Path to the force history file
        log_path: PathBuf,
        /// Trailing-window length
        #[arg(long, default_value_t = 15)]
        window: usize,
        /// Output CSV file path (optional, defaults to stdout table)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show the execution plan for this host
    Plan {
        /// Requested partition count
        #[arg(long)]
        cores: Option<usize>,
        /// Fail instead of clamping when the request exceeds availability
        #[arg(long)]
        strict: bool,
    },
}

fn main() -> AppResult<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            case_root,
            template,
            geometry,
            aoa,
            cores,
            window,
        } => cmd_run(case_root, &template, &geometry, aoa, cores, window),
        Commands::Sweep { config_path, out } => cmd_sweep(&config_path, &out),
        Commands::Forces {
            log_path,
            window,
            output,
        } => cmd_forces(&log_path, window, output.as_deref()),
        Commands::Plan { cores, strict } => cmd_plan(cores, strict),
    }
}

fn cmd_run(
    case_root: PathBuf,
    template: &Path,
    geometry: &Path,
    aoa: f64,
    cores: Option<usize>,
    window: usize,
) -> AppResult<()> {
    let runner = ProcessRunner::default();
    let summary = run_case(
        &runner,
        &CopyStager,
        &CaseRequest {
            case_root,
            template,
            geometry,
            aoa_deg: aoa,
            cores,
            detected_cores: None,
            window,
        },
    )?;

    println!("Case complete: {}", summary.case);
    println!(
        "  mean over last {} records (drag {:.4} N, lift {:.4} N)",
        summary.samples, summary.drag, summary.lift
    );
    println!(
        "  wind axis: drag {:.4} N, lift {:.4} N",
        summary.wind.drag, summary.wind.lift
    );
    if summary.skipped_lines > 0 {
        println!("  {} malformed force-log lines skipped", summary.skipped_lines);
    }
    Ok(())
}

fn cmd_sweep(config_path: &Path, out: &Path) -> AppResult<()> {
    let config = load_config(config_path)?;
    std::fs::create_dir_all(out)?;

    let runner = ProcessRunner::default();
    let entries = run_sweep(
        &runner,
        &CopyStager,
        &SweepRequest {
            config: &config,
            sweep_root: out,
            detected_cores: None,
        },
    );

    let summary_path = out.join("sweep_summary.json");
    write_summary(&summary_path, config.window, &entries)?;

    println!("{:>10} {:>12} {:>12} {:>10}", "AOA (deg)", "Lift (N)", "Drag (N)", "L/D");
    for entry in &entries {
        match &entry.summary {
            Some(summary) => {
                let ld = if summary.wind.drag != 0.0 {
                    summary.wind.lift / summary.wind.drag
                } else {
                    0.0
                };
                println!(
                    "{:>10.1} {:>12.3} {:>12.3} {:>10.2}",
                    entry.aoa_deg, summary.wind.lift, summary.wind.drag, ld
                );
            }
            None => println!("{:>10.1} {:>12} {:>12} {:>10}", entry.aoa_deg, "failed", "-", "-"),
        }
    }
    println!("Summary written to {}", summary_path.display());
    Ok(())
}

fn cmd_forces(log_path: &Path, window: usize, output: Option<&Path>) -> AppResult<()> {
    let series = af_forces::parse(log_path)?;
    println!(
        "{} records, {} malformed lines skipped",
        series.len(),
        series.skipped_lines
    );

    if let Some(path) = output {
        let mut file = std::fs::File::create(path)?;
        writeln!(file, "time,drag,lift")?;
        for record in &series.records {
            writeln!(file, "{},{},{}", record.time, record.drag(), record.lift())?;
        }
        println!("Series exported to {}", path.display());
    }

    if series.is_empty() {
        println!("no records to average");
        return Ok(());
    }
    let window = window.min(series.len());
    match series.tail_average(window) {
        Ok(average) => println!(
            "tail mean over {} records: drag {:.4} N, lift {:.4} N",
            average.samples, average.drag, average.lift
        ),
        Err(err) => println!("no average available: {err}"),
    }
    Ok(())
}

fn cmd_plan(cores: Option<usize>, strict: bool) -> AppResult<()> {
    let policy = if strict {
        PartitionPolicy::Strict
    } else {
        PartitionPolicy::Clamp
    };
    let exec_plan = plan(cores, detect_cores(), policy)?;

    println!("detected cores:      {}", exec_plan.detected);
    println!(
        "requested partitions: {}",
        exec_plan
            .requested
            .map_or("all".to_string(), |n| n.to_string())
    );
    println!("effective partitions: {}", exec_plan.effective);
    if exec_plan.clamped {
        println!("request clamped to detected core count");
    }
    Ok(())
}
