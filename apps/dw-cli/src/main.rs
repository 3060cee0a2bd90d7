use clap::{Parser, Subcommand};
use dw_decom::{
    DecomError, DecomResult, ProblemDefinition, ResultTable, RunOutcome, RunSummary, WaveSpeed,
    load_config_file, run_batch, validate_config,
};
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "dw-cli")]
#[command(about = "Decompression wave speed along an isentrope", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a configuration file without running it
    Validate {
        /// Path to the YAML or JSON configuration
        config: PathBuf,
    },
    /// Run one configuration and write the result table
    Run {
        /// Path to the YAML or JSON configuration
        config: PathBuf,
        /// Output CSV file (defaults to decom_result.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Print the summary and result table as JSON instead of writing CSV
        #[arg(long)]
        json: bool,
    },
    /// Run several configurations in parallel
    Batch {
        /// Configuration files
        #[arg(required = true)]
        configs: Vec<PathBuf>,
        /// Directory for the CSV files, one per configuration
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },
    /// List the equation of state families and backend options
    Backends,
}

fn main() -> DecomResult<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { config } => cmd_validate(&config),
        Commands::Run {
            config,
            output,
            json,
        } => cmd_run(&config, output.as_deref(), json),
        Commands::Batch { configs, out_dir } => cmd_batch(&configs, &out_dir),
        Commands::Backends => {
            cmd_backends();
            Ok(())
        }
    }
}

fn cmd_validate(config_path: &Path) -> DecomResult<()> {
    println!("Validating configuration: {}", config_path.display());
    let config = load_config_file(config_path)?;
    let validation = validate_config(&config);
    if validation.ok {
        println!("✓ Configuration is valid");
        return Ok(());
    }
    println!("✗ {} problem(s):", validation.diagnostics.len());
    for diagnostic in &validation.diagnostics {
        println!("  {diagnostic}");
    }
    Err(DecomError::Input)
}

fn cmd_run(config_path: &Path, output: Option<&Path>, json: bool) -> DecomResult<()> {
    let config = load_config_file(config_path)?;
    let problem = ProblemDefinition::from_config(&config)?;

    let started = Instant::now();
    let mut ws = WaveSpeed::new(problem)?;
    ws.run()?;
    let elapsed = started.elapsed();

    let (Some(summary), Some(table)) = (ws.summary(), ws.result_table()) else {
        return Err(DecomError::Backend {
            message: "run did not complete".into(),
        });
    };

    if json {
        println!("{}", json_report(&summary, &table)?);
        return Ok(());
    }

    println!("{summary}");
    println!("Elapsed:      {:.3} s", elapsed.as_secs_f64());
    let written = table.write_csv(output)?;
    println!("✓ Results written to {}", written.display());
    Ok(())
}

/// Summary and result columns as one JSON document.
fn json_report(summary: &RunSummary, table: &ResultTable) -> DecomResult<String> {
    let report = serde_json::json!({ "summary": summary, "results": table });
    Ok(serde_json::to_string_pretty(&report)?)
}

fn cmd_batch(configs: &[PathBuf], out_dir: &Path) -> DecomResult<()> {
    let mut problems = Vec::with_capacity(configs.len());
    for path in configs {
        let config = load_config_file(path)?;
        problems.push(ProblemDefinition::from_config(&config)?);
    }

    std::fs::create_dir_all(out_dir)?;
    tracing::info!(runs = problems.len(), out_dir = %out_dir.display(), "batch loaded");
    let started = Instant::now();
    let outcomes = run_batch(problems);
    println!(
        "Completed {} run(s) in {:.3} s",
        outcomes.len(),
        started.elapsed().as_secs_f64()
    );

    let mut failures = 0usize;
    for (path, outcome) in configs.iter().zip(outcomes) {
        match outcome {
            Ok(outcome) => report_outcome(path, &outcome, out_dir)?,
            Err(e) => {
                failures += 1;
                println!("✗ {}: {e}", path.display());
            }
        }
    }

    if failures > 0 {
        return Err(DecomError::Backend {
            message: format!("{failures} of {} run(s) failed", configs.len()),
        });
    }
    Ok(())
}

fn report_outcome(config_path: &Path, outcome: &RunOutcome, out_dir: &Path) -> DecomResult<()> {
    let stem = config_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "run".to_string());
    let csv_path = out_dir.join(format!("{stem}.csv"));
    outcome.table.write_csv(Some(&csv_path))?;

    let summary = &outcome.summary;
    print!(
        "✓ {}: {} points, {}",
        config_path.display(),
        summary.points,
        summary.termination
    );
    if let (Some(p), Some(w)) = (summary.final_pressure, summary.final_wave_speed) {
        print!(", final P = {p:.0} Pa, W = {w:.3} m/s");
    }
    println!(" -> {}", csv_path.display());
    Ok(())
}

fn cmd_backends() {
    println!("Equation of state families (eos):");
    for eos in dw_fluids::EosFamily::ALL {
        println!("  {}", eos.key());
    }
    println!("Backend options (backend_option / refprop_option):");
    for option in dw_fluids::BackendOption::ALL {
        println!("  {}", option.key());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dw_decom::InputConfig;
    use dw_fluids::EosFamily;

    #[test]
    fn json_report_holds_summary_and_columns() {
        let input = InputConfig::new(300.0, 20.0e5, EosFamily::Ideal, "N2");
        let mut ws = WaveSpeed::new(ProblemDefinition::from_input(&input).unwrap()).unwrap();
        ws.run().unwrap();

        let text = json_report(&ws.summary().unwrap(), &ws.result_table().unwrap()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["summary"]["fluid"], "N2");
        assert_eq!(value["summary"]["eos"], "IDEAL");
        let points = value["summary"]["points"].as_u64().unwrap() as usize;
        assert_eq!(
            value["results"]["pressure"].as_array().unwrap().len(),
            points
        );
        assert_eq!(value["results"]["pressure"][0], 20.0e5);
    }
}
