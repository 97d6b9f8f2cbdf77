use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use facility_conformance::config::DEFAULT_CONFIG_FILE;
use facility_conformance::demo::ConformanceApiClient;
use facility_conformance::error::log_fixture_error;
use facility_conformance::{
    init_logging, ConformanceReport, ConformanceRunner, FixtureDocument, HarnessConfig,
    ServiceClient,
};
use tracing::Level;

/// Exit status for failures that abort the whole run. Failure counts stop at
/// `MAX_FAILURE_STATUS` so the two never collide.
const FATAL_EXIT: u8 = u8::MAX;

#[derive(Parser, Debug)]
#[command(
    name = "conformance",
    about = "Replay Facility conformance fixtures against the demo client",
    after_help = "Exit status: number of failed cases (capped at 254); 255 when the run aborts."
)]
struct Cli {
    /// Only log warnings and errors
    #[arg(long, short, global = true)]
    quiet: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run fixture cases and report pass/fail counts
    Run {
        #[arg(long)]
        fixtures: Option<PathBuf>,
        /// Harness config file (defaults to ./conformance.json when present)
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long)]
        filter: Option<String>,
        #[arg(long)]
        max_diagnostics: Option<usize>,
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
        /// Also write the JSON report to this path
        #[arg(long)]
        report_out: Option<PathBuf>,
    },
    /// List fixture cases as `name -> method`
    List {
        #[arg(long)]
        fixtures: Option<PathBuf>,
    },
    /// Print the demo client's methods and parameters
    Methods,
    /// Print the demo client's registered type names
    Types,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(if cli.quiet { Level::WARN } else { Level::INFO });
    match run(cli.command) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("conformance error: {err:#}");
            ExitCode::from(FATAL_EXIT)
        }
    }
}

fn run(command: Commands) -> Result<ExitCode> {
    match command {
        Commands::Run {
            fixtures,
            config,
            filter,
            max_diagnostics,
            format,
            report_out,
        } => {
            let mut config = load_config(config);
            if let Some(path) = fixtures {
                config.fixtures_path = path;
            }
            if filter.is_some() {
                config.filter = filter;
            }
            if let Some(limit) = max_diagnostics {
                config.max_diagnostics = limit;
            }
            run_fixtures(&config, format, report_out)
        }
        Commands::List { fixtures } => {
            let path = fixtures.unwrap_or_else(|| HarnessConfig::default().fixtures_path);
            run_list(path)
        }
        Commands::Methods => run_methods(),
        Commands::Types => run_types(),
    }
}

fn load_config(path: Option<PathBuf>) -> HarnessConfig {
    match path {
        Some(path) => HarnessConfig::load_from_file(path),
        None if PathBuf::from(DEFAULT_CONFIG_FILE).exists() => HarnessConfig::load(),
        None => HarnessConfig::default(),
    }
}

fn demo_client() -> Result<ConformanceApiClient> {
    ConformanceApiClient::new().context("building demo client")
}

fn run_fixtures(
    config: &HarnessConfig,
    format: Format,
    report_out: Option<PathBuf>,
) -> Result<ExitCode> {
    let client = demo_client()?;
    let runner = ConformanceRunner::new(&client, config);
    let report = runner
        .run_path(&config.fixtures_path)
        .inspect_err(|err| log_fixture_error(err, "conformance run"))
        .with_context(|| format!("loading fixtures {}", config.fixtures_path.display()))?;

    emit_report(&report, format)?;
    if let Some(path) = report_out {
        let json = serde_json::to_string_pretty(&report)?;
        fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
    }
    Ok(report.exit_code())
}

fn emit_report(report: &ConformanceReport, format: Format) -> Result<()> {
    match format {
        Format::Text => {
            for line in report.summary_lines() {
                println!("{line}");
            }
        }
        Format::Json => println!("{}", serde_json::to_string_pretty(report)?),
    }
    Ok(())
}

fn run_list(path: PathBuf) -> Result<ExitCode> {
    let document = FixtureDocument::load(&path)
        .with_context(|| format!("loading fixtures {}", path.display()))?;
    for case in &document.tests {
        println!("{} -> {}", case.name, case.method);
    }
    Ok(ExitCode::SUCCESS)
}

fn run_methods() -> Result<ExitCode> {
    let client = demo_client()?;
    for method in client.methods() {
        let parameters: Vec<_> = method
            .parameters
            .iter()
            .map(|slot| {
                let default = if slot.has_default { " = default" } else { "" };
                format!("{}: {}{default}", slot.name, slot.descriptor)
            })
            .collect();
        println!("{}({})", method.name, parameters.join(", "));
    }
    Ok(ExitCode::SUCCESS)
}

fn run_types() -> Result<ExitCode> {
    let client = demo_client()?;
    for name in client.types().names() {
        println!("{name}");
    }
    Ok(ExitCode::SUCCESS)
}
