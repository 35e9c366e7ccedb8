//! sqlite-pg-verify CLI - verify a SQLite to PostgreSQL migration.

use clap::{Parser, Subcommand};
use sqlite_pg_verify::{exit_codes, Config, VerifyEngine, VerifyError};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, Level};

#[derive(Parser)]
#[command(name = "sqlite-pg-verify")]
#[command(about = "Verify that a PostgreSQL database matches a migrated SQLite database")]
#[command(version)]
struct Cli {
    /// Path to YAML configuration file; falls back to DATABASE_URL and
    /// SQLITE_PATH environment variables when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output JSON result to stdout
    #[arg(long)]
    output_json: bool,

    /// Log format: text or json
    #[arg(long, default_value = "text")]
    log_format: String,

    /// Log verbosity: debug, info, warn, error
    #[arg(long, default_value = "info")]
    verbosity: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare schemas and row counts, report PASS/WARNING/FAIL
    Verify {
        /// Table whose mismatches only warn instead of failing (repeatable)
        #[arg(long = "allow-table")]
        allow_tables: Vec<String>,
    },

    /// Test connectivity to both databases
    HealthCheck,

    /// List tables and column counts from both databases
    Tables,
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("{}", e.format_detailed());
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run() -> Result<u8, VerifyError> {
    let cli = Cli::parse();

    setup_logging(&cli.verbosity, &cli.log_format)
        .map_err(VerifyError::Config)?;

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Verify { allow_tables } => {
            let mut config = config;
            config.verify.allow_tables.extend(allow_tables);

            let engine = VerifyEngine::connect(&config).await?;
            let report = engine.run().await?;
            engine.close().await;

            print!("{}", report.render_text());
            if cli.output_json {
                println!("{}", report.to_json()?);
            }

            Ok(report.verdict.exit_code())
        }

        Commands::HealthCheck => {
            let engine = VerifyEngine::connect(&config).await?;
            let result = engine.health_check().await;
            engine.close().await;

            if cli.output_json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("Health Check Results:");
                println!(
                    "  Source (SQLite): {} ({}ms)",
                    if result.source_connected { "OK" } else { "FAILED" },
                    result.source_latency_ms
                );
                if let Some(ref err) = result.source_error {
                    println!("    Error: {}", err);
                }
                println!(
                    "  Target (PostgreSQL): {} ({}ms)",
                    if result.target_connected { "OK" } else { "FAILED" },
                    result.target_latency_ms
                );
                if let Some(ref err) = result.target_error {
                    println!("    Error: {}", err);
                }
                println!(
                    "\n  Overall: {}",
                    if result.healthy { "HEALTHY" } else { "UNHEALTHY" }
                );
            }

            if result.healthy {
                Ok(exit_codes::PASS)
            } else {
                Ok(exit_codes::CONNECTION_ERROR)
            }
        }

        Commands::Tables => {
            let engine = VerifyEngine::connect(&config).await?;
            let source = engine.source_tables().await?;
            let target = engine.target_tables().await?;
            engine.close().await;

            if cli.output_json {
                let listing = serde_json::json!({ "source": source, "target": target });
                println!("{}", serde_json::to_string_pretty(&listing)?);
            } else {
                println!("Source (SQLite): {} tables", source.len());
                for table in &source {
                    println!("  {} ({} columns)", table.name, table.columns.len());
                }
                println!("\nTarget (PostgreSQL): {} tables", target.len());
                for table in &target {
                    println!("  {} ({} columns)", table.name, table.columns.len());
                }
            }

            Ok(exit_codes::PASS)
        }
    }
}

/// Load configuration from an explicit file, a `verify.yaml` in the working
/// directory, or the environment, in that order.
fn load_config(path: Option<&std::path::Path>) -> Result<Config, VerifyError> {
    if let Some(path) = path {
        let config = Config::load(path)?;
        info!("Loaded configuration from {:?}", path);
        return Ok(config);
    }

    let default_path = std::path::Path::new("verify.yaml");
    if default_path.exists() {
        let config = Config::load(default_path)?;
        info!("Loaded configuration from {:?}", default_path);
        return Ok(config);
    }

    info!("No configuration file; reading DATABASE_URL and SQLITE_PATH from environment");
    Config::from_env()
}

fn setup_logging(verbosity: &str, format: &str) -> Result<(), String> {
    let level = match verbosity.to_lowercase().as_str() {
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr);

    if format == "json" {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    Ok(())
}
