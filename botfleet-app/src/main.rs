use anyhow::{bail, Context, Result};
use botfleet_app::bootstrap::Fleet;
use botfleet_app::dry_run::DryRunAutomation;
use botfleet_app::status;
use botfleet_core::{Automation, Profile};
use botfleet_infra::FleetConfig;
use chrono::Utc;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG: &str = "botfleet.yaml";
const STATUS_INTERVAL: Duration = Duration::from_secs(60);

enum Command {
    Run,
    Check,
    Status { json: bool },
}

fn usage() -> &'static str {
    "usage: botfleet [run|check|status [--json]] [--config <path>]"
}

fn parse_args(args: &[String]) -> Result<(Command, PathBuf)> {
    let mut command = Command::Run;
    let mut config = PathBuf::from(DEFAULT_CONFIG);
    let mut json = false;
    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "run" => command = Command::Run,
            "check" => command = Command::Check,
            "status" => command = Command::Status { json: false },
            "--json" => json = true,
            "--config" | "-c" => {
                let Some(path) = iter.next() else {
                    bail!("--config needs a path\n{}", usage());
                };
                config = PathBuf::from(path);
            }
            "--help" | "-h" => {
                println!("{}", usage());
                std::process::exit(0);
            }
            other => bail!("unknown argument {}\n{}", other, usage()),
        }
    }
    if let Command::Status { .. } = command {
        command = Command::Status { json };
    }
    Ok((command, config))
}

fn dry_run_client(profile: &Profile, serial: &str) -> Box<dyn Automation> {
    info!("Profile {} ({}) using dry-run client for {}", profile.id, profile.name, serial);
    Box::new(DryRunAutomation::new(serial))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = std::env::args().collect();
    let (command, config_path) = parse_args(&args)?;
    let config = FleetConfig::load(&config_path)
        .with_context(|| format!("Failed to load {}", config_path.display()))?;

    match command {
        Command::Check => {
            println!(
                "{}: {} profiles, tick {} ms, database {}",
                config_path.display(),
                config.profiles.len(),
                config.scheduler.tick_interval_ms,
                config.database_path.display()
            );
            Ok(())
        }
        Command::Status { json } => {
            let fleet = Fleet::from_config(&config)?;
            fleet.prepare_enabled(&dry_run_client)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&status::render_json(&fleet.manager, Utc::now()))?);
            } else {
                print!("{}", status::render(&fleet.manager, Utc::now()));
            }
            Ok(())
        }
        Command::Run => run(config).await,
    }
}

async fn run(config: FleetConfig) -> Result<()> {
    let fleet = Fleet::from_config(&config)?;
    if fleet.activate_enabled(&dry_run_client) == 0 {
        bail!("no profile could be activated");
    }

    let mut ticker = tokio::time::interval(STATUS_INTERVAL);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                info!("Fleet status\n{}", status::render(&fleet.manager, Utc::now()));
            }
            signal = tokio::signal::ctrl_c() => {
                signal.context("Failed to listen for Ctrl-C")?;
                info!("Shutdown requested");
                break;
            }
        }
    }

    // Joining the profile threads blocks.
    tokio::task::spawn_blocking(move || fleet.shutdown())
        .await
        .context("Shutdown task failed")?;
    info!("All profiles stopped");
    Ok(())
}
