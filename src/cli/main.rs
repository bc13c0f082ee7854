use anyhow::Context;
use clap::{Parser, Subcommand};
use predictive_maintenance::{
    config::Config,
    ml::ModelArtifacts,
    models::MachineType,
    pipeline::{write_csv, PredictionService},
    translation,
};
use reqwest::Client;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "pm-cli")]
#[command(about = "Predictive Maintenance CLI", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:5000", env = "PM_ENDPOINT")]
    endpoint: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check server health
    Health,

    /// Score one machine on a running server
    Predict {
        /// Machine type: L, M or H
        #[arg(short = 't', long = "type", default_value = "L")]
        machine_type: MachineType,

        /// Air temperature [K]
        #[arg(long)]
        air_temp: f64,

        /// Process temperature [K]
        #[arg(long)]
        proc_temp: f64,

        /// Rotational speed [rpm]
        #[arg(long)]
        speed: f64,

        /// Torque [Nm]
        #[arg(long)]
        torque: f64,

        /// Tool wear [min]
        #[arg(long)]
        tool_wear: f64,
    },

    /// Score a CSV file locally with the configured model artifacts
    #[command(name = "score-file")]
    ScoreFile {
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Where to write the scored CSV (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let client = Client::new();

    match cli.command {
        Commands::Health => {
            let response = client
                .get(format!("{}/health", cli.endpoint))
                .send()
                .await?;

            let body: serde_json::Value = response.json().await?;
            println!("{}", serde_json::to_string_pretty(&body)?);
        }

        Commands::Predict {
            machine_type,
            air_temp,
            proc_temp,
            speed,
            torque,
            tool_wear,
        } => {
            let response = client
                .post(format!("{}/v1/predict", cli.endpoint))
                .json(&json!({
                    "type": machine_type,
                    "air_temp": air_temp,
                    "proc_temp": proc_temp,
                    "speed": speed,
                    "torque": torque,
                    "tool_wear": tool_wear,
                }))
                .send()
                .await?;

            let body: serde_json::Value = response.json().await?;
            println!("{}", serde_json::to_string_pretty(&body)?);
        }

        Commands::ScoreFile { input, output } => {
            let config = Config::load().context("failed to load configuration")?;
            let artifacts = ModelArtifacts::load(&config.models)?;
            let service = PredictionService::new(Arc::new(artifacts));

            let bytes = std::fs::read(&input)
                .with_context(|| format!("failed to read {}", input.display()))?;

            let result = service
                .predict_table(&bytes)
                .map_err(|e| anyhow::anyhow!(translation::file_error(&e.to_string())))?;
            let csv = write_csv(&result.table)?;

            match output {
                Some(path) => {
                    std::fs::write(&path, csv)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    eprintln!(
                        "Scored {} rows ({} at risk) into {}",
                        result.len(),
                        result.high_risk_count(),
                        path.display()
                    );
                }
                None => {
                    use std::io::Write;
                    std::io::stdout().write_all(&csv)?;
                }
            }
        }
    }

    Ok(())
}
