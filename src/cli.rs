use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use crate::app_state::AppState;
use crate::artifacts::ArtifactSet;
use crate::config::AppConfig;
use crate::config_loader::load_config;
use crate::explainer::ranked;
use crate::features::UserInput;
use crate::input_validator::InputValidator;
use crate::predictor::{feature_rows, EngagementPredictor};
use crate::session_context::SessionContext;

/// Top-level CLI for the engagement prediction service
#[derive(Parser)]
#[command(
    name = "engage",
    version,
    about = "Engagement score prediction from four user metrics"
)]
pub struct Cli {
    /// Configuration file (defaults to engage.toml, or $ENGAGE_CONFIG)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// The four caller-supplied metrics; omitted ones fall back to the means.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct InputArgs {
    #[arg(long)]
    pub message_count_sum: Option<f64>,
    #[arg(long)]
    pub meeting_count_sum: Option<f64>,
    #[arg(long)]
    pub session_count: Option<f64>,
    #[arg(long)]
    pub session_duration_sec_mean: Option<f64>,
}

impl From<InputArgs> for UserInput {
    fn from(args: InputArgs) -> Self {
        UserInput {
            message_count_sum: args.message_count_sum,
            meeting_count_sum: args.meeting_count_sum,
            session_count: args.session_count,
            session_duration_sec_mean: args.session_duration_sec_mean,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Serve the HTTP API (sessions, prediction, explanation, report)
    Serve {
        /// Host/IP to bind (overrides server.host)
        #[arg(long)]
        host: Option<String>,
        /// Port to bind (overrides server.port)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Predict once and print the score, contributions and report
    Predict {
        #[command(flatten)]
        input: InputArgs,
        /// Also write the plain-text report to this file
        #[arg(short, long)]
        report: Option<PathBuf>,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Print the model's global feature importances
    Importance,

    /// Show artifact widths and fingerprints
    Status,
}

pub fn load_predictor(config: &AppConfig) -> anyhow::Result<EngagementPredictor> {
    let artifacts = ArtifactSet::load(&config.artifacts).context("Failed to load artifacts")?;
    Ok(EngagementPredictor::new(artifacts))
}

pub fn dispatch(cli: Cli, config: AppConfig) -> anyhow::Result<()> {
    match cli.command {
        Commands::Serve { host, port } => {
            let predictor = load_predictor(&config)?;
            let dims = predictor.dimension_report();
            if !dims.is_consistent() {
                warn!("Serving with inconsistent artifact widths: {dims:?}");
            }

            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);
            let addr = format!("{host}:{port}");

            let state = Arc::new(AppState::from_config(predictor, &config));
            let app = crate::web::build_router(state);

            let rt = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
                .context("Failed to build Tokio runtime")?;

            rt.block_on(async move {
                let socket_addr: std::net::SocketAddr = addr
                    .parse()
                    .with_context(|| format!("Invalid bind address {addr}"))?;
                let listener = tokio::net::TcpListener::bind(socket_addr)
                    .await
                    .with_context(|| format!("Failed to bind {addr}"))?;
                info!("HTTP server listening on http://{addr}");
                axum::serve(listener, app).await.context("Server error")
            })
        }
        Commands::Predict { input, report, json } => {
            let predictor = load_predictor(&config)?;
            let input: UserInput = input.into();
            InputValidator::new().validate(&input)?;

            let mut session = SessionContext::new();
            let result = session.predict(&predictor, &input)?.clone();
            let contributions = session.explanation(&predictor)?;
            let text = session.report()?;

            if let Some(path) = &report {
                std::fs::write(path, &text)
                    .with_context(|| format!("Failed to write report to {}", path.display()))?;
                info!("Report written to {}", path.display());
            }

            if json {
                let out = serde_json::json!({
                    "score": result.score,
                    "features": feature_rows(&result.completed),
                    "contributions": contributions,
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                println!("Predicted Engagement Score: {:.2}\n", result.score);
                println!("Local contributions (largest first):");
                for c in ranked(&contributions) {
                    println!("  {:<28} {:>14.4}", c.feature.name(), c.contribution);
                }
                println!();
                print!("{text}");
            }
            Ok(())
        }
        Commands::Importance => {
            let predictor = load_predictor(&config)?;
            println!("Feature importances ({}):", predictor.model_name());
            for row in predictor.importances()? {
                println!("  {:<28} {:>8.4}", row.feature.name(), row.importance);
            }
            println!("  {:<28} {:>8.4}", "total", predictor.importance_total());
            Ok(())
        }
        Commands::Status => {
            let predictor = load_predictor(&config)?;
            let out = serde_json::json!({
                "model": predictor.model_name(),
                "dimensions": predictor.dimension_report(),
                "fingerprints": predictor.artifacts().fingerprints,
                "artifacts": config.artifacts,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
            Ok(())
        }
    }
}

/// Parse args, load configuration and initialise logging.
pub fn bootstrap() -> anyhow::Result<(Cli, AppConfig)> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref()).context("Failed to load config")?;
    crate::log_sink::init_logging(&config.logging);
    Ok((cli, config))
}
