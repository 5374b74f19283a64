// ============================================================
// Layer 1 - CLI / Presentation Layer
// ============================================================
// The only layer that touches stdin and stdout.
//
//   1. build the model selected by the subcommand
//   2. optionally restore it from a checkpoint
//   3. read one JSON line from stdin
//   4. hand it to the ServeUseCase
//   5. print one JSON line to stdout
//   6. optionally save the model
//
// stdout carries nothing but the response; logs go to stderr.

pub mod commands;

use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, BufRead, Write};

use commands::Commands;
use crate::application::serve_use_case::{ServeConfig, ServeUseCase};
use crate::domain::{
    response::ModelResponse,
    traits::{DetectionModel, Persistable},
};
use crate::infra::{checkpoint::CheckpointManager, metrics::MetricsLogger};
use crate::ml::{autoencoder::AutoencoderModel, cnn::CnnModel};

#[derive(Parser, Debug)]
#[command(
    name = "netguard-models",
    version,
    about = "Simulated intrusion-detection models behind a one-line JSON interface."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Autoencoder(args) => {
                let cfg: ServeConfig = args.into();
                serve_stdio(AutoencoderModel::new(cfg.seed), &cfg)
            }
            Commands::Cnn(args) => {
                let cfg: ServeConfig = args.into();
                serve_stdio(CnnModel::new(cfg.seed), &cfg)
            }
        }
    }
}

/// Serve one request from stdin to stdout.
fn serve_stdio<M>(model: M, cfg: &ServeConfig) -> Result<()>
where
    M: DetectionModel + Persistable,
{
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read request from stdin")?;

    let response = serve(model, cfg, &line)?;

    let mut out = io::stdout().lock();
    writeln!(out, "{}", serde_json::to_string(&response)?)
        .and_then(|_| out.flush())
        .context("Failed to write response to stdout")?;
    Ok(())
}

/// Everything between reading the request and printing the response.
pub fn serve<M>(mut model: M, cfg: &ServeConfig, line: &str) -> Result<ModelResponse>
where
    M: DetectionModel + Persistable,
{
    tracing::debug!("Serve config: {:?}", cfg);

    if let Some(path) = &cfg.checkpoint {
        CheckpointManager::new(path).load_into(&mut model)?;
    }

    let mut use_case = ServeUseCase::new(model);
    if let Some(dir) = &cfg.metrics_dir {
        let logger = MetricsLogger::new(dir, use_case.model().name());
        use_case = use_case.with_metrics(logger);
    }

    let response = use_case.handle_line(line)?;

    if let Some(path) = &cfg.save {
        if response.is_success() {
            CheckpointManager::new(path).save(use_case.model())?;
        } else {
            tracing::warn!("Request failed, not saving checkpoint to '{}'", path);
        }
    }

    Ok(response)
}
