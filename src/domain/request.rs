// ============================================================
// Layer 3 - Model Request
// ============================================================
// A single request read from stdin, e.g.
//
//   {"command": "train", "data": [[0.1, 0.2, ...]], "epochs": 5}
//
// Every field is optional. Missing fields fall back to the same
// defaults the command interface has always used: `predict`,
// an empty dataset, and 10 epochs.
//
// `epochs` comes straight from the caller, so it is capped at
// MAX_EPOCHS before any model loops over it.

use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_EPOCHS: usize = 10;
pub const MAX_EPOCHS:     usize = 10_000;

/// The two commands a model understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Train,
    Predict,
}

impl Command {
    /// Returns `None` for anything other than `train` / `predict`;
    /// the caller answers those with an "Unknown command" error.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "train"   => Some(Self::Train),
            "predict" => Some(Self::Predict),
            _         => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelRequest {
    #[serde(default = "default_command")]
    pub command: String,

    /// Raw nested numeric array. Its expected shape depends on the
    /// model, so it is validated later by the data layer.
    #[serde(default)]
    pub data: Value,

    #[serde(default = "default_epochs")]
    pub epochs: usize,

    /// Per-sample labels, only read by the CNN during training
    #[serde(default)]
    pub labels: Vec<Value>,

    /// Overrides the autoencoder's anomaly threshold for one prediction
    #[serde(default)]
    pub threshold: Option<f32>,
}

fn default_command() -> String {
    "predict".to_string()
}

fn default_epochs() -> usize {
    DEFAULT_EPOCHS
}

impl ModelRequest {
    pub fn predict(data: Value) -> Self {
        Self {
            command:   default_command(),
            data,
            epochs:    DEFAULT_EPOCHS,
            labels:    Vec::new(),
            threshold: None,
        }
    }

    pub fn parsed_command(&self) -> Option<Command> {
        Command::parse(&self.command)
    }

    /// Checks that hold for every command, before a model sees the request.
    pub fn validate(&self) -> Result<()> {
        check_epochs(self.epochs)
    }
}

pub fn check_epochs(epochs: usize) -> Result<()> {
    ensure!(epochs <= MAX_EPOCHS, "epochs must be at most {MAX_EPOCHS}, got {epochs}");
    Ok(())
}
