// ============================================================
// Layer 2 - ServeUseCase
// ============================================================
// Handles one request against one model:
//
//   Step 1: Parse the JSON line              (Layer 3 - domain)
//   Step 2: Dispatch on `command`            (Layer 3 - domain)
//   Step 3: Run train / predict              (Layer 5 - ml)
//   Step 4: Log training history to CSV      (Layer 6 - infra)
//   Step 5: Build the response               (Layer 3 - domain)
//
// Request-level problems (bad JSON, wrong shapes, out-of-range
// epochs, unknown command) become `{"status": "error", ...}` responses. Only infrastructure
// failures, such as an unwritable metrics file, are returned as Err.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::domain::{
    request::{Command, ModelRequest},
    response::ModelResponse,
    traits::DetectionModel,
};
use crate::infra::metrics::MetricsLogger;
use crate::ml::DEFAULT_SEED;

// ─── Serve Configuration ─────────────────────────────────────────────────────
// Everything the CLI collects for one run. Paths are optional; an
// absent path disables that step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServeConfig {
    pub seed:        u64,
    pub checkpoint:  Option<String>,
    pub save:        Option<String>,
    pub metrics_dir: Option<String>,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            seed:        DEFAULT_SEED,
            checkpoint:  None,
            save:        None,
            metrics_dir: None,
        }
    }
}

// ─── ServeUseCase ─────────────────────────────────────────────────────────────
pub struct ServeUseCase<M> {
    model:   M,
    metrics: Option<MetricsLogger>,
}

impl<M: DetectionModel> ServeUseCase<M> {
    pub fn new(model: M) -> Self {
        Self { model, metrics: None }
    }

    /// Append training history to this logger after every `train`.
    pub fn with_metrics(mut self, logger: MetricsLogger) -> Self {
        self.metrics = Some(logger);
        self
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// Handle one raw line from stdin.
    pub fn handle_line(&mut self, line: &str) -> Result<ModelResponse> {
        match serde_json::from_str::<ModelRequest>(line.trim()) {
            Ok(request) => self.handle(&request),
            Err(e) => {
                tracing::warn!("Rejected malformed request: {e}");
                Ok(ModelResponse::error(format!("Invalid request: {e}")))
            }
        }
    }

    pub fn handle(&mut self, request: &ModelRequest) -> Result<ModelResponse> {
        let Some(command) = request.parsed_command() else {
            tracing::warn!("Unknown command '{}'", request.command);
            return Ok(ModelResponse::unknown_command());
        };

        if let Err(e) = request.validate() {
            return Ok(self.rejected(e));
        }

        tracing::info!("Running '{}' on {}", request.command, self.model.name());

        match command {
            Command::Train => {
                let history = match self.model.train(request) {
                    Ok(history) => history,
                    Err(e)      => return Ok(self.rejected(e)),
                };
                if let Some(logger) = &self.metrics {
                    logger.log_all(&history)?;
                }
                if let Some(last) = history.last() {
                    tracing::info!("Training finished after {} epochs, loss={:.4}", last.epoch, last.loss);
                }
                Ok(ModelResponse::history(serde_json::to_value(&history)?))
            }
            Command::Predict => match self.model.predict(request) {
                Ok(results) => Ok(ModelResponse::results(results)),
                Err(e)      => Ok(self.rejected(e)),
            },
        }
    }

    fn rejected(&self, e: anyhow::Error) -> ModelResponse {
        tracing::warn!("{} rejected request: {e:#}", self.model.name());
        ModelResponse::error(format!("{e:#}"))
    }
}
