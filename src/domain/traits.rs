// ============================================================
// Layer 3 - Core Traits (Abstractions)
// ============================================================
// The application layer never names a concrete model. It talks
// to a `DetectionModel`, and the checkpoint manager talks to a
// `Persistable`. Both models implement both traits.

use anyhow::Result;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::domain::{epoch::EpochMetrics, request::ModelRequest};

// ─── DetectionModel ───────────────────────────────────────────────────────────
/// A model that can run the `train` and `predict` commands.
///
/// Errors returned from either method are request-level failures
/// (bad shapes, mismatched labels) and end up in an error response.
pub trait DetectionModel {
    /// Short name used in logs and metrics file names
    fn name(&self) -> &'static str;

    /// Run the training simulation and return the per-epoch history.
    fn train(&mut self, request: &ModelRequest) -> Result<Vec<EpochMetrics>>;

    /// Run inference and return the model-specific `results` payload.
    fn predict(&mut self, request: &ModelRequest) -> Result<Value>;
}

// ─── Persistable ──────────────────────────────────────────────────────────────
/// Any model whose full state can be captured and restored.
///
/// `State` is a plain serde value; the on-disk encoding is chosen by
/// the infrastructure layer.
pub trait Persistable {
    /// Tag written alongside the state so a checkpoint of one model
    /// can't be loaded into the other.
    const KIND: &'static str;

    type State: Serialize + DeserializeOwned;

    fn to_state(&self) -> Result<Self::State>;

    /// Replace the model's state. Fails if the state is internally
    /// inconsistent, in which case the model is left untouched.
    fn restore(&mut self, state: Self::State) -> Result<()>;
}
