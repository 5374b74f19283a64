// ============================================================
// Layer 3 - Epoch Metrics
// ============================================================
// One entry of a model's training history. The autoencoder only
// reports a loss; the classifier also reports an accuracy, so the
// field is skipped when absent and the JSON shape matches each
// model's history exactly:
//
//   autoencoder: {"epoch": 1, "loss": 0.42}
//   cnn:         {"epoch": 1, "accuracy": 0.77, "loss": 0.55}

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochMetrics {
    /// 1-based epoch number
    pub epoch: usize,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,

    pub loss: f64,
}

impl EpochMetrics {
    pub fn new(epoch: usize, loss: f64) -> Self {
        Self { epoch, accuracy: None, loss }
    }

    pub fn with_accuracy(epoch: usize, loss: f64, accuracy: f64) -> Self {
        Self { epoch, accuracy: Some(accuracy), loss }
    }
}
