// ============================================================
// Layer 1 - CLI Commands and Arguments
// ============================================================
// One subcommand per model. Both take the same flags:
//
//   netguard-models autoencoder --seed 42 --save model.bin
//   netguard-models cnn --checkpoint model.bin --metrics-dir runs/
//
// The request itself always arrives on stdin.

use clap::{Args, Subcommand};
use crate::application::serve_use_case::ServeConfig;
use crate::ml::DEFAULT_SEED;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Score rows of traffic features by reconstruction error
    Autoencoder(ModelArgs),

    /// Classify traffic samples into normal / dos / probe / r2l / u2r
    Cnn(ModelArgs),
}

#[derive(Args, Debug)]
pub struct ModelArgs {
    /// Seed for the initial weights and every later random draw
    #[arg(long, default_value_t = DEFAULT_SEED)]
    pub seed: u64,

    /// Load model state from this checkpoint before handling the request
    #[arg(long)]
    pub checkpoint: Option<String>,

    /// Save model state to this path after a successful request
    #[arg(long)]
    pub save: Option<String>,

    /// Append per-epoch training metrics to a CSV in this directory
    #[arg(long)]
    pub metrics_dir: Option<String>,
}

/// The application layer never sees clap types.
impl From<ModelArgs> for ServeConfig {
    fn from(a: ModelArgs) -> Self {
        ServeConfig {
            seed:        a.seed,
            checkpoint:  a.checkpoint,
            save:        a.save,
            metrics_dir: a.metrics_dir,
        }
    }
}
