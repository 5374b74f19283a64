// ============================================================
// Layer 6 - Checkpoint Manager
// ============================================================
// Saves and restores a model's full state to a single binary file.
//
// File layout (bincode):
//   CheckpointFile {
//       version: u32,      ← format version, currently 1
//       kind:    String,   ← "autoencoder" or "cnn"
//       state:   M::State, ← weights + hyperparameters
//   }
//
// Why bincode and not Burn's CompactRecorder?
//   CompactRecorder stores parameters at half precision. bincode
//   writes f32 values as their raw little-endian bits, so a save
//   followed by a load restores every weight exactly, and a
//   reloaded model scores the same rows identically.
//
// Why store the hyperparameters alongside the weights?
//   The state carries dimensions (input_dim, num_classes, ...)
//   next to the tensors. On load each model checks the tensors
//   against those dimensions before swapping anything in, so a
//   truncated or hand-edited file is refused and the running
//   model keeps its old weights.
//
// Why the version and kind header?
//   A checkpoint written by one model kind is refused by the
//   other, and a future layout change can be detected instead of
//   misread.
//
// Typical flow:
//   netguard-models autoencoder --save ae.bin        ← train, then save
//   netguard-models autoencoder --checkpoint ae.bin  ← load, then predict

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use crate::domain::traits::Persistable;

pub const FORMAT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct CheckpointFile<S> {
    version: u32,
    kind:    String,
    state:   S,
}

/// Reads and writes one checkpoint file.
pub struct CheckpointManager {
    path: PathBuf,
}

impl CheckpointManager {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Write the model's state, creating parent directories as needed.
    pub fn save<M: Persistable>(&self, model: &M) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Cannot create checkpoint directory '{}'", parent.display())
            })?;
        }

        let file = CheckpointFile {
            version: FORMAT_VERSION,
            kind:    M::KIND.to_string(),
            state:   model.to_state()?,
        };
        let bytes = bincode::serialize(&file)
            .with_context(|| format!("Cannot encode {} checkpoint", M::KIND))?;

        fs::write(&self.path, bytes).with_context(|| {
            format!("Failed to save checkpoint to '{}'", self.path.display())
        })?;

        tracing::info!("Saved {} checkpoint to '{}'", M::KIND, self.path.display());
        Ok(())
    }

    /// Replace the model's state with the checkpoint's.
    pub fn load_into<M: Persistable>(&self, model: &mut M) -> Result<()> {
        let bytes = fs::read(&self.path).with_context(|| {
            format!("Cannot read checkpoint '{}'", self.path.display())
        })?;

        let file: CheckpointFile<M::State> = bincode::deserialize(&bytes).with_context(|| {
            format!(
                "'{}' is not a valid {} checkpoint",
                self.path.display(),
                M::KIND
            )
        })?;

        if file.version != FORMAT_VERSION {
            bail!(
                "Checkpoint '{}' has format version {}, expected {}",
                self.path.display(),
                file.version,
                FORMAT_VERSION
            );
        }
        if file.kind != M::KIND {
            bail!(
                "Checkpoint '{}' holds a {} model, cannot load it as {}",
                self.path.display(),
                file.kind,
                M::KIND
            );
        }

        model.restore(file.state).with_context(|| {
            format!("Checkpoint '{}' is inconsistent", self.path.display())
        })?;

        tracing::info!("Loaded {} checkpoint from '{}'", M::KIND, self.path.display());
        Ok(())
    }
}
