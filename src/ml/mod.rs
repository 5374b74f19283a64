// ============================================================
// Layer 5 - ML / Model Layer (Burn)
// ============================================================
// All burn-specific code lives here. Other layers see plain Rust
// values (FeatureMatrix, EpochMetrics, serde_json::Value) and the
// DetectionModel / Persistable traits.
//
//   weights.rs     - seeded random tensors and the persisted
//                    WeightTensor snapshot
//
//   autoencoder.rs - linear encode/decode anomaly scorer
//
//   cnn.rs         - simulated five-class intrusion classifier
//
// Everything runs on the CPU NdArray backend. The models are small
// enough that a GPU backend would only add start-up cost.

use burn::tensor::backend::Backend;

/// CPU backend shared by both models
pub type ModelBackend = burn::backend::NdArray;

pub type ModelDevice = <ModelBackend as Backend>::Device;

/// Seed used when none is given on the command line
pub const DEFAULT_SEED: u64 = 42;

/// Seeded initialisation and weight snapshots
pub mod weights;

/// Reconstruction-error anomaly detector
pub mod autoencoder;

/// Attack-class classifier
pub mod cnn;
