// ============================================================
// Layer 4 - Data Pipeline
// ============================================================
// Request `data` field (untyped JSON)
//       │
//       ▼
//   Preprocessor      → validates shape, produces FeatureMatrix / SampleBatch
//       │
//       ▼
//   FeatureBatcher    → copies a FeatureMatrix into a burn tensor
//
// Each step is independently testable without a model.

/// Validates and converts raw request data
pub mod preprocessor;

/// Converts feature matrices into burn tensors
pub mod batcher;
