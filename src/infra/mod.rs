// ============================================================
// Layer 6 - Infrastructure Layer
// ============================================================
// Everything that touches the filesystem:
//
//   checkpoint.rs - saving and loading a model's full state as a
//                   bincode file
//
//   metrics.rs    - appending training history to a CSV file
//
// Errors here are infrastructure failures. They abort the process
// rather than being turned into a JSON error response.

/// Model checkpoint saving and loading
pub mod checkpoint;

/// Training metrics CSV logger
pub mod metrics;
