// ============================================================
// Layer 3 - Domain Layer
// ============================================================
// Plain Rust types and traits that describe what the system
// talks about: requests, responses, epoch metrics and the
// attack classes a classifier can emit.
//
// Rules for this layer:
//   - NO burn tensor types here
//   - NO file I/O
//   - Only structs, enums and traits
//
// The models in Layer 5 implement the traits defined here so the
// application layer can drive either model the same way.

// The one-line JSON request read from stdin
pub mod request;

// The one-line JSON response written to stdout
pub mod response;

// One row of training history
pub mod epoch;

// The fixed set of traffic classes
pub mod attack;

// Core abstractions (traits) that the models implement
pub mod traits;
