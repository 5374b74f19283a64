// ============================================================
// Layer 2 - Application / Use Cases
// ============================================================
// Orchestrates the other layers to answer one request.
//
// Rules for this layer:
//   - No tensor math here (that's Layer 5)
//   - No stdin/stdout access (that's Layer 1)
//   - Only workflow coordination

// Handling one train/predict request end to end
pub mod serve_use_case;
