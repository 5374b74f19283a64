// ============================================================
// Layer 3 - Model Response
// ============================================================
// Exactly one of these is written to stdout per process run.
//
//   {"status":"success","training_history":[...]}
//   {"status":"success","results":...}
//   {"status":"error","message":"Unknown command"}
//
// Absent fields are skipped entirely rather than written as null.

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const UNKNOWN_COMMAND: &str = "Unknown command";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelResponse {
    pub status: Status,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub training_history: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ModelResponse {
    pub fn history(history: Value) -> Self {
        Self {
            status:           Status::Success,
            training_history: Some(history),
            results:          None,
            message:          None,
        }
    }

    pub fn results(results: Value) -> Self {
        Self {
            status:           Status::Success,
            training_history: None,
            results:          Some(results),
            message:          None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status:           Status::Error,
            training_history: None,
            results:          None,
            message:          Some(message.into()),
        }
    }

    pub fn unknown_command() -> Self {
        Self::error(UNKNOWN_COMMAND)
    }

    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unknown_command_wire_format() {
        let out = serde_json::to_string(&ModelResponse::unknown_command()).unwrap();
        assert_eq!(out, r#"{"status":"error","message":"Unknown command"}"#);
    }

    #[test]
    fn test_history_skips_other_fields() {
        let out = serde_json::to_value(ModelResponse::history(json!([]))).unwrap();
        assert_eq!(out, json!({"status": "success", "training_history": []}));
    }

    #[test]
    fn test_results_is_success() {
        let resp = ModelResponse::results(json!({"k": 1}));
        assert!(resp.is_success());
        assert!(!ModelResponse::error("boom").is_success());
    }
}
