use cronscope_core::{ExecutionTarget, MutationOutcome};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// JSON-RPC request from client
#[derive(Debug, Deserialize)]
pub struct Request {
    pub id: u64,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

/// JSON-RPC success response
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub id: u64,
    pub result: Value,
}

/// JSON-RPC error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub id: u64,
    pub error: RpcError,
}

/// Error details
#[derive(Debug, Serialize)]
pub struct RpcError {
    pub code: &'static str,
    pub message: String,
}

// Error codes
pub const INVALID_PARAMS: &str = "invalid_params";
pub const CRON_ERROR: &str = "cron_error";
pub const AGGREGATE_FAILED: &str = "aggregate_failed";

// Method names
pub const METHOD_CRON_LIST_ALL: &str = "cron_list_all";
pub const METHOD_CRON_LIST: &str = "cron_list";
pub const METHOD_CRON_SET: &str = "cron_set";
pub const METHOD_CRON_DELETE: &str = "cron_delete";

/// Sent when a response cannot be encoded.
const ENCODE_FAILURE: &str =
    r#"{"id":0,"error":{"code":"internal_error","message":"failed to encode response"}}"#;

// --- Request params ---

#[derive(Debug, Deserialize)]
pub struct CronListParams {
    pub target: ExecutionTarget,
}

#[derive(Debug, Deserialize)]
pub struct CronSetParams {
    pub targets: Vec<ExecutionTarget>,
    pub cron_jobs: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct CronDeleteParams {
    pub targets: Vec<ExecutionTarget>,
    pub patterns: Vec<String>,
}

// --- Response results ---

/// Acknowledgement of a mutation with one outcome per requested target
#[derive(Debug, Serialize)]
pub struct MutationResult {
    pub message: String,
    pub outcomes: Vec<MutationOutcome>,
}

impl MutationResult {
    pub fn new(outcomes: Vec<MutationOutcome>) -> Self {
        let applied = outcomes.iter().filter(|o| o.is_applied()).count();
        Self {
            message: format!("applied to {applied} of {} target(s)", outcomes.len()),
            outcomes,
        }
    }
}

// --- Helpers ---

impl SuccessResponse {
    pub fn new<T: Serialize>(id: u64, result: T) -> Self {
        Self {
            id,
            result: serde_json::to_value(result).unwrap_or(Value::Null),
        }
    }
}

impl ErrorResponse {
    pub fn new(id: u64, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            id,
            error: RpcError {
                code,
                message: message.into(),
            },
        }
    }
}

/// Encode a response as a single JSON line (without the newline)
pub fn encode<T: Serialize>(response: &T) -> String {
    serde_json::to_string(response).unwrap_or_else(|_| ENCODE_FAILURE.to_string())
}

#[cfg(test)]
mod tests {
    use super::{
        encode, CronDeleteParams, CronListParams, CronSetParams, ErrorResponse, MutationResult,
        Request, SuccessResponse, CRON_ERROR, ENCODE_FAILURE,
    };
    use cronscope_core::{ExecutionTarget, MutationOutcome, MutationStatus};
    use serde_json::json;

    #[test]
    fn request_defaults_params_to_null() {
        let request: Request = serde_json::from_str(r#"{"id":1,"method":"cron_list_all"}"#)
            .expect("request to parse");
        assert_eq!(request.id, 1);
        assert_eq!(request.method, "cron_list_all");
        assert_eq!(request.params, json!(null));
    }

    #[test]
    fn success_response_serializes_result() {
        let response = SuccessResponse::new(2, json!({"count": 0}));
        let value = serde_json::to_value(response).expect("response to serialize");
        assert_eq!(value.get("id"), Some(&json!(2)));
        assert_eq!(value.get("result"), Some(&json!({"count": 0})));
    }

    #[test]
    fn error_response_serializes_error() {
        let response = ErrorResponse::new(3, CRON_ERROR, "nope");
        let value = serde_json::to_value(response).expect("error to serialize");
        assert_eq!(value.get("id"), Some(&json!(3)));
        let error = value.get("error").expect("error field");
        assert_eq!(error.get("code"), Some(&json!(CRON_ERROR)));
        assert_eq!(error.get("message"), Some(&json!("nope")));
    }

    #[test]
    fn list_params_parse_tagged_targets() {
        let params: CronListParams =
            serde_json::from_value(json!({"target": {"kind": "container", "name": "api"}}))
                .expect("params to parse");
        assert_eq!(params.target, ExecutionTarget::container("api"));

        let params: CronListParams = serde_json::from_value(json!({"target": {"kind": "host"}}))
            .expect("params to parse");
        assert_eq!(params.target, ExecutionTarget::Host);
    }

    #[test]
    fn host_is_never_a_bare_string() {
        let parsed = serde_json::from_value::<CronListParams>(json!({"target": "HOST"}));
        assert!(parsed.is_err());
    }

    #[test]
    fn mutation_params_parse() {
        let set: CronSetParams = serde_json::from_value(json!({
            "targets": [{"kind": "host"}],
            "cron_jobs": ["0 * * * * /usr/bin/x"],
        }))
        .expect("set params");
        assert_eq!(set.targets, vec![ExecutionTarget::Host]);
        assert_eq!(set.cron_jobs, vec!["0 * * * * /usr/bin/x"]);

        let delete: CronDeleteParams = serde_json::from_value(json!({
            "targets": [],
            "patterns": ["backup"],
        }))
        .expect("delete params");
        assert!(delete.targets.is_empty());
    }

    #[test]
    fn mutation_result_counts_applied() {
        let result = MutationResult::new(vec![
            MutationOutcome {
                target: ExecutionTarget::Host,
                status: MutationStatus::Applied,
            },
            MutationOutcome {
                target: ExecutionTarget::container("sidecar"),
                status: MutationStatus::Skipped {
                    reason: "read-only".to_string(),
                },
            },
        ]);
        assert_eq!(result.message, "applied to 1 of 2 target(s)");
    }

    #[test]
    fn encode_failure_is_valid_json() {
        let value: serde_json::Value =
            serde_json::from_str(ENCODE_FAILURE).expect("fallback to parse");
        assert_eq!(value["error"]["code"], json!("internal_error"));
        assert!(!encode(&SuccessResponse::new(1, json!(true))).contains('\n'));
    }
}
