use serde::de::DeserializeOwned;
use tracing::warn;

use cronscope_core::CronError;

use crate::protocol::*;
use crate::state::DaemonState;

fn mutation_error_code(error: &CronError) -> &'static str {
    if error.is_validation() {
        INVALID_PARAMS
    } else {
        CRON_ERROR
    }
}

fn parse_params<T: DeserializeOwned>(request: &Request) -> Result<T, String> {
    serde_json::from_value(request.params.clone()).map_err(|e| {
        let resp = ErrorResponse::new(request.id, INVALID_PARAMS, format!("Invalid params: {e}"));
        encode(&resp)
    })
}

pub async fn handle_list_all(request: &Request, state: &DaemonState) -> String {
    let aggregate = state.service.list_all().await;

    if aggregate.is_ok() {
        encode(&SuccessResponse::new(request.id, aggregate))
    } else {
        let message = aggregate
            .failure
            .unwrap_or_else(|| "cron aggregation failed".to_string());
        encode(&ErrorResponse::new(request.id, AGGREGATE_FAILED, message))
    }
}

pub async fn handle_list(request: &Request, state: &DaemonState) -> String {
    let params: CronListParams = match parse_params(request) {
        Ok(p) => p,
        Err(resp) => return resp,
    };

    match state.service.list_one(&params.target).await {
        Ok(report) => encode(&SuccessResponse::new(request.id, report)),
        Err(e) => encode(&ErrorResponse::new(request.id, CRON_ERROR, e.to_string())),
    }
}

pub async fn handle_set(request: &Request, state: &DaemonState) -> String {
    let params: CronSetParams = match parse_params(request) {
        Ok(p) => p,
        Err(resp) => return resp,
    };

    match state.service.apply(&params.targets, params.cron_jobs.as_slice()).await {
        Ok(outcomes) => encode(&SuccessResponse::new(request.id, MutationResult::new(outcomes))),
        Err(e) => {
            warn!("cron_set rejected: {e}");
            encode(&ErrorResponse::new(request.id, mutation_error_code(&e), e.to_string()))
        }
    }
}

pub async fn handle_delete(request: &Request, state: &DaemonState) -> String {
    let params: CronDeleteParams = match parse_params(request) {
        Ok(p) => p,
        Err(resp) => return resp,
    };

    match state.service.remove(&params.targets, params.patterns.as_slice()).await {
        Ok(outcomes) => encode(&SuccessResponse::new(request.id, MutationResult::new(outcomes))),
        Err(e) => {
            warn!("cron_delete rejected: {e}");
            encode(&ErrorResponse::new(request.id, mutation_error_code(&e), e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mutation_error_code;
    use crate::handlers::dispatch;
    use crate::handlers::tests::{request, state};
    use crate::protocol::{
        CRON_ERROR, INVALID_PARAMS, METHOD_CRON_DELETE, METHOD_CRON_LIST, METHOD_CRON_SET,
    };
    use cronscope_core::{CronError, ExecutionTarget};
    use serde_json::{json, Value};

    async fn call(method: &str, params: Value) -> Value {
        let response = dispatch(&request(1, method, params), &state()).await;
        serde_json::from_str(&response).expect("response json")
    }

    #[tokio::test]
    async fn delete_without_patterns_is_rejected() {
        let value = call(
            METHOD_CRON_DELETE,
            json!({"targets": [{"kind": "host"}], "patterns": []}),
        )
        .await;
        assert_eq!(value["error"]["code"], json!(INVALID_PARAMS));
        assert_eq!(
            value["error"]["message"],
            json!("at least one pattern is required")
        );
    }

    #[tokio::test]
    async fn set_on_container_is_acknowledged_as_skipped() {
        let value = call(
            METHOD_CRON_SET,
            json!({
                "targets": [{"kind": "container", "name": "sidecar"}],
                "cron_jobs": ["0 * * * * /usr/bin/x"],
            }),
        )
        .await;
        let result = &value["result"];
        assert_eq!(result["message"], json!("applied to 0 of 1 target(s)"));
        assert_eq!(result["outcomes"][0]["status"], json!("skipped"));
        assert_eq!(
            result["outcomes"][0]["target"],
            json!({"kind": "container", "name": "sidecar"})
        );
    }

    #[tokio::test]
    async fn malformed_target_is_invalid_params() {
        let value = call(METHOD_CRON_LIST, json!({"target": "HOST"})).await;
        assert_eq!(value["error"]["code"], json!(INVALID_PARAMS));
    }

    #[tokio::test]
    async fn missing_params_are_invalid() {
        let value = call(METHOD_CRON_SET, json!(null)).await;
        assert_eq!(value["error"]["code"], json!(INVALID_PARAMS));
    }

    #[test]
    fn only_validation_errors_are_invalid_params() {
        assert_eq!(
            mutation_error_code(&CronError::InvalidJobLine(String::new())),
            INVALID_PARAMS
        );
        assert_eq!(
            mutation_error_code(&CronError::Untrusted {
                target: ExecutionTarget::Host,
                reason: "listing could not be trusted".to_string(),
            }),
            CRON_ERROR
        );
    }
}
