pub mod crons;

use std::time::Instant;

use tracing::{debug, info, warn};

use crate::protocol::*;
use crate::state::DaemonState;

/// Dispatch a request to the appropriate handler
pub async fn dispatch(request: &Request, state: &DaemonState) -> String {
    let start = Instant::now();
    let method = request.method.as_str();
    let id = request.id;

    debug!("[dispatch] → id={} method={}", id, method);

    let response = match method {
        METHOD_CRON_LIST_ALL => crons::handle_list_all(request, state).await,
        METHOD_CRON_LIST => crons::handle_list(request, state).await,
        METHOD_CRON_SET => crons::handle_set(request, state).await,
        METHOD_CRON_DELETE => crons::handle_delete(request, state).await,
        _ => {
            warn!("[dispatch] Unknown method: {}", method);
            let resp = ErrorResponse::new(
                request.id,
                INVALID_PARAMS,
                format!("Unknown method: {}", request.method),
            );
            encode(&resp)
        }
    };

    let elapsed = start.elapsed();
    let is_error = response.contains("\"error\"");

    if is_error {
        info!("[dispatch] ← id={} method={} error elapsed={:?}", id, method, elapsed);
    } else {
        debug!("[dispatch] ← id={} method={} ok elapsed={:?}", id, method, elapsed);
    }

    response
}
