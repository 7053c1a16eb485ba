//! Identity endpoint.
//!
//! Read-only: reports which pod and node answered plus the current visit
//! count, without bumping it. Useful for watching a Service spread requests
//! across replicas.

use axum::{extract::State, Extension, Json};
use serde::Serialize;
use tracing::instrument;

use crate::error::{AppErrorResponse, ResultExt};
use crate::middleware::RequestId;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct WhoAmI {
    pub pod: String,
    pub node: String,
    pub hostname: String,
    pub count: u64,
    pub ready: bool,
}

#[instrument(name = "whoami::whoami", skip(state, request_id))]
pub async fn whoami(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
) -> Result<Json<WhoAmI>, AppErrorResponse> {
    let identity = state.identity.resolve();
    let hostname = state.identity.hostname().with_request_id(&request_id)?;

    Ok(Json(WhoAmI {
        pod: identity.pod,
        node: identity.node,
        hostname,
        count: state.counter.peek(),
        ready: state.readiness.is_ready(),
    }))
}
