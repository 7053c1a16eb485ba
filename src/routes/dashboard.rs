//! Dashboard page handler.
//!
//! Every view bumps the per-instance counter, then renders the instance's
//! identity, hostname, start arguments and readiness.

use axum::{extract::State, response::Html, Extension};
use tracing::instrument;

use crate::config::DASHBOARD_TEMPLATE;
use crate::error::{AppError, AppErrorResponse, ResultExt};
use crate::middleware::RequestId;
use crate::state::AppState;

#[instrument(name = "dashboard::index", skip(state, request_id))]
pub async fn index(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
) -> Result<Html<String>, AppErrorResponse> {
    let count = state.counter.increment();
    let hostname = state.identity.hostname().with_request_id(&request_id)?;
    let identity = state.identity.resolve();

    tracing::info!(count, pod = %identity.pod, "Dashboard accessed");

    let mut context = tera::Context::new();
    context.insert("config", &state.config.ui);
    context.insert("hostname", &hostname);
    context.insert("env", &identity.env_entries());
    context.insert("args", state.args.as_slice());
    context.insert("count", &count);
    context.insert("ready", &state.readiness.is_ready());
    context.insert("ready_after", &state.readiness.delay().as_secs());
    context.insert("uptime", &state.readiness.elapsed().as_secs());
    context.insert("started_at", &state.started_at.to_rfc3339());

    let html = state
        .tera
        .render(DASHBOARD_TEMPLATE, &context)
        .map_err(AppError::from)
        .with_request_id(&request_id)?;
    Ok(Html(html))
}
