//! Shared application state for request handlers.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tera::Tera;

use crate::config::AppConfig;
use crate::counter::RequestCounter;
use crate::identity::IdentityResolver;
use crate::readiness::ReadinessGate;

/// Shared application state, cloneable across handlers via Arc-wrapped fields.
///
/// Holds the configuration and template engine plus the three core
/// components: the visit counter, the readiness gate and the identity
/// resolver. Handlers only reach these through the accessors they expose.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub tera: Arc<Tera>,
    pub counter: Arc<RequestCounter>,
    pub readiness: ReadinessGate,
    pub identity: IdentityResolver,
    /// Command line the process was started with
    pub args: Arc<Vec<String>>,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        tera: Tera,
        readiness: ReadinessGate,
        identity: IdentityResolver,
        args: Vec<String>,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            tera: Arc::new(tera),
            counter: Arc::new(RequestCounter::new()),
            readiness,
            identity,
            args: Arc::new(args),
            started_at,
        }
    }
}
