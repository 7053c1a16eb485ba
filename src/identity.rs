//! Instance identity lookup.
//!
//! Identity comes from environment variables that the orchestrator injects
//! (typically via the Kubernetes downward API), plus the machine hostname.
//! Lookups go through `EnvSource` and `HostnameSource` so tests can supply
//! fixed values instead of mutating the process environment.

use std::collections::HashMap;
use std::io;
use std::sync::Arc;

use serde::Serialize;

use crate::config::{APP_ENV_VAR, NODE_NAME_VAR, POD_NAME_VAR, SERVICE_NAME_VAR, UNKNOWN};
use crate::error::AppError;

/// Read access to environment variables.
pub trait EnvSource: Send + Sync {
    fn var(&self, key: &str) -> Option<String>;
}

/// The real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// Source of the machine hostname.
pub trait HostnameSource: Send + Sync {
    fn hostname(&self) -> io::Result<String>;
}

/// Hostname as reported by the operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemHostname;

impl HostnameSource for SystemHostname {
    fn hostname(&self) -> io::Result<String> {
        hostname::get()?.into_string().map_err(|raw| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("hostname is not valid UTF-8: {:?}", raw),
            )
        })
    }
}

/// Labels identifying which replica and node served a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstanceIdentity {
    pub pod: String,
    pub node: String,
    pub app_env: String,
    pub service_name: String,
}

/// One identity field as shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvEntry<'a> {
    pub name: &'static str,
    pub value: &'a str,
}

impl InstanceIdentity {
    /// Fields in dashboard display order, keyed by environment variable name.
    pub fn env_entries(&self) -> Vec<EnvEntry<'_>> {
        [
            (APP_ENV_VAR, &self.app_env),
            (SERVICE_NAME_VAR, &self.service_name),
            (POD_NAME_VAR, &self.pod),
            (NODE_NAME_VAR, &self.node),
        ]
        .into_iter()
        .map(|(name, value)| EnvEntry { name, value })
        .collect()
    }
}

/// Resolves identity fresh on every call.
#[derive(Clone)]
pub struct IdentityResolver {
    env: Arc<dyn EnvSource>,
    hostname: Arc<dyn HostnameSource>,
}

impl IdentityResolver {
    pub fn new(env: Arc<dyn EnvSource>, hostname: Arc<dyn HostnameSource>) -> Self {
        Self { env, hostname }
    }

    /// Resolver backed by the process environment and the OS hostname.
    pub fn system() -> Self {
        Self::new(Arc::new(ProcessEnv), Arc::new(SystemHostname))
    }

    pub fn resolve(&self) -> InstanceIdentity {
        InstanceIdentity {
            pod: self.lookup(POD_NAME_VAR),
            node: self.lookup(NODE_NAME_VAR),
            app_env: self.lookup(APP_ENV_VAR),
            service_name: self.lookup(SERVICE_NAME_VAR),
        }
    }

    pub fn hostname(&self) -> Result<String, AppError> {
        self.hostname.hostname().map_err(AppError::Hostname)
    }

    fn lookup(&self, key: &str) -> String {
        self.env
            .var(key)
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| UNKNOWN.to_string())
    }
}

impl std::fmt::Debug for IdentityResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityResolver").finish_non_exhaustive()
    }
}
