//! Identity of the serving instance, reported with every diagnostic so
//! load distribution across replicas is visible from the client side.

use std::fs;

const UNKNOWN_POD: &str = "unknown";

#[cfg_attr(test, mockall::automock)]
pub trait PodIdentity: Send + Sync {
    fn name(&self) -> String;
}

/// Hostname resolved once at construction.
#[derive(Debug, Clone)]
pub struct HostnameIdentity {
    hostname: String,
}

impl HostnameIdentity {
    pub fn detect() -> Self {
        let hostname = std::env::var("HOSTNAME")
            .ok()
            .and_then(non_empty)
            .or_else(|| fs::read_to_string("/etc/hostname").ok().and_then(non_empty))
            .unwrap_or_else(|| {
                tracing::warn!("could not determine hostname, reporting pod as unknown");
                UNKNOWN_POD.to_string()
            });
        Self { hostname }
    }
}

impl PodIdentity for HostnameIdentity {
    fn name(&self) -> String {
        self.hostname.clone()
    }
}

#[derive(Debug, Clone)]
pub struct StaticIdentity(pub String);

impl PodIdentity for StaticIdentity {
    fn name(&self) -> String {
        self.0.clone()
    }
}

fn non_empty(raw: String) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
