use std::time::Duration;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::backend::{BackendState, HealthTarget};

/// Automatic retries after the first failed attempt.
pub const MAX_RETRIES: u32 = 3;

/// ConnectionStatus
///
/// Outcome of a connection test against one backend health endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ConnectionStatus {
    Connected {
        target: HealthTarget,
        attempts: u32,
        detail: String,
    },
    Disconnected {
        target: HealthTarget,
        attempts: u32,
        reason: String,
    },
}

impl ConnectionStatus {
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionStatus::Connected { .. })
    }

    pub fn attempts(&self) -> u32 {
        match self {
            ConnectionStatus::Connected { attempts, .. }
            | ConnectionStatus::Disconnected { attempts, .. } => *attempts,
        }
    }
}

/// ConnectionMonitor
///
/// Runs the connection test behind the dashboard's status indicator. Each check retries
/// on its own; a manual "try again" is simply another call.
#[derive(Clone)]
pub struct ConnectionMonitor {
    backend: BackendState,
    retries: u32,
    delay: Duration,
}

impl ConnectionMonitor {
    pub fn new(backend: BackendState, delay: Duration) -> Self {
        Self {
            backend,
            retries: MAX_RETRIES,
            delay,
        }
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// check
    ///
    /// Calls the endpoint for `target` until it answers or `1 + retries` attempts fail.
    pub async fn check(&self, target: HealthTarget) -> ConnectionStatus {
        let mut attempts = 0;
        loop {
            attempts += 1;
            match self.backend.health(target).await {
                Ok(detail) => {
                    tracing::debug!(?target, attempts, "health check passed");
                    return ConnectionStatus::Connected {
                        target,
                        attempts,
                        detail,
                    };
                }
                Err(e) if attempts > self.retries => {
                    tracing::warn!(?target, attempts, error = %e, "backend disconnected");
                    return ConnectionStatus::Disconnected {
                        target,
                        attempts,
                        reason: e.to_string(),
                    };
                }
                Err(e) => {
                    tracing::debug!(?target, attempts, error = %e, "health check failed, retrying");
                    tokio::time::sleep(self.delay).await;
                }
            }
        }
    }

    /// Checks the API, database and cache endpoints concurrently.
    pub async fn check_all(&self) -> Vec<ConnectionStatus> {
        let [api, database, cache] = HealthTarget::ALL;
        let (api, database, cache) =
            tokio::join!(self.check(api), self.check(database), self.check(cache));
        vec![api, database, cache]
    }
}
