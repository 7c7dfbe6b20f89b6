//! Liveness check and connect-and-verify functionality.
//!
//! A client that connects but does not answer the ping is treated as the same
//! failure class as a client that cannot connect at all.

use std::time::Duration;

use bollard::Docker;

use super::resolution::{EngineEndpoint, HostProbe, Resolution};
use super::{EngineConnector, HEALTH_CHECK_TIMEOUT_SECS};
use crate::error::{ConnectionError, EngineUnavailable};

impl EngineConnector {
    /// Perform a ping with timeout (internal helper).
    async fn ping_with_timeout(docker: &Docker) -> Result<(), ConnectionError> {
        let timeout = Duration::from_secs(HEALTH_CHECK_TIMEOUT_SECS);

        tokio::time::timeout(timeout, docker.ping())
            .await
            .map_err(|_| ConnectionError::HealthCheckTimeout {
                seconds: HEALTH_CHECK_TIMEOUT_SECS,
            })?
            .map_err(|e| ConnectionError::HealthCheckFailed {
                message: e.to_string(),
            })?;
        Ok(())
    }

    /// Verify the container engine is responsive.
    ///
    /// Sends a ping request and waits up to ten seconds for the answer. This
    /// confirms the engine is operational, not just that the socket exists.
    ///
    /// # Errors
    ///
    /// Returns `ConnectionError::HealthCheckFailed` if the engine does not
    /// respond correctly, or `ConnectionError::HealthCheckTimeout` if the
    /// check times out.
    pub async fn health_check_async(docker: &Docker) -> Result<(), ConnectionError> {
        Self::ping_with_timeout(docker).await
    }

    /// Connect to `endpoint` and verify the engine answers a ping.
    ///
    /// # Errors
    ///
    /// Returns any connection or health check error; see [`Self::connect`]
    /// and [`Self::health_check_async`].
    pub async fn connect_and_verify_async(
        endpoint: &EngineEndpoint,
    ) -> Result<Docker, ConnectionError> {
        let docker = Self::connect(endpoint.target())?;
        Self::ping_with_timeout(&docker).await?;
        tracing::info!(
            method = %endpoint.method(),
            endpoint = endpoint.target(),
            "connected to container engine"
        );
        Ok(docker)
    }

    /// Connect to a resolved endpoint, keeping the attempt log on failure.
    ///
    /// # Errors
    ///
    /// Returns [`EngineUnavailable`] with the selected attempt marked as
    /// failed when connecting or pinging fails.
    pub async fn connect_resolved_async(
        resolution: Resolution,
    ) -> Result<Docker, EngineUnavailable> {
        match Self::connect_and_verify_async(resolution.endpoint()).await {
            Ok(docker) => Ok(docker),
            Err(error) => {
                tracing::warn!(
                    endpoint = resolution.endpoint().target(),
                    %error,
                    "container engine endpoint is not usable"
                );
                Err(resolution.into_failure(error))
            }
        }
    }

    /// Resolve an endpoint through the strategy list, then connect and verify.
    ///
    /// The probe is only consulted during resolution; no client is cached and
    /// nothing is retried.
    ///
    /// # Errors
    ///
    /// Returns [`EngineUnavailable`] carrying the attempt log when no strategy
    /// resolves or the selected endpoint cannot be verified.
    pub async fn resolve_and_connect_async(
        probe: &dyn HostProbe,
    ) -> Result<Docker, EngineUnavailable> {
        let resolution = Self::resolve(probe)?;
        Self::connect_resolved_async(resolution).await
    }
}
