use std::time::Duration;

use anyhow::{bail, Context, Result};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

const STATE_RUNNING: &str = "running";
const STATE_EXITED: &str = "exited";
const STATE_CREATED: &str = "created";

#[derive(Debug, Clone)]
pub struct PortainerConfig {
    pub url: String,
    pub username: String,
    pub password: String,
    pub endpoint_id: String,
    pub container_id: String,
    /// Grace period after a cold start before the first relay attempt.
    pub start_wait: Duration,
}

#[derive(Debug, Deserialize)]
struct AuthResponse {
    jwt: String,
}

#[derive(Debug, Deserialize)]
struct InspectResponse {
    #[serde(rename = "State")]
    state: InspectState,
}

#[derive(Debug, Deserialize)]
struct InspectState {
    #[serde(rename = "Status")]
    status: String,
}

/// Drives the dockerized Anki container through the Portainer API so the
/// relay can wake it on demand.
pub struct ContainerSupervisor {
    http: Client,
    config: PortainerConfig,
}

impl ContainerSupervisor {
    pub fn new(config: PortainerConfig) -> Self {
        Self {
            http: Client::new(),
            config,
        }
    }

    pub fn container_id(&self) -> &str {
        &self.config.container_id
    }

    async fn jwt_token(&self) -> Result<String> {
        let response = self
            .http
            .post(format!("{}/api/auth", self.config.url))
            .json(&json!({
                "Username": self.config.username,
                "Password": self.config.password,
            }))
            .send()
            .await?
            .error_for_status()
            .context("portainer authentication failed")?;
        let body: AuthResponse = response.json().await?;
        Ok(body.jwt)
    }

    async fn container_status(&self, jwt: &str) -> Result<String> {
        let response = self
            .http
            .get(format!(
                "{}/api/endpoints/{}/docker/containers/{}/json",
                self.config.url, self.config.endpoint_id, self.config.container_id
            ))
            .bearer_auth(jwt)
            .send()
            .await?
            .error_for_status()
            .context("container inspect failed")?;
        let body: InspectResponse = response.json().await?;
        Ok(body.state.status)
    }

    async fn start_container(&self, jwt: &str) -> Result<()> {
        let response = self
            .http
            .post(format!(
                "{}/api/endpoints/{}/docker/containers/{}/start",
                self.config.url, self.config.endpoint_id, self.config.container_id
            ))
            .bearer_auth(jwt)
            .send()
            .await?;
        match response.status() {
            StatusCode::NO_CONTENT => {
                info!(container = %self.config.container_id, "container started");
                Ok(())
            }
            StatusCode::NOT_MODIFIED => {
                info!(container = %self.config.container_id, "container already running");
                Ok(())
            }
            status => {
                let body = response.text().await.unwrap_or_default();
                bail!("failed to start container: {status} - {body}")
            }
        }
    }

    pub async fn stop(&self) -> Result<()> {
        let jwt = self.jwt_token().await?;
        let response = self
            .http
            .post(format!(
                "{}/api/endpoints/{}/docker/containers/{}/stop",
                self.config.url, self.config.endpoint_id, self.config.container_id
            ))
            .bearer_auth(&jwt)
            .send()
            .await?;
        match response.status() {
            StatusCode::NO_CONTENT => {
                info!(container = %self.config.container_id, "container stopped");
                Ok(())
            }
            StatusCode::NOT_MODIFIED => {
                info!(container = %self.config.container_id, "container already stopped");
                Ok(())
            }
            status => {
                let body = response.text().await.unwrap_or_default();
                bail!("failed to stop container: {status} - {body}")
            }
        }
    }

    /// Brings the container up ahead of a relay attempt: "exited" and
    /// "created" get a start plus the boot grace period, "running" passes
    /// through, anything else is refused.
    pub async fn ensure_running(&self) -> Result<()> {
        let jwt = self.jwt_token().await?;
        let status = self.container_status(&jwt).await?;
        info!(container = %self.config.container_id, %status, "container state checked");
        match status.as_str() {
            STATE_EXITED | STATE_CREATED => {
                self.start_container(&jwt).await?;
                tokio::time::sleep(self.config.start_wait).await;
                Ok(())
            }
            STATE_RUNNING => Ok(()),
            other => {
                warn!(container = %self.config.container_id, status = %other, "container in unexpected state");
                bail!("container is in an unexpected state: {other}")
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/portainer_tests.rs"]
mod tests;
