//! Sandboxed screenshot capture.
//!
//! Each capture provisions a fresh selenium-standalone container with
//! restricted DNS, drives a WebDriver session over HTTP to navigate and
//! screenshot the target URL, and tears the container down afterwards.
//! Teardown runs regardless of the navigation outcome so no sandbox
//! outlives its job.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use base64::Engine as _;
use bollard_next::container::{
    Config, CreateContainerOptions, InspectContainerOptions, RemoveContainerOptions,
    StartContainerOptions, StopContainerOptions,
};
use bollard_next::image::CreateImageOptions;
use bollard_next::service::{HostConfig, PortBinding};
use bollard_next::Docker;
use futures::StreamExt;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::kernel::traits::BaseRenderer;

/// WebDriver port inside the sandbox container.
const WEBDRIVER_PORT: &str = "4444/tcp";

/// Sandbox containers bypass host DNS and resolve through a fixed public
/// resolver.
const SANDBOX_DNS: &str = "8.8.8.8";

/// The WebDriver endpoint rejects sessions until the container's browser
/// has started.
const WARMUP: Duration = Duration::from_secs(5);

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("failed to provision sandbox: {0}")]
    Provision(String),
    #[error("navigation failed: {0}")]
    Navigation(String),
    #[error("screenshot capture failed: {0}")]
    Capture(String),
}

/// Docker-backed isolation renderer.
pub struct ContainerRenderer {
    docker: Docker,
    http: reqwest::Client,
    image: String,
    screenshots_dir: PathBuf,
}

/// WebDriver `{"value": ...}` envelope.
#[derive(Debug, Deserialize)]
struct WdValue<T> {
    value: T,
}

#[derive(Debug, Deserialize)]
struct WdSession {
    #[serde(rename = "sessionId")]
    session_id: String,
}

/// Public path under which a job's screenshot is served.
pub fn public_screenshot_path(job_id: Uuid) -> String {
    format!("/static/screenshots/{}.png", job_id)
}

/// Message from a W3C WebDriver error payload, or the raw body when the
/// payload isn't one.
fn webdriver_error(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.pointer("/value/message")
                .and_then(|m| m.as_str())
                .map(|s| s.to_string())
        })
        .unwrap_or_else(|| body.to_string())
}

impl ContainerRenderer {
    pub fn new(image: String, screenshots_dir: PathBuf) -> Result<Self> {
        let docker =
            Docker::connect_with_socket_defaults().context("Failed to connect to Docker")?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(90))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            docker,
            http,
            image,
            screenshots_dir,
        })
    }

    fn container_name(job_id: Uuid) -> String {
        format!("sandbox-{}", job_id)
    }

    async fn ensure_image(&self) -> Result<(), RenderError> {
        let mut stream = self.docker.create_image(
            Some(CreateImageOptions {
                from_image: self.image.clone(),
                ..Default::default()
            }),
            None,
            None,
        );

        while let Some(result) = stream.next().await {
            if let Err(e) = result {
                return Err(RenderError::Provision(format!(
                    "failed to pull image '{}': {}",
                    self.image, e
                )));
            }
        }

        Ok(())
    }

    /// Create and start the sandbox container, returning its name and the
    /// host port mapped to the WebDriver endpoint. Ports are ephemeral so
    /// concurrent jobs never collide.
    async fn provision(&self, job_id: Uuid) -> Result<(String, u16), RenderError> {
        self.ensure_image().await?;

        let name = Self::container_name(job_id);

        let mut exposed_ports = HashMap::new();
        exposed_ports.insert(WEBDRIVER_PORT.to_string(), HashMap::new());

        let mut port_bindings = HashMap::new();
        port_bindings.insert(
            WEBDRIVER_PORT.to_string(),
            Some(vec![PortBinding {
                host_ip: Some("127.0.0.1".to_string()),
                host_port: Some("0".to_string()),
            }]),
        );

        let config = Config {
            image: Some(self.image.clone()),
            exposed_ports: Some(exposed_ports),
            host_config: Some(HostConfig {
                dns: Some(vec![SANDBOX_DNS.to_string()]),
                port_bindings: Some(port_bindings),
                ..Default::default()
            }),
            ..Default::default()
        };

        self.docker
            .create_container(
                Some(CreateContainerOptions {
                    name: name.clone(),
                    ..Default::default()
                }),
                config,
            )
            .await
            .map_err(|e| {
                RenderError::Provision(format!("failed to create container '{}': {}", name, e))
            })?;

        if let Err(e) = self
            .docker
            .start_container::<&str>(&name, Some(StartContainerOptions::default()))
            .await
        {
            // The created-but-unstarted container must not leak.
            self.teardown(&name).await;
            return Err(RenderError::Provision(format!(
                "failed to start container '{}': {}",
                name, e
            )));
        }

        tokio::time::sleep(WARMUP).await;

        match self.mapped_port(&name).await {
            Ok(port) => {
                info!(job_id = %job_id, container = %name, port, "sandbox ready");
                Ok((name, port))
            }
            Err(e) => {
                self.teardown(&name).await;
                Err(e)
            }
        }
    }

    async fn mapped_port(&self, name: &str) -> Result<u16, RenderError> {
        let details = self
            .docker
            .inspect_container(name, Some(InspectContainerOptions::default()))
            .await
            .map_err(|e| {
                RenderError::Provision(format!("failed to inspect container '{}': {}", name, e))
            })?;

        details
            .network_settings
            .and_then(|settings| settings.ports)
            .and_then(|ports| ports.get(WEBDRIVER_PORT).cloned())
            .flatten()
            .and_then(|bindings| bindings.into_iter().next())
            .and_then(|binding| binding.host_port)
            .and_then(|port| port.parse().ok())
            .ok_or_else(|| {
                RenderError::Provision(format!(
                    "no host port mapped for {} on '{}'",
                    WEBDRIVER_PORT, name
                ))
            })
    }

    /// Stop and remove the sandbox container. Best-effort: failures are
    /// logged, never propagated.
    async fn teardown(&self, name: &str) {
        debug!(container = name, "tearing down sandbox");
        if let Err(e) = self
            .docker
            .stop_container(name, Some(StopContainerOptions { t: 10 }))
            .await
        {
            warn!(container = name, error = %e, "failed to stop sandbox container");
        }
        if let Err(e) = self
            .docker
            .remove_container(
                name,
                Some(RemoveContainerOptions {
                    force: true,
                    ..Default::default()
                }),
            )
            .await
        {
            warn!(container = name, error = %e, "failed to remove sandbox container");
        }
    }

    async fn open_session(&self, base: &str) -> Result<String, RenderError> {
        let body = json!({
            "capabilities": {
                "alwaysMatch": {
                    "browserName": "chrome"
                }
            }
        });

        let resp = self
            .http
            .post(format!("{}/session", base))
            .json(&body)
            .send()
            .await
            .map_err(|e| RenderError::Provision(format!("WebDriver session request failed: {}", e)))?;

        let status = resp.status();
        if !status.is_success() {
            let detail = webdriver_error(&resp.text().await.unwrap_or_default());
            return Err(RenderError::Provision(format!(
                "WebDriver refused session ({}): {}",
                status, detail
            )));
        }

        let session: WdValue<WdSession> = resp
            .json()
            .await
            .map_err(|e| RenderError::Provision(format!("malformed session response: {}", e)))?;
        Ok(session.value.session_id)
    }

    async fn navigate(&self, base: &str, session: &str, url: &str) -> Result<(), RenderError> {
        let resp = self
            .http
            .post(format!("{}/session/{}/url", base, session))
            .json(&json!({ "url": url }))
            .send()
            .await
            .map_err(|e| RenderError::Navigation(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let detail = webdriver_error(&resp.text().await.unwrap_or_default());
            return Err(RenderError::Navigation(detail));
        }

        Ok(())
    }

    async fn screenshot(
        &self,
        base: &str,
        session: &str,
        job_id: Uuid,
    ) -> Result<(), RenderError> {
        let resp = self
            .http
            .get(format!("{}/session/{}/screenshot", base, session))
            .send()
            .await
            .map_err(|e| RenderError::Capture(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let detail = webdriver_error(&resp.text().await.unwrap_or_default());
            return Err(RenderError::Capture(detail));
        }

        let shot: WdValue<String> = resp
            .json()
            .await
            .map_err(|e| RenderError::Capture(format!("malformed screenshot response: {}", e)))?;

        let png = base64::engine::general_purpose::STANDARD
            .decode(shot.value.as_bytes())
            .map_err(|e| RenderError::Capture(format!("invalid screenshot payload: {}", e)))?;

        let path = self.screenshots_dir.join(format!("{}.png", job_id));
        tokio::fs::create_dir_all(&self.screenshots_dir)
            .await
            .map_err(|e| RenderError::Capture(e.to_string()))?;
        tokio::fs::write(&path, png)
            .await
            .map_err(|e| RenderError::Capture(e.to_string()))?;

        info!(job_id = %job_id, path = %path.display(), "screenshot saved");
        Ok(())
    }

    async fn close_session(&self, base: &str, session: &str) {
        if let Err(e) = self
            .http
            .delete(format!("{}/session/{}", base, session))
            .send()
            .await
        {
            debug!(error = %e, "failed to close WebDriver session");
        }
    }

    async fn drive(&self, base: &str, url: &str, job_id: Uuid) -> Result<String, RenderError> {
        let session = self.open_session(base).await?;

        let outcome = match self.navigate(base, &session, url).await {
            Ok(()) => self.screenshot(base, &session, job_id).await,
            Err(e) => Err(e),
        };
        self.close_session(base, &session).await;

        outcome.map(|_| public_screenshot_path(job_id))
    }
}

#[async_trait]
impl BaseRenderer for ContainerRenderer {
    async fn capture(&self, url: &str, job_id: Uuid) -> Result<String, RenderError> {
        let (container, port) = self.provision(job_id).await?;
        let base = format!("http://127.0.0.1:{}/wd/hub", port);

        let result = self.drive(&base, url, job_id).await;

        // Teardown is unconditional; a failed navigation must not leak the
        // container.
        self.teardown(&container).await;

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn screenshot_path_is_keyed_by_job_id() {
        let job_id = Uuid::new_v4();
        assert_eq!(
            public_screenshot_path(job_id),
            format!("/static/screenshots/{}.png", job_id)
        );
    }

    #[test]
    fn container_name_is_keyed_by_job_id() {
        let job_id = Uuid::new_v4();
        assert_eq!(
            ContainerRenderer::container_name(job_id),
            format!("sandbox-{}", job_id)
        );
    }

    #[test]
    fn webdriver_error_extracts_w3c_message() {
        let body = r#"{"value": {"error": "invalid argument", "message": "invalid url"}}"#;
        assert_eq!(webdriver_error(body), "invalid url");
    }

    #[test]
    fn webdriver_error_falls_back_to_raw_body() {
        assert_eq!(webdriver_error("gateway exploded"), "gateway exploded");
    }
}
