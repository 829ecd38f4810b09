use std::{collections::HashMap, fs, time::Duration};

use anyhow::{anyhow, bail, Context};
use url::Url;

use crate::portainer::PortainerConfig;

#[derive(Debug, Clone)]
pub struct Settings {
    pub server_bind: String,
    pub ankiconnect_url: Option<String>,
    pub handle_container: bool,
    pub portainer_url: String,
    pub portainer_username: Option<String>,
    pub portainer_password: Option<String>,
    pub portainer_endpoint_id: String,
    pub portainer_container_id: Option<String>,
    pub container_start_wait_seconds: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_bind: "127.0.0.1:8088".into(),
            ankiconnect_url: None,
            handle_container: false,
            portainer_url: "http://localhost:9000".into(),
            portainer_username: None,
            portainer_password: None,
            portainer_endpoint_id: "1".into(),
            portainer_container_id: None,
            container_start_wait_seconds: 10,
        }
    }
}

pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string("server.toml") {
        if let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(&raw) {
            apply_file_overrides(&mut settings, &file_cfg);
        }
    }

    apply_env_overrides(&mut settings);
    settings
}

fn apply_file_overrides(settings: &mut Settings, file_cfg: &HashMap<String, String>) {
    if let Some(v) = file_cfg.get("bind_addr") {
        settings.server_bind = v.clone();
    }
    if let Some(v) = file_cfg.get("ankiconnect_url") {
        settings.ankiconnect_url = Some(v.clone());
    }
    if let Some(v) = file_cfg.get("handle_container") {
        settings.handle_container = parse_bool_flag(v);
    }
    if let Some(v) = file_cfg.get("portainer_url") {
        settings.portainer_url = v.clone();
    }
    if let Some(v) = file_cfg.get("portainer_username") {
        settings.portainer_username = Some(v.clone());
    }
    if let Some(v) = file_cfg.get("portainer_password") {
        settings.portainer_password = Some(v.clone());
    }
    if let Some(v) = file_cfg.get("portainer_endpoint_id") {
        settings.portainer_endpoint_id = v.clone();
    }
    if let Some(v) = file_cfg.get("portainer_container_id") {
        settings.portainer_container_id = Some(v.clone());
    }
    if let Some(v) = file_cfg.get("container_start_wait_seconds") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.container_start_wait_seconds = parsed;
        }
    }
}

fn apply_env_overrides(settings: &mut Settings) {
    if let Ok(v) = std::env::var("SERVER_BIND") {
        settings.server_bind = v;
    }
    if let Ok(v) = std::env::var("APP__BIND_ADDR") {
        settings.server_bind = v;
    }

    if let Ok(v) = std::env::var("ANKICONNECT_URL") {
        settings.ankiconnect_url = Some(v);
    }
    if let Ok(v) = std::env::var("APP__ANKICONNECT_URL") {
        settings.ankiconnect_url = Some(v);
    }

    if let Ok(v) = std::env::var("HANDLE_CONTAINER") {
        settings.handle_container = parse_bool_flag(&v);
    }

    if let Ok(v) = std::env::var("PORTAINER_URL") {
        settings.portainer_url = v;
    }
    if let Ok(v) = std::env::var("PORTAINER_USERNAME") {
        settings.portainer_username = Some(v);
    }
    if let Ok(v) = std::env::var("PORTAINER_PASSWORD") {
        settings.portainer_password = Some(v);
    }
    if let Ok(v) = std::env::var("PORTAINER_ENDPOINT_ID") {
        settings.portainer_endpoint_id = v;
    }
    if let Ok(v) = std::env::var("PORTAINER_CONTAINER_ID") {
        settings.portainer_container_id = Some(v);
    }

    if let Ok(v) = std::env::var("APP__CONTAINER_START_WAIT_SECONDS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.container_start_wait_seconds = parsed;
        }
    }
}

/// "1", "true", "yes", and "on" enable a flag, case-insensitively.
pub fn parse_bool_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

pub fn normalize_service_url(raw: &str) -> anyhow::Result<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        bail!("service url is empty");
    }
    let parsed =
        Url::parse(trimmed).with_context(|| format!("invalid service url '{trimmed}'"))?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        bail!(
            "unsupported scheme '{}' in service url '{trimmed}'",
            parsed.scheme()
        );
    }
    Ok(trimmed.to_string())
}

impl Settings {
    /// Supervision settings become a usable config only when the
    /// credentials and container id are all present.
    pub fn portainer_config(&self) -> anyhow::Result<PortainerConfig> {
        let username = self
            .portainer_username
            .clone()
            .ok_or_else(|| anyhow!("PORTAINER_USERNAME is not set"))?;
        let password = self
            .portainer_password
            .clone()
            .ok_or_else(|| anyhow!("PORTAINER_PASSWORD is not set"))?;
        let container_id = self
            .portainer_container_id
            .clone()
            .ok_or_else(|| anyhow!("PORTAINER_CONTAINER_ID is not set"))?;

        Ok(PortainerConfig {
            url: normalize_service_url(&self.portainer_url)?,
            username,
            password,
            endpoint_id: self.portainer_endpoint_id.clone(),
            container_id,
            start_wait: Duration::from_secs(self.container_start_wait_seconds),
        })
    }
}
