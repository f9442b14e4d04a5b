use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

use crate::views::ViewConfig;

pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:8080";
pub const DEFAULT_MODEL_PATH: &str = "trained_plant_disease_model.onnx";
pub const DEFAULT_SIDEBAR_IMAGE: &str = "Diseases.png";
/// Largest accepted upload, 10 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid BIND_ADDRESS {value:?}: {reason}")]
    InvalidBindAddress { value: String, reason: String },

    #[error("invalid PLANT_MAX_UPLOAD_BYTES {value:?}: expected a positive byte count")]
    InvalidUploadLimit { value: String },
}

/// Server settings, read once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_address: SocketAddr,
    pub model_path: PathBuf,
    pub sidebar_image: PathBuf,
    pub max_upload_bytes: usize,
    pub view: ViewConfig,
}

impl AppConfig {
    /// Read settings from the process environment (and `.env`, if present).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind = lookup("BIND_ADDRESS").unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());
        let bind_address = bind
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidBindAddress {
                value: bind.clone(),
                reason: e.to_string(),
            })?;

        let model_path = lookup("PLANT_MODEL_PATH")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL_PATH.to_string());
        let sidebar_image = lookup("PLANT_SIDEBAR_IMAGE")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_SIDEBAR_IMAGE.to_string());

        let max_upload_bytes = match lookup("PLANT_MAX_UPLOAD_BYTES").filter(|v| !v.is_empty()) {
            Some(value) => match value.parse::<usize>() {
                Ok(limit) if limit > 0 => limit,
                _ => return Err(ConfigError::InvalidUploadLimit { value }),
            },
            None => DEFAULT_MAX_UPLOAD_BYTES,
        };

        let mut view = ViewConfig::default();
        if let Some(title) = lookup("PLANT_APP_TITLE").filter(|v| !v.is_empty()) {
            view.title = title;
        }

        Ok(Self {
            bind_address,
            model_path: PathBuf::from(model_path),
            sidebar_image: PathBuf::from(sidebar_image),
            max_upload_bytes,
            view,
        })
    }
}
