use directories::ProjectDirs;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Overrides `backend_url` from the config file
pub const BACKEND_URL_ENV: &str = "CROSSING_PANEL_BACKEND_URL";

const MIN_POLL_INTERVAL_MS: u64 = 100;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
	/// Base URL of the analytics backend, e.g. `http://127.0.0.1:8000`
	pub backend_url: String,
	/// Delay between two counts polls
	pub poll_interval_ms: u64,
	/// Timeout for the JSON endpoints; the video feed only gets a connect timeout
	pub request_timeout_secs: u64,
}

impl Default for PanelConfig {
	fn default() -> Self {
		Self {
			backend_url: "http://127.0.0.1:8000".to_owned(),
			poll_interval_ms: 1000,
			request_timeout_secs: 5,
		}
	}
}

impl PanelConfig {
	/// Load from the platform config dir, falling back to defaults.
	/// Never fails: a broken file is logged and ignored.
	pub fn load() -> Self {
		let mut config = match config_path() {
			Some(path) => match Self::load_from(&path) {
				Ok(Some(config)) => {
					log::info!("Loaded config from {}", path.display());
					config
				}
				Ok(None) => {
					log::info!("No config at {}, using defaults", path.display());
					Self::default()
				}
				Err(e) => {
					log::warn!("Ignoring config {}: {:#}", path.display(), e);
					Self::default()
				}
			},
			None => {
				log::warn!("Could not determine config directory, using defaults");
				Self::default()
			}
		};
		config.apply_backend_override(std::env::var(BACKEND_URL_ENV).ok());
		log::info!(
			"Backend: {}, poll interval: {:?}",
			config.backend_url,
			config.poll_interval()
		);
		config
	}

	/// Read a config file. `Ok(None)` when the file does not exist.
	pub fn load_from(path: &Path) -> anyhow::Result<Option<Self>> {
		if !path.exists() {
			return Ok(None);
		}
		let text = std::fs::read_to_string(path)?;
		Self::from_toml_str(&text).map(Some)
	}

	pub fn from_toml_str(text: &str) -> anyhow::Result<Self> {
		let config: PanelConfig = toml::from_str(text)?;
		if config.backend_url.trim().is_empty() {
			anyhow::bail!("backend_url must not be empty");
		}
		Ok(config)
	}

	fn apply_backend_override(&mut self, value: Option<String>) {
		if let Some(url) = value {
			let url = url.trim();
			if !url.is_empty() {
				log::info!("Backend URL overridden by {}", BACKEND_URL_ENV);
				self.backend_url = url.to_owned();
			}
		}
	}

	pub fn poll_interval(&self) -> Duration {
		Duration::from_millis(self.poll_interval_ms.max(MIN_POLL_INTERVAL_MS))
	}

	pub fn request_timeout(&self) -> Duration {
		Duration::from_secs(self.request_timeout_secs.max(1))
	}
}

pub fn config_path() -> Option<PathBuf> {
	ProjectDirs::from("", "", "crossing-panel").map(|dirs| dirs.config_dir().join("config.toml"))
}
