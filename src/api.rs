use crate::settings::PanelConfig;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

pub const SCENARIOS_PATH: &str = "/api/scenarios";
pub const COUNTS_PATH: &str = "/api/counts";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// A selectable video source as listed by the backend
#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
	pub id: String,
	pub title: String,
	pub video: String,
}

/// Snapshot of the line-crossing counters
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counts {
	#[serde(rename = "in")]
	pub count_in: u64,
	#[serde(rename = "out")]
	pub count_out: u64,
	pub total: u64,
}

/// Stream path for a scenario. `token` only defeats caching; the server ignores it.
pub fn video_feed_path(id: &str, token: u128) -> String {
	format!("/video_feed/{}?t={}", id, token)
}

/// Milliseconds since the unix epoch, used as the cache-busting token
pub fn cache_buster() -> u128 {
	SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.map(|d| d.as_millis())
		.unwrap_or_default()
}

pub struct PanelClient {
	client: reqwest::Client,
	base_url: String,
	request_timeout: Duration,
}

impl PanelClient {
	pub fn new(config: &PanelConfig) -> anyhow::Result<Self> {
		let client = reqwest::Client::builder()
			.user_agent(concat!("crossing-panel/", env!("CARGO_PKG_VERSION")))
			.connect_timeout(CONNECT_TIMEOUT)
			.build()?;
		Ok(Self {
			client,
			base_url: config.backend_url.trim().trim_end_matches('/').to_owned(),
			request_timeout: config.request_timeout(),
		})
	}

	pub fn url(&self, path: &str) -> String {
		format!("{}{}", self.base_url, path)
	}

	pub async fn fetch_scenarios(&self) -> anyhow::Result<Vec<Scenario>> {
		let scenarios: Vec<Scenario> = self.get_json(SCENARIOS_PATH).await?;
		log::info!("Found {} scenarios", scenarios.len());
		Ok(scenarios)
	}

	pub async fn fetch_counts(&self) -> anyhow::Result<Counts> {
		self.get_json(COUNTS_PATH).await
	}

	/// Open the continuous video stream. No request timeout, the body never ends.
	pub async fn open_feed(&self, source: &str) -> anyhow::Result<reqwest::Response> {
		let url = self.url(source);
		log::info!("Opening video feed: {}", url);
		let response = self.client.get(&url).send().await?;
		let status = response.status();
		if !status.is_success() {
			anyhow::bail!("Video feed request failed with status: {}", status);
		}
		Ok(response)
	}

	async fn get_json<T: DeserializeOwned>(&self, path: &str) -> anyhow::Result<T> {
		let url = self.url(path);
		log::debug!("GET {}", url);

		let response = self
			.client
			.get(&url)
			.timeout(self.request_timeout)
			.send()
			.await?;

		let status = response.status();
		if !status.is_success() {
			let error_text = response
				.text()
				.await
				.unwrap_or_else(|_| "<failed to read error text>".into());
			log::debug!("GET {} failed. Status: {}, Body: {}", path, status, error_text);
			anyhow::bail!("Request to {} failed with status: {}", path, status);
		}

		let text = response.text().await?;
		log::trace!("GET {} body length: {}", path, text.len());
		Ok(serde_json::from_str(&text)?)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::test_support::{CannedResponse, FakeBackend};

	fn client_for(backend: &FakeBackend) -> PanelClient {
		let config = PanelConfig {
			backend_url: format!("{}/", backend.base_url),
			..Default::default()
		};
		PanelClient::new(&config).unwrap()
	}

	#[test]
	fn counts_use_in_out_total_keys() {
		let counts: Counts = serde_json::from_str(r#"{"in":3,"out":1,"total":4}"#).unwrap();
		assert_eq!(
			counts,
			Counts {
				count_in: 3,
				count_out: 1,
				total: 4
			}
		);
	}

	#[test]
	fn scenario_ignores_extra_backend_fields() {
		let scenario: Scenario = serde_json::from_str(
			r#"{"id":"2","title":"Scenario 2: Loading Platform","video":"s2.mp4","config":"config/scenario2_config.yaml"}"#,
		)
		.unwrap();
		assert_eq!(scenario.id, "2");
		assert_eq!(scenario.title, "Scenario 2: Loading Platform");
		assert_eq!(scenario.video, "s2.mp4");
	}

	#[test]
	fn video_feed_path_carries_token() {
		assert_eq!(video_feed_path("3", 1700000000123), "/video_feed/3?t=1700000000123");
		assert!(cache_buster() > 0);
	}

	#[tokio::test]
	async fn fetch_scenarios_keeps_backend_order() {
		let backend = FakeBackend::start(|path| match path {
			SCENARIOS_PATH => CannedResponse::json(
				r#"[{"id":"2","title":"Dock","video":"b.mp4"},{"id":"1","title":"Lobby","video":"a.mp4"}]"#,
			),
			_ => CannedResponse::status(404),
		})
		.await;
		let client = client_for(&backend);

		let scenarios = client.fetch_scenarios().await.unwrap();
		let titles: Vec<&str> = scenarios.iter().map(|s| s.title.as_str()).collect();
		assert_eq!(titles, vec!["Dock", "Lobby"]);
		assert_eq!(backend.requests(), vec![SCENARIOS_PATH.to_owned()]);
	}

	#[tokio::test]
	async fn fetch_scenarios_fails_on_server_error_and_bad_json() {
		let backend = FakeBackend::start(|path| match path {
			SCENARIOS_PATH => CannedResponse::status(500),
			_ => CannedResponse::json("{not json"),
		})
		.await;
		let client = client_for(&backend);

		assert!(client.fetch_scenarios().await.is_err());
		assert!(client.fetch_counts().await.is_err());
	}

	#[tokio::test]
	async fn fetch_counts_decodes_snapshot() {
		let backend =
			FakeBackend::start(|_| CannedResponse::json(r#"{"in":0,"out":0,"total":0}"#)).await;
		let client = client_for(&backend);

		assert_eq!(client.fetch_counts().await.unwrap(), Counts::default());
		assert_eq!(backend.requests(), vec![COUNTS_PATH.to_owned()]);
	}
}
