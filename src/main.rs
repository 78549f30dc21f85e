#![windows_subsystem = "windows"]

mod api;
mod counts;
mod feed;
mod gallery;
mod gateway;
mod panel;
mod reactor;
mod settings;
#[cfg(test)]
mod test_support;
mod types;
mod view;

use api::PanelClient;
use reactor::Reactor;
use settings::PanelConfig;
use std::sync::Arc;

#[tokio::main]
async fn main() -> eframe::Result<()> {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

	let config = PanelConfig::load();
	let client = match PanelClient::new(&config) {
		Ok(client) => Arc::new(client),
		Err(e) => {
			log::error!("Failed to build HTTP client: {:#}", e);
			std::process::exit(1);
		}
	};

	let native_options = eframe::NativeOptions {
		viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1280.0, 720.0]),
		..Default::default()
	};

	eframe::run_native(
		"Crossing Panel",
		native_options,
		Box::new(move |cc| Ok(Box::new(Reactor::new(&cc.egui_ctx, client, &config)))),
	)
}
