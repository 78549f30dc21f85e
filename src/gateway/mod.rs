use crate::api::{Counts, PanelClient, Scenario};
use crate::reactor::{ComponentResponse, CountsEvent, Event, GalleryEvent, GatewayEvent};
use crate::types::PollingHandle;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Message from async tasks back to the component
pub enum GatewayMessage {
	ScenariosLoaded {
		result: anyhow::Result<Vec<Scenario>>,
	},
	CountsLoaded {
		handle: PollingHandle,
		seq: u64,
		result: anyhow::Result<Counts>,
	},
}

/// Runs the JSON fetches off the UI thread and turns their outcome into events
pub struct PanelGateway {
	client: Arc<PanelClient>,
	sender: mpsc::Sender<GatewayMessage>,
	receiver: mpsc::Receiver<GatewayMessage>,
	in_flight: usize,
}

impl PanelGateway {
	pub fn new(client: Arc<PanelClient>) -> Self {
		let (sender, receiver) = mpsc::channel(100);
		Self {
			client,
			sender,
			receiver,
			in_flight: 0,
		}
	}

	pub fn poll(&mut self) -> ComponentResponse {
		let mut responses = Vec::new();
		while let Ok(msg) = self.receiver.try_recv() {
			self.in_flight = self.in_flight.saturating_sub(1);
			match msg {
				GatewayMessage::ScenariosLoaded { result } => match result {
					Ok(scenarios) => {
						responses.push(Event::Gallery(GalleryEvent::ScenariosReceived { scenarios }))
					}
					Err(e) => responses.push(Event::Gallery(GalleryEvent::LoadFailed {
						message: format!("{:#}", e),
					})),
				},
				GatewayMessage::CountsLoaded {
					handle,
					seq,
					result,
				} => match result {
					Ok(counts) => responses.push(Event::Counts(CountsEvent::Received {
						handle,
						seq,
						counts,
					})),
					Err(e) => responses.push(Event::Counts(CountsEvent::PollFailed {
						handle,
						seq,
						message: format!("{:#}", e),
					})),
				},
			}
		}

		if responses.is_empty() {
			ComponentResponse::none()
		} else {
			ComponentResponse::emit_many(responses)
		}
	}

	pub fn handle(&mut self, event: &Event) -> ComponentResponse {
		match event {
			Event::Gateway(GatewayEvent::FetchScenarios) => {
				self.spawn_scenarios_fetch();
			}
			Event::Gateway(GatewayEvent::FetchCounts { handle, seq }) => {
				self.spawn_counts_fetch(*handle, *seq);
			}
			_ => {}
		}
		ComponentResponse::none()
	}

	fn spawn_scenarios_fetch(&mut self) {
		log::debug!("Spawning scenario list request");
		self.in_flight += 1;
		let client = self.client.clone();
		let sender = self.sender.clone();

		tokio::spawn(async move {
			let result = client.fetch_scenarios().await;
			if let Err(e) = &result {
				log::error!("Scenario request failed: {:#}", e);
			}
			let _ = sender.send(GatewayMessage::ScenariosLoaded { result }).await;
		});
	}

	fn spawn_counts_fetch(&mut self, handle: PollingHandle, seq: u64) {
		log::trace!("Spawning counts request #{}", seq);
		self.in_flight += 1;
		let client = self.client.clone();
		let sender = self.sender.clone();

		tokio::spawn(async move {
			let result = client.fetch_counts().await;
			let _ = sender
				.send(GatewayMessage::CountsLoaded {
					handle,
					seq,
					result,
				})
				.await;
		});
	}

	pub fn is_busy(&self) -> bool {
		self.in_flight > 0
	}
}
