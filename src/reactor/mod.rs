pub mod event;
pub mod queue;
pub mod scheduler;

pub use event::{
	ComponentResponse, CountsEvent, Event, FeedEvent, GalleryEvent, GatewayEvent, PanelEvent,
};
pub use queue::EventQueue;
pub use scheduler::Scheduler;

use crate::api::PanelClient;
use crate::counts::CountsPoller;
use crate::feed::VideoFeed;
use crate::gallery::ScenarioGallery;
use crate::gateway::PanelGateway;
use crate::panel::PanelController;
use crate::settings::PanelConfig;
use crate::view::ViewManager;
use eframe::egui;
use std::sync::Arc;
use std::time::{Duration, Instant};

const MAX_EVENTS_PER_PUMP: usize = 1000;

/// Repaint cadence while a JSON request is outstanding
const BUSY_REPAINT: Duration = Duration::from_millis(50);

pub struct Reactor {
	queue: EventQueue,
	scheduler: Scheduler,

	pub panel: PanelController,
	pub gallery: ScenarioGallery,
	pub gateway: PanelGateway,
	pub counts: CountsPoller,
	pub feed: VideoFeed,
	pub view: ViewManager,
}

impl Reactor {
	pub fn new(ctx: &egui::Context, client: Arc<PanelClient>, config: &PanelConfig) -> Self {
		log::info!("Initializing all components");
		let mut reactor = Self {
			queue: EventQueue::new(),
			scheduler: Scheduler::new(),
			panel: PanelController::new(),
			gallery: ScenarioGallery::new(),
			gateway: PanelGateway::new(client.clone()),
			counts: CountsPoller::new(config.poll_interval()),
			feed: VideoFeed::new(ctx, client),
			view: ViewManager::new(),
		};

		reactor.process_response(reactor.panel.initialize());
		log::info!("Initialization complete");

		reactor
	}

	fn process_response(&mut self, response: ComponentResponse) {
		if response.is_empty() {
			return;
		}
		for e in response.events {
			self.queue.push(e);
		}
		for (e, d) in response.scheduled {
			self.scheduler.schedule(e, d);
		}
	}

	/// Queue an event for the next pump
	pub fn dispatch(&mut self, event: Event) {
		self.queue.push(event);
	}

	/// Release due timers, collect async results and drain the event queue
	pub fn pump(&mut self) {
		self.scheduler.tick(&mut self.queue);

		let gateway_response = self.gateway.poll();
		let feed_response = self.feed.poll();
		self.process_response(gateway_response);
		self.process_response(feed_response);

		self.drain_queue();
	}

	fn drain_queue(&mut self) {
		let mut iterations = 0;
		while let Some(event) = self.queue.pop() {
			log::trace!("Processing event: {:?}", event);
			let response = self.route(&event);
			self.process_response(response);

			iterations += 1;
			if iterations > MAX_EVENTS_PER_PUMP {
				log::warn!(
					"Event loop exceeded {} iterations, breaking with {} queued",
					MAX_EVENTS_PER_PUMP,
					self.queue.len()
				);
				break;
			}
		}
	}

	pub fn tick(&mut self, ctx: &egui::Context) {
		self.pump();

		let events = self
			.view
			.render(ctx, &self.panel, &self.gallery, &self.counts, &self.feed);

		// Clicks take effect in this frame, not the next one
		for event in events {
			log::trace!("Processing render event: {:?}", event);
			let response = self.route(&event);
			self.process_response(response);
		}
		self.drain_queue();

		if self.gateway.is_busy() {
			ctx.request_repaint_after(BUSY_REPAINT);
		}
		if let Some(deadline) = self.scheduler.next_deadline() {
			log::trace!("{} timers pending", self.scheduler.len());
			ctx.request_repaint_after(deadline.saturating_duration_since(Instant::now()));
		}
	}

	fn route(&mut self, event: &Event) -> ComponentResponse {
		match event {
			Event::Panel(_) => self.panel.handle(event),
			Event::Gateway(_) => self.gateway.handle(event),
			Event::Gallery(_) => self.gallery.handle(event),
			Event::Counts(_) => self.counts.handle(event),
			Event::Feed(_) => self.feed.handle(event),
		}
	}
}

impl eframe::App for Reactor {
	fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
		self.tick(ctx);
	}
}
