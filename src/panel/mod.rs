use crate::api::{cache_buster, video_feed_path};
use crate::reactor::{ComponentResponse, CountsEvent, Event, FeedEvent, GalleryEvent, PanelEvent};
use crate::types::ViewState;

/// Switches between the gallery and the streaming view and wires a selected
/// scenario to the video feed and the counts poller.
pub struct PanelController {
	view_state: ViewState,
	title: String,
	clock: fn() -> u128,
}

impl PanelController {
	pub fn new() -> Self {
		Self::with_clock(cache_buster)
	}

	/// `clock` supplies the cache-busting token for stream URLs
	pub fn with_clock(clock: fn() -> u128) -> Self {
		Self {
			view_state: ViewState::Gallery,
			title: String::new(),
			clock,
		}
	}

	/// Page-ready entry point: ask for the scenario list
	pub fn initialize(&self) -> ComponentResponse {
		ComponentResponse::emit(Event::Gallery(GalleryEvent::Load))
	}

	pub fn handle(&mut self, event: &Event) -> ComponentResponse {
		match event {
			Event::Panel(PanelEvent::Start { id, title }) => self.start_scenario(id, title),
			Event::Panel(PanelEvent::Stop) => self.stop_stream(),
			_ => ComponentResponse::none(),
		}
	}

	pub fn start_scenario(&mut self, id: &str, title: &str) -> ComponentResponse {
		log::info!("Starting scenario {} ({})", id, title);
		self.view_state = ViewState::Streaming;
		self.title = format!("Analyzing: {}", title);

		let source = video_feed_path(id, (self.clock)());
		ComponentResponse::emit_many(vec![
			Event::Feed(FeedEvent::Attach { source }),
			Event::Counts(CountsEvent::StartPolling),
		])
	}

	pub fn stop_stream(&mut self) -> ComponentResponse {
		log::info!("Stopping stream");
		let detach = Event::Feed(FeedEvent::Detach);
		self.view_state = ViewState::Gallery;
		ComponentResponse::emit_many(vec![detach, Event::Counts(CountsEvent::StopPolling)])
	}

	pub fn view_state(&self) -> ViewState {
		self.view_state
	}

	pub fn title(&self) -> &str {
		&self.title
	}
}

impl Default for PanelController {
	fn default() -> Self {
		Self::new()
	}
}
