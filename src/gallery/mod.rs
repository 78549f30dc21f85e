use crate::api::Scenario;
use crate::reactor::{ComponentResponse, Event, GalleryEvent, GatewayEvent};

pub const SCENARIO_LOAD_ERROR: &str = "Failed to load scenarios. Ensure backend is running.";

/// One rendered scenario card
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioCard {
	pub id: String,
	pub title: String,
	pub video: String,
}

impl From<Scenario> for ScenarioCard {
	fn from(scenario: Scenario) -> Self {
		Self {
			id: scenario.id,
			title: scenario.title,
			video: scenario.video,
		}
	}
}

pub struct ScenarioGallery {
	cards: Vec<ScenarioCard>,
	load_error: Option<String>,
	loading: bool,
}

impl ScenarioGallery {
	pub fn new() -> Self {
		Self {
			cards: Vec::new(),
			load_error: None,
			loading: false,
		}
	}

	pub fn handle(&mut self, event: &Event) -> ComponentResponse {
		match event {
			Event::Gallery(GalleryEvent::Load) => {
				if self.loading {
					log::debug!("Scenario load already in flight");
					return ComponentResponse::none();
				}
				log::info!("Loading scenarios");
				self.loading = true;
				ComponentResponse::emit(Event::Gateway(GatewayEvent::FetchScenarios))
			}
			Event::Gallery(GalleryEvent::ScenariosReceived { scenarios }) => {
				self.loading = false;
				self.render_scenarios(scenarios.clone());
				ComponentResponse::none()
			}
			Event::Gallery(GalleryEvent::LoadFailed { message }) => {
				log::error!("Scenario load failed: {}", message);
				self.loading = false;
				self.cards.clear();
				self.load_error = Some(SCENARIO_LOAD_ERROR.to_owned());
				ComponentResponse::none()
			}
			_ => ComponentResponse::none(),
		}
	}

	/// Replace all cards with `scenarios`, in the order given
	pub fn render_scenarios(&mut self, scenarios: Vec<Scenario>) {
		self.cards = scenarios.into_iter().map(ScenarioCard::from).collect();
		self.load_error = None;
		log::info!("Rendered {} scenario cards", self.cards.len());
	}

	pub fn cards(&self) -> &[ScenarioCard] {
		&self.cards
	}

	pub fn load_error(&self) -> Option<&str> {
		self.load_error.as_deref()
	}

	pub fn is_loading(&self) -> bool {
		self.loading
	}
}

impl Default for ScenarioGallery {
	fn default() -> Self {
		Self::new()
	}
}
