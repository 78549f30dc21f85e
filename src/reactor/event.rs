use crate::api::{Counts, Scenario};
use crate::types::PollingHandle;
use std::time::Duration;

#[derive(Clone, Debug)]
pub enum Event {
	Panel(PanelEvent),
	Gateway(GatewayEvent),
	Gallery(GalleryEvent),
	Counts(CountsEvent),
	Feed(FeedEvent),
}

impl Event {
	pub fn priority(&self) -> Priority {
		match self {
			Event::Gallery(GalleryEvent::LoadFailed { .. }) => Priority::Critical,
			Event::Panel(_) => Priority::High,
			Event::Counts(CountsEvent::Tick { .. }) => Priority::Low,
			Event::Counts(CountsEvent::PollFailed { .. }) => Priority::Low,
			Event::Counts(_) => Priority::Normal,
			Event::Gateway(_) => Priority::Normal,
			Event::Gallery(_) => Priority::Normal,
			Event::Feed(_) => Priority::Normal,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Priority {
	Critical = 0,
	High = 1,
	Normal = 2,
	Low = 3,
}

impl Priority {
	pub const COUNT: usize = 4;

	pub fn as_index(&self) -> usize {
		*self as usize
	}
}

/// User intents coming from the rendered UI
#[derive(Clone, Debug)]
pub enum PanelEvent {
	Start { id: String, title: String },
	Stop,
}

#[derive(Clone, Debug)]
pub enum GatewayEvent {
	FetchScenarios,
	FetchCounts { handle: PollingHandle, seq: u64 },
}

#[derive(Clone, Debug)]
pub enum GalleryEvent {
	/// Request the scenario list (page load or the reload button)
	Load,
	ScenariosReceived { scenarios: Vec<Scenario> },
	LoadFailed { message: String },
}

#[derive(Clone, Debug)]
pub enum CountsEvent {
	StartPolling,
	StopPolling,
	Tick {
		handle: PollingHandle,
	},
	Received {
		handle: PollingHandle,
		seq: u64,
		counts: Counts,
	},
	PollFailed {
		handle: PollingHandle,
		seq: u64,
		message: String,
	},
}

#[derive(Clone, Debug)]
pub enum FeedEvent {
	/// Point the video at a new source path, replacing any current one
	Attach { source: String },
	/// Clear the source and drop the connection
	Detach,
}

/// Response from component.handle()
#[derive(Default, Debug)]
pub struct ComponentResponse {
	/// Events to dispatch immediately
	pub events: Vec<Event>,
	/// Events to schedule (event, delay)
	pub scheduled: Vec<(Event, Duration)>,
}

impl ComponentResponse {
	pub fn none() -> Self {
		Self::default()
	}

	pub fn emit(event: Event) -> Self {
		Self::emit_many(vec![event])
	}

	pub fn emit_many(events: Vec<Event>) -> Self {
		Self {
			events,
			scheduled: vec![],
		}
	}

	pub fn schedule(event: Event, delay: Duration) -> Self {
		Self {
			events: vec![],
			scheduled: vec![(event, delay)],
		}
	}

	pub fn is_empty(&self) -> bool {
		self.events.is_empty() && self.scheduled.is_empty()
	}
}
