use crate::api::Counts;
use crate::reactor::{ComponentResponse, CountsEvent, Event, GatewayEvent};
use crate::types::PollingHandle;
use std::time::Duration;

/// Owns the single counts polling loop and the displayed counters.
///
/// Each loop is identified by a [`PollingHandle`]. Starting a loop replaces the
/// active handle, so ticks still sitting in the scheduler for the old loop die
/// on arrival. Every request also gets a sequence number and responses older
/// than the last applied one are dropped, which keeps out-of-order replies from
/// rolling the counters back.
pub struct CountsPoller {
	interval: Duration,
	active: Option<PollingHandle>,
	next_generation: u64,
	next_seq: u64,
	last_applied_seq: Option<u64>,
	counts: Counts,
	failed_polls: u64,
}

impl CountsPoller {
	pub fn new(interval: Duration) -> Self {
		Self {
			interval,
			active: None,
			next_generation: 0,
			next_seq: 0,
			last_applied_seq: None,
			counts: Counts::default(),
			failed_polls: 0,
		}
	}

	pub fn handle(&mut self, event: &Event) -> ComponentResponse {
		match event {
			Event::Counts(CountsEvent::StartPolling) => {
				let handle = PollingHandle::new(self.next_generation);
				self.next_generation += 1;
				if let Some(previous) = self.active.replace(handle) {
					log::debug!(
						"Replacing polling loop {} with {}",
						previous.generation(),
						handle.generation()
					);
				}
				log::info!(
					"Counts polling started (loop {}, every {:?})",
					handle.generation(),
					self.interval
				);
				ComponentResponse::schedule(Event::Counts(CountsEvent::Tick { handle }), self.interval)
			}
			Event::Counts(CountsEvent::StopPolling) => {
				if let Some(handle) = self.active.take() {
					log::info!("Counts polling stopped (loop {})", handle.generation());
				}
				ComponentResponse::none()
			}
			Event::Counts(CountsEvent::Tick { handle }) => {
				if !self.is_active(*handle) {
					log::trace!("Dropping tick of cancelled loop {}", handle.generation());
					return ComponentResponse::none();
				}
				let seq = self.next_seq;
				self.next_seq += 1;

				let mut response = ComponentResponse::emit(Event::Gateway(GatewayEvent::FetchCounts {
					handle: *handle,
					seq,
				}));
				response
					.scheduled
					.push((Event::Counts(CountsEvent::Tick { handle: *handle }), self.interval));
				response
			}
			Event::Counts(CountsEvent::Received {
				handle,
				seq,
				counts,
			}) => {
				if !self.is_active(*handle) {
					log::debug!("Discarding counts #{} from cancelled loop", seq);
					return ComponentResponse::none();
				}
				if self.last_applied_seq.is_some_and(|last| *seq <= last) {
					log::debug!(
						"Discarding stale counts #{} (already applied #{:?})",
						seq,
						self.last_applied_seq
					);
					return ComponentResponse::none();
				}
				self.last_applied_seq = Some(*seq);
				self.counts = *counts;
				log::trace!("Counts #{}: {:?}", seq, counts);
				ComponentResponse::none()
			}
			Event::Counts(CountsEvent::PollFailed {
				handle,
				seq,
				message,
			}) => {
				if !self.is_active(*handle) {
					log::debug!("Discarding failure #{} from cancelled loop: {}", seq, message);
					return ComponentResponse::none();
				}
				self.failed_polls += 1;
				log::error!(
					"Failed to poll counts (loop {}, #{}): {}",
					handle.generation(),
					seq,
					message
				);
				ComponentResponse::none()
			}
			_ => ComponentResponse::none(),
		}
	}

	fn is_active(&self, handle: PollingHandle) -> bool {
		self.active == Some(handle)
	}

	// Accessors for ViewManager
	pub fn counts(&self) -> Counts {
		self.counts
	}

	pub fn active_handle(&self) -> Option<PollingHandle> {
		self.active
	}

	pub fn is_polling(&self) -> bool {
		self.active.is_some()
	}

	pub fn failed_polls(&self) -> u64 {
		self.failed_polls
	}
}

impl Default for CountsPoller {
	fn default() -> Self {
		Self::new(Duration::from_secs(1))
	}
}
