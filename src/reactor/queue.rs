use super::event::{Event, Priority};
use std::collections::VecDeque;

/// FIFO per priority level; higher levels always drain first
#[derive(Default)]
pub struct EventQueue {
	lanes: [VecDeque<Event>; Priority::COUNT],
}

impl EventQueue {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn push(&mut self, event: Event) {
		let lane = event.priority().as_index();
		self.lanes[lane].push_back(event);
	}

	pub fn pop(&mut self) -> Option<Event> {
		self.lanes.iter_mut().find_map(|lane| lane.pop_front())
	}

	pub fn len(&self) -> usize {
		self.lanes.iter().map(VecDeque::len).sum()
	}

	pub fn is_empty(&self) -> bool {
		self.lanes.iter().all(VecDeque::is_empty)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::reactor::{CountsEvent, GalleryEvent, PanelEvent};
	use crate::types::PollingHandle;

	#[test]
	fn higher_priority_pops_first_and_fifo_within_level() {
		let mut queue = EventQueue::new();
		queue.push(Event::Counts(CountsEvent::Tick {
			handle: PollingHandle::new(1),
		}));
		queue.push(Event::Gallery(GalleryEvent::Load));
		queue.push(Event::Panel(PanelEvent::Stop));
		queue.push(Event::Gallery(GalleryEvent::LoadFailed {
			message: "down".into(),
		}));
		queue.push(Event::Counts(CountsEvent::StopPolling));
		assert_eq!(queue.len(), 5);

		assert!(matches!(queue.pop(), Some(Event::Gallery(GalleryEvent::LoadFailed { .. }))));
		assert!(matches!(queue.pop(), Some(Event::Panel(PanelEvent::Stop))));
		assert!(matches!(queue.pop(), Some(Event::Gallery(GalleryEvent::Load))));
		assert!(matches!(queue.pop(), Some(Event::Counts(CountsEvent::StopPolling))));
		assert!(matches!(queue.pop(), Some(Event::Counts(CountsEvent::Tick { .. }))));
		assert!(queue.pop().is_none());
		assert!(queue.is_empty());
	}
}
