use super::event::Event;
use super::queue::EventQueue;
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::time::{Duration, Instant};

struct Pending {
	due: Instant,
	/// Insertion order, keeps same-deadline events FIFO
	order: u64,
	event: Event,
}

impl Pending {
	fn key(&self) -> (Instant, u64) {
		(self.due, self.order)
	}
}

impl PartialEq for Pending {
	fn eq(&self, other: &Self) -> bool {
		self.key() == other.key()
	}
}

impl Eq for Pending {}

impl PartialOrd for Pending {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

impl Ord for Pending {
	fn cmp(&self, other: &Self) -> Ordering {
		self.key().cmp(&other.key())
	}
}

/// Delayed events, released into the queue once due
#[derive(Default)]
pub struct Scheduler {
	pending: BinaryHeap<Reverse<Pending>>,
	next_order: u64,
}

impl Scheduler {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn schedule(&mut self, event: Event, delay: Duration) {
		self.schedule_at(event, Instant::now() + delay);
	}

	pub fn schedule_at(&mut self, event: Event, due: Instant) {
		let order = self.next_order;
		self.next_order += 1;
		self.pending.push(Reverse(Pending { due, order, event }));
	}

	pub fn tick(&mut self, queue: &mut EventQueue) {
		self.release_due(Instant::now(), queue);
	}

	/// Move every event due at or before `now` into the queue
	pub fn release_due(&mut self, now: Instant, queue: &mut EventQueue) {
		while self.pending.peek().is_some_and(|Reverse(p)| p.due <= now) {
			if let Some(Reverse(pending)) = self.pending.pop() {
				queue.push(pending.event);
			}
		}
	}

	/// Earliest deadline still waiting, used to schedule the next repaint
	pub fn next_deadline(&self) -> Option<Instant> {
		self.pending.peek().map(|Reverse(p)| p.due)
	}

	pub fn len(&self) -> usize {
		self.pending.len()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::reactor::{CountsEvent, FeedEvent};

	#[test]
	fn releases_only_due_events_in_deadline_order() {
		let mut scheduler = Scheduler::new();
		let mut queue = EventQueue::new();
		let start = Instant::now();

		scheduler.schedule_at(Event::Feed(FeedEvent::Detach), start + Duration::from_secs(2));
		scheduler.schedule_at(
			Event::Counts(CountsEvent::StopPolling),
			start + Duration::from_secs(1),
		);
		assert_eq!(scheduler.next_deadline(), Some(start + Duration::from_secs(1)));

		scheduler.release_due(start, &mut queue);
		assert!(queue.is_empty());

		scheduler.release_due(start + Duration::from_millis(1500), &mut queue);
		assert!(matches!(queue.pop(), Some(Event::Counts(CountsEvent::StopPolling))));
		assert!(queue.pop().is_none());
		assert_eq!(scheduler.len(), 1);

		scheduler.release_due(start + Duration::from_secs(2), &mut queue);
		assert!(matches!(queue.pop(), Some(Event::Feed(FeedEvent::Detach))));
		assert_eq!(scheduler.next_deadline(), None);
	}

	#[test]
	fn same_deadline_keeps_insertion_order() {
		let mut scheduler = Scheduler::new();
		let mut queue = EventQueue::new();
		let due = Instant::now();

		scheduler.schedule_at(Event::Feed(FeedEvent::Attach { source: "a".into() }), due);
		scheduler.schedule_at(Event::Feed(FeedEvent::Attach { source: "b".into() }), due);
		scheduler.release_due(due, &mut queue);

		let sources: Vec<String> = std::iter::from_fn(|| queue.pop())
			.filter_map(|e| match e {
				Event::Feed(FeedEvent::Attach { source }) => Some(source),
				_ => None,
			})
			.collect();
		assert_eq!(sources, vec!["a".to_owned(), "b".to_owned()]);
	}
}
