/// Top-level UI mode. Exactly one region is visible at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewState {
	#[default]
	Gallery,
	Streaming,
}

impl ViewState {
	pub fn gallery_visible(self) -> bool {
		self == ViewState::Gallery
	}

	pub fn streaming_visible(self) -> bool {
		self == ViewState::Streaming
	}
}

/// Token for one counts polling loop.
///
/// Ticks and responses carry the handle of the loop that issued them, so
/// anything tagged with a replaced handle can be told apart and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PollingHandle {
	generation: u64,
}

impl PollingHandle {
	pub fn new(generation: u64) -> Self {
		Self { generation }
	}

	pub fn generation(&self) -> u64 {
		self.generation
	}
}
