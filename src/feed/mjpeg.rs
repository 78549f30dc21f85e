//! Splits a `multipart/x-mixed-replace` body into its JPEG parts.
//!
//! Parts look like `--frame\r\nContent-Type: image/jpeg\r\n\r\n<jpeg>\r\n`.
//! A part with a `Content-Length` header is complete as soon as that many body
//! bytes arrived; otherwise it ends at the next `\r\n--frame` delimiter, so the
//! newest frame is released one part late.

pub const DEFAULT_BOUNDARY: &str = "frame";

/// Parts larger than this mean we lost sync; the buffer is dropped
const MAX_BUFFERED: usize = 16 * 1024 * 1024;

const HEADER_END: &[u8] = b"\r\n\r\n";

/// Pull the `boundary` parameter out of a multipart content type
pub fn boundary_from_content_type(content_type: &str) -> Option<String> {
	content_type
		.split(';')
		.skip(1)
		.filter_map(|param| param.split_once('='))
		.find(|(key, _)| key.trim().eq_ignore_ascii_case("boundary"))
		.map(|(_, value)| value.trim().trim_matches('"').to_owned())
		.filter(|boundary| !boundary.is_empty())
}

pub struct MjpegSplitter {
	/// `--boundary`
	dash_boundary: Vec<u8>,
	/// `\r\n--boundary`, terminates a part body
	delimiter: Vec<u8>,
	buffer: Vec<u8>,
	/// `buffer` starts with `dash_boundary`
	aligned: bool,
	/// Offset of the current part's blank line, once seen
	header_end: Option<usize>,
	/// Where the next header or delimiter search resumes
	scanned: usize,
}

enum Step {
	Part(Vec<u8>),
	/// The front of the buffer was dropped, look again
	Resync,
	NeedMore,
}

impl MjpegSplitter {
	pub fn new(boundary: &str) -> Self {
		let dash_boundary = format!("--{}", boundary).into_bytes();
		let mut delimiter = b"\r\n".to_vec();
		delimiter.extend_from_slice(&dash_boundary);
		Self {
			dash_boundary,
			delimiter,
			buffer: Vec::new(),
			aligned: false,
			header_end: None,
			scanned: 0,
		}
	}

	/// Feed one network chunk, get back every part body it completed
	pub fn push(&mut self, chunk: &[u8]) -> Vec<Vec<u8>> {
		self.buffer.extend_from_slice(chunk);
		let mut parts = Vec::new();

		loop {
			match self.next_part() {
				Step::Part(part) if part.is_empty() => {}
				Step::Part(part) => parts.push(part),
				Step::Resync => {}
				Step::NeedMore => break,
			}
		}

		if self.buffer.len() > MAX_BUFFERED {
			log::warn!(
				"[Feed] Dropping {} buffered bytes without a complete part",
				self.buffer.len()
			);
			self.buffer.clear();
			self.reset_part();
		}
		parts
	}

	fn next_part(&mut self) -> Step {
		if !self.aligned {
			// Skip preamble or the CRLF left over from the previous part
			match find(&self.buffer, &self.dash_boundary) {
				Some(start) => {
					self.buffer.drain(..start);
					self.aligned = true;
					self.scanned = self.dash_boundary.len();
				}
				None => {
					let keep = self.dash_boundary.len() - 1;
					if self.buffer.len() > keep {
						let excess = self.buffer.len() - keep;
						self.buffer.drain(..excess);
					}
					return Step::NeedMore;
				}
			}
		}

		let header_end = match self.header_end {
			Some(end) => end,
			None => match find_from(&self.buffer, HEADER_END, &mut self.scanned) {
				Some(end) => {
					self.header_end = Some(end);
					self.scanned = end + HEADER_END.len();
					end
				}
				None => return Step::NeedMore,
			},
		};
		let body_start = header_end + HEADER_END.len();
		let headers = &self.buffer[self.dash_boundary.len()..header_end];

		let body_end = match content_length(headers) {
			Some(len) => match body_start.checked_add(len).filter(|_| len <= MAX_BUFFERED) {
				Some(end) if self.buffer.len() < end => return Step::NeedMore,
				Some(end) => end,
				None => {
					log::warn!("[Feed] Part announces {} bytes, skipping to the next boundary", len);
					self.buffer.drain(..body_start);
					self.reset_part();
					return Step::Resync;
				}
			},
			None => match find_from(&self.buffer, &self.delimiter, &mut self.scanned) {
				Some(end) => end,
				None => return Step::NeedMore,
			},
		};

		let body = self.buffer[body_start..body_end].to_vec();
		self.buffer.drain(..body_end);
		self.reset_part();
		Step::Part(body)
	}

	fn reset_part(&mut self) {
		self.aligned = false;
		self.header_end = None;
		self.scanned = 0;
	}
}

/// Search `haystack[*scanned..]`; on a miss, remember how far it is safe to skip next time
fn find_from(haystack: &[u8], needle: &[u8], scanned: &mut usize) -> Option<usize> {
	let from = (*scanned).min(haystack.len());
	match find(&haystack[from..], needle) {
		Some(pos) => Some(from + pos),
		None => {
			*scanned = haystack.len().saturating_sub(needle.len() - 1).max(from);
			None
		}
	}
}

fn content_length(headers: &[u8]) -> Option<usize> {
	String::from_utf8_lossy(headers)
		.split("\r\n")
		.filter_map(|line| line.split_once(':'))
		.find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
		.and_then(|(_, value)| value.trim().parse().ok())
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
	if needle.is_empty() || haystack.len() < needle.len() {
		return None;
	}
	haystack.windows(needle.len()).position(|w| w == needle)
}
