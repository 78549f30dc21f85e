pub mod mjpeg;

use crate::api::PanelClient;
use crate::reactor::{ComponentResponse, Event, FeedEvent};
use eframe::egui;
use mjpeg::{DEFAULT_BOUNDARY, MjpegSplitter, boundary_from_content_type};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

pub enum FeedMessage {
	Frame {
		attach_id: u64,
		image: egui::ColorImage,
	},
	Ended {
		attach_id: u64,
		error: Option<String>,
	},
}

/// The video element: a source path plus the reader task streaming it.
///
/// Every attach and detach bumps `attach_id`; messages tagged with an older id
/// come from a reader that was already aborted and are ignored.
pub struct VideoFeed {
	client: Arc<PanelClient>,
	source: String,
	attach_id: u64,
	task: Option<JoinHandle<()>>,
	frame: Option<egui::TextureHandle>,
	frames_received: u64,
	sender: mpsc::Sender<FeedMessage>,
	receiver: mpsc::Receiver<FeedMessage>,
	egui_ctx: egui::Context,
}

impl VideoFeed {
	pub fn new(ctx: &egui::Context, client: Arc<PanelClient>) -> Self {
		log::info!("[Feed] Initializing");
		let (sender, receiver) = mpsc::channel(4);
		Self {
			client,
			source: String::new(),
			attach_id: 0,
			task: None,
			frame: None,
			frames_received: 0,
			sender,
			receiver,
			egui_ctx: ctx.clone(),
		}
	}

	pub fn poll(&mut self) -> ComponentResponse {
		while let Ok(msg) = self.receiver.try_recv() {
			match msg {
				FeedMessage::Frame { attach_id, image } => {
					if attach_id != self.attach_id {
						continue;
					}
					self.frames_received += 1;
					match self.frame.as_mut() {
						Some(texture) => texture.set(image, egui::TextureOptions::LINEAR),
						None => {
							log::info!("[Feed] First frame {:?} from {}", image.size, self.source);
							self.frame = Some(self.egui_ctx.load_texture(
								"video_feed",
								image,
								egui::TextureOptions::LINEAR,
							));
						}
					}
				}
				FeedMessage::Ended { attach_id, error } => {
					if attach_id != self.attach_id {
						continue;
					}
					self.task = None;
					match error {
						Some(error) => log::warn!("[Feed] Stream {} failed: {}", self.source, error),
						None => log::info!("[Feed] Stream {} ended", self.source),
					}
				}
			}
		}
		ComponentResponse::none()
	}

	pub fn handle(&mut self, event: &Event) -> ComponentResponse {
		match event {
			Event::Feed(FeedEvent::Attach { source }) => self.attach(source.clone()),
			Event::Feed(FeedEvent::Detach) => self.detach(),
			_ => {}
		}
		ComponentResponse::none()
	}

	fn attach(&mut self, source: String) {
		self.stop_reader();
		self.attach_id += 1;
		self.frame = None;
		self.frames_received = 0;
		self.source = source;
		log::info!("[Feed] Attaching {}", self.source);

		let client = self.client.clone();
		let sender = self.sender.clone();
		let ctx = self.egui_ctx.clone();
		let source = self.source.clone();
		let attach_id = self.attach_id;

		self.task = Some(tokio::spawn(async move {
			let error = read_feed(&client, &source, attach_id, &sender, &ctx)
				.await
				.err()
				.map(|e| format!("{:#}", e));
			let _ = sender.send(FeedMessage::Ended { attach_id, error }).await;
			ctx.request_repaint();
		}));
	}

	fn detach(&mut self) {
		if !self.source.is_empty() {
			log::info!("[Feed] Detaching {}", self.source);
		}
		self.stop_reader();
		self.attach_id += 1;
		self.source.clear();
		self.frame = None;
	}

	fn stop_reader(&mut self) {
		if let Some(task) = self.task.take() {
			// Dropping the response inside the task closes the connection
			task.abort();
		}
	}

	/// Current source path, empty when nothing is attached
	pub fn source(&self) -> &str {
		&self.source
	}

	pub fn frame(&self) -> Option<&egui::TextureHandle> {
		self.frame.as_ref()
	}

	pub fn frames_received(&self) -> u64 {
		self.frames_received
	}

	pub fn is_streaming(&self) -> bool {
		self.task.is_some()
	}
}

impl Drop for VideoFeed {
	fn drop(&mut self) {
		self.stop_reader();
	}
}

async fn read_feed(
	client: &PanelClient,
	source: &str,
	attach_id: u64,
	sender: &mpsc::Sender<FeedMessage>,
	ctx: &egui::Context,
) -> anyhow::Result<()> {
	let mut response = client.open_feed(source).await?;

	let boundary = response
		.headers()
		.get(reqwest::header::CONTENT_TYPE)
		.and_then(|value| value.to_str().ok())
		.and_then(boundary_from_content_type)
		.unwrap_or_else(|| DEFAULT_BOUNDARY.to_owned());
	log::debug!("[Feed] Reading parts with boundary '{}'", boundary);

	let mut splitter = MjpegSplitter::new(&boundary);
	while let Some(chunk) = response.chunk().await? {
		for jpeg in splitter.push(&chunk) {
			let image = match decode_frame(&jpeg) {
				Ok(image) => image,
				Err(e) => {
					log::debug!("[Feed] Skipping undecodable frame ({} bytes): {}", jpeg.len(), e);
					continue;
				}
			};
			if sender
				.send(FeedMessage::Frame { attach_id, image })
				.await
				.is_err()
			{
				return Ok(());
			}
			ctx.request_repaint();
		}
	}
	Ok(())
}

fn decode_frame(jpeg: &[u8]) -> anyhow::Result<egui::ColorImage> {
	let img = image::load_from_memory_with_format(jpeg, image::ImageFormat::Jpeg)?;
	let size = [img.width() as usize, img.height() as usize];
	let img_buffer = img.to_rgba8();
	let pixels = img_buffer.as_flat_samples();
	Ok(egui::ColorImage::from_rgba_unmultiplied(size, pixels.as_slice()))
}
