use crate::counts::CountsPoller;
use crate::feed::VideoFeed;
use crate::gallery::{ScenarioCard, ScenarioGallery};
use crate::panel::PanelController;
use crate::reactor::{Event, GalleryEvent, PanelEvent};
use eframe::egui::{self, ScrollArea};

const CARD_WIDTH: f32 = 260.0;

/// Shown until the first frame decodes; stream failures are only logged
const VIDEO_PLACEHOLDER: &str = "Waiting for video...";

pub struct ViewManager {
	card_width: f32,
}

impl ViewManager {
	pub fn new() -> Self {
		Self {
			card_width: CARD_WIDTH,
		}
	}

	/// Draw whichever region is visible and collect the user's intents
	pub fn render(
		&mut self,
		ctx: &egui::Context,
		panel: &PanelController,
		gallery: &ScenarioGallery,
		counts: &CountsPoller,
		feed: &VideoFeed,
	) -> Vec<Event> {
		let mut events = Vec::new();

		if panel.view_state().streaming_visible()
			&& ctx.input(|i| i.key_pressed(egui::Key::Escape))
		{
			events.push(Event::Panel(PanelEvent::Stop));
		}

		egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
			ui.horizontal(|ui| {
				ui.heading("Line Crossing Analytics");
				if gallery.is_loading() {
					ui.spinner();
				}
			});
		});

		egui::CentralPanel::default().show(ctx, |ui| {
			if panel.view_state().gallery_visible() {
				self.render_gallery(ui, gallery, &mut events);
			} else {
				self.render_streaming(ui, panel, counts, feed, &mut events);
			}
		});

		events
	}

	fn render_gallery(&self, ui: &mut egui::Ui, gallery: &ScenarioGallery, events: &mut Vec<Event>) {
		if let Some(err) = gallery.load_error() {
			ui.label(egui::RichText::new(err).color(egui::Color32::RED));
			ui.add_space(8.0);
			if ui
				.add_enabled(!gallery.is_loading(), egui::Button::new("Reload"))
				.clicked()
			{
				events.push(Event::Gallery(GalleryEvent::Load));
			}
			return;
		}

		if gallery.is_loading() && gallery.cards().is_empty() {
			ui.centered_and_justified(|ui| {
				ui.spinner();
			});
			return;
		}

		ScrollArea::vertical().show(ui, |ui| {
			ui.horizontal_wrapped(|ui| {
				for card in gallery.cards() {
					self.render_card(ui, card, events);
				}
			});
		});
	}

	fn render_card(&self, ui: &mut egui::Ui, card: &ScenarioCard, events: &mut Vec<Event>) {
		egui::Frame::none()
			.fill(egui::Color32::from_gray(40))
			.inner_margin(12.0)
			.rounding(4.0)
			.show(ui, |ui| {
				ui.set_width(self.card_width);
				ui.vertical(|ui| {
					ui.heading(&card.title);
					ui.label(egui::RichText::new(&card.video).color(egui::Color32::LIGHT_GRAY));
					ui.add_space(6.0);
					if ui.button("Start Analysis").clicked() {
						events.push(Event::Panel(PanelEvent::Start {
							id: card.id.clone(),
							title: card.title.clone(),
						}));
					}
				});
			});
	}

	fn render_streaming(
		&self,
		ui: &mut egui::Ui,
		panel: &PanelController,
		counts: &CountsPoller,
		feed: &VideoFeed,
		events: &mut Vec<Event>,
	) {
		ui.horizontal(|ui| {
			ui.heading(panel.title());
			ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
				if ui.button("Stop").clicked() {
					events.push(Event::Panel(PanelEvent::Stop));
				}
			});
		});

		let snapshot = counts.counts();
		ui.horizontal(|ui| {
			Self::render_count(ui, "In", snapshot.count_in, egui::Color32::GREEN);
			Self::render_count(ui, "Out", snapshot.count_out, egui::Color32::from_rgb(255, 140, 0));
			Self::render_count(ui, "Total", snapshot.total, egui::Color32::WHITE);
		});
		ui.separator();

		match feed.frame() {
			Some(texture) => {
				let available_size = ui.available_size();
				let img_size = texture.size_vec2();

				// Fit inside, never crop
				let width_ratio = available_size.x / img_size.x;
				let height_ratio = available_size.y / img_size.y;
				let scale = width_ratio.min(height_ratio).max(0.0);
				let display_size = img_size * scale;

				ui.vertical_centered(|ui| {
					ui.add(egui::Image::new(texture).fit_to_exact_size(display_size));
				});
			}
			None => {
				ui.centered_and_justified(|ui| {
					ui.label(VIDEO_PLACEHOLDER);
				});
			}
		}
	}

	fn render_count(ui: &mut egui::Ui, label: &str, value: u64, color: egui::Color32) {
		egui::Frame::none()
			.fill(egui::Color32::from_gray(30))
			.inner_margin(10.0)
			.rounding(4.0)
			.show(ui, |ui| {
				ui.vertical_centered(|ui| {
					ui.label(label);
					ui.label(
						egui::RichText::new(value.to_string())
							.size(28.0)
							.strong()
							.color(color),
					);
				});
			});
	}
}

impl Default for ViewManager {
	fn default() -> Self {
		Self::new()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::api::{PanelClient, Scenario};
	use crate::settings::PanelConfig;
	use std::sync::Arc;

	struct Screen {
		ctx: egui::Context,
		view: ViewManager,
		panel: PanelController,
		gallery: ScenarioGallery,
		counts: CountsPoller,
		feed: VideoFeed,
	}

	impl Screen {
		fn new() -> Self {
			let ctx = egui::Context::default();
			let client = Arc::new(PanelClient::new(&PanelConfig::default()).unwrap());
			Self {
				feed: VideoFeed::new(&ctx, client),
				ctx,
				view: ViewManager::new(),
				panel: PanelController::new(),
				gallery: ScenarioGallery::new(),
				counts: CountsPoller::default(),
			}
		}

		/// One headless frame: the intents it produced and every string it painted
		fn frame(&mut self, input: egui::RawInput) -> (Vec<Event>, Vec<String>) {
			let mut events = Vec::new();
			let output = self.ctx.run(input, |ctx| {
				events = self
					.view
					.render(ctx, &self.panel, &self.gallery, &self.counts, &self.feed);
			});

			let mut texts = Vec::new();
			for clipped in &output.shapes {
				collect_text(&clipped.shape, &mut texts);
			}
			(events, texts)
		}
	}

	fn collect_text(shape: &egui::Shape, out: &mut Vec<String>) {
		match shape {
			egui::Shape::Text(text) => out.push(text.galley.text().to_owned()),
			egui::Shape::Vec(shapes) => shapes.iter().for_each(|s| collect_text(s, out)),
			_ => {}
		}
	}

	fn escape() -> egui::RawInput {
		egui::RawInput {
			events: vec![egui::Event::Key {
				key: egui::Key::Escape,
				physical_key: None,
				pressed: true,
				repeat: false,
				modifiers: egui::Modifiers::NONE,
			}],
			..Default::default()
		}
	}

	fn scenario(id: &str, title: &str) -> Scenario {
		Scenario {
			id: id.into(),
			title: title.into(),
			video: format!("{}.mp4", title.to_lowercase()),
		}
	}

	#[test]
	fn gallery_draws_one_card_per_scenario_in_order() {
		let mut screen = Screen::new();
		screen
			.gallery
			.render_scenarios(vec![scenario("1", "Lobby"), scenario("2", "Dock")]);

		screen.frame(egui::RawInput::default());
		let (events, texts) = screen.frame(egui::RawInput::default());

		assert!(events.is_empty());
		assert_eq!(texts.iter().filter(|t| *t == "Start Analysis").count(), 2);
		let lobby = texts.iter().position(|t| t == "Lobby").expect("Lobby card");
		let dock = texts.iter().position(|t| t == "Dock").expect("Dock card");
		assert!(lobby < dock);
		assert!(texts.iter().any(|t| t == "dock.mp4"));
	}

	#[test]
	fn load_error_replaces_the_cards() {
		let mut screen = Screen::new();
		screen.gallery.render_scenarios(vec![scenario("1", "Lobby")]);
		screen.gallery.handle(&Event::Gallery(GalleryEvent::LoadFailed {
			message: "connection refused".into(),
		}));

		screen.frame(egui::RawInput::default());
		let (_, texts) = screen.frame(egui::RawInput::default());
		assert!(texts.iter().any(|t| t == crate::gallery::SCENARIO_LOAD_ERROR));
		assert!(texts.iter().any(|t| t == "Reload"));
		assert!(!texts.iter().any(|t| t == "Start Analysis"));
	}

	#[test]
	fn escape_stops_only_while_streaming() {
		let mut screen = Screen::new();
		screen.frame(egui::RawInput::default());
		let (events, _) = screen.frame(escape());
		assert!(events.is_empty());

		screen.panel.start_scenario("1", "Lobby");
		let (events, texts) = screen.frame(escape());
		assert!(matches!(events.as_slice(), [Event::Panel(PanelEvent::Stop)]));
		assert!(texts.iter().any(|t| t == "Analyzing: Lobby"));
		assert!(texts.iter().any(|t| t == VIDEO_PLACEHOLDER));
	}
}
