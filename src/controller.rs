use rgb::RGB8;
use strip_lights_shared::ChannelOrder;
use tracing::debug;

use crate::{
	buffer::{PixelBuffer, Selection},
	color::ColorModel,
	patterns::{Pattern, Timing},
	strip::Strip,
	supervisor::Supervisor,
	transport::Transport,
	Error,
	Result,
};

/// The operations a front end (the HTTP layer, the CLI) can invoke.
pub struct Controller {
	strip: Strip,
	supervisor: Supervisor,
}

impl Controller {
	pub fn new(strip: Strip) -> Self {
		Self {
			supervisor: Supervisor::new(strip.clone()),
			strip,
		}
	}

	/// Builds a controller for `count` pixels on `transport`, starting with the default color.
	pub fn with_transport(count: usize, order: ChannelOrder, transport: Box<dyn Transport>) -> Self {
		let buffer = PixelBuffer::new(count, transport);
		Self::new(Strip::new(buffer, ColorModel::new(order)))
	}

	/// Blanks the strip so it matches the in-memory buffer.
	pub fn setup(&mut self) -> Result<()> {
		self.strip.with_buffer(|buffer| {
			buffer.clear();
			buffer.show()
		})
	}

	pub fn strip(&self) -> &Strip {
		&self.strip
	}

	pub fn count(&self) -> usize {
		self.strip.count()
	}

	/// Stops any pattern and lights `ids`, or the whole strip, with the current color.
	pub fn lights_on(&mut self, ids: Option<&[usize]>) -> Result<()> {
		debug!(?ids, "lights on");
		self.supervisor.stop();
		self.strip.on(selection(ids))
	}

	/// Stops any pattern and turns `ids`, or the whole strip, off.
	pub fn lights_off(&mut self, ids: Option<&[usize]>) -> Result<()> {
		debug!(?ids, "lights off");
		self.supervisor.stop();
		self.strip.off(selection(ids))
	}

	/// Changes the current color and repaints the whole strip with it.
	///
	/// A running pattern keeps running and picks the new color up.
	pub fn set_color(&self, color: RGB8) -> Result<()> {
		debug!(r = color.r, g = color.g, b = color.b, "set color");
		self.strip.set_color(color);
		self.strip.on(Selection::All)
	}

	/// Switches to a random color, repaints and returns it as `#rrggbb`.
	pub fn random_color(&self) -> Result<String> {
		let color = self.strip.randomize_color();
		debug!(r = color.r, g = color.g, b = color.b, "random color");
		self.strip.on(Selection::All)?;
		Ok(self.color_hex())
	}

	pub fn color(&self) -> RGB8 {
		self.strip.color_model().current_color()
	}

	pub fn color_hex(&self) -> String {
		self.strip.color_model().hex()
	}

	/// Lights pixels `0..=value` and turns the rest off; `-1` turns everything off.
	pub fn slide_from_bottom(&mut self, value: i64) -> Result<()> {
		debug!(value, "slide from bottom");
		if value == -1 {
			return self.lights_off(None);
		}
		let lit = self.slide_index(value)?;

		let on: Vec<usize> = (0..=lit).collect();
		let off: Vec<usize> = (lit + 1..self.count()).collect();
		self.lights_on(Some(on.as_slice()))?;
		self.lights_off(Some(off.as_slice()))
	}

	/// Lights pixels `value..count` and turns the rest off; `count` turns everything off.
	pub fn slide_from_top(&mut self, value: i64) -> Result<()> {
		debug!(value, "slide from top");
		if value == self.count() as i64 {
			return self.lights_off(None);
		}
		let first = self.slide_index(value)?;

		let on: Vec<usize> = (first..self.count()).rev().collect();
		let off: Vec<usize> = (0..first).collect();
		self.lights_on(Some(on.as_slice()))?;
		self.lights_off(Some(off.as_slice()))
	}

	/// Starts `name` in the background, stopping any pattern that is already running.
	pub fn start_pattern(&mut self, name: &str, delay: f64, pause: f64, rounds: u32) -> Result<u64> {
		debug!(name, delay, pause, rounds, "start pattern");
		let pattern: Pattern = name.parse()?;
		let timing = Timing::from_secs(delay, pause, rounds)?;
		self.supervisor.start_pattern(pattern, timing)
	}

	pub fn stop_pattern(&mut self) {
		self.supervisor.stop();
	}

	/// Blocks until a pattern started with a finite number of rounds is done.
	pub fn wait_for_pattern(&mut self) {
		self.supervisor.wait();
	}

	pub fn pattern_running(&self) -> bool {
		self.supervisor.is_running()
	}

	/// Number of patterns started so far.
	pub fn generation(&self) -> u64 {
		self.supervisor.generation()
	}

	/// Registered patterns with their display names.
	pub fn patterns() -> Vec<(&'static str, String)> {
		Pattern::all().map(|pattern| (pattern.name(), pattern.display_name())).collect()
	}

	fn slide_index(&self, value: i64) -> Result<usize> {
		usize::try_from(value)
			.ok()
			.filter(|&index| index < self.count())
			.ok_or(Error::InvalidSlide(value))
	}
}

fn selection(ids: Option<&[usize]>) -> Selection<'_> {
	match ids {
		Some(ids) => Selection::Only(ids),
		None => Selection::All,
	}
}
