use rand::Rng;
use rgb::RGB8;
use strip_lights_shared::ChannelOrder;

use crate::{
	buffer::{PixelBuffer, Selection},
	Result,
};

/// Color every "on" operation uses when nothing else is asked for.
pub const STARTING_COLOR: RGB8 = RGB8 { r: 255, g: 0, b: 0 };

/// The process wide current color and the wiring of the strip.
///
/// The current color is always kept in logical RGB order, the channel order
/// is only applied when it is written into a [`PixelBuffer`].
#[derive(Debug, Clone, Copy)]
pub struct ColorModel {
	current: RGB8,
	order: ChannelOrder,
}

impl ColorModel {
	pub fn new(order: ChannelOrder) -> Self {
		Self {
			current: STARTING_COLOR,
			order,
		}
	}

	pub fn order(&self) -> ChannelOrder {
		self.order
	}

	pub fn current_color(&self) -> RGB8 {
		self.current
	}

	pub fn set_current_color(&mut self, color: RGB8) {
		self.current = color;
	}

	/// Picks a new uniformly random current color and returns it.
	pub fn randomize(&mut self) -> RGB8 {
		self.current = random_color();
		self.current
	}

	/// The current color in the order the strip expects it.
	pub fn wire_color(&self) -> RGB8 {
		self.order.to_wire(self.current)
	}

	/// Writes the current color into the selected pixels, applying the channel swap.
	pub fn apply_current_color_to(&self, buffer: &mut PixelBuffer, selection: Selection<'_>) -> Result<()> {
		buffer.set_selection(selection, self.wire_color())
	}

	/// `#rrggbb` of the logical current color.
	pub fn hex(&self) -> String {
		to_hex(self.current)
	}
}

pub fn random_color() -> RGB8 {
	let mut rng = rand::rng();
	RGB8::new(rng.random(), rng.random(), rng.random())
}

pub fn to_hex(color: RGB8) -> String {
	format!("#{:02x}{:02x}{:02x}", color.r, color.g, color.b)
}
