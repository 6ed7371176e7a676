use rgb::RGB8;

use super::Animation;
use crate::Result;

/// Width of the lit segment that slides in from the far end.
const SEGMENT: usize = 10;

/// Pixels slide in from the far end and pile up at the start, ten at a time.
pub(crate) fn appear_from_back(anim: &Animation) -> Result<()> {
	let count = anim.strip.count();

	anim.blank()?;
	anim.repeat(|| {
		for block in (0..count).step_by(SEGMENT) {
			for head in (block..count).rev() {
				let color = anim.strip.color_model().wire_color();
				anim.strip.with_buffer(|buffer| {
					buffer.clear();
					for i in (0..block).chain(head.saturating_sub(SEGMENT - 1)..=head) {
						buffer.set_pixel(i, color)?;
					}
					buffer.show()
				})?;
				anim.delay()?;
			}
		}
		anim.pause()
	})
}

pub(crate) fn fade_in_out(anim: &Animation) -> Result<()> {
	anim.blank()?;
	anim.repeat(|| {
		brightness_increase(anim)?;
		anim.pause()?;
		brightness_decrease(anim)?;
		anim.pause()
	})
}

/// Ramps every pixel from black up to the current color, one step per channel and frame.
fn brightness_increase(anim: &Animation) -> Result<()> {
	let model = anim.strip.color_model();
	let target = model.current_color();

	for level in 0..=u8::MAX {
		let step = RGB8::new(target.r.min(level), target.g.min(level), target.b.min(level));
		anim.strip.with_buffer(|buffer| {
			buffer.set_all_pixels(model.order().to_wire(step));
			buffer.show()
		})?;
		if step == target {
			break;
		}
		anim.delay()?;
	}
	Ok(())
}

/// Dims whatever the strip shows until the last pixel is black.
fn brightness_decrease(anim: &Animation) -> Result<()> {
	for _ in 0..=u8::MAX {
		// already in wire order, no swap needed
		let last = anim.strip.with_buffer(|buffer| -> Result<RGB8> {
			let mut last = RGB8::default();
			for i in 0..buffer.count() {
				let pixel = buffer.get_pixel(i)?;
				last = RGB8::new(pixel.r.saturating_sub(1), pixel.g.saturating_sub(1), pixel.b.saturating_sub(1));
				buffer.set_pixel(i, last)?;
			}
			buffer.show()?;
			Ok(last)
		})?;
		if last == RGB8::default() {
			break;
		}
		anim.delay()?;
	}
	Ok(())
}
