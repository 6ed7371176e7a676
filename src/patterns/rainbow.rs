use rgb::RGB8;

use super::Animation;
use crate::Result;

/// Interpolates a hue for `pos` in three bands: green to red, red to blue, blue to green.
///
/// The result is written as is, wheel colors never go through the channel swap.
pub fn wheel(pos: u8) -> RGB8 {
	match pos {
		0..=84 => RGB8::new(pos * 3, 255 - pos * 3, 0),
		85..=169 => {
			let pos = pos - 85;
			RGB8::new(255 - pos * 3, 0, pos * 3)
		}
		_ => {
			let pos = pos - 170;
			RGB8::new(0, pos * 3, 255 - pos * 3)
		}
	}
}

/// A hue gradient across the strip that rotates one wheel step per frame.
pub(crate) fn rainbow_cycle(anim: &Animation) -> Result<()> {
	let count = anim.strip.count();
	cycle(anim, |i, j| (i * 256 / count + j) % 256)
}

/// The whole strip shows the same hue and walks through the wheel.
pub(crate) fn rainbow_colors(anim: &Animation) -> Result<()> {
	let offset = 256 / anim.strip.count().max(1);
	cycle(anim, |_, j| (offset + j) % 256)
}

/// One round is a full turn of the wheel, `position(i, j)` picks the hue of pixel `i` in step `j`.
fn cycle(anim: &Animation, position: impl Fn(usize, usize) -> usize) -> Result<()> {
	anim.blank()?;
	anim.repeat(|| {
		for j in 0..256 {
			anim.strip.with_buffer(|buffer| {
				for i in 0..buffer.count() {
					// position is always reduced mod 256
					buffer.set_pixel(i, wheel(position(i, j) as u8))?;
				}
				buffer.show()
			})?;
			anim.delay()?;
		}
		anim.pause()
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::patterns::{
		tests::{once, strip},
		Pacer,
		Pattern,
	};

	#[test]
	fn wheel_band_edges() {
		assert_eq!(wheel(0), RGB8::new(0, 255, 0));
		assert_eq!(wheel(84), RGB8::new(252, 3, 0));
		assert_eq!(wheel(85), RGB8::new(255, 0, 0));
		assert_eq!(wheel(170), RGB8::new(0, 0, 255));
		assert_eq!(wheel(255), RGB8::new(0, 255, 0));
	}

	#[test]
	fn wheel_is_never_dark() {
		for pos in 0..=255u8 {
			let color = wheel(pos);
			assert_eq!(color.r as u16 + color.g as u16 + color.b as u16, 255, "pos {pos}");
		}
	}

	#[test]
	fn rainbow_cycle_spreads_the_wheel_over_the_strip() {
		let (strip, recorder) = strip(4);
		Pattern::RainbowCycle.run(&strip, &Pacer::uncancellable(), once()).unwrap();

		let frames = recorder.frames();
		assert_eq!(frames.len(), 1 + 256);
		assert_eq!(frames[1], vec![wheel(0), wheel(64), wheel(128), wheel(192)]);
		assert_eq!(frames[2], vec![wheel(1), wheel(65), wheel(129), wheel(193)]);
		assert_eq!(frames[256], vec![wheel(255), wheel(63), wheel(127), wheel(191)]);
	}

	#[test]
	fn rainbow_colors_moves_in_lockstep() {
		let (strip, recorder) = strip(4);
		Pattern::RainbowColors.run(&strip, &Pacer::uncancellable(), once()).unwrap();

		let frames = recorder.frames();
		assert_eq!(frames.len(), 1 + 256);
		for (j, frame) in frames[1..].iter().enumerate() {
			assert_eq!(frame, &vec![wheel(((64 + j) % 256) as u8); 4]);
		}
	}
}
