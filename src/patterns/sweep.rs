//! Patterns that switch whole pixels on and off in some order.

use rand::seq::{index, SliceRandom};

use super::{ascending, descending, Animation};
use crate::{buffer::Selection, Result};

/// One pixel at a time travels along `order`.
pub(crate) fn chase(anim: &Animation, order: &[usize]) -> Result<()> {
	anim.blank()?;
	anim.repeat(|| {
		for pixel in order {
			anim.strip.on(Selection::single(pixel))?;
			anim.delay()?;
			anim.strip.off(Selection::single(pixel))?;
		}
		anim.pause()
	})
}

/// Lights every pixel along `order` without turning earlier ones off, then clears.
pub(crate) fn fill(anim: &Animation, order: &[usize]) -> Result<()> {
	anim.blank()?;
	anim.repeat(|| {
		light_each(anim, order)?;
		anim.pause()?;
		anim.blank()?;
		anim.delay()
	})
}

pub(crate) fn fill_up_and_down(anim: &Animation) -> Result<()> {
	let up = ascending(anim.strip.count());
	let down = descending(anim.strip.count());

	anim.blank()?;
	anim.repeat(|| {
		light_each(anim, &up)?;
		anim.pause()?;
		darken_each(anim, &down)?;
		anim.pause()
	})
}

/// Fills upwards, then switches off in the same direction.
pub(crate) fn fill_up_chase_up(anim: &Animation) -> Result<()> {
	let up = ascending(anim.strip.count());

	anim.blank()?;
	anim.repeat(|| {
		light_each(anim, &up)?;
		darken_each(anim, &up)?;
		anim.pause()?;
		anim.blank()?;
		anim.delay()
	})
}

pub(crate) fn alternating(anim: &Animation) -> Result<()> {
	let (odd, even): (Vec<usize>, Vec<usize>) = ascending(anim.strip.count()).into_iter().partition(|i| i % 2 == 1);

	anim.blank()?;
	anim.repeat(|| {
		anim.strip.off(Selection::Only(&even))?;
		anim.delay()?;
		anim.strip.on(Selection::Only(&odd))?;
		anim.pause()?;
		anim.strip.on(Selection::Only(&even))?;
		anim.delay()?;
		anim.strip.off(Selection::Only(&odd))?;
		anim.pause()
	})
}

/// Flashes a random half of the strip, `count / 2` rounded down.
pub(crate) fn random_sets(anim: &Animation) -> Result<()> {
	let count = anim.strip.count();

	anim.blank()?;
	anim.repeat(|| {
		let lights = index::sample(&mut rand::rng(), count, count / 2).into_vec();
		anim.strip.on(Selection::Only(&lights))?;
		anim.pause()?;
		anim.strip.off(Selection::Only(&lights))
	})
}

pub(crate) fn random_on_off(anim: &Animation) -> Result<()> {
	let mut lights = ascending(anim.strip.count());

	anim.blank()?;
	anim.repeat(|| {
		lights.shuffle(&mut rand::rng());
		light_each(anim, &lights)?;
		anim.pause()?;
		lights.shuffle(&mut rand::rng());
		darken_each(anim, &lights)?;
		anim.pause()
	})
}

fn light_each(anim: &Animation, order: &[usize]) -> Result<()> {
	for pixel in order {
		anim.strip.on(Selection::single(pixel))?;
		anim.delay()?;
	}
	Ok(())
}

fn darken_each(anim: &Animation, order: &[usize]) -> Result<()> {
	for pixel in order {
		anim.strip.off(Selection::single(pixel))?;
		anim.delay()?;
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use crate::patterns::{
		tests::{lit, once, strip, OFF, ON},
		Pacer,
		Pattern,
	};

	#[test]
	fn fill_up_lights_in_order_then_clears_once() {
		let (strip, recorder) = strip(5);
		Pattern::FillUp.run(&strip, &Pacer::uncancellable(), once()).unwrap();

		let mut expected = vec![lit(5, [])];
		for n in 1..=5 {
			expected.push(lit(5, 0..n));
		}
		expected.push(lit(5, []));
		assert_eq!(recorder.frames(), expected);
	}

	#[test]
	fn fill_down_lights_from_the_top() {
		let (strip, recorder) = strip(3);
		Pattern::FillDown.run(&strip, &Pacer::uncancellable(), once()).unwrap();

		let expected = vec![lit(3, []), lit(3, [2]), lit(3, [1, 2]), lit(3, [0, 1, 2]), lit(3, [])];
		assert_eq!(recorder.frames(), expected);
	}

	#[test]
	fn chase_up_moves_a_single_pixel() {
		let (strip, recorder) = strip(3);
		Pattern::ChaseUp.run(&strip, &Pacer::uncancellable(), once()).unwrap();

		let expected = vec![lit(3, []), lit(3, [0]), lit(3, []), lit(3, [1]), lit(3, []), lit(3, [2]), lit(3, [])];
		assert_eq!(recorder.frames(), expected);
	}

	#[test]
	fn chase_down_moves_a_single_pixel() {
		let (strip, recorder) = strip(3);
		Pattern::ChaseDown.run(&strip, &Pacer::uncancellable(), once()).unwrap();

		let expected = vec![lit(3, []), lit(3, [2]), lit(3, []), lit(3, [1]), lit(3, []), lit(3, [0]), lit(3, [])];
		assert_eq!(recorder.frames(), expected);
	}

	#[test]
	fn fill_up_and_down_clears_from_the_top() {
		let (strip, recorder) = strip(3);
		Pattern::FillUpAndDown.run(&strip, &Pacer::uncancellable(), once()).unwrap();

		let expected = vec![
			lit(3, []),
			lit(3, [0]),
			lit(3, [0, 1]),
			lit(3, [0, 1, 2]),
			lit(3, [0, 1]),
			lit(3, [0]),
			lit(3, []),
		];
		assert_eq!(recorder.frames(), expected);
	}

	#[test]
	fn fill_up_chase_up_clears_from_the_bottom() {
		let (strip, recorder) = strip(2);
		Pattern::FillUpChaseUp.run(&strip, &Pacer::uncancellable(), once()).unwrap();

		let expected = vec![lit(2, []), lit(2, [0]), lit(2, [0, 1]), lit(2, [1]), lit(2, []), lit(2, [])];
		assert_eq!(recorder.frames(), expected);
	}

	#[test]
	fn alternating_swaps_odd_and_even() {
		let (strip, recorder) = strip(4);
		Pattern::Alternating.run(&strip, &Pacer::uncancellable(), once()).unwrap();

		let expected = vec![
			lit(4, []),
			lit(4, []),
			lit(4, [1, 3]),
			lit(4, [0, 1, 2, 3]),
			lit(4, [0, 2]),
		];
		assert_eq!(recorder.frames(), expected);
	}

	#[test]
	fn random_sets_lights_half_rounded_down() {
		let (strip, recorder) = strip(7);
		Pattern::RandomSets.run(&strip, &Pacer::uncancellable(), once()).unwrap();

		let frames = recorder.frames();
		assert_eq!(frames.len(), 3);
		assert_eq!(frames[1].iter().filter(|&&p| p == ON).count(), 3);
		assert_eq!(frames[2], vec![OFF; 7]);
	}

	#[test]
	fn random_on_off_touches_every_pixel_twice() {
		let (strip, recorder) = strip(6);
		Pattern::RandomOnOff.run(&strip, &Pacer::uncancellable(), once()).unwrap();

		let frames = recorder.frames();
		assert_eq!(frames.len(), 1 + 6 + 6);
		assert_eq!(frames[6], vec![ON; 6]);
		assert_eq!(frames[12], vec![OFF; 6]);
		for (n, frame) in frames[1..=6].iter().enumerate() {
			assert_eq!(frame.iter().filter(|&&p| p == ON).count(), n + 1);
		}
	}
}
