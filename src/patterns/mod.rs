//! The animation library.
//!
//! Every pattern starts by turning the whole strip off and then repeats its
//! round `rounds` times, or forever when `rounds` is zero. Pacing goes through
//! a [`Pacer`] so a running pattern can be stopped at any delay.

use std::{
	fmt,
	ops::{Range, RangeInclusive},
	str::FromStr,
	time::Duration,
};

use rand::Rng;
use tracing::debug;

use crate::{buffer::Selection, strip::Strip, Error, Result};

mod fade;
mod pacer;
mod rainbow;
mod sweep;

pub use pacer::Pacer;
pub use rainbow::wheel;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pattern {
	ChaseUp,
	ChaseDown,
	FillUp,
	FillDown,
	FillUpAndDown,
	FillUpChaseUp,
	Alternating,
	RandomSets,
	RandomOnOff,
	AppearFromBack,
	FadeInOut,
	RainbowColors,
	RainbowCycle,
	/// Keeps picking one of [`Pattern::ANIMATIONS`] with random timing.
	AllRandom,
}

impl Pattern {
	/// Every pattern that animates the strip by itself, in registry order.
	pub const ANIMATIONS: [Pattern; 13] = [
		Pattern::ChaseUp,
		Pattern::ChaseDown,
		Pattern::FillUp,
		Pattern::FillDown,
		Pattern::FillUpAndDown,
		Pattern::FillUpChaseUp,
		Pattern::Alternating,
		Pattern::RandomSets,
		Pattern::RandomOnOff,
		Pattern::AppearFromBack,
		Pattern::FadeInOut,
		Pattern::RainbowColors,
		Pattern::RainbowCycle,
	];

	pub fn all() -> impl Iterator<Item = Pattern> {
		Self::ANIMATIONS.into_iter().chain([Pattern::AllRandom])
	}

	pub fn name(self) -> &'static str {
		match self {
			Pattern::ChaseUp => "chase_up",
			Pattern::ChaseDown => "chase_down",
			Pattern::FillUp => "fill_up",
			Pattern::FillDown => "fill_down",
			Pattern::FillUpAndDown => "fill_up_and_down",
			Pattern::FillUpChaseUp => "fill_up_chase_up",
			Pattern::Alternating => "alternating",
			Pattern::RandomSets => "random_sets",
			Pattern::RandomOnOff => "random_on_off",
			Pattern::AppearFromBack => "appear_from_back",
			Pattern::FadeInOut => "fade_in_out",
			Pattern::RainbowColors => "rainbow_colors",
			Pattern::RainbowCycle => "rainbow_cycle",
			Pattern::AllRandom => "all_random",
		}
	}

	/// Human readable name, `fill_up_chase_up` becomes `Fill Up Chase Up`.
	pub fn display_name(self) -> String {
		self.name()
			.split('_')
			.map(|word| {
				let mut chars = word.chars();
				match chars.next() {
					Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
					None => String::new(),
				}
			})
			.collect::<Vec<_>>()
			.join(" ")
	}

	/// Runs the pattern on the calling thread until its rounds are done or `pacer` is cancelled.
	pub fn run(self, strip: &Strip, pacer: &Pacer, timing: Timing) -> Result<()> {
		let anim = Animation { strip, pacer, timing };
		match self {
			Pattern::ChaseUp => sweep::chase(&anim, &ascending(strip.count())),
			Pattern::ChaseDown => sweep::chase(&anim, &descending(strip.count())),
			Pattern::FillUp => sweep::fill(&anim, &ascending(strip.count())),
			Pattern::FillDown => sweep::fill(&anim, &descending(strip.count())),
			Pattern::FillUpAndDown => sweep::fill_up_and_down(&anim),
			Pattern::FillUpChaseUp => sweep::fill_up_chase_up(&anim),
			Pattern::Alternating => sweep::alternating(&anim),
			Pattern::RandomSets => sweep::random_sets(&anim),
			Pattern::RandomOnOff => sweep::random_on_off(&anim),
			Pattern::AppearFromBack => fade::appear_from_back(&anim),
			Pattern::FadeInOut => fade::fade_in_out(&anim),
			Pattern::RainbowColors => rainbow::rainbow_colors(&anim),
			Pattern::RainbowCycle => rainbow::rainbow_cycle(&anim),
			Pattern::AllRandom => all_random(&anim, &RandomPicks::DEFAULT, |pattern, timing| {
				debug!(%pattern, delay = ?timing.delay, pause = ?timing.pause, rounds = timing.rounds, "all_random picked");
			}),
		}
	}
}

impl FromStr for Pattern {
	type Err = Error;

	fn from_str(name: &str) -> Result<Self> {
		Self::all()
			.find(|pattern| pattern.name() == name)
			.ok_or_else(|| Error::UnknownPattern(name.to_string()))
	}
}

impl fmt::Display for Pattern {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

/// Pacing parameters of a pattern run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
	/// Wait between single steps.
	pub delay: Duration,
	/// Wait between phases of a round.
	pub pause: Duration,
	/// Number of rounds, zero runs forever.
	pub rounds: u32,
}

impl Timing {
	/// Builds a timing from seconds, rejecting negative and non finite values.
	pub fn from_secs(delay: f64, pause: f64, rounds: u32) -> Result<Self> {
		let secs = |value: f64| Duration::try_from_secs_f64(value).map_err(|_| Error::InvalidTiming(value));
		Ok(Self {
			delay: secs(delay)?,
			pause: secs(pause)?,
			rounds,
		})
	}
}

/// Everything a running pattern needs.
pub(crate) struct Animation<'a> {
	pub strip: &'a Strip,
	pub pacer: &'a Pacer,
	pub timing: Timing,
}

impl Animation<'_> {
	pub fn delay(&self) -> Result<()> {
		self.pacer.sleep(self.timing.delay)
	}

	pub fn pause(&self) -> Result<()> {
		self.pacer.sleep(self.timing.pause)
	}

	/// Turns everything off, bypassing any supervisor.
	pub fn blank(&self) -> Result<()> {
		self.strip.off(Selection::All)
	}

	/// Repeats `round` as often as the timing asks for.
	pub fn repeat(&self, mut round: impl FnMut() -> Result<()>) -> Result<()> {
		if self.timing.rounds == 0 {
			loop {
				round()?;
			}
		}

		for _ in 0..self.timing.rounds {
			round()?;
		}
		Ok(())
	}
}

pub(crate) fn ascending(count: usize) -> Vec<usize> {
	(0..count).collect()
}

pub(crate) fn descending(count: usize) -> Vec<usize> {
	(0..count).rev().collect()
}

/// Ranges `all_random` draws a pattern and its timing from.
struct RandomPicks {
	delay_secs: Range<f64>,
	pause_secs: Range<f64>,
	rounds: RangeInclusive<u32>,
}

impl RandomPicks {
	const DEFAULT: Self = Self {
		delay_secs: 0.005..0.05,
		pause_secs: 0.5..5.0,
		rounds: 3..=6,
	};

	fn pick(&self, rng: &mut impl Rng) -> (Pattern, Timing) {
		let pattern = Pattern::ANIMATIONS[rng.random_range(0..Pattern::ANIMATIONS.len())];
		let timing = Timing {
			delay: Duration::from_secs_f64(rng.random_range(self.delay_secs.clone())),
			pause: Duration::from_secs_f64(rng.random_range(self.pause_secs.clone())),
			rounds: rng.random_range(self.rounds.clone()),
		};
		(pattern, timing)
	}
}

/// Runs randomly chosen patterns back to back, `rounds` bounds the number of picks.
fn all_random(anim: &Animation, picks: &RandomPicks, mut on_pick: impl FnMut(Pattern, Timing)) -> Result<()> {
	anim.blank()?;
	anim.repeat(|| {
		let (pattern, timing) = picks.pick(&mut rand::rng());
		on_pick(pattern, timing);

		pattern.run(anim.strip, anim.pacer, timing)?;
		anim.delay()
	})
}

#[cfg(test)]
pub(crate) mod tests {
	use rgb::RGB8;
	use strip_lights_shared::ChannelOrder;

	use super::*;
	use crate::{buffer::PixelBuffer, color::ColorModel, transport::MemoryTransport};

	pub const ON: RGB8 = RGB8 { r: 255, g: 0, b: 0 };
	pub const OFF: RGB8 = RGB8 { r: 0, g: 0, b: 0 };

	pub fn strip(count: usize) -> (Strip, MemoryTransport) {
		let recorder = MemoryTransport::new();
		let buffer = PixelBuffer::new(count, Box::new(recorder.clone()));
		(Strip::new(buffer, ColorModel::new(ChannelOrder::Rgb)), recorder)
	}

	pub fn once() -> Timing {
		Timing {
			delay: Duration::ZERO,
			pause: Duration::ZERO,
			rounds: 1,
		}
	}

	/// Frame with exactly the given pixels lit.
	pub fn lit(count: usize, on: impl IntoIterator<Item = usize>) -> Vec<RGB8> {
		let mut frame = vec![OFF; count];
		for i in on {
			frame[i] = ON;
		}
		frame
	}

	#[test]
	fn names_round_trip() {
		for pattern in Pattern::all() {
			assert_eq!(pattern.name().parse::<Pattern>().unwrap(), pattern);
		}
		assert_eq!(Pattern::all().count(), 14);
	}

	#[test]
	fn unknown_name_is_rejected() {
		assert!(matches!("sparkle".parse::<Pattern>(), Err(Error::UnknownPattern(name)) if name == "sparkle"));
	}

	#[test]
	fn display_names_are_title_cased() {
		assert_eq!(Pattern::FillUpChaseUp.display_name(), "Fill Up Chase Up");
		assert_eq!(Pattern::Alternating.display_name(), "Alternating");
	}

	#[test]
	fn timing_rejects_negative_and_nan() {
		assert!(matches!(Timing::from_secs(-0.1, 0.5, 0), Err(Error::InvalidTiming(_))));
		assert!(matches!(Timing::from_secs(0.1, f64::NAN, 0), Err(Error::InvalidTiming(_))));

		let timing = Timing::from_secs(0.1, 0.5, 3).unwrap();
		assert_eq!(timing.delay, Duration::from_millis(100));
		assert_eq!(timing.pause, Duration::from_millis(500));
		assert_eq!(timing.rounds, 3);
	}

	#[test]
	fn every_animation_finishes_after_its_rounds() {
		for pattern in Pattern::ANIMATIONS {
			let (strip, recorder) = strip(12);
			pattern.run(&strip, &Pacer::uncancellable(), once()).unwrap();

			let frames = recorder.frames();
			assert_eq!(frames[0], vec![OFF; 12], "{pattern} must start blank");
			assert!(frames.len() > 1, "{pattern} wrote nothing");
		}
	}

	#[test]
	fn rounds_repeat_the_round_unit() {
		let (strip, recorder) = strip(4);
		let timing = Timing { rounds: 3, ..once() };
		Pattern::FillUp.run(&strip, &Pacer::uncancellable(), timing).unwrap();

		// blank, then 4 fills and a clear per round
		assert_eq!(recorder.frame_count(), 1 + 3 * 5);
	}

	#[test]
	fn all_random_rounds_count_picks() {
		let (strip, _) = strip(6);
		let pacer = Pacer::uncancellable();
		let anim = Animation {
			strip: &strip,
			pacer: &pacer,
			timing: Timing { rounds: 2, ..once() },
		};
		let short = RandomPicks {
			delay_secs: 0.0..0.0001,
			pause_secs: 0.0..0.0001,
			rounds: 1..=2,
		};

		let mut picked = Vec::new();
		all_random(&anim, &short, |pattern, timing| picked.push((pattern, timing))).unwrap();

		assert_eq!(picked.len(), 2);
		for (pattern, timing) in picked {
			assert!(Pattern::ANIMATIONS.contains(&pattern), "{pattern}");
			assert!(timing.delay < Duration::from_micros(100));
			assert!(timing.pause < Duration::from_micros(100));
			assert!(short.rounds.contains(&timing.rounds));
		}
	}

	#[test]
	fn default_picks_stay_in_range() {
		let mut rng = rand::rng();
		for _ in 0..500 {
			let (pattern, timing) = RandomPicks::DEFAULT.pick(&mut rng);
			assert_ne!(pattern, Pattern::AllRandom);
			assert!(timing.delay >= Duration::from_millis(5) && timing.delay < Duration::from_millis(50));
			assert!(timing.pause >= Duration::from_millis(500) && timing.pause < Duration::from_secs(5));
			assert!((3..=6).contains(&timing.rounds));
		}
	}

	#[test]
	fn forever_stops_only_when_cancelled() {
		let (strip, recorder) = strip(3);
		let (cancel, rx) = std::sync::mpsc::channel();
		let handle = std::thread::spawn(move || {
			let timing = Timing { rounds: 0, ..once() };
			Pattern::ChaseUp.run(&strip, &Pacer::new(rx), timing)
		});

		while recorder.frame_count() < 50 {
			std::thread::yield_now();
		}
		cancel.send(()).unwrap();
		assert!(matches!(handle.join().unwrap(), Err(Error::Cancelled)));
	}
}
