use std::{
	sync::mpsc::{self, Sender},
	thread::{self, JoinHandle},
};

use tracing::{debug, error, info};

use crate::{
	patterns::{Pacer, Pattern, Timing},
	strip::Strip,
	Error,
	Result,
};

/// The single running pattern.
struct PatternTask {
	pattern: Pattern,
	generation: u64,
	cancel: Sender<()>,
	handle: JoinHandle<()>,
}

/// Keeps at most one pattern running on a background thread.
///
/// Starting a pattern always stops and joins the previous one first, so two
/// patterns never write to the strip at the same time.
pub struct Supervisor {
	strip: Strip,
	task: Option<PatternTask>,
	generation: u64,
}

impl Supervisor {
	pub fn new(strip: Strip) -> Self {
		Self {
			strip,
			task: None,
			generation: 0,
		}
	}

	/// Starts the pattern registered as `name`.
	///
	/// An unknown name fails with [`Error::UnknownPattern`] and leaves the running pattern alone.
	pub fn start(&mut self, name: &str, timing: Timing) -> Result<u64> {
		let pattern = name.parse()?;
		self.start_pattern(pattern, timing)
	}

	/// Stops whatever is running and starts `pattern`, returning its generation.
	pub fn start_pattern(&mut self, pattern: Pattern, timing: Timing) -> Result<u64> {
		self.stop();

		self.generation += 1;
		let generation = self.generation;
		let (cancel, cancelled) = mpsc::channel();
		let strip = self.strip.clone();

		let handle = thread::Builder::new()
			.name(format!("pattern-{pattern}"))
			.spawn(move || {
				let pacer = Pacer::new(cancelled);
				match pattern.run(&strip, &pacer, timing) {
					Ok(()) => info!(%pattern, generation, "pattern finished"),
					Err(Error::Cancelled) => debug!(%pattern, generation, "pattern cancelled"),
					Err(e) => error!(%pattern, generation, "pattern failed: {e}"),
				}
			})
			.map_err(Error::Spawn)?;

		info!(%pattern, generation, delay = ?timing.delay, pause = ?timing.pause, rounds = timing.rounds, "pattern started");
		self.task = Some(PatternTask {
			pattern,
			generation,
			cancel,
			handle,
		});

		Ok(generation)
	}

	/// Stops the running pattern and waits for its thread to exit.
	///
	/// Never fails, the slot is always free afterwards.
	pub fn stop(&mut self) {
		let Some(task) = self.task.take() else {
			return;
		};

		if task.cancel.send(()).is_err() {
			debug!(pattern = %task.pattern, generation = task.generation, "pattern had already exited");
		}
		Self::reap(task);
	}

	/// Blocks until the running pattern finishes by itself.
	///
	/// Returns immediately when nothing runs; never returns for a pattern started with zero rounds.
	pub fn wait(&mut self) {
		if let Some(task) = self.task.take() {
			Self::reap(task);
		}
	}

	/// Number of patterns started so far.
	pub fn generation(&self) -> u64 {
		self.generation
	}

	/// Whether a pattern thread is still animating.
	pub fn is_running(&self) -> bool {
		self.task.as_ref().is_some_and(|task| !task.handle.is_finished())
	}

	fn reap(task: PatternTask) {
		let PatternTask {
			pattern,
			generation,
			cancel,
			handle,
		} = task;

		if handle.join().is_err() {
			error!(%pattern, generation, "pattern thread panicked");
		}
		drop(cancel);
	}
}

impl Drop for Supervisor {
	fn drop(&mut self) {
		self.stop();
	}
}

#[cfg(test)]
mod tests {
	use std::time::{Duration, Instant};

	use rgb::RGB8;

	use super::*;
	use crate::patterns::tests::{lit, once, strip, OFF, ON};

	fn forever() -> Timing {
		Timing { rounds: 0, ..once() }
	}

	#[test]
	fn unknown_pattern_is_rejected_without_stopping() {
		let (strip, _) = strip(3);
		let mut supervisor = Supervisor::new(strip);
		supervisor.start("chase_up", forever()).unwrap();

		assert!(matches!(supervisor.start("nope", once()), Err(Error::UnknownPattern(_))));
		assert!(supervisor.is_running());
		assert_eq!(supervisor.generation(), 1);
	}

	#[test]
	fn natural_completion_frees_the_slot() {
		let (strip, recorder) = strip(5);
		let mut supervisor = Supervisor::new(strip);

		assert_eq!(supervisor.start("fill_up", once()).unwrap(), 1);
		supervisor.wait();

		assert!(!supervisor.is_running());
		assert_eq!(recorder.frame_count(), 7);

		// stopping an idle slot is a no-op
		supervisor.stop();
		assert_eq!(recorder.frame_count(), 7);
	}

	#[test]
	fn stop_interrupts_a_long_pause() {
		let (strip, recorder) = strip(2);
		let mut supervisor = Supervisor::new(strip);
		let timing = Timing {
			pause: Duration::from_secs(60),
			..forever()
		};
		supervisor.start_pattern(Pattern::RandomSets, timing).unwrap();
		while recorder.frame_count() < 2 {
			thread::yield_now();
		}

		let start = Instant::now();
		supervisor.stop();
		assert!(start.elapsed() < Duration::from_secs(10));
		assert!(!supervisor.is_running());
	}

	#[test]
	fn previous_pattern_is_reaped_before_the_next_starts() {
		let (strip, recorder) = strip(5);
		let mut supervisor = Supervisor::new(strip);

		supervisor.start_pattern(Pattern::RainbowCycle, forever()).unwrap();
		while recorder.frame_count() < 10 {
			thread::yield_now();
		}
		assert_eq!(supervisor.start_pattern(Pattern::FillUp, once()).unwrap(), 2);
		supervisor.wait();

		let frames = recorder.frames();
		let is_rainbow = |frame: &Vec<RGB8>| frame.iter().any(|&p| p != ON && p != OFF);
		let last_rainbow = frames.iter().rposition(is_rainbow).expect("rainbow frames");

		let mut expected = vec![lit(5, [])];
		for n in 1..=5 {
			expected.push(lit(5, 0..n));
		}
		expected.push(lit(5, []));
		assert_eq!(frames[last_rainbow + 1..].to_vec(), expected);
	}

	#[test]
	fn hardware_failure_ends_the_pattern_quietly() {
		let (strip, recorder) = strip(3);
		let mut supervisor = Supervisor::new(strip);
		recorder.fail_next_write();

		supervisor.start_pattern(Pattern::ChaseUp, forever()).unwrap();
		supervisor.wait();

		assert_eq!(recorder.frame_count(), 0);
		assert!(!supervisor.is_running());
	}

	#[test]
	fn all_random_can_be_stopped() {
		let (strip, recorder) = strip(4);
		let mut supervisor = Supervisor::new(strip);
		supervisor.start_pattern(Pattern::AllRandom, forever()).unwrap();
		while recorder.frame_count() < 3 {
			thread::yield_now();
		}

		let start = Instant::now();
		supervisor.stop();
		assert!(start.elapsed() < Duration::from_secs(10));
	}
}
