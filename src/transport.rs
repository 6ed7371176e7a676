use std::{
	collections::VecDeque,
	io,
	sync::{
		atomic::{AtomicBool, Ordering},
		Arc, Mutex, PoisonError,
	},
};

use rgb::RGB8;
use tracing::trace;

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
	#[error("io error: {0}")]
	Io(#[from] io::Error),
	#[error("serial port error: {0}")]
	Serial(#[from] serialport::Error),
	#[error("message was not written completely")]
	IncompleteWrite,
	#[error("device did not respond")]
	NoResponse,
	#[error("unexpected response from device: {received} (expected \"{expected}\")")]
	UnexpectedResponse { expected: String, received: String },
	#[error("no serial to ws2812 device found")]
	DeviceNotFound,
	#[error("transport unavailable")]
	Unavailable,
}

/// Pushes a complete frame to the physical strip.
///
/// Implementations receive pixels already in wire order, the buffer never
/// remaps channels on their behalf.
pub trait Transport: Send {
	fn write(&mut self, pixels: &[RGB8]) -> Result<(), TransportError>;
}

#[derive(Default)]
struct Recorded {
	frames: VecDeque<Vec<RGB8>>,
	written: usize,
}

/// In-memory transport that records every flushed frame.
///
/// Clones share the same recording, so a test can keep one handle while the
/// buffer owns the other.
#[derive(Clone, Default)]
pub struct MemoryTransport {
	recorded: Arc<Mutex<Recorded>>,
	fail_next: Arc<AtomicBool>,
	history: Option<usize>,
}

impl MemoryTransport {
	/// Records every frame for the lifetime of the transport.
	pub fn new() -> Self {
		Self::default()
	}

	/// Keeps only the most recent `frames` frames.
	pub fn with_history(frames: usize) -> Self {
		Self {
			history: Some(frames),
			..Self::default()
		}
	}

	/// Makes the next write fail with [`TransportError::Unavailable`].
	pub fn fail_next_write(&self) {
		self.fail_next.store(true, Ordering::SeqCst);
	}

	pub fn frames(&self) -> Vec<Vec<RGB8>> {
		self.recorded().frames.iter().cloned().collect()
	}

	pub fn last_frame(&self) -> Option<Vec<RGB8>> {
		self.recorded().frames.back().cloned()
	}

	/// Total number of successful writes, including frames dropped from the history.
	pub fn frame_count(&self) -> usize {
		self.recorded().written
	}

	fn recorded(&self) -> std::sync::MutexGuard<'_, Recorded> {
		self.recorded.lock().unwrap_or_else(PoisonError::into_inner)
	}
}

impl Transport for MemoryTransport {
	fn write(&mut self, pixels: &[RGB8]) -> Result<(), TransportError> {
		if self.fail_next.swap(false, Ordering::SeqCst) {
			return Err(TransportError::Unavailable);
		}

		let history = self.history;
		let mut recorded = self.recorded();
		if history == Some(0) {
			recorded.written += 1;
			return Ok(());
		}
		if let Some(limit) = history {
			while recorded.frames.len() >= limit {
				recorded.frames.pop_front();
			}
		}
		recorded.frames.push_back(pixels.to_vec());
		recorded.written += 1;
		trace!(frame = recorded.written, pixels = pixels.len(), "memory transport flushed");

		Ok(())
	}
}
