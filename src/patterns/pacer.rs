use std::{
	sync::mpsc::{Receiver, RecvTimeoutError, Sender},
	time::Duration,
};

use crate::{Error, Result};

/// Sleeps between animation steps and doubles as the kill switch.
///
/// Every sleep wakes up as soon as the owning [`Sender`] signals or is
/// dropped, and the pattern unwinds with [`Error::Cancelled`].
pub struct Pacer {
	cancel: Receiver<()>,
	_keep_alive: Option<Sender<()>>,
}

impl Pacer {
	/// A pacer that is cancelled through the other end of `cancel`.
	pub fn new(cancel: Receiver<()>) -> Self {
		Self {
			cancel,
			_keep_alive: None,
		}
	}

	/// A pacer that can never be cancelled.
	#[cfg(test)]
	pub(crate) fn uncancellable() -> Self {
		let (keep_alive, cancel) = std::sync::mpsc::channel();
		Self {
			cancel,
			_keep_alive: Some(keep_alive),
		}
	}

	/// Waits for `duration`, a zero duration still checks for cancellation.
	pub fn sleep(&self, duration: Duration) -> Result<()> {
		match self.cancel.recv_timeout(duration) {
			Err(RecvTimeoutError::Timeout) => Ok(()),
			Ok(()) | Err(RecvTimeoutError::Disconnected) => Err(Error::Cancelled),
		}
	}
}
