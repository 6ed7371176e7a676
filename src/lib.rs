//! Drive an addressable LED strip: a shared pixel buffer, the current color
//! with its channel swap, a library of timed animations and a supervisor that
//! keeps at most one of them running in the background.

use std::io;

pub mod buffer;
pub mod color;
pub mod config;
pub mod controller;
#[cfg(feature = "server")]
pub mod http;
pub mod patterns;
pub mod serial;
pub mod strip;
pub mod supervisor;
pub mod transport;

pub use buffer::{PixelBuffer, Selection};
pub use color::ColorModel;
pub use config::Config;
pub use controller::Controller;
pub use patterns::{Pattern, Timing};
pub use rgb::RGB8;
pub use strip::Strip;
pub use strip_lights_shared::ChannelOrder;
pub use supervisor::Supervisor;
pub use transport::{MemoryTransport, Transport, TransportError};

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("pixel index {index} is out of range for a strip of {count} pixels")]
	IndexOutOfRange { index: usize, count: usize },
	#[error("unknown pattern \"{0}\"")]
	UnknownPattern(String),
	#[error("hardware: {0}")]
	Hardware(#[from] TransportError),
	#[error("invalid duration of {0} seconds")]
	InvalidTiming(f64),
	#[error("slide value {0} is out of range")]
	InvalidSlide(i64),
	/// A stop was requested while the pattern was waiting.
	#[error("pattern cancelled")]
	Cancelled,
	#[error("could not start pattern thread: {0}")]
	Spawn(#[source] io::Error),
	#[error("configuration: {0}")]
	Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
