use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use rgb::RGB8;

use crate::{
	buffer::{PixelBuffer, Selection},
	color::ColorModel,
	Result,
};

/// Shared handle to the pixel buffer and the color model.
///
/// The foreground and a running pattern each hold a clone. Every operation
/// takes the lock only for its own duration, so concurrent writers simply
/// interleave and the last flush wins.
#[derive(Clone)]
pub struct Strip {
	count: usize,
	buffer: Arc<Mutex<PixelBuffer>>,
	color: Arc<RwLock<ColorModel>>,
}

impl Strip {
	pub fn new(buffer: PixelBuffer, color: ColorModel) -> Self {
		Self {
			count: buffer.count(),
			buffer: Arc::new(Mutex::new(buffer)),
			color: Arc::new(RwLock::new(color)),
		}
	}

	pub fn count(&self) -> usize {
		self.count
	}

	/// Lights the selected pixels with the current color and flushes.
	pub fn on(&self, selection: Selection<'_>) -> Result<()> {
		self.paint(selection, true)
	}

	/// Turns the selected pixels off and flushes.
	pub fn off(&self, selection: Selection<'_>) -> Result<()> {
		let mut buffer = self.buffer();
		buffer.set_selection(selection, RGB8::default())?;
		buffer.show()
	}

	/// Writes the current color into the selected pixels, flushing only if `show` is set.
	pub fn paint(&self, selection: Selection<'_>, show: bool) -> Result<()> {
		let color = self.color_model();
		let mut buffer = self.buffer();
		color.apply_current_color_to(&mut buffer, selection)?;
		if show {
			buffer.show()?;
		}
		Ok(())
	}

	/// Snapshot of the color model.
	pub fn color_model(&self) -> ColorModel {
		*self.color.read().unwrap_or_else(PoisonError::into_inner)
	}

	pub fn set_color(&self, color: RGB8) {
		self.color.write().unwrap_or_else(PoisonError::into_inner).set_current_color(color);
	}

	pub fn randomize_color(&self) -> RGB8 {
		self.color.write().unwrap_or_else(PoisonError::into_inner).randomize()
	}

	/// Runs `f` with exclusive access to the buffer.
	pub fn with_buffer<R>(&self, f: impl FnOnce(&mut PixelBuffer) -> R) -> R {
		f(&mut self.buffer())
	}

	/// Copy of the logical buffer contents, flushed or not.
	pub fn pixels(&self) -> Vec<RGB8> {
		self.buffer().pixels().to_vec()
	}

	fn buffer(&self) -> MutexGuard<'_, PixelBuffer> {
		self.buffer.lock().unwrap_or_else(PoisonError::into_inner)
	}
}
