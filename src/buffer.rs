use rgb::RGB8;

use crate::{transport::Transport, Error, Result};

/// Which pixels an operation applies to.
#[derive(Debug, Clone, Copy)]
pub enum Selection<'a> {
	All,
	Only(&'a [usize]),
}

impl<'a> Selection<'a> {
	pub fn single(index: &'a usize) -> Self {
		Self::Only(std::slice::from_ref(index))
	}
}

/// In-memory pixel store in front of a [`Transport`].
///
/// Writes are purely logical until [`PixelBuffer::show`] pushes the whole
/// frame to the strip.
pub struct PixelBuffer {
	pixels: Vec<RGB8>,
	transport: Box<dyn Transport>,
}

impl PixelBuffer {
	pub fn new(count: usize, transport: Box<dyn Transport>) -> Self {
		Self {
			pixels: vec![RGB8::default(); count],
			transport,
		}
	}

	pub fn count(&self) -> usize {
		self.pixels.len()
	}

	/// Fails with [`Error::IndexOutOfRange`] if `index` is not on the strip.
	pub fn check_index(&self, index: usize) -> Result<()> {
		if index < self.pixels.len() {
			Ok(())
		} else {
			Err(Error::IndexOutOfRange {
				index,
				count: self.pixels.len(),
			})
		}
	}

	pub fn set_pixel(&mut self, index: usize, color: RGB8) -> Result<()> {
		self.check_index(index)?;
		self.pixels[index] = color;
		Ok(())
	}

	pub fn get_pixel(&self, index: usize) -> Result<RGB8> {
		self.check_index(index)?;
		Ok(self.pixels[index])
	}

	pub fn set_all_pixels(&mut self, color: RGB8) {
		self.pixels.fill(color);
	}

	/// Sets the selected pixels to `color`.
	///
	/// Every index is checked before the first pixel is written.
	pub fn set_selection(&mut self, selection: Selection<'_>, color: RGB8) -> Result<()> {
		match selection {
			Selection::All => self.set_all_pixels(color),
			Selection::Only(indices) => {
				for &index in indices {
					self.check_index(index)?;
				}
				for &index in indices {
					self.pixels[index] = color;
				}
			}
		}
		Ok(())
	}

	/// Turns every pixel off without flushing.
	pub fn clear(&mut self) {
		self.set_all_pixels(RGB8::default());
	}

	pub fn pixels(&self) -> &[RGB8] {
		&self.pixels
	}

	/// Flushes the buffer to the strip.
	///
	/// A failed flush is not retried, the buffer keeps its contents.
	pub fn show(&mut self) -> Result<()> {
		self.transport.write(&self.pixels)?;
		Ok(())
	}
}
