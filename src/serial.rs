use std::{
	io,
	io::{Read, Write},
	time::Duration,
};

use rgb::RGB8;
use serialport::{SerialPort, SerialPortType};
use strip_lights_shared::{
	frame_len,
	wire_bytes,
	DEVICE_ERROR_MESSAGE,
	DEVICE_INIT_MESSAGE,
	DEVICE_MESSAGE_TYPE_LEN,
	DEVICE_OK_MESSAGE,
	DEVICE_PARTIAL_MESSAGE,
	DEVICE_PRODUCT_NAME,
	SET_LEDS_MESSAGE,
	SET_STRIPS_MESSAGE,
	STRIPS,
	UPDATE_MESSAGE,
};
use tracing::{info, warn};

use crate::transport::{Transport, TransportError};

pub const DEFAULT_BAUD_RATE: u32 = 921_600;

/// Reads attempted while resetting before the device counts as unresponsive.
const RESET_ATTEMPTS: usize = 300;

type Result<T> = std::result::Result<T, TransportError>;

/// Transport for a USB serial to WS2812 bridge device driving a single strip.
pub struct SerialTransport {
	leds: usize,
	port: Box<dyn SerialPort>,
	frame: Vec<u8>,

	initialized: bool,
}

impl SerialTransport {
	/// Open the given serial device for a strip of `leds` pixels.
	pub fn new(serial_device: &str, baud_rate: u32, leds: usize) -> Result<Self> {
		let builder = serialport::new(serial_device, baud_rate).timeout(Duration::from_millis(50));
		let port = builder.open()?;
		info!(device = serial_device, leds, "opened serial device");

		Ok(Self {
			leds,
			port,
			frame: Vec::with_capacity(frame_len(leds)),

			initialized: false,
		})
	}

	/// Finds the first serial device with product name "Serial WS2812" and opens it.
	///
	/// If more than one device is connected the returned device will be the first the OS lists.
	pub fn find(baud_rate: u32, leds: usize) -> Result<Self> {
		let ports = serialport::available_ports()?;
		let mut serial_device = None;

		for p in ports {
			if let SerialPortType::UsbPort(usb) = p.port_type {
				if usb.product == Some(DEVICE_PRODUCT_NAME.to_string())
					|| usb.product == Some(DEVICE_PRODUCT_NAME.replace(' ', "_"))
				{
					serial_device = Some(p.port_name);
					break;
				}
			}
		}

		let Some(serial_device) = serial_device else {
			return Err(TransportError::DeviceNotFound);
		};

		Self::new(&serial_device, baud_rate, leds)
	}

	fn reset_to_command(&mut self) -> Result<()> {
		info!("trying to reset device to start of command");
		self.port.set_timeout(Duration::from_millis(10))?;
		let reset = reset_handshake(&mut self.port);
		self.port.set_timeout(Duration::from_millis(50))?;

		reset?;
		info!("reset successful");
		Ok(())
	}

	/// Resets the device if needed and tells it how many pixels to expect.
	pub fn configure(&mut self) -> Result<()> {
		if !self.initialized {
			self.reset_to_command()?;
			self.initialized = true;
		}

		self.send_command(SET_STRIPS_MESSAGE, &STRIPS.to_le_bytes())?;
		self.send_command(SET_LEDS_MESSAGE, &(self.leds as u32).to_le_bytes())?;

		Ok(())
	}

	fn send_command(&mut self, command: &[u8], data: &[u8]) -> Result<()> {
		self.serial_write(command)?;
		self.expect_response(DEVICE_PARTIAL_MESSAGE)?;

		self.serial_write(data)?;
		self.expect_response(DEVICE_OK_MESSAGE)
	}

	fn expect_response(&mut self, expected: &[u8; DEVICE_MESSAGE_TYPE_LEN]) -> Result<()> {
		let mut output = [0u8; DEVICE_MESSAGE_TYPE_LEN];

		if self.port.read(&mut output)? != DEVICE_MESSAGE_TYPE_LEN {
			return Err(TransportError::NoResponse);
		}
		if &output != expected {
			return Err(TransportError::UnexpectedResponse {
				expected: String::from_utf8_lossy(expected).to_string(),
				received: format!("{:?}", output),
			});
		}

		Ok(())
	}

	fn serial_write(&mut self, buffer: &[u8]) -> Result<()> {
		match self.port.write_all(buffer) {
			Ok(()) => Ok(()),
			Err(ref e) if e.kind() == io::ErrorKind::TimedOut => {
				warn!("serial timeout");
				Err(TransportError::IncompleteWrite)
			}
			Err(e) => Err(e.into()),
		}
	}
}

/// Pokes the device with null bytes until it answers `i` or `e`.
///
/// Gives up with [`TransportError::NoResponse`] after [`RESET_ATTEMPTS`] reads.
fn reset_handshake(port: &mut (impl Read + Write)) -> Result<()> {
	let mut buffer = [0u8; DEVICE_MESSAGE_TYPE_LEN * 4];

	let mut has_logged = false;
	let mut counter = 0;

	for _ in 0..RESET_ATTEMPTS {
		let read_bytes = match port.read(&mut buffer) {
			Ok(n) => n,
			Err(e) if e.kind() == io::ErrorKind::TimedOut => {
				if !has_logged {
					info!("read timeout, writing null bytes to force a response");
					has_logged = true;
				}

				counter += 1;
				if counter < 8 {
					port.write_all(&[0u8])?;
				} else {
					port.write_all(&[0u8; 32])?;
				}

				continue;
			}
			Err(e) => return Err(e.into()),
		};

		// more than one byte means the 32 byte burst was answered, start over
		if read_bytes > 1 {
			counter = 0;
			continue;
		}

		if read_bytes == 1 && (&buffer[..1] == DEVICE_INIT_MESSAGE || &buffer[..1] == DEVICE_ERROR_MESSAGE) {
			return Ok(());
		}
	}

	warn!(attempts = RESET_ATTEMPTS, "device never answered the reset");
	Err(TransportError::NoResponse)
}

impl Transport for SerialTransport {
	fn write(&mut self, pixels: &[RGB8]) -> Result<()> {
		if !self.initialized {
			self.configure()?;
		}

		self.frame.clear();
		self.frame.extend(wire_bytes(pixels));
		let frame = std::mem::take(&mut self.frame);
		let result = self.send_command(UPDATE_MESSAGE, &frame);
		self.frame = frame;

		result
	}
}
