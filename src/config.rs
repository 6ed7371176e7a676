use std::{
	fs,
	io,
	path::{Path, PathBuf},
};

use serde::Deserialize;
use strip_lights_shared::{ChannelOrder, MAX_LEDS_PER_STRIP};
use tracing::info;

use crate::{
	serial::{SerialTransport, DEFAULT_BAUD_RATE},
	transport::{MemoryTransport, Transport},
	Error,
	Result,
};

/// Settings read once at startup.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
	pub general: General,
	pub logging: Logging,
	pub hardware: Hardware,
	pub http: Http,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct General {
	/// Number of pixels on the strip.
	pub pixel_count: usize,
	/// Set for strips wired with green and blue swapped.
	pub is_rbg: bool,
}

impl Default for General {
	fn default() -> Self {
		Self {
			pixel_count: 160,
			is_rbg: true,
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Logging {
	/// Default filter directive, `RUST_LOG` takes precedence.
	pub level: String,
}

impl Logging {
	/// Filter directive to start with, `--quiet` caps it at `info`.
	pub fn filter(&self, quiet: bool) -> &str {
		if quiet {
			"info"
		} else {
			&self.level
		}
	}
}

impl Default for Logging {
	fn default() -> Self {
		Self {
			level: "debug".to_string(),
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
	#[default]
	Serial,
	Memory,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Hardware {
	pub transport: TransportKind,
	/// Serial device path, looked up by USB product name when absent.
	pub device: Option<String>,
	pub baud_rate: u32,
}

impl Default for Hardware {
	fn default() -> Self {
		Self {
			transport: TransportKind::Serial,
			device: None,
			baud_rate: DEFAULT_BAUD_RATE,
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Http {
	pub bind: String,
	pub static_dir: Option<PathBuf>,
}

impl Default for Http {
	fn default() -> Self {
		Self {
			bind: "0.0.0.0:80".to_string(),
			static_dir: None,
		}
	}
}

impl Config {
	/// Reads the config file at `path`, a missing file means all defaults.
	pub fn load(path: &Path) -> Result<Self> {
		match fs::read_to_string(path) {
			Ok(contents) => Self::parse(&contents),
			Err(e) if e.kind() == io::ErrorKind::NotFound => {
				info!(path = %path.display(), "no config file, using defaults");
				Ok(Self::default())
			}
			Err(e) => Err(Error::Config(format!("reading {}: {e}", path.display()))),
		}
	}

	pub fn parse(contents: &str) -> Result<Self> {
		let config: Self = toml::from_str(contents).map_err(|e| Error::Config(e.to_string()))?;
		config.validate()?;
		Ok(config)
	}

	fn validate(&self) -> Result<()> {
		if self.general.pixel_count == 0 {
			return Err(Error::Config("pixel_count must be at least 1".to_string()));
		}
		if self.hardware.transport == TransportKind::Serial && self.general.pixel_count > MAX_LEDS_PER_STRIP {
			return Err(Error::Config(format!(
				"pixel_count {} exceeds the {MAX_LEDS_PER_STRIP} pixels the serial device supports",
				self.general.pixel_count
			)));
		}
		Ok(())
	}

	pub fn channel_order(&self) -> ChannelOrder {
		ChannelOrder::from_rbg_flag(self.general.is_rbg)
	}

	/// Opens the configured transport.
	pub fn open_transport(&self) -> Result<Box<dyn Transport>> {
		let leds = self.general.pixel_count;
		let transport: Box<dyn Transport> = match self.hardware.transport {
			TransportKind::Serial => match &self.hardware.device {
				Some(device) => Box::new(SerialTransport::new(device, self.hardware.baud_rate, leds)?),
				None => Box::new(SerialTransport::find(self.hardware.baud_rate, leds)?),
			},
			TransportKind::Memory => Box::new(MemoryTransport::with_history(1)),
		};
		Ok(transport)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn empty_file_uses_defaults() {
		let config = Config::parse("").unwrap();
		assert_eq!(config.general.pixel_count, 160);
		assert!(config.general.is_rbg);
		assert_eq!(config.channel_order(), ChannelOrder::Rbg);
		assert_eq!(config.logging.level, "debug");
		assert_eq!(config.hardware.transport, TransportKind::Serial);
		assert_eq!(config.hardware.baud_rate, 921_600);
	}

	#[test]
	fn sections_override_defaults() {
		let config = Config::parse(
			r#"
			[general]
			pixel_count = 32
			is_rbg = false

			[hardware]
			transport = "memory"

			[http]
			bind = "127.0.0.1:8080"
			static_dir = "web"
			"#,
		)
		.unwrap();

		assert_eq!(config.general.pixel_count, 32);
		assert_eq!(config.channel_order(), ChannelOrder::Rgb);
		assert_eq!(config.hardware.transport, TransportKind::Memory);
		assert_eq!(config.http.bind, "127.0.0.1:8080");
		assert_eq!(config.http.static_dir, Some(PathBuf::from("web")));
	}

	#[test]
	fn invalid_pixel_counts_are_rejected() {
		assert!(matches!(Config::parse("[general]\npixel_count = 0"), Err(Error::Config(_))));
		assert!(matches!(Config::parse("[general]\npixel_count = 600"), Err(Error::Config(_))));
		assert!(Config::parse("[general]\npixel_count = 600\n[hardware]\ntransport = \"memory\"").is_ok());
	}

	#[test]
	fn unknown_keys_are_rejected() {
		assert!(matches!(Config::parse("[general]\npixels = 10"), Err(Error::Config(_))));
	}

	#[test]
	fn quiet_logs_at_info() {
		let config = Config::parse("[logging]\nlevel = \"trace\"").unwrap();
		assert_eq!(config.logging.filter(false), "trace");
		assert_eq!(config.logging.filter(true), "info");
	}

	#[test]
	fn missing_file_means_defaults() {
		let config = Config::load(Path::new("/nonexistent/strip-lights.toml")).unwrap();
		assert_eq!(config.general.pixel_count, 160);
	}

	#[test]
	fn memory_transport_needs_no_hardware() {
		let config = Config::parse("[hardware]\ntransport = \"memory\"").unwrap();
		assert!(config.open_transport().is_ok());
	}
}
