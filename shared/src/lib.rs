#![cfg_attr(not(test), no_std)]

use rgb::RGB8;

pub const MESSAGE_TYPE_LEN: usize = 8;

pub const UPDATE_MESSAGE: &[u8; MESSAGE_TYPE_LEN] = b"update\0\0";
pub const SET_STRIPS_MESSAGE: &[u8; MESSAGE_TYPE_LEN] = b"strips\0\0";
pub const SET_LEDS_MESSAGE: &[u8; MESSAGE_TYPE_LEN] = b"leds\0\0\0\0";

/// A controller drives exactly one strip on the device.
pub const STRIPS: u32 = 1;
/// Upper bound the device firmware accepts for a single strip.
pub const MAX_LEDS_PER_STRIP: usize = 512;
pub const BYTES_PER_LED: usize = 3;

pub const DEVICE_MESSAGE_TYPE_LEN: usize = 1;

pub const DEVICE_INIT_MESSAGE: &[u8; DEVICE_MESSAGE_TYPE_LEN] = b"i";
pub const DEVICE_ERROR_MESSAGE: &[u8; DEVICE_MESSAGE_TYPE_LEN] = b"e";
pub const DEVICE_PARTIAL_MESSAGE: &[u8; DEVICE_MESSAGE_TYPE_LEN] = b"p";
pub const DEVICE_OK_MESSAGE: &[u8; DEVICE_MESSAGE_TYPE_LEN] = b"k";

pub const DEVICE_PRODUCT_NAME: &str = "Serial WS2812";

/// Order in which a strip expects the color channels of a logical RGB value.
///
/// Some strips are wired with green and blue swapped, anything that writes
/// "the current color" has to go through [`ChannelOrder::to_wire`] first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChannelOrder {
	#[default]
	Rgb,
	Rbg,
}

impl ChannelOrder {
	pub fn from_rbg_flag(is_rbg: bool) -> Self {
		if is_rbg {
			Self::Rbg
		} else {
			Self::Rgb
		}
	}

	pub fn to_wire(self, color: RGB8) -> RGB8 {
		match self {
			Self::Rgb => color,
			Self::Rbg => RGB8::new(color.r, color.b, color.g),
		}
	}
}

/// Number of payload bytes an `update` message carries for `leds` pixels.
pub const fn frame_len(leds: usize) -> usize {
	leds * BYTES_PER_LED
}

/// Flattens a frame into the byte stream the device expects after `update`.
pub fn wire_bytes(pixels: &[RGB8]) -> impl Iterator<Item = u8> + '_ {
	pixels.iter().flat_map(|p| [p.r, p.g, p.b])
}
