//! Shockwave flash header parsing.
//!
//! The stage rect, frame rate and frame count sit right after the 8-byte
//! shell, so only a short prefix of the body ever needs inflating.

use crate::{ExtractCtx, Fields, MetadataHandler};
use flate2::read::ZlibDecoder;
use shelf_filetype::{Error, Result};
use std::io::Read;
use tracing::debug;

/// Stage coordinates are in twips, 20 per pixel.
const TWIPS_PER_PIXEL: i64 = 20;

/// Plenty for the rect plus the two u16s that follow it.
const BODY_PREFIX_LEN: usize = 64;

pub(crate) struct FlashHandler;

impl MetadataHandler for FlashHandler {
	fn extract(&self, ctx: &ExtractCtx<'_>) -> Result<Fields> {
		let data = std::fs::read(ctx.path)?;
		if data.len() < 9 {
			return Err(Error::DamagedOrUnusual("flash file is truncated".into()));
		}

		let body = match &data[..3] {
			b"FWS" => data[8..].to_vec(),
			b"CWS" => {
				let mut body = Vec::with_capacity(BODY_PREFIX_LEN);
				ZlibDecoder::new(&data[8..])
					.take(BODY_PREFIX_LEN as u64)
					.read_to_end(&mut body)
					.map_err(|err| {
						Error::DamagedOrUnusual(format!("bad flash zlib stream: {err}"))
					})?;
				body
			}
			// lzma-compressed; the header is not worth a whole extra decoder
			b"ZWS" => {
				debug!(path = %ctx.path.display(), "lzma flash, skipping header parse");
				return Ok(Fields::default());
			}
			_ => return Err(Error::DamagedOrUnusual("unrecognized flash shell".into())),
		};

		parse_flash_body(&body)
			.ok_or_else(|| Error::DamagedOrUnusual("malformed flash stage header".into()))
	}
}

fn parse_flash_body(body: &[u8]) -> Option<Fields> {
	let mut bits = BitReader::new(body);

	let nbits = bits.take(5)? as u32;
	let x_min = bits.take_signed(nbits)?;
	let x_max = bits.take_signed(nbits)?;
	let y_min = bits.take_signed(nbits)?;
	let y_max = bits.take_signed(nbits)?;

	let after_rect = bits.bytes_consumed();
	let rate_raw = u16::from_le_bytes(body.get(after_rect..after_rect + 2)?.try_into().ok()?);
	let frame_count =
		u16::from_le_bytes(body.get(after_rect + 2..after_rect + 4)?.try_into().ok()?);

	// 8.8 fixed point frames per second
	let frame_rate = f64::from(rate_raw) / 256.0;
	let duration_ms = if frame_rate > 0.0 {
		Some((f64::from(frame_count) / frame_rate * 1000.0).round() as i64)
	} else {
		None
	};

	Some(Fields {
		width: Some((x_max - x_min) / TWIPS_PER_PIXEL),
		height: Some((y_max - y_min) / TWIPS_PER_PIXEL),
		duration_ms,
		frame_count: Some(i64::from(frame_count)),
		..Default::default()
	})
}

/// Big-endian bit cursor over a byte slice.
struct BitReader<'a> {
	data: &'a [u8],
	position: usize,
}

impl<'a> BitReader<'a> {
	fn new(data: &'a [u8]) -> Self {
		Self { data, position: 0 }
	}

	fn take(&mut self, count: u32) -> Option<u64> {
		let mut value = 0u64;
		for _ in 0..count {
			let byte = *self.data.get(self.position / 8)?;
			let bit = (byte >> (7 - (self.position % 8))) & 1;
			value = (value << 1) | u64::from(bit);
			self.position += 1;
		}
		Some(value)
	}

	fn take_signed(&mut self, count: u32) -> Option<i64> {
		if count == 0 {
			return Some(0);
		}
		let raw = self.take(count)?;
		let sign_bit = 1u64 << (count - 1);
		Some(if raw & sign_bit != 0 {
			(raw as i64) - ((sign_bit as i64) << 1)
		} else {
			raw as i64
		})
	}

	/// Bytes covered so far, the cursor rounded up to a byte boundary.
	fn bytes_consumed(&self) -> usize {
		(self.position + 7) / 8
	}
}
