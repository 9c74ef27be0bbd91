//! Frame-count and duration extraction for animated formats.

use crate::{ExtractCtx, Fields, MetadataHandler};
use image::{codecs::gif::GifDecoder, AnimationDecoder};
use serde::Deserialize;
use shelf_filetype::{Error, Result};
use std::{
	fs::File,
	io::{BufReader, Cursor},
	time::Duration,
};
use tracing::debug;

pub(crate) struct GifHandler;

impl MetadataHandler for GifHandler {
	fn extract(&self, ctx: &ExtractCtx<'_>) -> Result<Fields> {
		let decoder = GifDecoder::new(BufReader::new(File::open(ctx.path)?))?;

		let mut frame_count = 0i64;
		let mut total = Duration::ZERO;
		for frame in decoder.into_frames() {
			let frame = frame?;
			frame_count += 1;
			total += Duration::from(frame.delay());
		}

		let (width, height) = image::image_dimensions(ctx.path)?;

		Ok(Fields {
			width: Some(i64::from(width)),
			height: Some(i64::from(height)),
			duration_ms: Some(total.as_millis() as i64),
			frame_count: Some(frame_count),
			..Default::default()
		})
	}
}

pub(crate) struct ApngHandler;

impl MetadataHandler for ApngHandler {
	fn extract(&self, ctx: &ExtractCtx<'_>) -> Result<Fields> {
		let data = std::fs::read(ctx.path)?;
		let properties = apng_properties(&data)
			.ok_or_else(|| Error::DamagedOrUnusual("malformed apng chunk stream".into()))?;

		Ok(Fields {
			width: Some(i64::from(properties.width)),
			height: Some(i64::from(properties.height)),
			duration_ms: Some(properties.duration_ms),
			frame_count: Some(i64::from(properties.frame_count)),
			..Default::default()
		})
	}
}

struct ApngProperties {
	width: u32,
	height: u32,
	frame_count: u32,
	duration_ms: i64,
}

/// Walks the png chunk stream: `IHDR` for dimensions, `acTL` for the declared
/// frame count, `fcTL` delays summed for the duration.
fn apng_properties(data: &[u8]) -> Option<ApngProperties> {
	let mut cursor = 8usize; // past the signature
	let mut dimensions = None;
	let mut frame_count = None;
	let mut duration = Duration::ZERO;

	while cursor + 8 <= data.len() {
		let length = u32::from_be_bytes(data.get(cursor..cursor + 4)?.try_into().ok()?) as usize;
		let chunk_type = data.get(cursor + 4..cursor + 8)?;
		let body = data.get(cursor + 8..cursor + 8 + length)?;

		match chunk_type {
			b"IHDR" if length >= 8 => {
				let width = u32::from_be_bytes(body[..4].try_into().ok()?);
				let height = u32::from_be_bytes(body[4..8].try_into().ok()?);
				dimensions = Some((width, height));
			}
			b"acTL" if length >= 4 => {
				frame_count = Some(u32::from_be_bytes(body[..4].try_into().ok()?));
			}
			b"fcTL" if length >= 24 => {
				let delay_num = u16::from_be_bytes(body[20..22].try_into().ok()?);
				let delay_den = u16::from_be_bytes(body[22..24].try_into().ok()?);
				// a zero denominator means 1/100s, per the apng spec
				let den = if delay_den == 0 { 100 } else { delay_den };
				duration +=
					Duration::from_secs_f64(f64::from(delay_num) / f64::from(den));
			}
			b"IEND" => break,
			_ => {}
		}

		// chunk body plus the trailing crc
		cursor += 8 + length + 4;
	}

	let (width, height) = dimensions?;
	Some(ApngProperties {
		width,
		height,
		frame_count: frame_count?,
		duration_ms: duration.as_millis() as i64,
	})
}

pub(crate) struct UgoiraHandler;

#[derive(Deserialize)]
struct UgoiraTimings {
	frames: Vec<UgoiraFrame>,
}

#[derive(Deserialize)]
struct UgoiraFrame {
	#[allow(dead_code)]
	file: String,
	delay: i64,
}

impl MetadataHandler for UgoiraHandler {
	fn extract(&self, ctx: &ExtractCtx<'_>) -> Result<Fields> {
		let frames = shelf_archive::image_entry_names(ctx.path)?;
		if frames.is_empty() {
			return Err(Error::DamagedOrUnusual("ugoira archive has no frames".into()));
		}

		// cover frame dimensions straight from the archive, decoded by content
		let cover = shelf_archive::cover_bytes(ctx.path)?;
		let (width, height) = image::io::Reader::new(Cursor::new(cover))
			.with_guessed_format()?
			.into_dimensions()?;

		// timing data is optional; without it the duration stays empty
		let duration_ms = match shelf_archive::read_entry(ctx.path, "animation.json") {
			Ok(bytes) => serde_json::from_slice::<UgoiraTimings>(&bytes)
				.map(|timings| timings.frames.iter().map(|frame| frame.delay).sum::<i64>())
				.ok(),
			Err(err) => {
				debug!(path = %ctx.path.display(), %err, "ugoira has no timing entry");
				None
			}
		};

		Ok(Fields {
			width: Some(i64::from(width)),
			height: Some(i64::from(height)),
			duration_ms,
			frame_count: Some(frames.len() as i64),
			..Default::default()
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use shelf_filetype::FileKind;
	use std::{fs, io::Write};

	#[test]
	fn ugoira_cover_dimensions_and_timings_are_read() {
		let dir = tempfile::tempdir().unwrap();
		let frame = dir.path().join("frame.png");
		image::RgbaImage::new(9, 6).save(&frame).unwrap();
		let frame = fs::read(&frame).unwrap();

		let path = dir.path().join("anim.zip");
		let mut writer = zip::ZipWriter::new(fs::File::create(&path).unwrap());
		for name in ["000000.png", "000001.png"] {
			writer
				.start_file(name, zip::write::FileOptions::default())
				.unwrap();
			writer.write_all(&frame).unwrap();
		}
		writer
			.start_file("animation.json", zip::write::FileOptions::default())
			.unwrap();
		writer
			.write_all(
				br#"{"frames":[{"file":"000000.png","delay":80},{"file":"000001.png","delay":120}]}"#,
			)
			.unwrap();
		writer.finish().unwrap();

		let fields = UgoiraHandler
			.extract(&ExtractCtx {
				path: &path,
				kind: FileKind::Ugoira,
				media_probe: None,
				document_renderer: None,
			})
			.unwrap();

		assert_eq!(fields.width, Some(9));
		assert_eq!(fields.height, Some(6));
		assert_eq!(fields.frame_count, Some(2));
		assert_eq!(fields.duration_ms, Some(200));
	}

	#[test]
	fn apng_chunk_walk() {
		let mut data = Vec::new();
		data.extend_from_slice(b"\x89PNG\r\n\x1a\n");
		push_chunk(&mut data, b"IHDR", &ihdr_body(4, 3));
		push_chunk(&mut data, b"acTL", &actl_body(2));
		push_chunk(&mut data, b"fcTL", &fctl_body(50, 100)); // 0.5s
		push_chunk(&mut data, b"fcTL", &fctl_body(1, 0)); // den 0 => 1/100s
		push_chunk(&mut data, b"IEND", &[]);

		let properties = apng_properties(&data).unwrap();
		assert_eq!(properties.width, 4);
		assert_eq!(properties.height, 3);
		assert_eq!(properties.frame_count, 2);
		assert_eq!(properties.duration_ms, 510);
	}

	fn push_chunk(data: &mut Vec<u8>, chunk_type: &[u8; 4], body: &[u8]) {
		data.extend_from_slice(&(body.len() as u32).to_be_bytes());
		data.extend_from_slice(chunk_type);
		data.extend_from_slice(body);
		data.extend_from_slice(&[0u8; 4]); // crc is not verified by the walk
	}

	fn ihdr_body(width: u32, height: u32) -> Vec<u8> {
		let mut body = Vec::new();
		body.extend_from_slice(&width.to_be_bytes());
		body.extend_from_slice(&height.to_be_bytes());
		body.extend_from_slice(&[8, 6, 0, 0, 0]);
		body
	}

	fn actl_body(frames: u32) -> Vec<u8> {
		let mut body = frames.to_be_bytes().to_vec();
		body.extend_from_slice(&0u32.to_be_bytes());
		body
	}

	fn fctl_body(delay_num: u16, delay_den: u16) -> Vec<u8> {
		let mut body = vec![0u8; 20];
		body.extend_from_slice(&delay_num.to_be_bytes());
		body.extend_from_slice(&delay_den.to_be_bytes());
		body.extend_from_slice(&[0, 0]);
		body
	}
}
