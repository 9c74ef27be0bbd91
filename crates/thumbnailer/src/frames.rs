//! Preview-frame selection for time- and frame-indexed files.

use crate::{Error, Result};
use image::{codecs::gif::GifDecoder, AnimationDecoder, DynamicImage};
use shelf_filetype::MediaProbe;
use std::{fs::File, io::BufReader, path::Path};
use tracing::debug;

/// The frame a preview is taken from: `percentage_in` percent of the way
/// through, floored, so a 10-frame file at 35% yields frame 3.
#[must_use]
pub(crate) fn preview_frame_index(percentage_in: f32, frame_count: u32) -> u32 {
	if frame_count == 0 {
		return 0;
	}
	(f64::from(percentage_in) / 100.0 * f64::from(frame_count - 1)).floor() as u32
}

/// Decodes the preview frame through the multimedia probe, retrying once at
/// frame zero before giving up.
pub(crate) fn probe_frame(
	probe: &dyn MediaProbe,
	path: &Path,
	percentage_in: f32,
	frame_count: Option<u32>,
	target: (u32, u32),
) -> Result<DynamicImage> {
	let frame_count = match frame_count {
		Some(count) => count,
		None => u32::try_from(probe.properties(path)?.frame_count.max(0)).unwrap_or(u32::MAX),
	};

	let index = preview_frame_index(percentage_in, frame_count);
	match probe.decode_frame(path, index, target) {
		Ok(frame) => Ok(frame),
		Err(err) if index != 0 => {
			debug!(path = %path.display(), index, %err, "preview frame failed, retrying at zero");
			Ok(probe.decode_frame(path, 0, target)?)
		}
		Err(err) => Err(err.into()),
	}
}

/// Native gif path for when no probe is attached: walk to the preview frame,
/// retrying at frame zero like the probe path.
pub(crate) fn gif_frame(path: &Path, percentage_in: f32) -> Result<DynamicImage> {
	let frames: Vec<_> = GifDecoder::new(BufReader::new(File::open(path)?))?
		.into_frames()
		.collect();
	let decoded = frames.len() as u32;

	let index = preview_frame_index(percentage_in, decoded);
	for candidate in [index, 0] {
		match frames.get(candidate as usize) {
			Some(Ok(frame)) => {
				return Ok(DynamicImage::ImageRgba8(frame.buffer().clone()));
			}
			_ if candidate != 0 => {
				debug!(path = %path.display(), candidate, "gif preview frame failed, retrying at zero");
			}
			_ => break,
		}
	}

	Err(Error::Frame(index))
}
