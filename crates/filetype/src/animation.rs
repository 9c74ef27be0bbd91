//! Animation-presence probes for formats whose signature cannot tell the
//! static and animated variants apart.

use crate::Result;
use image::{codecs::gif::GifDecoder, AnimationDecoder};
use std::{fs::File, io::BufReader, path::Path};

/// An apng declares itself with an `acTL` chunk ahead of the first `IDAT`.
/// Both land comfortably inside the sniffer's header sample.
#[must_use]
pub fn png_is_animated(header: &[u8]) -> bool {
	let actl = find(header, b"acTL");
	let idat = find(header, b"IDAT");

	match (actl, idat) {
		(Some(actl), Some(idat)) => actl < idat,
		(Some(_), None) => true,
		(None, _) => false,
	}
}

/// True when the gif decodes to more than one frame.
pub fn gif_is_animated(path: &Path) -> Result<bool> {
	let decoder = match GifDecoder::new(BufReader::new(File::open(path)?)) {
		Ok(decoder) => decoder,
		// undecodable gifs are treated as static; the metadata pass will
		// report the real failure
		Err(_) => return Ok(false),
	};

	Ok(decoder
		.into_frames()
		.take(2)
		.filter(std::result::Result::is_ok)
		.count() > 1)
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
	haystack
		.windows(needle.len())
		.position(|window| window == needle)
}
