//! Clip Studio Paint project support.
//!
//! A `.clip` file is a proprietary container wrapping an sqlite database, and
//! the database carries a full-size PNG preview of the canvas. Rather than
//! parse the database we scan the raw bytes for the PNG stream, which is what
//! the preview consumers need anyway.

use crate::{Error, Result};
use std::{fs, path::Path};

const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";
const IEND: &[u8] = b"IEND";

/// Locates the embedded canvas preview and returns its bytes.
pub fn embedded_png_bytes(path: impl AsRef<Path>) -> Result<Vec<u8>> {
	let data = fs::read(path.as_ref())?;

	let start = find(&data, PNG_SIGNATURE).ok_or(Error::NoEmbeddedRaster)?;
	let iend = find(&data[start..], IEND).ok_or(Error::NoEmbeddedRaster)?;

	// IEND chunk: 4 length bytes precede the tag, 4 CRC bytes follow it.
	let end = start + iend + IEND.len() + 4;
	if end > data.len() {
		return Err(Error::NoEmbeddedRaster);
	}

	Ok(data[start..end].to_vec())
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
	haystack
		.windows(needle.len())
		.position(|window| window == needle)
}
