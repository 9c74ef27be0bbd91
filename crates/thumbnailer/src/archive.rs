//! Cover extraction for archive-shaped formats.
//!
//! Comic archives and ugoira carry their cover as a regular entry, and the
//! project formats embed a preview; all of them are read into memory and
//! decoded by content, never by entry name.

use crate::Result;
use image::DynamicImage;
use std::path::Path;

/// Reads the first image entry and decodes it.
pub(crate) fn cover(path: &Path) -> Result<DynamicImage> {
	let bytes = shelf_archive::cover_bytes(path)?;
	Ok(image::load_from_memory(&bytes)?)
}

pub(crate) fn clip_preview(path: &Path) -> Result<DynamicImage> {
	let png = shelf_archive::clip::embedded_png_bytes(path)?;
	Ok(image::load_from_memory(&png)?)
}

pub(crate) fn procreate_preview(path: &Path) -> Result<DynamicImage> {
	let png = shelf_archive::read_entry(path, "QuickLook/Thumbnail.png")?;
	Ok(image::load_from_memory(&png)?)
}

/// Krita zips hold a full merged render plus a small preview; prefer the
/// merged render.
pub(crate) fn krita_preview(path: &Path) -> Result<DynamicImage> {
	let png = shelf_archive::read_entry(path, "mergedimage.png")
		.or_else(|_| shelf_archive::read_entry(path, "preview.png"))?;
	Ok(image::load_from_memory(&png)?)
}
