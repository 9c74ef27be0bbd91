//! Page-document and comic-archive metadata.

use crate::{ExtractCtx, Fields, MetadataHandler};
use shelf_filetype::{Error, Result};
use std::io::Cursor;
use tracing::debug;

/// Raster resolution a pdf page is treated as having when its size in points
/// is converted to pixels.
const PDF_ASSUMED_DPI: f64 = 300.0;
const POINTS_PER_INCH: f64 = 72.0;

/// Dimensions a comic archive falls back to when its cover cannot be read.
/// The archive itself stays usable; the cover is just unknowable.
const CBZ_FALLBACK_DIMENSIONS: (i64, i64) = (100, 100);

pub(crate) struct CbzHandler;

impl CbzHandler {
	fn cover_dimensions(ctx: &ExtractCtx<'_>) -> Result<(i64, i64)> {
		let cover = shelf_archive::cover_bytes(ctx.path)?;
		// entry names are unreliable, so the format is guessed from content
		let (width, height) = image::io::Reader::new(Cursor::new(cover))
			.with_guessed_format()?
			.into_dimensions()?;
		Ok((i64::from(width), i64::from(height)))
	}
}

impl MetadataHandler for CbzHandler {
	fn extract(&self, ctx: &ExtractCtx<'_>) -> Result<Fields> {
		let (width, height) = match Self::cover_dimensions(ctx) {
			Ok(dimensions) => dimensions,
			Err(err) => {
				debug!(path = %ctx.path.display(), %err, "unreadable cbz cover, substituting");
				CBZ_FALLBACK_DIMENSIONS
			}
		};

		Ok(Fields {
			width: Some(width),
			height: Some(height),
			..Default::default()
		})
	}
}

pub(crate) struct PdfHandler;

impl MetadataHandler for PdfHandler {
	fn extract(&self, ctx: &ExtractCtx<'_>) -> Result<Fields> {
		let Some(renderer) = ctx.document_renderer else {
			// still importable, just with no intrinsic properties
			return Ok(Fields::default());
		};

		let (width, height) = match renderer.natural_page_size(ctx.path) {
			Ok((width_pt, height_pt)) => (
				Some((width_pt * PDF_ASSUMED_DPI / POINTS_PER_INCH).round() as i64),
				Some((height_pt * PDF_ASSUMED_DPI / POINTS_PER_INCH).round() as i64),
			),
			// access-protected documents surface to the caller as-is
			Err(err @ Error::Encrypted(_)) => return Err(err),
			Err(err) => {
				debug!(path = %ctx.path.display(), %err, "pdf page size unavailable");
				(None, None)
			}
		};

		let word_count = match renderer.word_count(ctx.path) {
			Ok(count) => Some(i64::from(count)),
			Err(err) => {
				debug!(path = %ctx.path.display(), %err, "pdf text layer unavailable");
				None
			}
		};

		Ok(Fields {
			width,
			height,
			word_count,
			..Default::default()
		})
	}
}
