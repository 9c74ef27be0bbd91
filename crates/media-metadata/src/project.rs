//! Art-project file metadata.
//!
//! These formats are proprietary to varying degrees; each handler reads the
//! smallest slice of structure that yields a dimension pair.

use crate::{ExtractCtx, Fields, MetadataHandler};
use shelf_filetype::{Error, Result};
use tracing::debug;

/// Photoshop stores the canvas size in the fixed-layout file header,
/// height before width, both big-endian.
pub(crate) struct PsdHandler;

impl MetadataHandler for PsdHandler {
	fn extract(&self, ctx: &ExtractCtx<'_>) -> Result<Fields> {
		let data = std::fs::read(ctx.path)?;
		let header = data
			.get(14..22)
			.ok_or_else(|| Error::DamagedOrUnusual("psd header is truncated".into()))?;

		let height = u32::from_be_bytes([header[0], header[1], header[2], header[3]]);
		let width = u32::from_be_bytes([header[4], header[5], header[6], header[7]]);

		Ok(Fields {
			width: Some(i64::from(width)),
			height: Some(i64::from(height)),
			..Default::default()
		})
	}
}

/// Clip Studio files embed a full png preview; its dimensions are the
/// canvas dimensions.
pub(crate) struct ClipHandler;

impl MetadataHandler for ClipHandler {
	fn extract(&self, ctx: &ExtractCtx<'_>) -> Result<Fields> {
		let png = shelf_archive::clip::embedded_png_bytes(ctx.path)?;
		let preview = image::load_from_memory(&png)?;

		Ok(Fields {
			width: Some(i64::from(preview.width())),
			height: Some(i64::from(preview.height())),
			..Default::default()
		})
	}
}

/// Krita documents are zips with an xml manifest carrying the canvas size.
/// An unreadable manifest is tolerated; the document itself may still open.
pub(crate) struct KritaHandler;

impl MetadataHandler for KritaHandler {
	fn extract(&self, ctx: &ExtractCtx<'_>) -> Result<Fields> {
		match krita_dimensions(ctx) {
			Ok((width, height)) => Ok(Fields {
				width: Some(width),
				height: Some(height),
				..Default::default()
			}),
			Err(err) => {
				debug!(path = %ctx.path.display(), %err, "unreadable krita manifest");
				Ok(Fields::default())
			}
		}
	}
}

fn krita_dimensions(ctx: &ExtractCtx<'_>) -> Result<(i64, i64)> {
	let manifest = shelf_archive::read_entry(ctx.path, "maindoc.xml")?;
	let manifest = String::from_utf8_lossy(&manifest);

	let width = xml_attribute(&manifest, "width=")
		.ok_or_else(|| Error::DamagedOrUnusual("krita manifest has no width".into()))?;
	let height = xml_attribute(&manifest, "height=")
		.ok_or_else(|| Error::DamagedOrUnusual("krita manifest has no height".into()))?;

	Ok((width, height))
}

/// Pulls the first `name="123"` integer attribute out of raw xml text. Keeps
/// this crate free of an xml dependency for one pair of numbers.
fn xml_attribute(text: &str, name: &str) -> Option<i64> {
	let start = text.find(name)? + name.len();
	let rest = &text[start..];
	let quote = rest.chars().next()?;
	if quote != '"' && quote != '\'' {
		return None;
	}
	let rest = &rest[1..];
	let end = rest.find(quote)?;
	rest[..end].parse().ok()
}

/// Procreate bundles a QuickLook preview png whose dimensions track the
/// canvas. Tolerated on failure like krita.
pub(crate) struct ProcreateHandler;

impl MetadataHandler for ProcreateHandler {
	fn extract(&self, ctx: &ExtractCtx<'_>) -> Result<Fields> {
		let dimensions = shelf_archive::read_entry(ctx.path, "QuickLook/Thumbnail.png")
			.map_err(Error::from)
			.and_then(|bytes| {
				let preview = image::load_from_memory(&bytes)?;
				Ok((preview.width(), preview.height()))
			});

		match dimensions {
			Ok((width, height)) => Ok(Fields {
				width: Some(i64::from(width)),
				height: Some(i64::from(height)),
				..Default::default()
			}),
			Err(err) => {
				debug!(path = %ctx.path.display(), %err, "unreadable procreate preview");
				Ok(Fields::default())
			}
		}
	}
}
