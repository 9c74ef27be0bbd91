//! Still-image dimension extraction.

use crate::{ExtractCtx, Fields, MetadataHandler};
use shelf_filetype::{Error, Result};

/// Reads the dimension pair straight from the image header. A recognized
/// image that cannot be decoded is a fatal failure for the file.
pub(crate) struct StillImageHandler;

impl MetadataHandler for StillImageHandler {
	fn extract(&self, ctx: &ExtractCtx<'_>) -> Result<Fields> {
		let (width, height) = image::image_dimensions(ctx.path)?;

		Ok(Fields {
			width: Some(i64::from(width)),
			height: Some(i64::from(height)),
			..Default::default()
		})
	}
}

/// avif/heic/heif stills: the `image` crate has no decoder for these, so the
/// multimedia probe supplies the dimensions. Without a probe the kind is
/// recognized but unsupported.
pub(crate) struct HeifFamilyHandler;

impl MetadataHandler for HeifFamilyHandler {
	fn extract(&self, ctx: &ExtractCtx<'_>) -> Result<Fields> {
		let probe = ctx.media_probe.ok_or_else(|| {
			Error::Unsupported(format!(
				"no decoder available for {} files",
				ctx.kind
			))
		})?;

		let properties = probe.properties(ctx.path)?;

		Ok(Fields {
			width: Some(properties.width),
			height: Some(properties.height),
			..Default::default()
		})
	}
}
