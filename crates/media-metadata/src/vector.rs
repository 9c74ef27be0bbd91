//! Vector image metadata.

use crate::{ExtractCtx, Fields, MetadataHandler};
use resvg::usvg;
use shelf_filetype::Result;
use tracing::debug;

/// Svg dimensions come from the parsed tree's resolved size. A document that
/// does not parse is tolerated; the renderer gets its own chance later.
pub(crate) struct SvgHandler;

impl MetadataHandler for SvgHandler {
	fn extract(&self, ctx: &ExtractCtx<'_>) -> Result<Fields> {
		let data = std::fs::read(ctx.path)?;

		match usvg::Tree::from_data(&data, &usvg::Options::default()) {
			Ok(tree) => {
				let size = tree.size();
				Ok(Fields {
					width: Some(size.width().round() as i64),
					height: Some(size.height().round() as i64),
					..Default::default()
				})
			}
			Err(err) => {
				debug!(path = %ctx.path.display(), %err, "unparseable svg");
				Ok(Fields::default())
			}
		}
	}
}
