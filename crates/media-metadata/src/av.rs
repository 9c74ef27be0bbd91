//! Video and audio stream properties via the multimedia probe.

use crate::{ExtractCtx, Fields, MetadataHandler};
use shelf_filetype::{Error, Result};

/// A recognized video that the probe cannot read is a fatal failure: the
/// container signature promised streams and none are reachable.
pub(crate) struct VideoHandler;

impl MetadataHandler for VideoHandler {
	fn extract(&self, ctx: &ExtractCtx<'_>) -> Result<Fields> {
		let probe = ctx.media_probe.ok_or_else(|| {
			Error::Unsupported(format!("no decoder available for {} files", ctx.kind))
		})?;

		let properties = probe.properties(ctx.path)?;

		Ok(Fields {
			width: Some(properties.width),
			height: Some(properties.height),
			duration_ms: Some(properties.duration_ms),
			frame_count: Some(properties.frame_count),
			has_audio: Some(properties.has_audio),
			..Default::default()
		})
	}
}

/// Audio files carry a duration and nothing visual.
pub(crate) struct AudioHandler;

impl MetadataHandler for AudioHandler {
	fn extract(&self, ctx: &ExtractCtx<'_>) -> Result<Fields> {
		let probe = ctx.media_probe.ok_or_else(|| {
			Error::Unsupported(format!("no decoder available for {} files", ctx.kind))
		})?;

		let properties = probe.properties(ctx.path)?;

		Ok(Fields {
			duration_ms: Some(properties.duration_ms),
			has_audio: Some(true),
			..Default::default()
		})
	}
}
