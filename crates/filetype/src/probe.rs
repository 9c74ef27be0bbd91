//! Interfaces to foreign decoders.
//!
//! The multimedia probe and the page-document renderer are long-running
//! native calls supplied by the embedding application; this core only ever
//! talks to them through these traits. Implementations are expected to be
//! blocking; callers wrap them in a cancellable operation with a wall-clock
//! timeout (see `shelf-thumbnailer::foreign`).

use crate::{FileKind, Result};
use image::DynamicImage;
use std::path::Path;

/// Stream properties reported by the multimedia probe. Fields are signed
/// because real probes have been seen reporting negative values; the metadata
/// extractor normalizes them.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AvProperties {
	pub width: i64,
	pub height: i64,
	pub duration_ms: i64,
	pub frame_count: i64,
	pub has_audio: bool,
}

/// An ffmpeg-style multimedia prober and frame decoder.
pub trait MediaProbe: Send + Sync {
	/// Container-level sniff for formats the signature table cannot settle
	/// (ISO media and ASF shells, signature-less media). Returns
	/// [`FileKind::Unknown`] for anything it does not recognize.
	fn identify(&self, path: &Path) -> Result<FileKind>;

	/// Stream properties of a video, animation or audio file.
	fn properties(&self, path: &Path) -> Result<AvProperties>;

	/// Seeks to `frame_index` and decodes one frame, scaled to `target`.
	fn decode_frame(
		&self,
		path: &Path,
		frame_index: u32,
		target: (u32, u32),
	) -> Result<DynamicImage>;
}

/// A first-page renderer for page documents (pdf and friends).
///
/// Implementations must report access-protected documents through
/// [`crate::Error::Encrypted`] so callers can distinguish a password prompt
/// from corruption.
pub trait DocumentRenderer: Send + Sync {
	fn page_count(&self, path: &Path) -> Result<u32>;

	/// Size of the first page in points (1/72 inch).
	fn natural_page_size(&self, path: &Path) -> Result<(f64, f64)>;

	fn word_count(&self, path: &Path) -> Result<u32>;

	/// Renders the first page; `None` renders at the page's natural size.
	fn render_first_page(&self, path: &Path, target: Option<(u32, u32)>)
		-> Result<DynamicImage>;
}

/// Kinds of shelf's own serialized update packages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdatePackageKind {
	Content,
	Definitions,
}

/// Structured-deserialization probe for the update fast path.
pub trait UpdateProbe: Send + Sync {
	/// Attempts to parse the bytes as a serialized update package.
	fn classify(&self, bytes: &[u8]) -> Option<UpdatePackageKind>;
}
