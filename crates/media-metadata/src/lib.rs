//! Per-file intrinsic metadata extraction.
//!
//! [`Extractor::file_info`] is the import pipeline's metadata entry point:
//! size gate, type resolution, allow-list gate, then a per-family handler.
//! Handlers declare their own failure policy — some leave fields empty, some
//! substitute a fixed default, some abort the file with a typed error — and
//! every numeric field that does come back is sign-normalized independently
//! before the record is returned.

#![warn(clippy::unwrap_used, clippy::expect_used, rust_2018_idioms)]
#![forbid(unsafe_code)]

mod animation;
mod av;
mod document;
mod flash;
mod project;
mod still;
mod vector;

pub use shelf_filetype::{Error, Result};

use serde::{Deserialize, Serialize};
use shelf_filetype::{DocumentRenderer, Family, FileKind, MediaProbe, Sniffer, UpdateProbe};
use std::{fs, path::Path};

/// The intrinsic properties of one file. Immutable once returned; the caller
/// owns storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMetadata {
	pub size: u64,
	pub kind: FileKind,
	pub width: Option<u32>,
	pub height: Option<u32>,
	pub duration_ms: Option<u32>,
	pub frame_count: Option<u32>,
	pub has_audio: bool,
	pub word_count: Option<u32>,
}

/// Raw handler output before sign normalization. Signed on purpose: foreign
/// probes have been seen reporting negative dimensions and durations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Fields {
	pub width: Option<i64>,
	pub height: Option<i64>,
	pub duration_ms: Option<i64>,
	pub frame_count: Option<i64>,
	pub has_audio: Option<bool>,
	pub word_count: Option<i64>,
}

impl Fields {
	/// Normalizes each numeric field to its absolute value, independently.
	#[must_use]
	fn normalized(self) -> Self {
		Self {
			width: self.width.map(i64::abs),
			height: self.height.map(i64::abs),
			duration_ms: self.duration_ms.map(i64::abs),
			frame_count: self.frame_count.map(i64::abs),
			has_audio: self.has_audio,
			word_count: self.word_count.map(i64::abs),
		}
	}
}

fn to_u32(value: Option<i64>) -> Option<u32> {
	value.map(|value| u32::try_from(value).unwrap_or(u32::MAX))
}

/// What a handler gets to work with.
pub(crate) struct ExtractCtx<'a> {
	pub path: &'a Path,
	pub kind: FileKind,
	pub media_probe: Option<&'a dyn MediaProbe>,
	pub document_renderer: Option<&'a dyn DocumentRenderer>,
}

/// One extraction strategy, owning a narrow scope (a dimension pair, a
/// duration triple) and its own failure policy.
pub(crate) trait MetadataHandler: Send + Sync {
	fn extract(&self, ctx: &ExtractCtx<'_>) -> Result<Fields>;
}

/// Maps a kind to its extraction handler. Kinds without an entry have no
/// intrinsic properties to extract (plain archives, office documents) and
/// yield an all-empty record.
fn handler_for(kind: FileKind) -> Option<&'static dyn MetadataHandler> {
	Some(match kind {
		FileKind::Apng => &animation::ApngHandler,
		FileKind::AnimatedGif => &animation::GifHandler,
		FileKind::Ugoira => &animation::UgoiraHandler,
		FileKind::Cbz => &document::CbzHandler,
		FileKind::Pdf => &document::PdfHandler,
		FileKind::Flash => &flash::FlashHandler,
		FileKind::Psd => &project::PsdHandler,
		FileKind::Clip => &project::ClipHandler,
		FileKind::Krita => &project::KritaHandler,
		FileKind::Procreate => &project::ProcreateHandler,
		FileKind::Svg => &vector::SvgHandler,
		FileKind::Avif | FileKind::Heic | FileKind::Heif => &still::HeifFamilyHandler,
		kind if matches!(kind.family(), Family::Video)
			|| matches!(
				kind,
				FileKind::AvifSequence | FileKind::HeicSequence | FileKind::HeifSequence
			) =>
		{
			&av::VideoHandler
		}
		kind if matches!(kind.family(), Family::Audio) => &av::AudioHandler,
		kind if matches!(kind.family(), Family::Image) => &still::StillImageHandler,
		_ => return None,
	})
}

/// Metadata extraction with optional foreign collaborators, mirroring the
/// sniffer's builder shape.
#[derive(Default)]
pub struct Extractor<'a> {
	media_probe: Option<&'a dyn MediaProbe>,
	document_renderer: Option<&'a dyn DocumentRenderer>,
	update_probe: Option<&'a dyn UpdateProbe>,
	look_for_updates: bool,
}

impl<'a> Extractor<'a> {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	#[must_use]
	pub fn media_probe(mut self, probe: &'a dyn MediaProbe) -> Self {
		self.media_probe = Some(probe);
		self
	}

	#[must_use]
	pub fn document_renderer(mut self, renderer: &'a dyn DocumentRenderer) -> Self {
		self.document_renderer = Some(renderer);
		self
	}

	#[must_use]
	pub fn update_probe(mut self, probe: &'a dyn UpdateProbe) -> Self {
		self.update_probe = Some(probe);
		self
	}

	#[must_use]
	pub fn look_for_updates(mut self, look: bool) -> Self {
		self.look_for_updates = look;
		self
	}

	/// Resolves the file's kind and extracts its metadata in one call.
	pub fn file_info(&self, path: impl AsRef<Path>) -> Result<FileMetadata> {
		let path = path.as_ref();

		let size = fs::metadata(path)?.len();
		if size == 0 {
			return Err(Error::ZeroSize);
		}

		let mut sniffer = Sniffer::new().look_for_updates(self.look_for_updates);
		if let Some(probe) = self.media_probe {
			sniffer = sniffer.media_probe(probe);
		}
		if let Some(probe) = self.update_probe {
			sniffer = sniffer.update_probe(probe);
		}

		self.extract(path, sniffer.identify(path)?)
	}

	/// Extracts metadata for a file whose kind is already resolved.
	pub fn extract(&self, path: impl AsRef<Path>, kind: FileKind) -> Result<FileMetadata> {
		let path = path.as_ref();

		let size = fs::metadata(path)?.len();
		if size == 0 {
			return Err(Error::ZeroSize);
		}

		check_allowed(kind)?;

		let ctx = ExtractCtx {
			path,
			kind,
			media_probe: self.media_probe,
			document_renderer: self.document_renderer,
		};

		let fields = match handler_for(kind) {
			Some(handler) => handler.extract(&ctx)?,
			None => Fields::default(),
		}
		.normalized();

		Ok(FileMetadata {
			size,
			kind,
			width: to_u32(fields.width),
			height: to_u32(fields.height),
			duration_ms: to_u32(fields.duration_ms),
			frame_count: to_u32(fields.frame_count),
			has_audio: fields.has_audio.unwrap_or(kind.has_definite_audio()),
			word_count: to_u32(fields.word_count),
		})
	}
}

fn check_allowed(kind: FileKind) -> Result<()> {
	if kind.is_supported() {
		return Ok(());
	}

	Err(match kind {
		FileKind::Html => Error::Unsupported(
			"looks like html -- maybe the client needs to be taught how to parse this?".into(),
		),
		FileKind::Unknown => Error::Unsupported("unknown filetype".into()),
		_ => Error::Unsupported(format!("filetype is not permitted: {kind}")),
	})
}

/// One-shot helper with no foreign collaborators attached.
pub fn file_info(path: impl AsRef<Path>) -> Result<FileMetadata> {
	Extractor::new().file_info(path)
}
