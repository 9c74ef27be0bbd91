//! Canonical type resolution.
//!
//! `Sniffer::identify` is deterministic: every step either returns a concrete
//! kind or falls through to the next, and the last resort is
//! [`FileKind::Unknown`]. Probes for foreign containers are optional
//! collaborators; without them the sniffer still terminates, it just settles
//! undetermined containers on their default kind.

use crate::{
	animation,
	magic::{self, Sniff, HEADER_SAMPLE_SIZE},
	probe::{MediaProbe, UpdatePackageKind, UpdateProbe},
	text, Error, FileKind, Result,
};
use shelf_archive as archive;
use std::{
	fs::{self, File},
	io::Read,
	path::Path,
};
use tracing::{debug, warn};

/// Update packages above this size are never speculatively deserialized.
const UPDATE_PACKAGE_SIZE_CEILING: u64 = 64 * 1024 * 1024;

/// Extensions that foreign media probes are known to false-positive on.
const PROBE_FALSE_POSITIVE_EXTENSIONS: [&str; 3] = ["txt", "log", "json"];

/// Resolves a file's canonical kind from its bytes.
///
/// Construct, attach the collaborators you have, call [`Sniffer::identify`].
#[derive(Default)]
pub struct Sniffer<'a> {
	media_probe: Option<&'a dyn MediaProbe>,
	update_probe: Option<&'a dyn UpdateProbe>,
	look_for_updates: bool,
}

impl<'a> Sniffer<'a> {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Attaches the multimedia probe used for undetermined containers and the
	/// last-resort media check.
	#[must_use]
	pub fn media_probe(mut self, probe: &'a dyn MediaProbe) -> Self {
		self.media_probe = Some(probe);
		self
	}

	#[must_use]
	pub fn update_probe(mut self, probe: &'a dyn UpdateProbe) -> Self {
		self.update_probe = Some(probe);
		self
	}

	/// Enables the fast path that tries to deserialize the file as one of
	/// shelf's own update packages before any signature work.
	#[must_use]
	pub fn look_for_updates(mut self, look: bool) -> Self {
		self.look_for_updates = look;
		self
	}

	pub fn identify(&self, path: impl AsRef<Path>) -> Result<FileKind> {
		let path = path.as_ref();

		let size = fs::metadata(path)?.len();
		if size == 0 {
			return Err(Error::ZeroSize);
		}

		if self.look_for_updates && size < UPDATE_PACKAGE_SIZE_CEILING {
			if let Some(probe) = self.update_probe {
				if let Some(kind) = probe.classify(&fs::read(path)?) {
					return Ok(match kind {
						UpdatePackageKind::Content => FileKind::UpdateContent,
						UpdatePackageKind::Definitions => FileKind::UpdateDefinitions,
					});
				}
			}
		}

		let header = read_header(path)?;

		if let Some(sniff) = magic::match_header(&header) {
			return Ok(match sniff {
				Sniff::Kind(kind) => kind,
				Sniff::Zip => self.resolve_zip(path),
				Sniff::Png => {
					if animation::png_is_animated(&header) {
						FileKind::Apng
					} else {
						FileKind::Png
					}
				}
				Sniff::Gif => {
					if animation::gif_is_animated(path)? {
						FileKind::AnimatedGif
					} else {
						FileKind::Gif
					}
				}
				Sniff::Mp4 => self.resolve_av_container(path, FileKind::Mp4),
				Sniff::Wm => self.resolve_av_container(path, FileKind::Wmv),
			});
		}

		// a file starting with '{' or '[' is probably JSON, but only a full
		// parse can tell
		if matches!(header.first(), Some(b'{' | b'[')) && text::looks_like_json(&fs::read(path)?) {
			return Ok(FileKind::Json);
		}

		if text::looks_like_html(&header) {
			return Ok(FileKind::Html);
		}

		if text::looks_like_svg(&header) {
			return Ok(FileKind::Svg);
		}

		// The media probe goes last: it has plenty of false positives and
		// costs real CPU to return a true negative, so text-like extensions
		// skip it entirely.
		if !has_probe_false_positive_extension(path) {
			if let Some(probe) = self.media_probe {
				match probe.identify(path) {
					Ok(FileKind::Unknown) => {}
					Ok(kind) => return Ok(kind),
					Err(Error::Unsupported(_)) => {}
					Err(err) => warn!(path = %path.display(), %err, "media probe failed"),
				}
			}
		}

		Ok(FileKind::Unknown)
	}

	/// The zip disambiguation chain, in order: encrypted stays zip, then the
	/// document formats, then the application-specific layouts, then the
	/// generic container.
	fn resolve_zip(&self, path: &Path) -> FileKind {
		match archive::is_encrypted(path) {
			Ok(true) => return FileKind::Zip,
			Ok(false) => {}
			Err(err) => {
				debug!(path = %path.display(), %err, "unreadable zip stays generic");
				return FileKind::Zip;
			}
		}

		if let Ok(Some(mimetype)) = archive::open_document_mimetype(path) {
			if let Some(kind) = kind_from_document_mimetype(&mimetype) {
				return kind;
			}
		}

		if let Ok(Some(ooxml)) = archive::ooxml_kind(path) {
			return match ooxml {
				archive::OoxmlKind::Word => FileKind::Docx,
				archive::OoxmlKind::Spreadsheet => FileKind::Xlsx,
				archive::OoxmlKind::Presentation => FileKind::Pptx,
			};
		}

		if archive::looks_like_procreate(path).unwrap_or(false) {
			return FileKind::Procreate;
		}

		if archive::looks_like_ugoira(path).unwrap_or(false) {
			return FileKind::Ugoira;
		}

		if archive::looks_like_cbz(path).unwrap_or(false) {
			return FileKind::Cbz;
		}

		FileKind::Zip
	}

	/// Hands an undetermined media container to the probe; without one, or
	/// when the probe comes back empty-handed, the container's default kind
	/// stands.
	fn resolve_av_container(&self, path: &Path, fallback: FileKind) -> FileKind {
		let Some(probe) = self.media_probe else {
			return fallback;
		};

		match probe.identify(path) {
			Ok(FileKind::Unknown) => fallback,
			Ok(kind) => kind,
			Err(err) => {
				warn!(path = %path.display(), %err, "media probe failed on container");
				fallback
			}
		}
	}
}

/// Convenience wrapper: identification with no foreign collaborators.
pub fn identify(path: impl AsRef<Path>) -> Result<FileKind> {
	Sniffer::new().identify(path)
}

fn read_header(path: &Path) -> Result<Vec<u8>> {
	let mut header = Vec::with_capacity(HEADER_SAMPLE_SIZE);
	File::open(path)?
		.take(HEADER_SAMPLE_SIZE as u64)
		.read_to_end(&mut header)?;
	Ok(header)
}

fn kind_from_document_mimetype(mimetype: &str) -> Option<FileKind> {
	Some(match mimetype {
		"application/epub+zip" => FileKind::Epub,
		"application/vnd.oasis.opendocument.text" => FileKind::Odt,
		"application/vnd.oasis.opendocument.spreadsheet" => FileKind::Ods,
		"application/vnd.oasis.opendocument.presentation" => FileKind::Odp,
		"application/x-krita" => FileKind::Krita,
		_ => return None,
	})
}

fn has_probe_false_positive_extension(path: &Path) -> bool {
	path.extension()
		.and_then(|ext| ext.to_str())
		.is_some_and(|ext| {
			PROBE_FALSE_POSITIVE_EXTENSIONS
				.iter()
				.any(|known| known.eq_ignore_ascii_case(ext))
		})
}
