//! Container-content probing and payload extraction.
//!
//! Several formats in the library are zip archives whose logical type depends
//! on what is inside them (comic archives, Krita and Procreate projects,
//! ugoira animations, office documents). The sniffer calls the predicates in
//! here after the outer zip signature has matched; the metadata extractor and
//! the thumbnailer call the payload helpers to read cover entries.

#![warn(clippy::unwrap_used, clippy::expect_used, rust_2018_idioms)]
#![forbid(unsafe_code)]

pub mod clip;

use std::{
	fs::File,
	io::{BufReader, Read},
	path::Path,
};
use zip::{result::ZipError, ZipArchive};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("there was an i/o error: {0}")]
	Io(#[from] std::io::Error),
	#[error("zip error: {0}")]
	Zip(#[from] zip::result::ZipError),
	#[error("archive has no usable cover entry")]
	NoCover,
	#[error("no embedded raster found in container")]
	NoEmbeddedRaster,
}

/// Extensions that count as images when judging an archive's contents.
pub const IMAGE_ENTRY_EXTENSIONS: [&str; 9] = [
	"jpg", "jpeg", "png", "gif", "webp", "bmp", "tiff", "avif", "heic",
];

/// Office-format zip variants recognized by entry layout rather than by the
/// `mimetype` entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OoxmlKind {
	Word,
	Spreadsheet,
	Presentation,
}

fn open(path: &Path) -> Result<ZipArchive<BufReader<File>>> {
	Ok(ZipArchive::new(BufReader::new(File::open(path)?))?)
}

fn is_image_entry(name: &str) -> bool {
	Path::new(name)
		.extension()
		.and_then(|ext| ext.to_str())
		.is_some_and(|ext| {
			IMAGE_ENTRY_EXTENSIONS
				.iter()
				.any(|known| known.eq_ignore_ascii_case(ext))
		})
}

/// True when any entry in the archive is encrypted. The zip crate only
/// reveals this by refusing passwordless access to the entry.
pub fn is_encrypted(path: impl AsRef<Path>) -> Result<bool> {
	let mut archive = open(path.as_ref())?;

	for index in 0..archive.len() {
		match archive.by_index(index) {
			Ok(_) => {}
			Err(ZipError::UnsupportedArchive(ZipError::PASSWORD_REQUIRED)) => return Ok(true),
			Err(err) => return Err(err.into()),
		}
	}

	Ok(false)
}

/// Reads the `mimetype` entry that open-document formats (odt, ods, odp,
/// epub) store as their first file, if present.
pub fn open_document_mimetype(path: impl AsRef<Path>) -> Result<Option<String>> {
	let mut archive = open(path.as_ref())?;

	let Ok(mut entry) = archive.by_name("mimetype") else {
		return Ok(None);
	};

	let mut mimetype = String::new();
	entry.read_to_string(&mut mimetype)?;

	Ok(Some(mimetype.trim().to_owned()))
}

/// Recognizes docx/xlsx/pptx by their characteristic document entry.
pub fn ooxml_kind(path: impl AsRef<Path>) -> Result<Option<OoxmlKind>> {
	let archive = open(path.as_ref())?;
	let names: Vec<&str> = archive.file_names().collect();

	if !names.iter().any(|name| *name == "[Content_Types].xml") {
		return Ok(None);
	}

	Ok(if names.iter().any(|name| *name == "word/document.xml") {
		Some(OoxmlKind::Word)
	} else if names.iter().any(|name| *name == "xl/workbook.xml") {
		Some(OoxmlKind::Spreadsheet)
	} else if names.iter().any(|name| *name == "ppt/presentation.xml") {
		Some(OoxmlKind::Presentation)
	} else {
		None
	})
}

/// Procreate projects are zips carrying a `Document.archive` plist.
pub fn looks_like_procreate(path: impl AsRef<Path>) -> Result<bool> {
	let archive = open(path.as_ref())?;
	let found = archive
		.file_names()
		.any(|name| name == "Document.archive");
	Ok(found)
}

/// Ugoira animations are zips of sequentially numbered image frames,
/// optionally alongside an `animation.json` timing file.
pub fn looks_like_ugoira(path: impl AsRef<Path>) -> Result<bool> {
	let archive = open(path.as_ref())?;

	let mut frame_numbers = Vec::new();
	for name in archive.file_names() {
		if name.ends_with('/') || name == "animation.json" {
			continue;
		}

		if !is_image_entry(name) {
			return Ok(false);
		}

		let Some(stem) = Path::new(name).file_stem().and_then(|stem| stem.to_str()) else {
			return Ok(false);
		};

		let Ok(number) = stem.parse::<u32>() else {
			return Ok(false);
		};

		frame_numbers.push(number);
	}

	if frame_numbers.is_empty() {
		return Ok(false);
	}

	frame_numbers.sort_unstable();
	Ok(frame_numbers
		.iter()
		.enumerate()
		.all(|(expected, &actual)| actual as usize == expected))
}

/// A comic archive is mostly images, with at most a sprinkling of notes and
/// metadata files alongside them.
pub fn looks_like_cbz(path: impl AsRef<Path>) -> Result<bool> {
	let archive = open(path.as_ref())?;

	let mut images = 0usize;
	let mut others = 0usize;

	for name in archive.file_names() {
		if name.ends_with('/') {
			continue;
		}

		if is_image_entry(name) {
			images += 1;
		} else if Path::new(name)
			.extension()
			.and_then(|ext| ext.to_str())
			.is_some_and(|ext| {
				["txt", "nfo", "xml", "json"]
					.iter()
					.any(|allowed| allowed.eq_ignore_ascii_case(ext))
			}) {
			others += 1;
		} else {
			return Ok(false);
		}
	}

	Ok(images > 0 && others <= images)
}

/// The names of all image entries, sorted, which doubles as the frame order
/// for ugoira archives and the page order for comic archives.
pub fn image_entry_names(path: impl AsRef<Path>) -> Result<Vec<String>> {
	let archive = open(path.as_ref())?;

	let mut names: Vec<String> = archive
		.file_names()
		.filter(|name| !name.ends_with('/') && is_image_entry(name))
		.map(ToOwned::to_owned)
		.collect();

	names.sort();
	Ok(names)
}

/// Reads a single entry into memory.
pub fn read_entry(path: impl AsRef<Path>, name: &str) -> Result<Vec<u8>> {
	let mut archive = open(path.as_ref())?;
	let mut entry = archive.by_name(name)?;

	let mut data = Vec::new();
	entry.read_to_end(&mut data)?;
	Ok(data)
}

/// Reads the first image entry (in name order) into memory. Consumers decode
/// it by content; an archive entry's name carries no trustworthy format hint.
pub fn cover_bytes(path: impl AsRef<Path>) -> Result<Vec<u8>> {
	let names = image_entry_names(path.as_ref())?;
	let cover = names.first().ok_or(Error::NoCover)?;
	read_entry(path, cover)
}
