//! The closed set of formats the library understands.

use serde::{Deserialize, Serialize};
use strum_macros::Display;

/// Canonical content type of a file, resolved from raw bytes.
///
/// Every kind here is terminal: intermediate sniff states (a png that may be
/// an apng, a zip whose contents have not been inspected yet) live in
/// [`crate::magic::Sniff`] and never leave the sniffer.
#[derive(
	Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FileKind {
	// Still images
	Jpeg,
	Png,
	Gif,
	Webp,
	Tiff,
	Bmp,
	Ico,
	Qoi,
	Avif,
	Heic,
	Heif,
	Svg,

	// Animations
	Apng,
	AnimatedGif,
	AvifSequence,
	HeicSequence,
	HeifSequence,
	Ugoira,

	// Video
	Flv,
	Mp4,
	Mov,
	Avi,
	Wmv,
	Webm,
	Mkv,
	Mpeg,
	Ogv,

	// Audio
	Mp3,
	Ogg,
	Flac,
	Wave,
	WavPack,
	M4a,
	Wma,

	// Documents
	Pdf,
	Epub,
	Djvu,
	Rtf,
	Odt,
	Ods,
	Odp,
	Docx,
	Xlsx,
	Pptx,
	Cbz,

	// Art projects
	Psd,
	Clip,
	Sai2,
	Xcf,
	Krita,
	Procreate,

	// Archives
	Zip,
	SevenZip,
	Rar,
	Gzip,
	EncryptedZip,

	// Applications and text
	Flash,
	WindowsExe,
	Json,
	Html,

	// Shelf's own serialized repository update packages
	UpdateContent,
	UpdateDefinitions,

	Unknown,
}

/// Groups of kinds sharing an extraction and thumbnail strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Family {
	Image,
	Animation,
	Video,
	Audio,
	Document,
	Project,
	Archive,
	Application,
	Update,
	Unknown,
}

impl FileKind {
	#[must_use]
	pub const fn family(self) -> Family {
		use FileKind::*;

		match self {
			Jpeg | Png | Gif | Webp | Tiff | Bmp | Ico | Qoi | Avif | Heic | Heif | Svg => {
				Family::Image
			}
			Apng | AnimatedGif | AvifSequence | HeicSequence | HeifSequence | Ugoira => {
				Family::Animation
			}
			Flv | Mp4 | Mov | Avi | Wmv | Webm | Mkv | Mpeg | Ogv => Family::Video,
			Mp3 | Ogg | Flac | Wave | WavPack | M4a | Wma => Family::Audio,
			Pdf | Epub | Djvu | Rtf | Odt | Ods | Odp | Docx | Xlsx | Pptx | Cbz => {
				Family::Document
			}
			Psd | Clip | Sai2 | Xcf | Krita | Procreate => Family::Project,
			Zip | SevenZip | Rar | Gzip | EncryptedZip => Family::Archive,
			Flash | WindowsExe | Json | Html => Family::Application,
			UpdateContent | UpdateDefinitions => Family::Update,
			Unknown => Family::Unknown,
		}
	}

	/// The import allow-list: kinds that may proceed to metadata extraction
	/// and thumbnail derivation.
	#[must_use]
	pub const fn is_supported(self) -> bool {
		use FileKind::*;

		!matches!(
			self,
			Unknown | Html | Json | Rtf | WindowsExe | EncryptedZip
		)
	}

	/// Kinds whose payload always carries audio; probing cannot change this.
	#[must_use]
	pub const fn has_definite_audio(self) -> bool {
		matches!(self.family(), Family::Audio)
	}

	/// Kinds whose thumbnails come from a time or frame indexed decode.
	#[must_use]
	pub const fn is_frame_indexed(self) -> bool {
		matches!(self.family(), Family::Video)
			|| matches!(
				self,
				Self::Apng
					| Self::AnimatedGif
					| Self::AvifSequence
					| Self::HeicSequence
					| Self::HeifSequence
			)
	}
}
