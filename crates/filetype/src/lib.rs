//! Canonical content-type resolution from raw bytes.
//!
//! Extensions are advisory at best; this crate decides what a file *is* from
//! its header bytes, with content probes for container formats whose outer
//! signature is ambiguous, and cheap text heuristics as a net under the
//! signature table.

#![warn(clippy::unwrap_used, clippy::expect_used, rust_2018_idioms)]
#![forbid(unsafe_code)]

mod animation;
pub mod kind;
pub mod magic;
pub mod probe;
pub mod sniffer;
pub mod text;

pub use kind::{Family, FileKind};
pub use probe::{AvProperties, DocumentRenderer, MediaProbe, UpdatePackageKind, UpdateProbe};
pub use sniffer::{identify, Sniffer};

pub type Result<T> = std::result::Result<T, Error>;

/// The file-processing error taxonomy shared across the pipeline.
///
/// `Encrypted` is deliberately distinct from `DamagedOrUnusual`: callers
/// prompt for credentials on one and report corruption on the other.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("file is of zero length")]
	ZeroSize,
	#[error("unsupported filetype: {0}")]
	Unsupported(String),
	#[error("damaged or unusual file: {0}")]
	DamagedOrUnusual(String),
	#[error("file is access-protected: {0}")]
	Encrypted(String),
	#[error("there was an i/o error: {0}")]
	Io(#[from] std::io::Error),
}

impl From<shelf_archive::Error> for Error {
	fn from(err: shelf_archive::Error) -> Self {
		match err {
			shelf_archive::Error::Io(io) => Self::Io(io),
			other => Self::DamagedOrUnusual(other.to_string()),
		}
	}
}

impl From<image::ImageError> for Error {
	fn from(err: image::ImageError) -> Self {
		match err {
			// decoders report truncated payloads as UnexpectedEof, which is
			// damage to the file, not an i/o failure
			image::ImageError::IoError(io)
				if io.kind() != std::io::ErrorKind::UnexpectedEof =>
			{
				Self::Io(io)
			}
			other => Self::DamagedOrUnusual(other.to_string()),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn truncated_image_payloads_map_to_damage() {
		let eof = image::ImageError::IoError(std::io::ErrorKind::UnexpectedEof.into());
		assert!(matches!(Error::from(eof), Error::DamagedOrUnusual(_)));

		// genuine i/o failures keep their own variant
		let denied = image::ImageError::IoError(std::io::ErrorKind::PermissionDenied.into());
		assert!(matches!(Error::from(denied), Error::Io(_)));
	}
}
