//! Streaming multi-digest file hashing.
//!
//! `sha256` is the canonical content identity used across the library; md5,
//! sha1 and sha512 are kept for legacy and interop matching. All four are fed
//! from a single sequential pass over the file, so a file is only ever read
//! once no matter how many digests are wanted.

#![warn(clippy::unwrap_used, clippy::expect_used, rust_2018_idioms)]
#![forbid(unsafe_code)]

use md5::Md5;
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha512};
use std::{
	fs::File,
	io::{BufReader, Read},
	path::Path,
};

/// Files are digested in fixed-size blocks so arbitrarily large inputs never
/// get buffered whole.
const BLOCK_SIZE: usize = 64 * 1024;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("file is of zero length")]
	ZeroSize,
	#[error("there was an i/o error: {0}")]
	Io(#[from] std::io::Error),
}

/// The full set of digests computed for a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestSet {
	pub sha256: [u8; 32],
	pub md5: [u8; 16],
	pub sha1: [u8; 20],
	pub sha512: [u8; 64],
}

impl DigestSet {
	#[must_use]
	pub fn sha256_hex(&self) -> String {
		hex::encode(self.sha256)
	}

	#[must_use]
	pub fn md5_hex(&self) -> String {
		hex::encode(self.md5)
	}

	#[must_use]
	pub fn sha1_hex(&self) -> String {
		hex::encode(self.sha1)
	}

	#[must_use]
	pub fn sha512_hex(&self) -> String {
		hex::encode(self.sha512)
	}
}

/// Computes all four digests of the file at `path` in one pass.
///
/// Zero-length files are rejected before any content is read, matching the
/// import pipeline's zero-size gate.
pub fn digest_path(path: impl AsRef<Path>) -> Result<DigestSet> {
	let file = File::open(path.as_ref())?;

	if file.metadata()?.len() == 0 {
		return Err(Error::ZeroSize);
	}

	digest_reader(BufReader::with_capacity(BLOCK_SIZE, file))
}

/// Digests an already-open stream. No zero-size gate here; an exhausted
/// reader yields each algorithm's standard empty-input digest.
pub fn digest_reader(mut reader: impl Read) -> Result<DigestSet> {
	let mut sha256 = Sha256::new();
	let mut md5 = Md5::new();
	let mut sha1 = Sha1::new();
	let mut sha512 = Sha512::new();

	let mut block = [0u8; BLOCK_SIZE];
	loop {
		let read = reader.read(&mut block)?;
		if read == 0 {
			break;
		}

		sha256.update(&block[..read]);
		md5.update(&block[..read]);
		sha1.update(&block[..read]);
		sha512.update(&block[..read]);
	}

	Ok(DigestSet {
		sha256: sha256.finalize().into(),
		md5: md5.finalize().into(),
		sha1: sha1.finalize().into(),
		sha512: sha512.finalize().into(),
	})
}
