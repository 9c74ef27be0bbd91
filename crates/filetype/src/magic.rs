//! Byte-signature matching over file headers.
//!
//! The table is ordered most-specific first and the first fully matching rule
//! wins. Ordering is load-bearing: rules that recognize a specific payload
//! inside a generic container shape (Krita and epub are both zips) must come
//! before the container rule itself, or the specific kind is unreachable.
//! `ordering_is_specific_before_generic` below guards this.

use crate::FileKind;

/// How many leading bytes the sniffer samples for signature matching.
pub const HEADER_SAMPLE_SIZE: usize = 256;

/// Outcome of a signature match. Some signatures settle the kind outright;
/// others only narrow it to a shape that needs content probing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sniff {
	Kind(FileKind),
	/// A png that may be an apng; settled by the animation chunk probe.
	Png,
	/// A gif that may be animated; settled by the frame probe.
	Gif,
	/// An ISO media container; settled by the multimedia probe.
	Mp4,
	/// An ASF container (wmv or wma); settled by the multimedia probe.
	Wm,
	/// A zip whose logical type depends on its contents.
	Zip,
}

/// One conjunct of a signature: holds if any candidate offset carries any
/// candidate prefix.
#[derive(Debug, Clone, Copy)]
pub struct PrefixGroup {
	pub offsets: &'static [usize],
	pub prefixes: &'static [&'static [u8]],
}

/// A signature is a conjunction of prefix groups; all must hold.
#[derive(Debug, Clone, Copy)]
pub struct SignatureRule {
	pub groups: &'static [PrefixGroup],
	pub result: Sniff,
}

impl PrefixGroup {
	#[must_use]
	pub fn holds(&self, header: &[u8]) -> bool {
		self.offsets.iter().any(|&offset| {
			self.prefixes.iter().any(|prefix| {
				header
					.get(offset..offset + prefix.len())
					.is_some_and(|sample| sample == *prefix)
			})
		})
	}
}

impl SignatureRule {
	#[must_use]
	pub fn matches(&self, header: &[u8]) -> bool {
		self.groups.iter().all(|group| group.holds(header))
	}
}

macro_rules! rule {
	($result:expr, $( [$($offset:expr),+] => [$($prefix:expr),+] ),+ ) => {
		SignatureRule {
			groups: &[ $( PrefixGroup {
				offsets: &[$($offset),+],
				prefixes: &[$($prefix),+],
			} ),+ ],
			result: $result,
		}
	};
}

use FileKind::*;
use Sniff::Kind;

/// The ordered signature table.
pub static SIGNATURE_TABLE: &[SignatureRule] = &[
	rule!(Kind(Jpeg), [0] => [b"\xff\xd8"]),
	rule!(Sniff::Png, [0] => [b"\x89PNG"]),
	rule!(Sniff::Gif, [0] => [b"GIF87a", b"GIF89a"]),
	rule!(Kind(Webp), [8] => [b"WEBP"]),
	rule!(Kind(Tiff), [0] => [b"II*\x00", b"MM\x00*"]),
	rule!(Kind(Bmp), [0] => [b"BM"]),
	rule!(Kind(Ico), [0] => [b"\x00\x00\x01\x00", b"\x00\x00\x02\x00"]),
	rule!(Kind(Qoi), [0] => [b"qoif"]),
	rule!(Kind(Flash), [0] => [b"CWS", b"FWS", b"ZWS"]),
	rule!(Kind(Flv), [0] => [b"FLV"]),
	rule!(Kind(Pdf), [0] => [b"%PDF"]),
	rule!(Kind(Psd), [0] => [b"8BPS\x00\x01", b"8BPS\x00\x02"]),
	rule!(Kind(Clip), [0] => [b"CSFCHUNK"]),
	rule!(Kind(Sai2), [0] => [b"SAI-CANVAS"]),
	rule!(Kind(Xcf), [0] => [b"gimp xcf "]),
	// zip-based formats whose mimetype entry lands at a handful of fixed
	// offsets; these must precede the generic zip rule
	rule!(Kind(Krita), [38, 42, 58, 63] => [b"application/x-krita"]),
	rule!(Kind(Epub), [38, 43] => [b"application/epub+zip"]),
	rule!(
		Kind(Djvu),
		[4] => [b"FORM"],
		[12] => [b"DJVU", b"DJVM", b"PM44", b"BM44", b"SDJV"]
	),
	rule!(Kind(Rtf), [0] => [b"{\\rtf"]),
	rule!(Sniff::Zip, [0] => [b"PK\x03\x04", b"PK\x05\x06", b"PK\x07\x08"]),
	rule!(Kind(SevenZip), [0] => [b"7z\xBC\xAF\x27\x1C"]),
	rule!(
		Kind(Rar),
		[0] => [b"\x52\x61\x72\x21\x1A\x07\x00", b"\x52\x61\x72\x21\x1A\x07\x01\x00"]
	),
	rule!(Kind(Gzip), [0] => [b"\x1f\x8b"]),
	rule!(Kind(EncryptedZip), [0] => [b"shelf encrypted zip"]),
	rule!(Kind(Avif), [4] => [b"ftypavif"]),
	rule!(Kind(AvifSequence), [4] => [b"ftypavis"]),
	rule!(Kind(Avif), [4] => [b"ftypmif1"], [16, 20, 24] => [b"avif"]),
	rule!(Kind(Heic), [4] => [b"ftypheic", b"ftypheix", b"ftypheim", b"ftypheis"]),
	rule!(
		Kind(HeicSequence),
		[4] => [b"ftyphevc", b"ftyphevx", b"ftyphevm", b"ftyphevs"]
	),
	rule!(Kind(Heif), [4] => [b"ftypmif1"]),
	rule!(Kind(HeifSequence), [4] => [b"ftypmsf1"]),
	rule!(
		Sniff::Mp4,
		[4] => [
			b"ftypmp4", b"ftypisom", b"ftypM4V", b"ftypMSNV", b"ftypavc1",
			b"ftypFACE", b"ftypdash"
		]
	),
	rule!(Kind(Mov), [4] => [b"ftypqt"]),
	rule!(Kind(Flac), [0] => [b"fLaC"]),
	rule!(Kind(Wave), [0] => [b"RIFF"], [8] => [b"WAVE"]),
	rule!(Kind(WavPack), [0] => [b"wvpk"]),
	rule!(Kind(Avi), [8] => [b"AVI "]),
	rule!(
		Sniff::Wm,
		[0] => [b"\x30\x26\xB2\x75\x8E\x66\xCF\x11\xA6\xD9\x00\xAA\x00\x62\xCE\x6C"]
	),
	rule!(Kind(WindowsExe), [0] => [b"\x4D\x5A\x90\x00\x03"]),
];

/// First matching rule wins.
#[must_use]
pub fn match_header(header: &[u8]) -> Option<Sniff> {
	SIGNATURE_TABLE
		.iter()
		.find(|rule| rule.matches(header))
		.map(|rule| rule.result)
}

#[cfg(test)]
mod tests {
	use super::*;

	/// Smallest buffer satisfying a rule: first prefix at first offset of
	/// every group, zero elsewhere.
	fn minimal_buffer(rule: &SignatureRule) -> Vec<u8> {
		let mut buf = vec![0u8; HEADER_SAMPLE_SIZE];
		for group in rule.groups {
			place(&mut buf, group);
		}
		buf
	}

	fn place(buf: &mut [u8], group: &PrefixGroup) {
		let offset = group.offsets[0];
		let prefix = group.prefixes[0];
		buf[offset..offset + prefix.len()].copy_from_slice(prefix);
	}

	/// Merges two rules' minimal byte assignments; `None` when they disagree
	/// on any byte.
	fn merged_buffer(a: &SignatureRule, b: &SignatureRule) -> Option<Vec<u8>> {
		let mut assignments: Vec<Option<u8>> = vec![None; HEADER_SAMPLE_SIZE];

		for rule in [a, b] {
			for group in rule.groups {
				let offset = group.offsets[0];
				for (index, &byte) in group.prefixes[0].iter().enumerate() {
					match assignments[offset + index] {
						Some(existing) if existing != byte => return None,
						_ => assignments[offset + index] = Some(byte),
					}
				}
			}
		}

		Some(
			assignments
				.into_iter()
				.map(|byte| byte.unwrap_or(0))
				.collect(),
		)
	}

	#[test]
	fn every_rule_is_reachable() {
		for (index, rule) in SIGNATURE_TABLE.iter().enumerate() {
			let buf = minimal_buffer(rule);
			assert_eq!(
				match_header(&buf),
				Some(rule.result),
				"rule {index} is shadowed or does not match its own bytes"
			);
		}
	}

	#[test]
	fn mutating_any_signature_byte_breaks_the_rule() {
		for rule in SIGNATURE_TABLE {
			let buf = minimal_buffer(rule);
			for group in rule.groups {
				let offset = group.offsets[0];
				for position in 0..group.prefixes[0].len() {
					let mut mutated = buf.clone();
					mutated[offset + position] ^= 0xFF;
					assert!(
						!rule.matches(&mutated),
						"flipping byte {} of {:?} left the rule matching",
						offset + position,
						rule.result
					);
				}
			}
		}
	}

	#[test]
	fn ordering_is_specific_before_generic() {
		// Whenever two rules can both hold on one buffer, the earlier (more
		// specific) one must be the one the table reports.
		for (i, specific) in SIGNATURE_TABLE.iter().enumerate() {
			for generic in &SIGNATURE_TABLE[i + 1..] {
				let Some(buf) = merged_buffer(specific, generic) else {
					continue;
				};
				assert_eq!(
					match_header(&buf),
					Some(specific.result),
					"{:?} is shadowed when co-present with {:?}",
					specific.result,
					generic.result
				);
			}
		}
	}

	#[test]
	fn krita_wins_over_zip() {
		// the canonical container-disambiguation case: a krita project is a
		// zip, but must never be reported as one by the table
		let mut buf = vec![0u8; HEADER_SAMPLE_SIZE];
		buf[..4].copy_from_slice(b"PK\x03\x04");
		buf[38..38 + 19].copy_from_slice(b"application/x-krita");

		assert_eq!(match_header(&buf), Some(Kind(Krita)));
	}

	#[test]
	fn short_headers_never_panic() {
		assert_eq!(match_header(&[]), None);
		assert_eq!(match_header(b"\xff"), None);
		assert_eq!(match_header(b"\xff\xd8"), Some(Kind(Jpeg)));
	}
}
