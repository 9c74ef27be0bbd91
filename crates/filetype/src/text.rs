//! Cheap textual heuristics for files no signature claimed.
//!
//! These are narrow checks, not parsers: the JSON one is the only heuristic
//! allowed to read the whole file, and only after the first byte already
//! looks like JSON.

/// True when the bytes parse as a complete JSON document.
#[must_use]
pub fn looks_like_json(bytes: &[u8]) -> bool {
	serde_json::from_slice::<serde_json::Value>(bytes).is_ok()
}

/// True when the header carries an html document marker.
#[must_use]
pub fn looks_like_html(header: &[u8]) -> bool {
	let sample = String::from_utf8_lossy(header).to_ascii_lowercase();
	sample.contains("<html") || sample.contains("<!doctype html")
}

/// True when the header carries an svg root element, either bare or behind
/// an xml declaration.
#[must_use]
pub fn looks_like_svg(header: &[u8]) -> bool {
	let sample = String::from_utf8_lossy(header).to_ascii_lowercase();
	sample.contains("<svg") || (sample.starts_with("<?xml") && sample.contains("svg"))
}
