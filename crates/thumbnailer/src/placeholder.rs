//! Builtin fallback rasters, one per family.
//!
//! These are the bytes a caller receives whenever genuine derivation fails,
//! so they must always be valid compressed images themselves.

use shelf_filetype::Family;

macro_rules! placeholder {
	($file:literal) => {
		include_bytes!(concat!("../assets/", $file))
	};
}

/// Returns the family's placeholder raster. Total: every family has one.
#[must_use]
pub fn for_family(family: Family) -> &'static [u8] {
	match family {
		Family::Image => placeholder!("image.png"),
		Family::Animation => placeholder!("animation.png"),
		Family::Video => placeholder!("video.png"),
		Family::Audio => placeholder!("audio.png"),
		Family::Document => placeholder!("document.png"),
		Family::Project => placeholder!("project.png"),
		Family::Archive => placeholder!("archive.png"),
		Family::Application => placeholder!("application.png"),
		Family::Update => placeholder!("update.png"),
		Family::Unknown => placeholder!("unknown.png"),
	}
}
