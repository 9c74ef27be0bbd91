use crate::{Error, Result};
use image::DynamicImage;
use once_cell::sync::Lazy;
use resvg::{tiny_skia, usvg};
use std::{path::Path, sync::Arc};

static FONTDB: Lazy<Arc<usvg::fontdb::Database>> = Lazy::new(|| {
	let mut fontdb = usvg::fontdb::Database::new();
	fontdb.load_system_fonts();
	Arc::new(fontdb)
});

/// Rasterizes an svg document scaled to fit within `target`.
#[allow(
	clippy::cast_possible_truncation,
	clippy::cast_sign_loss,
	clippy::cast_precision_loss
)]
pub(crate) fn render(path: &Path, target: (u32, u32)) -> Result<DynamicImage> {
	let data = std::fs::read(path)?;

	let options = usvg::Options {
		// Default font is user-agent dependent so we can use whichever we like.
		font_family: "Times New Roman".to_owned(),
		font_size: 12.0,
		languages: vec!["en".to_string()],
		#[allow(clippy::expect_used)]
		default_size: usvg::Size::from_wh(100.0, 100.0).expect("Must be a valid size"),
		fontdb: Arc::clone(&FONTDB),
		..usvg::Options::default()
	};

	let rtree = usvg::Tree::from_data(&data, &options)?;

	let scale = (target.0 as f32 / rtree.size().width())
		.min(target.1 as f32 / rtree.size().height());
	let width = (rtree.size().width() * scale).round().max(1.0) as u32;
	let height = (rtree.size().height() * scale).round().max(1.0) as u32;

	let Some(mut pixmap) = tiny_skia::Pixmap::new(width, height) else {
		return Err(Error::SvgRaster);
	};

	resvg::render(
		&rtree,
		tiny_skia::Transform::from_scale(scale, scale),
		&mut pixmap.as_mut(),
	);

	image::RgbaImage::from_raw(pixmap.width(), pixmap.height(), pixmap.data().into())
		.map_or(Err(Error::SvgRaster), |raster| {
			Ok(DynamicImage::ImageRgba8(raster))
		})
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn svg_renders_within_target() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("wide.svg");
		std::fs::write(
			&path,
			br#"<svg xmlns="http://www.w3.org/2000/svg" width="200" height="100"><rect width="200" height="100" fill="blue"/></svg>"#,
		)
		.unwrap();

		let raster = render(&path, (128, 128)).unwrap();
		assert_eq!(raster.width(), 128);
		assert_eq!(raster.height(), 64);
	}

	#[test]
	fn malformed_svg_fails() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("broken.svg");
		std::fs::write(&path, b"<svg nope").unwrap();

		assert!(render(&path, (128, 128)).is_err());
	}
}
