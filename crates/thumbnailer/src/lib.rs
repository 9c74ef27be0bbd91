//! Preview raster derivation with a guaranteed fallback.
//!
//! [`Thumbnailer::generate`] never fails: every strategy that comes up short,
//! on any file, for any reason, ends in the family's builtin placeholder. The
//! underlying cause is logged for diagnostics and goes no further. This is a
//! deliberate asymmetry with metadata extraction, which does fail loudly.

#![warn(clippy::unwrap_used, clippy::expect_used, rust_2018_idioms)]
#![forbid(unsafe_code)]

mod archive;
mod consts;
mod error;
pub mod foreign;
mod frames;
pub mod placeholder;
mod svg;

pub use error::{Error, Result};

use consts::{DEFAULT_PERCENTAGE_IN, DEFAULT_QUALITY, STILL_MAXIMUM_FILE_SIZE};
use image::{imageops::FilterType, DynamicImage};
use shelf_filetype::{DocumentRenderer, Family, FileKind, MediaProbe};
use std::{ops::Deref, path::Path};
use tracing::debug;
use webp::Encoder;

/// Runs a derivation closure on a blocking thread under a wall-clock
/// deadline. The never-fail contract holds here too: a stuck or crashed
/// decoder ends in the family placeholder, same as any other failure.
pub async fn generate_with_deadline<F>(
	deadline: std::time::Duration,
	kind: FileKind,
	work: F,
) -> Vec<u8>
where
	F: FnOnce() -> Vec<u8> + Send + 'static,
{
	match foreign::call(deadline, || Ok(work())).await {
		Ok(bytes) => bytes,
		Err(err) => {
			debug!(%kind, %err, "deadlined derivation failed, substituting placeholder");
			placeholder::for_family(kind.family()).to_vec()
		}
	}
}

/// A crop applied before the final resize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
	pub x: u32,
	pub y: u32,
	pub width: u32,
	pub height: u32,
}

/// `ThumbnailerBuilder` holds the target shape and decode collaborators,
/// exposing validated setters for the tunables.
pub struct ThumbnailerBuilder<'a> {
	width: u32,
	height: u32,
	percentage_in: f32,
	quality: f32,
	clip_rect: Option<Rect>,
	media_probe: Option<&'a dyn MediaProbe>,
	document_renderer: Option<&'a dyn DocumentRenderer>,
}

impl<'a> ThumbnailerBuilder<'a> {
	#[must_use]
	pub fn new(width: u32, height: u32) -> Self {
		Self {
			width,
			height,
			percentage_in: DEFAULT_PERCENTAGE_IN,
			quality: DEFAULT_QUALITY,
			clip_rect: None,
			media_probe: None,
			document_renderer: None,
		}
	}

	/// Percentage into a frame-indexed file the preview is taken from.
	/// Must be a value between 0.0 and 100.0.
	pub fn percentage_in(mut self, percentage_in: f32) -> Result<Self> {
		if !(0.0..=100.0).contains(&percentage_in) {
			return Err(Error::InvalidPercentage(percentage_in));
		}
		self.percentage_in = percentage_in;
		Ok(self)
	}

	/// Webp quality. Must be a value between 0.0 and 100.0.
	pub fn quality(mut self, quality: f32) -> Result<Self> {
		if !(0.0..=100.0).contains(&quality) {
			return Err(Error::InvalidQuality(quality));
		}
		self.quality = quality;
		Ok(self)
	}

	#[must_use]
	pub fn clip_rect(mut self, clip_rect: Rect) -> Self {
		self.clip_rect = Some(clip_rect);
		self
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
	pub fn build(self) -> Thumbnailer<'a> {
		Thumbnailer { builder: self }
	}
}

/// `Thumbnailer` holds data from a `ThumbnailerBuilder`, exposing the
/// derivation entry point.
pub struct Thumbnailer<'a> {
	builder: ThumbnailerBuilder<'a>,
}

impl Thumbnailer<'_> {
	/// Derives a webp preview for the file. On any failure the family's
	/// placeholder raster is returned instead; this method cannot fail.
	#[must_use]
	pub fn generate(&self, path: &Path, kind: FileKind, frame_count: Option<u32>) -> Vec<u8> {
		match self.derive(path, kind, frame_count) {
			Ok(bytes) => bytes,
			Err(err) => {
				debug!(
					path = %path.display(),
					%kind,
					%err,
					"thumbnail derivation failed, substituting placeholder"
				);
				placeholder::for_family(kind.family()).to_vec()
			}
		}
	}

	fn derive(&self, path: &Path, kind: FileKind, frame_count: Option<u32>) -> Result<Vec<u8>> {
		let raster = self.raster(path, kind, frame_count)?;
		self.finish(raster)
	}

	fn raster(
		&self,
		path: &Path,
		kind: FileKind,
		frame_count: Option<u32>,
	) -> Result<DynamicImage> {
		let target = (self.builder.width, self.builder.height);

		match kind {
			FileKind::Svg => svg::render(path, target),
			FileKind::Pdf => {
				let renderer = self
					.builder
					.document_renderer
					.ok_or(Error::NoPreview(Family::Document))?;
				Ok(renderer.render_first_page(path, Some(target))?)
			}
			FileKind::Cbz | FileKind::Ugoira => archive::cover(path),
			FileKind::Clip => archive::clip_preview(path),
			FileKind::Procreate => archive::procreate_preview(path),
			FileKind::Krita => archive::krita_preview(path),
			// the image crate has no decoder for these; the probe does
			FileKind::Avif | FileKind::Heic | FileKind::Heif => {
				let probe = self
					.builder
					.media_probe
					.ok_or(Error::NoPreview(Family::Image))?;
				Ok(probe.decode_frame(path, 0, target)?)
			}
			kind if kind.is_frame_indexed() => match self.builder.media_probe {
				Some(probe) => frames::probe_frame(
					probe,
					path,
					self.builder.percentage_in,
					frame_count,
					target,
				),
				None if matches!(kind, FileKind::AnimatedGif) => {
					frames::gif_frame(path, self.builder.percentage_in)
				}
				None => Err(Error::NoPreview(kind.family())),
			},
			kind if matches!(kind.family(), Family::Image) => self.still(path),
			kind => Err(Error::NoPreview(kind.family())),
		}
	}

	/// Whole-file in-memory decode, gated by a size ceiling.
	fn still(&self, path: &Path) -> Result<DynamicImage> {
		let size = std::fs::metadata(path)?.len();
		if size > STILL_MAXIMUM_FILE_SIZE {
			return Err(Error::TooLarge(size));
		}

		let data = std::fs::read(path)?;
		Ok(image::load_from_memory(&data)?)
	}

	/// Clip, resize unless the decoder already hit the target exactly, then
	/// encode.
	fn finish(&self, raster: DynamicImage) -> Result<Vec<u8>> {
		let raster = match self.builder.clip_rect {
			Some(rect) => {
				let within = rect
					.x
					.checked_add(rect.width)
					.is_some_and(|right| right <= raster.width())
					&& rect
						.y
						.checked_add(rect.height)
						.is_some_and(|bottom| bottom <= raster.height());
				if !within {
					return Err(Error::ClipOutOfBounds);
				}
				raster.crop_imm(rect.x, rect.y, rect.width, rect.height)
			}
			None => raster,
		};

		let (width, height) = (self.builder.width, self.builder.height);
		let raster = if (raster.width(), raster.height()) == (width, height) {
			raster
		} else {
			raster.resize(width, height, FilterType::Lanczos3)
		};

		// WebPMemory is !Send, so deref to a slice and copy out
		Ok(
			Encoder::from_image(&DynamicImage::ImageRgb8(raster.to_rgb8()))
				.map_err(|err| Error::WebpEncode(err.to_string()))?
				.encode(self.builder.quality)
				.deref()
				.to_vec(),
		)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use shelf_filetype::AvProperties;
	use std::{fs, sync::Mutex};

	fn thumbnailer<'a>() -> Thumbnailer<'a> {
		ThumbnailerBuilder::new(128, 128).build()
	}

	#[test]
	fn builder_rejects_out_of_range_tunables() {
		assert!(matches!(
			ThumbnailerBuilder::new(128, 128).percentage_in(130.0),
			Err(Error::InvalidPercentage(_))
		));
		assert!(matches!(
			ThumbnailerBuilder::new(128, 128).quality(-1.0),
			Err(Error::InvalidQuality(_))
		));
	}

	#[test]
	fn still_image_produces_a_genuine_webp() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("photo.png");
		image::RgbaImage::from_pixel(64, 32, image::Rgba([200, 10, 10, 255]))
			.save(&path)
			.unwrap();

		let bytes = thumbnailer().generate(&path, FileKind::Png, None);

		assert_ne!(bytes, placeholder::for_family(Family::Image));
		let decoded = image::load_from_memory(&bytes).unwrap();
		// resized to fit 128x128 while keeping the 2:1 shape
		assert_eq!((decoded.width(), decoded.height()), (128, 64));
	}

	#[test]
	fn corrupt_files_fall_back_to_the_family_placeholder() {
		let dir = tempfile::tempdir().unwrap();

		let cases = [
			("broken.png", b"\x89PNG\r\n\x1a\ngarbage".to_vec(), FileKind::Png, Family::Image),
			("broken.gif", b"GIF89agarbage".to_vec(), FileKind::AnimatedGif, Family::Animation),
			("broken.mp4", b"\x00\x00\x00\x18ftypmp42".to_vec(), FileKind::Mp4, Family::Video),
			("broken.mp3", b"ID3garbage".to_vec(), FileKind::Mp3, Family::Audio),
			("broken.pdf", b"%PDF-1.7 garbage".to_vec(), FileKind::Pdf, Family::Document),
			("broken.clip", b"CSFCHUNKgarbage".to_vec(), FileKind::Clip, Family::Project),
			("broken.zip", b"PK\x03\x04garbage".to_vec(), FileKind::Zip, Family::Archive),
		];

		for (name, data, kind, family) in cases {
			let path = dir.path().join(name);
			fs::write(&path, &data).unwrap();

			let bytes = thumbnailer().generate(&path, kind, None);
			assert_eq!(
				bytes,
				placeholder::for_family(family),
				"{name} did not fall back to the {family} placeholder"
			);
		}
	}

	struct ExactFrameProbe {
		targets: Mutex<Vec<(u32, u32)>>,
	}

	impl MediaProbe for ExactFrameProbe {
		fn identify(&self, _: &Path) -> shelf_filetype::Result<FileKind> {
			Ok(FileKind::Unknown)
		}

		fn properties(&self, _: &Path) -> shelf_filetype::Result<AvProperties> {
			Ok(AvProperties {
				frame_count: 10,
				..Default::default()
			})
		}

		fn decode_frame(
			&self,
			_: &Path,
			_: u32,
			target: (u32, u32),
		) -> shelf_filetype::Result<DynamicImage> {
			self.targets.lock().unwrap().push(target);
			Ok(DynamicImage::ImageRgba8(image::RgbaImage::from_pixel(
				target.0,
				target.1,
				image::Rgba([0, 0, 255, 255]),
			)))
		}
	}

	#[test]
	fn exact_resolution_frames_are_not_resized_again() {
		let probe = ExactFrameProbe {
			targets: Mutex::new(Vec::new()),
		};
		let thumbnailer = ThumbnailerBuilder::new(128, 128).media_probe(&probe).build();

		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("clip.mp4");
		fs::write(&path, b"\x00\x00\x00\x18ftypmp42").unwrap();

		let bytes = thumbnailer.generate(&path, FileKind::Mp4, Some(10));

		assert_eq!(*probe.targets.lock().unwrap(), vec![(128, 128)]);
		let decoded = image::load_from_memory(&bytes).unwrap();
		assert_eq!((decoded.width(), decoded.height()), (128, 128));
	}

	#[test]
	fn clip_rect_is_applied_before_resizing() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("wide.png");
		image::RgbaImage::from_pixel(200, 100, image::Rgba([0, 255, 0, 255]))
			.save(&path)
			.unwrap();

		let thumbnailer = ThumbnailerBuilder::new(64, 64)
			.clip_rect(Rect {
				x: 0,
				y: 0,
				width: 100,
				height: 100,
			})
			.build();

		let bytes = thumbnailer.generate(&path, FileKind::Png, None);
		let decoded = image::load_from_memory(&bytes).unwrap();
		// square crop, then square resize
		assert_eq!((decoded.width(), decoded.height()), (64, 64));
	}

	#[tokio::test]
	async fn deadlined_derivation_falls_back_to_the_placeholder() {
		let bytes = generate_with_deadline(
			std::time::Duration::from_millis(20),
			FileKind::Mp4,
			|| {
				std::thread::sleep(std::time::Duration::from_secs(5));
				vec![1, 2, 3]
			},
		)
		.await;

		assert_eq!(bytes, placeholder::for_family(Family::Video));
	}

	#[test]
	fn unreadable_comic_cover_falls_back_to_the_document_placeholder() {
		use std::io::Write;

		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("comic.cbz");
		let mut writer = zip::ZipWriter::new(fs::File::create(&path).unwrap());
		writer
			.start_file("001.png", zip::write::FileOptions::default())
			.unwrap();
		writer.write_all(b"not a real png").unwrap();
		writer.finish().unwrap();

		let bytes = thumbnailer().generate(&path, FileKind::Cbz, None);
		assert_eq!(bytes, placeholder::for_family(Family::Document));
	}

	#[test]
	fn readable_comic_cover_becomes_a_genuine_thumbnail() {
		use std::io::Write;

		let dir = tempfile::tempdir().unwrap();
		let cover = dir.path().join("page.png");
		image::RgbaImage::from_pixel(32, 32, image::Rgba([9, 9, 9, 255]))
			.save(&cover)
			.unwrap();

		let path = dir.path().join("comic.cbz");
		let mut writer = zip::ZipWriter::new(fs::File::create(&path).unwrap());
		writer
			.start_file("001.png", zip::write::FileOptions::default())
			.unwrap();
		writer.write_all(&fs::read(&cover).unwrap()).unwrap();
		writer.finish().unwrap();

		let bytes = thumbnailer().generate(&path, FileKind::Cbz, None);
		assert_ne!(bytes, placeholder::for_family(Family::Document));
		let decoded = image::load_from_memory(&bytes).unwrap();
		assert_eq!((decoded.width(), decoded.height()), (128, 128));
	}

	#[test]
	fn heif_family_stills_decode_through_the_probe() {
		let probe = ExactFrameProbe {
			targets: Mutex::new(Vec::new()),
		};
		let with_probe = ThumbnailerBuilder::new(128, 128).media_probe(&probe).build();

		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("photo.heic");
		fs::write(&path, b"\x00\x00\x00\x18ftypheic").unwrap();

		let bytes = with_probe.generate(&path, FileKind::Heic, None);

		assert_eq!(*probe.targets.lock().unwrap(), vec![(128, 128)]);
		assert_ne!(bytes, placeholder::for_family(Family::Image));

		// without a probe the image placeholder stands
		let bytes = thumbnailer().generate(&path, FileKind::Heic, None);
		assert_eq!(bytes, placeholder::for_family(Family::Image));
	}

	#[test]
	fn degenerate_clip_rect_cannot_panic_the_fallback() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("photo.png");
		image::RgbaImage::new(16, 16).save(&path).unwrap();

		let thumbnailer = ThumbnailerBuilder::new(64, 64)
			.clip_rect(Rect {
				x: 1,
				y: 1,
				width: u32::MAX,
				height: 10,
			})
			.build();

		let bytes = thumbnailer.generate(&path, FileKind::Png, None);
		assert_eq!(bytes, placeholder::for_family(Family::Image));
	}
}
