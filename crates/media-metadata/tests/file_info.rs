//! End-to-end `file_info` runs over synthetic files: type resolution,
//! allow-list gating and per-family extraction in one pass.

use shelf_media_metadata::{file_info, Error};
use std::{fs, io::Write};

use image::codecs::gif::GifEncoder;
use image::{Delay, Frame, RgbaImage};
use shelf_filetype::FileKind;

#[test]
fn still_png_resolves_with_dimensions() {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("photo.png");
	RgbaImage::new(40, 30).save(&path).unwrap();

	let metadata = file_info(&path).unwrap();

	assert_eq!(metadata.kind, FileKind::Png);
	assert_eq!(metadata.width, Some(40));
	assert_eq!(metadata.height, Some(30));
	assert_eq!(metadata.frame_count, None);
	assert!(!metadata.has_audio);
	assert_eq!(metadata.size, fs::metadata(&path).unwrap().len());
}

#[test]
fn animated_gif_resolves_with_frames_and_duration() {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("loop.gif");

	{
		let file = fs::File::create(&path).unwrap();
		let mut encoder = GifEncoder::new(file);
		for shade in [60u8, 180] {
			let frame = Frame::from_parts(
				RgbaImage::from_pixel(8, 8, image::Rgba([shade, shade, shade, 255])),
				0,
				0,
				Delay::from_numer_denom_ms(100, 1),
			);
			encoder.encode_frame(frame).unwrap();
		}
	}

	let metadata = file_info(&path).unwrap();

	assert_eq!(metadata.kind, FileKind::AnimatedGif);
	assert_eq!(metadata.width, Some(8));
	assert_eq!(metadata.frame_count, Some(2));
	assert_eq!(metadata.duration_ms, Some(200));
}

#[test]
fn comic_archive_resolves_with_cover_dimensions() {
	let dir = tempfile::tempdir().unwrap();

	let cover = dir.path().join("page.png");
	RgbaImage::new(12, 18).save(&cover).unwrap();

	let path = dir.path().join("comic.cbz");
	let mut writer = zip::ZipWriter::new(fs::File::create(&path).unwrap());
	for name in ["001.png", "002.png"] {
		writer
			.start_file(name, zip::write::FileOptions::default())
			.unwrap();
		writer.write_all(&fs::read(&cover).unwrap()).unwrap();
	}
	writer.finish().unwrap();

	let metadata = file_info(&path).unwrap();

	assert_eq!(metadata.kind, FileKind::Cbz);
	assert_eq!(metadata.width, Some(12));
	assert_eq!(metadata.height, Some(18));
}

#[test]
fn zero_size_and_disallowed_files_are_rejected() {
	let dir = tempfile::tempdir().unwrap();

	let empty = dir.path().join("empty.bin");
	fs::write(&empty, b"").unwrap();
	assert!(matches!(file_info(&empty), Err(Error::ZeroSize)));

	let exe = dir.path().join("tool.exe");
	fs::write(&exe, b"\x4D\x5A\x90\x00\x03\x00\x00\x00rest").unwrap();
	assert!(matches!(file_info(&exe), Err(Error::Unsupported(_))));
}
