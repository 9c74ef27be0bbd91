use shelf_filetype::Family;

pub type Result<T> = std::result::Result<T, Error>;

/// Internal derivation failures. None of these ever reach a caller of
/// [`crate::Thumbnailer::generate`]; they exist so the placeholder fallback
/// can log what actually went wrong.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("no preview strategy for {0} files")]
	NoPreview(Family),
	#[error("file is too large to decode in memory: {0} bytes")]
	TooLarge(u64),
	#[error("seek percentage must be between 0 and 100, got {0}")]
	InvalidPercentage(f32),
	#[error("quality must be between 0 and 100, got {0}")]
	InvalidQuality(f32),
	#[error("clip rectangle falls outside the image bounds")]
	ClipOutOfBounds,
	#[error("frame {0} could not be decoded")]
	Frame(u32),
	#[error("svg could not be rasterized")]
	SvgRaster,
	#[error("webp encoding failed: {0}")]
	WebpEncode(String),
	#[error("decoder deadline exceeded")]
	DeadlineExceeded,
	#[error("foreign decoder task failed: {0}")]
	ForeignTask(String),
	#[error(transparent)]
	Pipeline(#[from] shelf_filetype::Error),
	#[error("there was an i/o error: {0}")]
	Io(#[from] std::io::Error),
}

impl From<shelf_archive::Error> for Error {
	fn from(err: shelf_archive::Error) -> Self {
		Self::Pipeline(err.into())
	}
}

impl From<image::ImageError> for Error {
	fn from(err: image::ImageError) -> Self {
		Self::Pipeline(err.into())
	}
}

impl From<resvg::usvg::Error> for Error {
	fn from(_: resvg::usvg::Error) -> Self {
		Self::SvgRaster
	}
}
