/// How far into a frame-indexed file the preview frame is taken from,
/// as a percentage of the frame count.
pub(crate) const DEFAULT_PERCENTAGE_IN: f32 = 35.0;

/// Default webp encoding quality.
pub(crate) const DEFAULT_QUALITY: f32 = 80.0;

/// The maximum file size that a still image can be in order to have a
/// thumbnail decoded in memory.
///
/// This value is in MiB.
pub(crate) const STILL_MAXIMUM_FILE_SIZE: u64 = MIB * 24;

/// The size of 1MiB in bytes
const MIB: u64 = 1048576;
