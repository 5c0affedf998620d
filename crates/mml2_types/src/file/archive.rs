//! Helpers for sector-aligned archive containers.
//!
//! Archive files are flat buffers whose sub-files start on [`SECTOR_SIZE`]
//! boundaries. The first sector holds a small header; the first sub-file
//! length is stored at `+0x04` and its data starts at `+0x800`.

use super::{AssetError, AssetKind, SECTOR_SIZE, raw};

/// Offset of the first sub-file's length
const FIRST_FILE_LENGTH_OFFSET: usize = 0x04;

/// Rounds `offset` up to the next sector boundary.
///
/// # Examples
///
/// ```
/// use mml2_types::file::archive::align_to_sector;
///
/// assert_eq!(align_to_sector(0), 0);
/// assert_eq!(align_to_sector(1), 0x800);
/// assert_eq!(align_to_sector(0x800), 0x800);
/// ```
pub fn align_to_sector(offset: usize) -> usize {
	offset.div_ceil(SECTOR_SIZE) * SECTOR_SIZE
}

/// Returns the first sub-file of an archive.
pub fn first_file(archive: &[u8]) -> Result<&[u8], AssetError> {
	let length = raw::read_u32(archive, FIRST_FILE_LENGTH_OFFSET, AssetKind::Archive)? as usize;
	raw::slice(archive, SECTOR_SIZE, length, AssetKind::Archive)
}

/// Returns the first sub-file of an archive for in-place editing.
pub fn first_file_mut(archive: &mut [u8]) -> Result<&mut [u8], AssetError> {
	let length = raw::read_u32(archive, FIRST_FILE_LENGTH_OFFSET, AssetKind::Archive)? as usize;
	let size = archive.len();
	archive.get_mut(SECTOR_SIZE..SECTOR_SIZE + length).ok_or_else(|| {
		AssetError::insufficient_data(AssetKind::Archive, SECTOR_SIZE + length, size)
	})
}

/// Writes `bytes` at `offset`, failing if they do not fit.
pub fn write_at(buffer: &mut [u8], offset: usize, bytes: &[u8], kind: AssetKind) -> Result<(), AssetError> {
	let end = offset + bytes.len();
	let size = buffer.len();
	buffer
		.get_mut(offset..end)
		.ok_or(AssetError::OutOfRange {
			kind,
			offset,
			end,
			size,
		})?
		.copy_from_slice(bytes);
	Ok(())
}
