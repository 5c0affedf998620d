//! Bounds-checked little-endian reads over byte slices.
//!
//! Every record format in this crate addresses its data through absolute
//! offsets, so these helpers take the offset explicitly instead of keeping a
//! cursor.

use super::{AssetError, AssetKind};

/// Returns `data[offset..offset + len]` or an [`AssetError::InsufficientData`].
#[inline]
pub fn slice(data: &[u8], offset: usize, len: usize, kind: AssetKind) -> Result<&[u8], AssetError> {
	let end = offset.checked_add(len).ok_or_else(|| AssetError::OutOfRange {
		kind,
		offset,
		end: usize::MAX,
		size: data.len(),
	})?;
	data.get(offset..end).ok_or_else(|| AssetError::insufficient_data(kind, end, data.len()))
}

/// Reads a `u8` at `offset`.
#[inline]
pub fn read_u8(data: &[u8], offset: usize, kind: AssetKind) -> Result<u8, AssetError> {
	Ok(slice(data, offset, 1, kind)?[0])
}

/// Reads an `i8` at `offset`.
#[inline]
pub fn read_i8(data: &[u8], offset: usize, kind: AssetKind) -> Result<i8, AssetError> {
	Ok(read_u8(data, offset, kind)? as i8)
}

/// Reads a little-endian `u16` at `offset`.
#[inline]
pub fn read_u16(data: &[u8], offset: usize, kind: AssetKind) -> Result<u16, AssetError> {
	let b = slice(data, offset, 2, kind)?;
	Ok(u16::from_le_bytes([b[0], b[1]]))
}

/// Reads a little-endian `i16` at `offset`.
#[inline]
pub fn read_i16(data: &[u8], offset: usize, kind: AssetKind) -> Result<i16, AssetError> {
	Ok(read_u16(data, offset, kind)? as i16)
}

/// Reads a little-endian `u32` at `offset`.
#[inline]
pub fn read_u32(data: &[u8], offset: usize, kind: AssetKind) -> Result<u32, AssetError> {
	let b = slice(data, offset, 4, kind)?;
	Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
}

/// Reads a self-delimiting table of `u32` pointers starting at `table_ofs`.
///
/// Pointers are read until the read position reaches the value of the first
/// pointer, which requires the writer to place the table immediately before
/// the data it points to, in increasing order.
pub fn read_pointer_table(data: &[u8], table_ofs: usize, kind: AssetKind) -> Result<Vec<u32>, AssetError> {
	let first = read_u32(data, table_ofs, kind)?;
	let first_ofs = first as usize;
	if first_ofs <= table_ofs || (first_ofs - table_ofs) % 4 != 0 {
		return Err(AssetError::format(
			kind,
			format!("pointer table at 0x{table_ofs:X} starts with invalid pointer 0x{first:X}"),
		));
	}

	let count = (first_ofs - table_ofs) / 4;
	let mut pointers = Vec::with_capacity(count);
	pointers.push(first);
	for i in 1..count {
		pointers.push(read_u32(data, table_ofs + i * 4, kind)?);
	}

	Ok(pointers)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_read_le_values() {
		let data = [0x34, 0x12, 0xFF, 0xFF, 0x78, 0x56, 0x34, 0x12];
		assert_eq!(read_u16(&data, 0, AssetKind::Archive).unwrap(), 0x1234);
		assert_eq!(read_i16(&data, 2, AssetKind::Archive).unwrap(), -1);
		assert_eq!(read_u32(&data, 4, AssetKind::Archive).unwrap(), 0x1234_5678);
		assert_eq!(read_i8(&data, 2, AssetKind::Archive).unwrap(), -1);
	}

	#[test]
	fn test_read_past_end() {
		let data = [0u8; 3];
		match read_u32(&data, 0, AssetKind::Entity) {
			Err(AssetError::InsufficientData {
				expected: 4,
				actual: 3,
				..
			}) => {}
			other => panic!("Expected InsufficientData, got {other:?}"),
		}
	}

	#[test]
	fn test_pointer_table() {
		let mut data = Vec::new();
		data.extend_from_slice(&8u32.to_le_bytes());
		data.extend_from_slice(&12u32.to_le_bytes());
		data.extend_from_slice(&[0u8; 8]);

		let table = read_pointer_table(&data, 0, AssetKind::Animation).unwrap();
		assert_eq!(table, vec![8, 12]);
	}

	#[test]
	fn test_pointer_table_rejects_backward_pointer() {
		let data = 0u32.to_le_bytes();
		assert!(read_pointer_table(&data, 0, AssetKind::Animation).is_err());
	}
}
