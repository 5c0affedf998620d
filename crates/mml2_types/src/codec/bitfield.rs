//! MSB-first bit streams stored as little-endian dwords.
//!
//! Bit `i` of the stream lives in dword `i / 32` at bit position
//! `31 - i % 32`. The stream is zero-padded to a whole dword.

/// Packs a bit stream.
///
/// The output length is `ceil(bits.len() / 32) * 4` bytes.
///
/// # Examples
///
/// ```
/// use mml2_types::codec::pack_bitfield;
///
/// assert_eq!(pack_bitfield(&[false, false, true]), vec![0x00, 0x00, 0x00, 0x20]);
/// assert!(pack_bitfield(&[]).is_empty());
/// ```
pub fn pack_bitfield(bits: &[bool]) -> Vec<u8> {
	let mut out = Vec::with_capacity(bits.len().div_ceil(32) * 4);
	for chunk in bits.chunks(32) {
		let mut dword = 0u32;
		for (i, &bit) in chunk.iter().enumerate() {
			if bit {
				dword |= 1 << (31 - i);
			}
		}
		out.extend_from_slice(&dword.to_le_bytes());
	}
	out
}

/// Unpacks every bit of `bytes`, including the padding.
///
/// A trailing partial dword is ignored.
pub fn unpack_bitfield(bytes: &[u8]) -> Vec<bool> {
	BitReader::new(bytes).collect()
}

/// Sequential reader over a packed bit stream
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
	bytes: &'a [u8],
	position: usize,
}

impl<'a> BitReader<'a> {
	/// Creates a reader positioned on the first bit.
	pub fn new(bytes: &'a [u8]) -> Self {
		Self {
			bytes,
			position: 0,
		}
	}

	/// Number of bits consumed so far
	pub fn position(&self) -> usize {
		self.position
	}

	/// Total number of bits available
	pub fn len(&self) -> usize {
		(self.bytes.len() / 4) * 32
	}

	/// Returns `true` if the stream holds no bits.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

impl Iterator for BitReader<'_> {
	type Item = bool;

	fn next(&mut self) -> Option<bool> {
		let word = self.position / 32;
		let chunk = self.bytes.get(word * 4..word * 4 + 4)?;
		let dword = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
		let bit = dword & (1 << (31 - self.position % 32)) != 0;
		self.position += 1;
		Some(bit)
	}

	fn size_hint(&self) -> (usize, Option<usize>) {
		let remaining = self.len().saturating_sub(self.position);
		(remaining, Some(remaining))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_padding_to_dword() {
		assert_eq!(pack_bitfield(&[true]).len(), 4);
		assert_eq!(pack_bitfield(&[true; 32]).len(), 4);
		assert_eq!(pack_bitfield(&[true; 33]).len(), 8);
		assert_eq!(pack_bitfield(&[true; 33])[4..], [0x00, 0x00, 0x00, 0x80]);
	}

	#[test]
	fn test_msb_first() {
		let mut bits = vec![false; 32];
		bits[0] = true;
		bits[31] = true;
		assert_eq!(pack_bitfield(&bits), 0x8000_0001u32.to_le_bytes().to_vec());
	}

	#[test]
	fn test_reader_matches_packer() {
		let bits: Vec<bool> = (0..70).map(|i| i % 3 == 0 || i % 7 == 0).collect();
		let packed = pack_bitfield(&bits);
		let unpacked = unpack_bitfield(&packed);
		assert_eq!(unpacked.len(), 96);
		assert_eq!(&unpacked[..70], &bits[..]);
		assert!(unpacked[70..].iter().all(|&bit| !bit));
	}

	#[test]
	fn test_reader_stops_at_end() {
		let mut reader = BitReader::new(&[0xFF, 0xFF, 0xFF, 0xFF, 0x01]);
		assert_eq!(reader.len(), 32);
		assert_eq!(reader.by_ref().count(), 32);
		assert_eq!(reader.next(), None);
		assert_eq!(reader.position(), 32);
	}
}
