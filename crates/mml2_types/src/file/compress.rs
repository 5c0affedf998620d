//! Segment-based texture compression.
//!
//! The input is split into `0x2000`-byte segments that are compressed
//! independently. Each segment becomes a run of 16-bit tokens plus one flag
//! bit per token:
//!
//! - bit `0`: the token is a literal word
//! - bit `1`: the token is `offset << 3 | (words - 2)`, copying 2..=9 words
//!   from a byte offset within the already decoded part of the segment;
//!   `0xFFFF` ends the segment
//!
//! The flag bits of all segments form one bit stream packed with
//! [`pack_bitfield`](crate::codec::pack_bitfield).

use memchr::memmem;

use crate::{
	codec::{bitfield::BitReader, pack_bitfield},
	file::AssetError,
};

/// Size of an independently compressed segment
pub const SEGMENT_SIZE: usize = 0x2000;

/// Token terminating a segment
pub const END_OF_SEGMENT: u16 = 0xFFFF;

/// Longest back-reference in words
const MAX_MATCH_WORDS: usize = 9;

/// Shortest back-reference in words
const MIN_MATCH_WORDS: usize = 2;

/// Output of [`compress`]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Compressed {
	/// Packed flag bits
	pub bitfield: Vec<u8>,
	/// Little-endian tokens
	pub payload: Vec<u8>,
}

struct SegmentOutput {
	bits: Vec<bool>,
	payload: Vec<u8>,
}

fn compress_segment(segment: &[u8]) -> SegmentOutput {
	let mut bits = Vec::new();
	// Worst case: every word is a literal, plus the terminator
	let mut payload = Vec::with_capacity(segment.len() + 2);

	let mut in_ofs = 0;
	while in_ofs < segment.len() {
		let words_left = (segment.len() - in_ofs) / 2;
		let max_words = words_left.min(MAX_MATCH_WORDS);
		let window = &segment[..in_ofs];

		// A longer needle can only match where its two-word prefix does
		let mut found = None;
		if max_words >= MIN_MATCH_WORDS
			&& memmem::find(window, &segment[in_ofs..in_ofs + MIN_MATCH_WORDS * 2]).is_some()
		{
			for words in (MIN_MATCH_WORDS..=max_words).rev() {
				let needle = &segment[in_ofs..in_ofs + words * 2];
				if let Some(offset) = memmem::find(window, needle) {
					found = Some((offset, words));
					break;
				}
			}
		}

		match found {
			Some((offset, words)) => {
				let token = ((offset << 3) | (words - MIN_MATCH_WORDS)) as u16;
				payload.extend_from_slice(&token.to_le_bytes());
				bits.push(true);
				in_ofs += words * 2;
			}
			None => {
				payload.extend_from_slice(&segment[in_ofs..in_ofs + 2]);
				bits.push(false);
				in_ofs += 2;
			}
		}
	}

	bits.push(true);
	payload.extend_from_slice(&END_OF_SEGMENT.to_le_bytes());

	SegmentOutput {
		bits,
		payload,
	}
}

/// Compresses `data`.
///
/// An odd trailing byte is padded with a zero to form a whole word; pass
/// the original length to [`decompress`] to drop it again.
///
/// # Examples
///
/// ```
/// use mml2_types::file::compress::{compress, decompress};
///
/// let data = [0x11, 0x22, 0x33, 0x44];
/// let packed = compress(&data);
/// assert_eq!(packed.bitfield, 0x2000_0000u32.to_le_bytes());
/// assert_eq!(packed.payload, [0x11, 0x22, 0x33, 0x44, 0xFF, 0xFF]);
/// assert_eq!(decompress(&packed.bitfield, &packed.payload, data.len()).unwrap(), data);
/// ```
pub fn compress(data: &[u8]) -> Compressed {
	let mut padded;
	let data = if data.len() % 2 == 0 {
		data
	} else {
		padded = data.to_vec();
		padded.push(0);
		&padded[..]
	};

	let count = data.len().div_ceil(SEGMENT_SIZE);
	let mut bits = Vec::new();
	let mut payload = Vec::new();
	for (i, segment) in data.chunks(SEGMENT_SIZE).enumerate() {
		log::debug!("Compressing segment {} of {}", i + 1, count);
		let output = compress_segment(segment);
		bits.extend(output.bits);
		payload.extend(output.payload);
	}

	Compressed {
		bitfield: pack_bitfield(&bits),
		payload,
	}
}

/// Decompresses a bit stream and token payload into `len` bytes.
///
/// Segments are decoded until `len` bytes (rounded up to a whole word) have
/// been produced; anything left in the streams is ignored.
pub fn decompress(bitfield: &[u8], payload: &[u8], len: usize) -> Result<Vec<u8>, AssetError> {
	decompress_counted(bitfield, payload, len).map(|(data, _)| data)
}

/// Like [`decompress`], also returning the number of payload bytes consumed.
pub fn decompress_counted(bitfield: &[u8], payload: &[u8], len: usize) -> Result<(Vec<u8>, usize), AssetError> {
	let padded_len = len.div_ceil(2) * 2;
	let mut bits = BitReader::new(bitfield);
	let mut tokens = payload.chunks_exact(2).map(|pair| u16::from_le_bytes([pair[0], pair[1]]));
	let mut consumed = 0;
	let mut out = Vec::with_capacity(padded_len);

	while out.len() < padded_len {
		let segment_start = out.len();
		loop {
			let bit = bits.next().ok_or_else(|| {
				AssetError::decompression(format!("bit stream ended at bit {}", bits.position()))
			})?;
			let token = tokens.next().ok_or_else(|| {
				AssetError::decompression(format!("payload ended after {} decoded bytes", out.len()))
			})?;
			consumed += 2;

			if !bit {
				out.extend_from_slice(&token.to_le_bytes());
			} else if token == END_OF_SEGMENT {
				break;
			} else {
				let offset = segment_start + (token >> 3) as usize;
				let len = ((token & 0x7) as usize + MIN_MATCH_WORDS) * 2;
				if offset + len > out.len() {
					return Err(AssetError::decompression(format!(
						"copy of {len} bytes from segment offset 0x{:X} exceeds the 0x{:X} decoded bytes",
						offset - segment_start,
						out.len() - segment_start
					)));
				}
				out.extend_from_within(offset..offset + len);
			}

			if out.len() - segment_start > SEGMENT_SIZE {
				return Err(AssetError::decompression(format!(
					"segment starting at 0x{segment_start:X} exceeds 0x{SEGMENT_SIZE:X} bytes"
				)));
			}
		}

		if out.len() == segment_start {
			return Err(AssetError::decompression(format!("empty segment at 0x{segment_start:X}")));
		}
	}

	out.truncate(len);
	Ok((out, consumed))
}

#[cfg(test)]
mod tests {
	use proptest::prelude::*;

	use super::*;
	use crate::codec::unpack_bitfield;

	fn noise(len: usize, seed: u32) -> Vec<u8> {
		let mut state = seed | 1;
		(0..len)
			.map(|_| {
				state ^= state << 13;
				state ^= state >> 17;
				state ^= state << 5;
				state as u8
			})
			.collect()
	}

	fn repetitive(len: usize) -> Vec<u8> {
		(0..len).map(|i| [0x00, 0x11, 0x11, 0x00, 0x42][i % 5]).collect()
	}

	#[test]
	fn test_sentinel_scenario() {
		let packed = compress(&[0x01, 0x02, 0x03, 0x04]);
		assert_eq!(packed.bitfield, vec![0x00, 0x00, 0x00, 0x20]);
		assert_eq!(packed.payload, vec![0x01, 0x02, 0x03, 0x04, 0xFF, 0xFF]);
	}

	#[test]
	fn test_empty_input() {
		let packed = compress(&[]);
		assert!(packed.bitfield.is_empty());
		assert!(packed.payload.is_empty());
		assert!(decompress(&packed.bitfield, &packed.payload, 0).unwrap().is_empty());
	}

	#[test]
	fn test_back_reference_token() {
		// Words: AB CD AB CD -> two literals then a 2-word copy from offset 0
		let packed = compress(&[0xAB, 0xCD, 0xAB, 0xCD, 0xAB, 0xCD, 0xAB, 0xCD]);
		assert_eq!(&unpack_bitfield(&packed.bitfield)[..4], &[false, false, true, true]);
		assert_eq!(packed.payload, vec![0xAB, 0xCD, 0xAB, 0xCD, 0x00, 0x00, 0xFF, 0xFF]);
	}

	#[test]
	fn test_match_at_odd_offset() {
		let data = [0x01, 0x02, 0x03, 0x04, 0x02, 0x03];
		let packed = compress(&data);
		// Third word (02 03) is found at byte 1 of the window but a single word
		// is shorter than the minimum match, so it stays literal
		assert_eq!(&packed.payload[4..6], &[0x02, 0x03]);
		assert_eq!(decompress(&packed.bitfield, &packed.payload, data.len()).unwrap(), data);

		let data = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x02, 0x03, 0x04, 0x05];
		let packed = compress(&data);
		assert_eq!(&packed.payload[6..8], &((1u16 << 3).to_le_bytes()));
		assert_eq!(decompress(&packed.bitfield, &packed.payload, data.len()).unwrap(), data);
	}

	#[test]
	fn test_round_trip_lengths() {
		for len in [0, 1, 0x1FFF, 0x2000, 0x2001, 0x10000] {
			for data in [noise(len, len as u32), repetitive(len)] {
				let packed = compress(&data);
				let unpacked = decompress(&packed.bitfield, &packed.payload, len).unwrap();
				assert_eq!(unpacked, data, "length 0x{len:X}");
			}
		}
	}

	#[test]
	fn test_segments_are_independent() {
		let segment = repetitive(SEGMENT_SIZE);
		let data = segment.repeat(2);
		let single = compress(&segment);
		let double = compress(&data);

		let single_bits = unpack_bitfield(&single.bitfield);
		let double_bits = unpack_bitfield(&double.bitfield);
		let bit_count = single.payload.len() / 2;
		assert!(!double_bits[bit_count]);
		assert_eq!(&double_bits[bit_count..bit_count * 2], &single_bits[..bit_count]);
		assert_eq!(double.payload, single.payload.repeat(2));
	}

	#[test]
	fn test_worst_case_size() {
		let data = noise(SEGMENT_SIZE, 7);
		let packed = compress(&data);
		assert!(packed.payload.len() <= SEGMENT_SIZE + 2);
	}

	#[test]
	fn test_deterministic() {
		let data = noise(0x3000, 99);
		assert_eq!(compress(&data), compress(&data));
	}

	#[test]
	fn test_consumed_payload() {
		let data = repetitive(0x2100);
		let packed = compress(&data);
		let mut payload = packed.payload.clone();
		payload.extend_from_slice(&[0xAA; 6]);
		let (unpacked, consumed) = decompress_counted(&packed.bitfield, &payload, data.len()).unwrap();
		assert_eq!(unpacked, data);
		assert_eq!(consumed, packed.payload.len());
	}

	#[test]
	fn test_reference_past_decoded_bytes() {
		// Copy from offset 0 with nothing decoded yet
		let bitfield = pack_bitfield(&[true]);
		let payload = 0x0000u16.to_le_bytes();
		assert!(matches!(decompress(&bitfield, &payload, 4), Err(AssetError::Decompression { .. })));
	}

	#[test]
	fn test_truncated_streams() {
		let packed = compress(&noise(64, 3));
		assert!(decompress(&packed.bitfield, &packed.payload[..10], 64).is_err());
		assert!(decompress(&[], &packed.payload, 64).is_err());
	}

	proptest! {
		#[test]
		fn prop_round_trip(data in proptest::collection::vec(any::<u8>(), 0..0x4100)) {
			let packed = compress(&data);
			let unpacked = decompress(&packed.bitfield, &packed.payload, data.len()).unwrap();
			prop_assert_eq!(unpacked, data);
		}

		#[test]
		fn prop_round_trip_low_entropy(data in proptest::collection::vec(0u8..3, 0..0x2100)) {
			let packed = compress(&data);
			let unpacked = decompress(&packed.bitfield, &packed.payload, data.len()).unwrap();
			prop_assert_eq!(unpacked, data);
		}
	}
}
