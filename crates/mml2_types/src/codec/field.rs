//! 10-bit signed fields.
//!
//! The top bit of a field is not a two's complement sign but a magnitude
//! flag worth -512, so a field decodes as `-(bit9 ? 512 : 0) + low9`. The
//! representable range is therefore `-512..=511`.

use crate::file::AssetError;

/// Width of one field in bits
pub const FIELD_BITS: u32 = 10;

/// Mask selecting one field
pub const FIELD_MASK: u32 = 0x3FF;

/// Magnitude flag (worth -512)
const FIELD_MSB: u32 = 0x200;

/// Low 9 bits
const FIELD_LOW: u32 = 0x1FF;

/// Largest encodable value
pub const FIELD_MAX: i32 = 511;

/// Smallest encodable value
pub const FIELD_MIN: i32 = -512;

/// Encodes `value` into a 10-bit field, failing when it does not fit.
///
/// # Examples
///
/// ```
/// use mml2_types::codec::field::encode_signed_field;
///
/// assert_eq!(encode_signed_field(5).unwrap(), 0x005);
/// assert_eq!(encode_signed_field(-1).unwrap(), 0x3FF);
/// assert_eq!(encode_signed_field(-512).unwrap(), 0x200);
/// assert!(encode_signed_field(512).is_err());
/// ```
pub fn encode_signed_field(value: i32) -> Result<u32, AssetError> {
	if !(FIELD_MIN..=FIELD_MAX).contains(&value) {
		return Err(AssetError::FieldOverflow {
			value,
		});
	}

	Ok(encode_signed_field_clamped(value))
}

/// Encodes `value` into a 10-bit field, saturating when it does not fit.
///
/// Positive overflow saturates to `0x1FF`, negative overflow to `0x3FF`.
pub fn encode_signed_field_clamped(value: i32) -> u32 {
	if value < 0 {
		if value < FIELD_MIN {
			return FIELD_MASK;
		}
		FIELD_MSB | (512 + value) as u32
	} else {
		(value as u32).min(FIELD_LOW)
	}
}

/// Decodes the low 10 bits of `code`.
///
/// # Examples
///
/// ```
/// use mml2_types::codec::field::decode_signed_field;
///
/// assert_eq!(decode_signed_field(0x1FF), 511);
/// assert_eq!(decode_signed_field(0x200), -512);
/// assert_eq!(decode_signed_field(0x3FF), -1);
/// ```
pub fn decode_signed_field(code: u32) -> i32 {
	let code = code & FIELD_MASK;
	let high = -((code & FIELD_MSB) as i32);
	let low = (code & FIELD_LOW) as i32;
	high + low
}

/// Extracts and decodes the field starting at bit `shift` of `dword`.
#[inline]
pub fn field_at(dword: u32, shift: u32) -> i32 {
	decode_signed_field(dword >> shift)
}

/// Encodes `value`, honoring `strict`.
pub(crate) fn encode_field_with(value: i32, strict: bool) -> Result<u32, AssetError> {
	if strict {
		encode_signed_field(value)
	} else {
		Ok(encode_signed_field_clamped(value))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_encode_boundaries() {
		assert_eq!(encode_signed_field(0).unwrap(), 0x000);
		assert_eq!(encode_signed_field(1).unwrap(), 0x001);
		assert_eq!(encode_signed_field(-1).unwrap(), 0x3FF);
		assert_eq!(encode_signed_field(511).unwrap(), 0x1FF);
		assert_eq!(encode_signed_field(-511).unwrap(), 0x201);
		assert_eq!(encode_signed_field(-512).unwrap(), 0x200);
	}

	#[test]
	fn test_encode_overflow() {
		match encode_signed_field(512) {
			Err(AssetError::FieldOverflow {
				value: 512,
			}) => {}
			other => panic!("Expected FieldOverflow, got {other:?}"),
		}
		assert!(encode_signed_field(-513).is_err());
	}

	#[test]
	fn test_clamped_saturates() {
		assert_eq!(encode_signed_field_clamped(700), 0x1FF);
		assert_eq!(encode_signed_field_clamped(-700), 0x3FF);
		assert_eq!(encode_signed_field_clamped(-3), 0x3FD);
	}

	#[test]
	fn test_decode_boundaries() {
		assert_eq!(decode_signed_field(0x000), 0);
		assert_eq!(decode_signed_field(0x001), 1);
		assert_eq!(decode_signed_field(0x1FF), 511);
		assert_eq!(decode_signed_field(0x200), -512);
		assert_eq!(decode_signed_field(0x201), -511);
		assert_eq!(decode_signed_field(0x3FF), -1);
	}

	#[test]
	fn test_decode_ignores_upper_bits() {
		assert_eq!(decode_signed_field(0xFFFF_FC01), 1);
		assert_eq!(field_at(0x3FF << 20, 20), -1);
	}

	#[test]
	fn test_every_value_round_trips() {
		for value in FIELD_MIN..=FIELD_MAX {
			let code = encode_signed_field(value).unwrap();
			assert!(code <= FIELD_MASK);
			assert_eq!(decode_signed_field(code), value);
		}
	}
}
