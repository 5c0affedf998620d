use glam::{EulerRot, Quat};

use crate::{
	codec::{
		CodecOptions,
		field::{FIELD_BITS, encode_field_with, field_at},
	},
	file::AssetError,
};

/// Full-scale angle, in degrees, of each magnitude class
pub const CLASS_DEGREES: [f32; 4] = [90.0, 180.0, 360.0, 720.0];

const CLASS_SHIFT: u32 = 30;

/// A rotation packed into one dword
///
/// ```text
/// bit 31 30 29     20         10          0
///     [cls][ z:10  ][  y:10  ][  x:10  ]
/// ```
///
/// Each field is a fraction of the class's full-scale angle:
/// `field / 512 × CLASS_DEGREES[cls]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PackedRotation(pub u32);

impl PackedRotation {
	/// Packs three field values and a magnitude class.
	pub fn new(fields: [i32; 3], class: u8, options: CodecOptions) -> Result<Self, AssetError> {
		let mut dword = u32::from(class & 0x3) << CLASS_SHIFT;
		for (axis, value) in fields.into_iter().enumerate() {
			dword |= encode_field_with(value, options.strict)? << (FIELD_BITS * axis as u32);
		}
		Ok(Self(dword))
	}

	/// Magnitude class (0..=3)
	pub fn class(self) -> u8 {
		(self.0 >> CLASS_SHIFT) as u8
	}

	/// Signed field values
	pub fn fields(self) -> [i32; 3] {
		[field_at(self.0, 0), field_at(self.0, FIELD_BITS), field_at(self.0, FIELD_BITS * 2)]
	}

	/// Euler angles in radians, with X and Y negated for the Y-up convention.
	pub fn euler(self) -> [f32; 3] {
		let full_scale = CLASS_DEGREES[usize::from(self.class())];
		let [x, y, z] = self.fields().map(|field| (field as f32 / 512.0 * full_scale).to_radians());
		[-x, -y, z]
	}

	/// Normalized quaternion composed in intrinsic XYZ order.
	pub fn to_quat(self) -> Quat {
		let [x, y, z] = self.euler();
		Quat::from_euler(EulerRot::XYZ, x, y, z).normalize()
	}
}

#[cfg(test)]
mod tests {
	use std::f32::consts::FRAC_PI_2;

	use glam::Vec3;

	use super::*;

	#[test]
	fn test_class_scales() {
		// 256 / 512 of each full scale
		for (class, degrees) in CLASS_DEGREES.iter().enumerate() {
			let rotation = PackedRotation::new([0, 0, 256], class as u8, CodecOptions::strict()).unwrap();
			assert_eq!(rotation.class(), class as u8);
			assert!((rotation.euler()[2] - (degrees / 2.0).to_radians()).abs() < 1e-6);
		}
	}

	#[test]
	fn test_negated_axes() {
		let rotation = PackedRotation::new([256, -256, 0], 1, CodecOptions::strict()).unwrap();
		let [x, y, z] = rotation.euler();
		assert!((x + FRAC_PI_2).abs() < 1e-6);
		assert!((y - FRAC_PI_2).abs() < 1e-6);
		assert_eq!(z, 0.0);
	}

	#[test]
	fn test_quaternion() {
		assert_eq!(PackedRotation(0).to_quat(), Quat::IDENTITY);

		// Quarter turn about Z
		let rotation = PackedRotation::new([0, 0, 256], 1, CodecOptions::strict()).unwrap();
		let turned = rotation.to_quat() * Vec3::X;
		assert!(turned.abs_diff_eq(Vec3::Y, 1e-6));
		assert!((rotation.to_quat().length() - 1.0).abs() < 1e-6);
	}

	#[test]
	fn test_field_overflow() {
		assert!(PackedRotation::new([512, 0, 0], 0, CodecOptions::strict()).is_err());
		let clamped = PackedRotation::new([512, 0, 0], 0, CodecOptions::compatible()).unwrap();
		assert_eq!(clamped.fields(), [511, 0, 0]);
	}
}
