//! 15-bit texels.
//!
//! ```text
//! bit 15  14    10 9     5 4     0
//!     [A][  blue ][ green ][  red ]
//! ```

/// Visibility flag
pub const VISIBLE_FLAG: u16 = 0x8000;

/// A packed BGR555 color with a visibility flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Texel(pub u16);

impl Texel {
	/// Fully transparent black, the reserved first palette entry
	pub const TRANSPARENT: Self = Self(0x0000);

	/// Packs an 8-bit RGBA color.
	///
	/// Alpha is binarized: any non-zero alpha sets the visibility flag, a zero
	/// alpha discards the color entirely so every transparent pixel maps to
	/// [`Texel::TRANSPARENT`].
	///
	/// # Examples
	///
	/// ```
	/// use mml2_types::codec::Texel;
	///
	/// assert_eq!(Texel::from_rgba([255, 0, 0, 255]).0, 0x801F);
	/// assert_eq!(Texel::from_rgba([255, 255, 255, 0]), Texel::TRANSPARENT);
	/// ```
	pub fn from_rgba([r, g, b, a]: [u8; 4]) -> Self {
		if a == 0 {
			return Self::TRANSPARENT;
		}

		let r = u16::from(r >> 3);
		let g = u16::from(g >> 3);
		let b = u16::from(b >> 3);
		Self(r | (g << 5) | (b << 10) | VISIBLE_FLAG)
	}

	/// Expands back to 8-bit RGBA.
	///
	/// Channels are widened with `<< 3`. A texel is treated as visible when
	/// any of its bits are set, which for encoder output is exactly the
	/// visibility flag.
	pub fn to_rgba(self) -> [u8; 4] {
		let r = ((self.0 & 0x1F) << 3) as u8;
		let g = (((self.0 >> 5) & 0x1F) << 3) as u8;
		let b = (((self.0 >> 10) & 0x1F) << 3) as u8;
		let a = if self.is_visible() {
			0xFF
		} else {
			0x00
		};
		[r, g, b, a]
	}

	/// Returns `true` for any texel other than [`Texel::TRANSPARENT`].
	pub fn is_visible(self) -> bool {
		self.0 != 0
	}

	/// Returns `true` when the stored visibility flag is set.
	pub fn has_visible_flag(self) -> bool {
		self.0 & VISIBLE_FLAG != 0
	}

	/// Reads a texel from two little-endian bytes.
	pub fn from_le_bytes(bytes: [u8; 2]) -> Self {
		Self(u16::from_le_bytes(bytes))
	}

	/// Returns the little-endian encoding of the texel.
	pub fn to_le_bytes(self) -> [u8; 2] {
		self.0.to_le_bytes()
	}
}
