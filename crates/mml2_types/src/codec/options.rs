//! Strict / compatible behavior toggle.
//!
//! Some inputs cannot be represented exactly: a coordinate outside the field
//! range, a 17th color, a 128th vertex. Strict mode turns those into typed
//! errors; compatible mode clamps, masks or truncates so that existing
//! patched archives are reproduced byte for byte.

/// Options controlling how capacity problems are handled.
///
/// # Presets
///
/// - `strict()` (default): overflowing fields, palettes, vertex counts and
///   unknown hierarchy flags are errors
/// - `compatible()`: clamp, truncate, mask and log
///
/// # Examples
///
/// ```
/// use mml2_types::codec::CodecOptions;
///
/// let options = CodecOptions::default();
/// assert!(options.strict);
///
/// let options = CodecOptions::compatible();
/// assert!(!options.strict);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecOptions {
	/// Fail instead of clamping/truncating
	pub strict: bool,
}

impl Default for CodecOptions {
	fn default() -> Self {
		Self::strict()
	}
}

impl CodecOptions {
	/// Capacity problems are errors.
	pub fn strict() -> Self {
		Self {
			strict: true,
		}
	}

	/// Capacity problems are clamped, truncated or logged.
	pub fn compatible() -> Self {
		Self {
			strict: false,
		}
	}
}
