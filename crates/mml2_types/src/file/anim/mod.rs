//! Keyframe pools and animation definitions.
//!
//! Animations are stored in two parts:
//!
//! - **Pools** (the tracks block): a self-delimiting table of `u32` pointers,
//!   each pointing at a run of pose frames. A pose frame is one root position
//!   dword followed by one [`PackedRotation`] per bone, so the frame stride is
//!   `(bones + 1) × 4`. Pool `i` ends where pool `i + 1` starts; the last one
//!   ends at the definitions block.
//! - **Definitions** (the control block): a second pointer table, each entry
//!   pointing at a record that samples one pool.
//!
//! ```text
//! Definition record
//! Offset  Size        Field    Description
//! ------  ----------  -------  ------------------------------------------
//! 0x00    1           source   Pool index
//! 0x01    1           length   Number of output frames
//! 0x02    2           padding
//! 0x04    length × 4  frames   Frame index in the pool (first byte of each)
//! ```
//!
//! Pointer tables are read until the read position reaches the first
//! pointer, so a table must be immediately followed by its data and its
//! pointers must increase. [`AnimationSet::to_bytes`] writes that layout.
//!
//! Output frame `f` is played at `f / 30` seconds. Bone tracks carry the pool
//! rotation and the bone's rest position; root motion is kept as a separate
//! channel.

mod rotation;

use glam::{Quat, Vec3};

pub use rotation::{CLASS_DEGREES, PackedRotation};

use super::{AssetError, AssetKind, raw};
use crate::codec::{
	PackedVertex,
	vertex::{MODEL_SCALE, to_world},
};

/// Playback rate of every animation
pub const FRAME_RATE: f32 = 30.0;

/// Size of a definition record header
const DEFINITION_HEADER_SIZE: usize = 4;

/// Size of one frame entry of a definition
const DEFINITION_ENTRY_SIZE: usize = 4;

/// One sampled pose
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PoseFrame {
	/// Packed root position
	pub root: PackedVertex,
	/// One rotation per bone
	pub rotations: Vec<PackedRotation>,
}

impl PoseFrame {
	/// Root position in meters (Y up).
	pub fn root_position(&self) -> Vec3 {
		let [x, y, z] = self.root.decode();
		to_world([x as f32, y as f32, z as f32], MODEL_SCALE)
	}
}

/// A reusable run of pose frames
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KeyframePool {
	/// Frames in file order
	pub frames: Vec<PoseFrame>,
}

/// An animation sampling one pool
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AnimationDefinition {
	/// Pool index
	pub source: u8,
	/// Pool frame index of every output frame
	pub frames: Vec<u8>,
}

/// A bone keyframe
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keyframe {
	/// Time in seconds
	pub time: f32,
	/// Local rotation
	pub rotation: Quat,
	/// Local position (the bone's rest position)
	pub position: Vec3,
}

/// Keyframes of one bone
#[derive(Debug, Clone, PartialEq)]
pub struct BoneTrack {
	/// Bone index
	pub bone: usize,
	/// One keyframe per output frame
	pub keyframes: Vec<Keyframe>,
}

/// A root motion sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RootKey {
	/// Time in seconds
	pub time: f32,
	/// Root position in meters
	pub position: Vec3,
}

/// A playable animation
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationClip {
	/// Length in seconds
	pub duration: f32,
	/// One track per bone
	pub tracks: Vec<BoneTrack>,
	/// Root motion, not applied to any bone
	pub root_motion: Vec<RootKey>,
}

/// Serialized animation blocks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedAnimationSet {
	/// Pools followed by definitions
	pub data: Vec<u8>,
	/// Offset of the tracks block (the base passed to the writer)
	pub tracks_ofs: usize,
	/// Offset of the definitions block
	pub control_ofs: usize,
}

/// Pools and definitions of one entity
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AnimationSet {
	/// Number of bones in each pose
	pub bone_count: usize,
	/// Keyframe pools
	pub pools: Vec<KeyframePool>,
	/// Animation definitions
	pub definitions: Vec<AnimationDefinition>,
}

impl AnimationSet {
	/// Size of one pose frame.
	pub fn stride(&self) -> usize {
		(self.bone_count + 1) * 4
	}

	/// Parses the tracks block at `tracks_ofs` and the control block at
	/// `control_ofs`; pointers are relative to `data`.
	pub fn parse(data: &[u8], tracks_ofs: usize, control_ofs: usize, bone_count: usize) -> Result<Self, AssetError> {
		let kind = AssetKind::Animation;
		let mut set = Self {
			bone_count,
			..Self::default()
		};
		let stride = set.stride();

		let pointers = raw::read_pointer_table(data, tracks_ofs, kind)?;
		for (i, &start) in pointers.iter().enumerate() {
			let start = start as usize;
			let end = pointers.get(i + 1).map_or(control_ofs, |&p| p as usize);
			let len = end.checked_sub(start).ok_or_else(|| {
				AssetError::format(kind, format!("pool {i} ends at 0x{end:X} before it starts at 0x{start:X}"))
			})?;
			if len % stride != 0 {
				log::debug!("Pool {i} has {} trailing bytes", len % stride);
			}

			let mut pool = KeyframePool::default();
			for frame in 0..len / stride {
				let base = start + frame * stride;
				let root = PackedVertex(raw::read_u32(data, base, kind)?);
				let rotations = (0..bone_count)
					.map(|bone| raw::read_u32(data, base + 4 + bone * 4, kind).map(PackedRotation))
					.collect::<Result<_, _>>()?;
				pool.frames.push(PoseFrame {
					root,
					rotations,
				});
			}
			set.pools.push(pool);
		}

		for pointer in raw::read_pointer_table(data, control_ofs, kind)? {
			let ofs = pointer as usize;
			let source = raw::read_u8(data, ofs, kind)?;
			let length = usize::from(raw::read_u8(data, ofs + 1, kind)?);
			let entries = raw::slice(data, ofs + DEFINITION_HEADER_SIZE, length * DEFINITION_ENTRY_SIZE, kind)?;
			set.definitions.push(AnimationDefinition {
				source,
				frames: entries.chunks_exact(DEFINITION_ENTRY_SIZE).map(|entry| entry[0]).collect(),
			});
		}

		log::debug!("Read {} pools and {} animations for {bone_count} bones", set.pools.len(), set.definitions.len());
		Ok(set)
	}

	/// Serializes pools then definitions, with pointers relative to a buffer
	/// where the returned data starts at `base`.
	pub fn to_bytes(&self, base: usize) -> Result<EncodedAnimationSet, AssetError> {
		let kind = AssetKind::Animation;
		if self.pools.is_empty() || self.definitions.is_empty() {
			return Err(AssetError::format(kind, "an animation set needs at least one pool and one definition"));
		}

		let pointer = |ofs: usize| {
			u32::try_from(base + ofs)
				.map_err(|_| AssetError::format(kind, format!("offset 0x{:X} does not fit a pointer", base + ofs)))
		};

		let mut out = vec![0u8; self.pools.len() * 4];
		for (i, pool) in self.pools.iter().enumerate() {
			let ptr = pointer(out.len())?;
			out[i * 4..i * 4 + 4].copy_from_slice(&ptr.to_le_bytes());
			for frame in &pool.frames {
				if frame.rotations.len() != self.bone_count {
					return Err(AssetError::format(
						kind,
						format!("pool {i} has a frame with {} rotations for {} bones", frame.rotations.len(), self.bone_count),
					));
				}
				out.extend_from_slice(&frame.root.to_le_bytes());
				for rotation in &frame.rotations {
					out.extend_from_slice(&rotation.0.to_le_bytes());
				}
			}
		}

		let control = out.len();
		out.resize(control + self.definitions.len() * 4, 0);
		for (i, definition) in self.definitions.iter().enumerate() {
			let length = u8::try_from(definition.frames.len()).map_err(|_| {
				AssetError::format(kind, format!("animation {i} has {} frames", definition.frames.len()))
			})?;
			let ptr = pointer(out.len())?;
			let slot = control + i * 4;
			out[slot..slot + 4].copy_from_slice(&ptr.to_le_bytes());

			out.extend_from_slice(&[definition.source, length, 0, 0]);
			for &frame in &definition.frames {
				out.extend_from_slice(&[frame, 0, 0, 0]);
			}
		}

		Ok(EncodedAnimationSet {
			data: out,
			tracks_ofs: base,
			control_ofs: base + control,
		})
	}

	/// Builds the clip of definition `index` for bones at `rest_positions`.
	pub fn clip(&self, index: usize, rest_positions: &[Vec3]) -> Result<AnimationClip, AssetError> {
		let kind = AssetKind::Animation;
		let definition = self
			.definitions
			.get(index)
			.ok_or_else(|| AssetError::format(kind, format!("no animation {index} of {}", self.definitions.len())))?;
		if rest_positions.len() != self.bone_count {
			return Err(AssetError::format(
				kind,
				format!("{} rest positions for {} bones", rest_positions.len(), self.bone_count),
			));
		}
		let pool = self.pools.get(usize::from(definition.source)).ok_or_else(|| {
			AssetError::format(kind, format!("animation {index} samples missing pool {}", definition.source))
		})?;

		let mut tracks: Vec<BoneTrack> = (0..self.bone_count)
			.map(|bone| BoneTrack {
				bone,
				keyframes: Vec::with_capacity(definition.frames.len()),
			})
			.collect();
		let mut root_motion = Vec::with_capacity(definition.frames.len());

		for (f, &frame_index) in definition.frames.iter().enumerate() {
			let time = f as f32 / FRAME_RATE;
			let frame = pool.frames.get(usize::from(frame_index)).ok_or_else(|| {
				AssetError::format(
					kind,
					format!("animation {index} samples frame {frame_index} of {}", pool.frames.len()),
				)
			})?;

			root_motion.push(RootKey {
				time,
				position: frame.root_position(),
			});
			for ((track, rotation), &position) in tracks.iter_mut().zip(&frame.rotations).zip(rest_positions) {
				track.keyframes.push(Keyframe {
					time,
					rotation: rotation.to_quat(),
					position,
				});
			}
		}

		Ok(AnimationClip {
			duration: definition.frames.len() as f32 / FRAME_RATE,
			tracks,
			root_motion,
		})
	}
}
