//! Entity table.
//!
//! A `u32` count followed by 16-byte records: `id`, mesh offset, tracks
//! offset and control offset (all `u32`). Entries whose low id byte is
//! `0x20` are characters with a skinned mesh.

use super::{AssetError, AssetKind, raw};

/// Size of an entity record
pub const ENTITY_RECORD_SIZE: usize = 16;

/// Low id byte of character entries
pub const CHARACTER_ID: u8 = 0x20;

/// One entity table record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityRecord {
	/// Entity id
	pub id: u32,
	/// Mesh header offset
	pub mesh_ofs: u32,
	/// Keyframe pool block offset
	pub tracks_ofs: u32,
	/// Animation definition block offset
	pub control_ofs: u32,
}

impl EntityRecord {
	/// Returns `true` for character entries.
	pub fn is_character(&self) -> bool {
		self.id as u8 == CHARACTER_ID
	}

	/// Returns `true` if both animation blocks are present.
	pub fn has_animations(&self) -> bool {
		self.tracks_ofs != 0 && self.control_ofs != 0
	}

	/// Formats the id the way entity lists name entries (`0x01c020`).
	pub fn id_string(&self) -> String {
		format!("0x{:06x}", self.id)
	}
}

/// Reads every record of the table at `ofs`.
pub fn read_entity_table(data: &[u8], ofs: usize) -> Result<Vec<EntityRecord>, AssetError> {
	let kind = AssetKind::Entity;
	let count = raw::read_u32(data, ofs, kind)? as usize;
	raw::slice(data, ofs + 4, count * ENTITY_RECORD_SIZE, kind)?;

	(0..count)
		.map(|i| {
			let base = ofs + 4 + i * ENTITY_RECORD_SIZE;
			Ok(EntityRecord {
				id: raw::read_u32(data, base, kind)?,
				mesh_ofs: raw::read_u32(data, base + 4, kind)?,
				tracks_ofs: raw::read_u32(data, base + 8, kind)?,
				control_ofs: raw::read_u32(data, base + 12, kind)?,
			})
		})
		.collect()
}

/// Reads only the character records.
pub fn read_characters(data: &[u8], ofs: usize) -> Result<Vec<EntityRecord>, AssetError> {
	Ok(read_entity_table(data, ofs)?.into_iter().filter(EntityRecord::is_character).collect())
}

#[cfg(test)]
mod tests {
	use super::*;

	fn table(records: &[[u32; 4]]) -> Vec<u8> {
		let mut data = (records.len() as u32).to_le_bytes().to_vec();
		for record in records {
			for value in record {
				data.extend_from_slice(&value.to_le_bytes());
			}
		}
		data
	}

	#[test]
	fn test_read_records() {
		let data = table(&[[0x01_C020, 0x100, 0x200, 0x300], [0x01_C010, 0x400, 0, 0], [0x02_0120, 0x500, 0x600, 0]]);
		let records = read_entity_table(&data, 0).unwrap();
		assert_eq!(records.len(), 3);
		assert_eq!(records[0].id_string(), "0x01c020");
		assert!(records[0].has_animations());
		assert!(!records[2].has_animations());

		let characters = read_characters(&data, 0).unwrap();
		assert_eq!(characters.iter().map(|r| r.mesh_ofs).collect::<Vec<_>>(), vec![0x100, 0x500]);
	}

	#[test]
	fn test_count_exceeds_data() {
		let mut data = table(&[[0x20, 0, 0, 0]]);
		data[0] = 2;
		assert!(read_entity_table(&data, 0).is_err());
	}
}
