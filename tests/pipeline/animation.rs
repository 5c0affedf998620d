use glam::Vec3;
use mml2_rs::{
	mml2_types::file::{
		anim::FRAME_RATE,
		entity::{BONE_SIZE, HEADER_SIZE, HIERARCHY_ENTRY_SIZE},
		entity_table::read_characters,
	},
	prelude::*,
};

const TABLE_SIZE: usize = 4 + 2 * 16;

/// One bone, one submesh with a single triangle.
fn mesh_bytes(base: u32) -> Vec<u8> {
	let geometry_ofs = base + HEADER_SIZE as u32;
	let skeleton_ofs = geometry_ofs + 0x10;
	let hierarchy_ofs = skeleton_ofs + BONE_SIZE as u32;
	let shadow_ofs = hierarchy_ofs + HIERARCHY_ENTRY_SIZE as u32;
	let vert_ofs = shadow_ofs;
	let tri_ofs = vert_ofs + 3 * 4;

	let header = EntityHeader {
		submesh_count: 1,
		geometry_ofs,
		skeleton_ofs,
		hierarchy_ofs,
		texture_ofs: 0,
		collision_ofs: 0,
		shadow_ofs,
	};
	let mut data = header.to_bytes().to_vec();
	data.extend([1, 0, 3, 0]);
	data.extend_from_slice(&tri_ofs.to_le_bytes());
	data.extend_from_slice(&0u32.to_le_bytes());
	data.extend_from_slice(&vert_ofs.to_le_bytes());
	data.extend([0u8; BONE_SIZE]);
	data.extend([0, 0xFF, 0, 0]);
	for [x, y, z] in [[0, 0, 0], [80, 0, 0], [0, 80, 0]] {
		data.extend(PackedVertex::encode(x, y, z, CodecOptions::strict()).unwrap().to_le_bytes());
	}
	let corner = |i| Corner::new(i, 0, 0);
	data.extend(Face::triangle(corner(0), corner(1), corner(2), 0).to_bytes());
	data
}

fn animations(bone_count: usize) -> AnimationSet {
	let rotation = |z| PackedRotation::new([0, 0, z], 1, CodecOptions::strict()).unwrap();
	let frame = |z, x| PoseFrame {
		root: PackedVertex::encode(x, 0, 0, CodecOptions::strict()).unwrap(),
		rotations: vec![rotation(z); bone_count],
	};
	AnimationSet {
		bone_count,
		pools: vec![KeyframePool {
			frames: vec![frame(0, 0), frame(128, 80), frame(256, 160)],
		}],
		definitions: vec![
			AnimationDefinition {
				source: 0,
				frames: vec![0, 1, 2, 1],
			},
			AnimationDefinition {
				source: 0,
				frames: vec![2],
			},
		],
	}
}

/// Entity table, mesh and animation blocks in one buffer.
fn dump() -> Vec<u8> {
	let mesh_ofs = TABLE_SIZE;
	let mesh = mesh_bytes(mesh_ofs as u32);
	let anim_ofs = mesh_ofs + mesh.len();
	let encoded = animations(1).to_bytes(anim_ofs).unwrap();

	let mut data = 2u32.to_le_bytes().to_vec();
	for record in [[0x0001_C020, mesh_ofs, encoded.tracks_ofs, encoded.control_ofs], [0x0001_C010, 0, 0, 0]] {
		for value in record {
			data.extend_from_slice(&(value as u32).to_le_bytes());
		}
	}
	data.extend(mesh);
	data.extend(encoded.data);
	data
}

#[test_log::test]
fn test_character_with_animations() {
	let data = dump();
	let characters = read_characters(&data, 0).unwrap();
	assert_eq!(characters.len(), 1);
	let record = characters[0];
	assert!(record.has_animations());

	let mesh = EntityMesh::parse(&data, record.mesh_ofs as usize, CodecOptions::strict()).unwrap();
	assert_eq!(mesh.skeleton.len(), 1);
	assert_eq!(mesh.corners.len(), 3);
	assert!(mesh.textures.is_empty());

	let set = AnimationSet::parse(&data, record.tracks_ofs as usize, record.control_ofs as usize, mesh.skeleton.len())
		.unwrap();
	assert_eq!(set, animations(1));

	let rest: Vec<Vec3> = mesh.skeleton.bones().iter().map(|bone| bone.position).collect();
	let clip = set.clip(0, &rest).unwrap();
	assert_eq!(clip.duration, 4.0 / FRAME_RATE);
	assert_eq!(clip.tracks.len(), 1);
	assert_eq!(clip.root_motion.len(), 4);
	assert!(clip.root_motion[2].position.abs_diff_eq(Vec3::new(0.2, 0.0, 0.0), 1e-6));
	assert_eq!(clip.tracks[0].keyframes[3].rotation, clip.tracks[0].keyframes[1].rotation);
}

#[test_log::test]
fn test_missing_pool_is_reported() {
	let mut set = animations(1);
	set.definitions[1].source = 3;
	let encoded = set.to_bytes(0).unwrap();
	let parsed = AnimationSet::parse(&encoded.data, encoded.tracks_ofs, encoded.control_ofs, 1).unwrap();
	assert!(parsed.clip(0, &[Vec3::ZERO]).is_ok());
	assert!(matches!(parsed.clip(1, &[Vec3::ZERO]), Err(AssetError::Format { .. })));
}
