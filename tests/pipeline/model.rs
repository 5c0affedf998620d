use mml2_rs::{mml2_types::file::model::patch_psx_archive, prelude::*};

const WEDGE: &str = "\
o wedge
v 0.1 0.0 0.0
v 0.0 0.2 0.0
v 0.0 0.0 -0.3
v 0.5 0.5 0.5
vt 0 0
vt 1 0
vt 0 1
f 1/1 2/2 3/3
f 1/1 2/2 4/3 3/1
";

fn meshes(count: usize, mesh: &EncodedMesh) -> Vec<EncodedMesh> {
	vec![mesh.clone(); count]
}

fn build(mesh: &EncodedMesh, layout: &PlayerModelLayout) -> Vec<u8> {
	let mut writer = ModelWriter::new(layout.clone());
	for group in &layout.groups {
		writer.write_group(group.name, &meshes(group.count, mesh)).unwrap();
	}
	writer.finish()
}

#[test_log::test]
fn test_obj_to_player_model() {
	let mesh = encode_obj(WEDGE, 0, CodecOptions::strict()).unwrap();
	assert_eq!((mesh.vertices.len(), mesh.triangles.len(), mesh.quads.len()), (4, 1, 1));

	let layout = PlayerModelLayout::megaman();
	let blob = build(&mesh, &layout);
	assert_eq!(blob.len(), layout.size);

	let model = read_player_model(&blob, &layout).unwrap();
	assert_eq!(model.submeshes.len(), layout.submesh_count());
	for submesh in &model.submeshes {
		assert_eq!(submesh.triangles, mesh.triangles);
		assert_eq!(submesh.quads, mesh.quads);
	}

	// OBJ coordinates come back in meters with Y up
	let head = model.submesh("head", 0).unwrap();
	let expected = [[0.1, 0.0, 0.0], [0.0, 0.2, 0.0], [0.0, 0.0, -0.3], [0.5, 0.5, 0.5]];
	for (position, [x, y, z]) in head.positions.iter().zip(expected) {
		assert!(position.abs_diff_eq(glam::Vec3::new(x, y, z), 1e-4), "{position} vs {x} {y} {z}");
	}

	// Every corner reads the shared full-brightness shading block
	let corners = head.shaded_triangles().unwrap();
	assert_eq!(corners.len(), 3);
	assert!(corners.iter().flatten().all(|corner| corner.shade == 1.0));
}

#[test_log::test]
fn test_oversized_model_reports_no_space() {
	let mut obj = String::new();
	for i in 0..120 {
		obj.push_str(&format!("v {} 0 0\n", i as f32 * 0.01));
	}
	obj.push_str("vt 0 0\n");
	for i in 0..118 {
		obj.push_str(&format!("f {}/1 {}/1 {}/1\n", i + 1, i + 2, i + 3));
	}
	let mesh = encode_obj(&obj, 0, CodecOptions::strict()).unwrap();

	let layout = PlayerModelLayout::megaman();
	let mut writer = ModelWriter::new(layout.clone());
	let result = layout.groups.iter().try_for_each(|group| writer.write_group(group.name, &meshes(group.count, &mesh)));
	assert!(matches!(result, Err(AssetError::NoSpace { .. })), "{result:?}");
}

#[test_log::test]
fn test_patch_psx_archive_shifts_model() {
	let mesh = encode_obj(WEDGE, 0, CodecOptions::strict()).unwrap();
	let layout = PlayerModelLayout::megaman();
	let blob = build(&mesh, &layout);

	let mut archive = vec![0xCDu8; layout.size + layout.psx_shift + 0x100];
	patch_psx_archive(&mut archive, &blob, &layout).unwrap();

	// The header before the replaced part is kept
	assert!(archive[..layout.patch_start + layout.psx_shift].iter().all(|&b| b == 0xCD));
	assert_eq!(&archive[layout.patch_start + layout.psx_shift..layout.size + layout.psx_shift], &blob[layout.patch_start..]);
}
