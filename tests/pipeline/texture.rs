use mml2_rs::{
	mml2_types::file::{
		archive::align_to_sector,
		rom,
		texture_archive::{SPECIAL_WEAPON_SIZE, splice_special_weapon},
	},
	prelude::*,
};

use crate::striped_rgba;

const ARCHIVE_SIZE: usize = 0x8000;

fn header(kind: u32, image_x: u16) -> ImageHeader {
	ImageHeader {
		kind,
		image_x,
		image_y: 0x100,
		width: 64,
		height: 256,
		palette_count: 1,
		..ImageHeader::default()
	}
}

fn archive(body: &Texture, face: &Texture) -> PlayerTextureArchive {
	PlayerTextureArchive {
		body: TextureEntry::encode(header(2, 0x240), body).unwrap(),
		palette_block: vec![0x5A; 0xB0],
		face: TextureEntry::encode(header(2, 0x280), face).unwrap(),
	}
}

/// Offsets [`PlayerTextureArchive::to_bytes`] places the entries at.
fn layout(archive: &PlayerTextureArchive) -> (PlayerTextureLayout, usize) {
	let palette = align_to_sector(archive.body.len());
	let face_offset = align_to_sector(palette + archive.palette_block.len());
	let layout = PlayerTextureLayout {
		body_offset: 0,
		palette_block: palette..palette + archive.palette_block.len(),
		face_offset,
	};
	(layout, face_offset + archive.face.len())
}

fn texture(colors: &[[u8; 4]]) -> Texture {
	Texture::from_rgba(&striped_rgba(colors), 256, 256, CodecOptions::strict()).unwrap()
}

#[test_log::test]
fn test_texture_archive_rebuild() {
	let body = texture(&[[255, 0, 0, 255], [0, 0, 255, 255]]);
	let mut face = texture(&[[0, 255, 0, 255], [0, 0, 0, 0]]);
	splice_special_weapon(&mut face, &[0x11; SPECIAL_WEAPON_SIZE]).unwrap();

	let rebuilt = archive(&body, &face);
	let bytes = rebuilt.to_bytes(ARCHIVE_SIZE).unwrap();
	assert_eq!(bytes.len(), ARCHIVE_SIZE);

	let (layout, end) = layout(&rebuilt);
	assert!(bytes[end..].iter().all(|&b| b == 0));
	let parsed = PlayerTextureArchive::parse(&bytes, &layout).unwrap();
	assert_eq!(parsed.body.header.image_x, 0x240);
	assert_eq!(parsed.body.header.color_count, 16);
	assert_eq!(parsed.palette_block, vec![0x5A; 0xB0]);
	assert_eq!(parsed.body.decode().unwrap(), body);

	let decoded_face = parsed.face.decode().unwrap();
	assert_eq!(&decoded_face.image[0x4000..], &[0x11; SPECIAL_WEAPON_SIZE]);
	assert_eq!(decoded_face.to_rgba()[..4], [0, 248, 0, 255]);
}

#[test_log::test]
fn test_patch_archive_into_disc_image() {
	// Trimmed to their content so no two consecutive sectors are identical
	let trimmed = |archive: PlayerTextureArchive| {
		let (_, end) = layout(&archive);
		archive.to_bytes(end).unwrap()
	};
	let original = trimmed(archive(&texture(&[[255, 255, 255, 255], [16, 16, 16, 255]]), &texture(&[[8, 8, 8, 255]])));
	let replacement = trimmed(archive(&texture(&[[255, 0, 0, 255], [0, 0, 0, 0]]), &texture(&[[0, 0, 248, 255]])));

	// Lay the original out with the raw sector stride
	let mut image = vec![0xEEu8; 0x40000];
	let offset = 0x9930;
	rom::patch(&mut image, offset, &original).unwrap();

	let mut rom = RomImage::from_bytes(image);
	assert_eq!(rom.replace(&original, &replacement, "PL00T.BIN").unwrap(), offset);
	assert_eq!(rom.locate(&replacement, "PL00T.BIN").unwrap(), offset);
	assert!(rom.locate(&original, "PL00T.BIN").is_err());

	// Frame headers between sectors are untouched
	assert_eq!(rom.as_bytes()[offset + SECTOR_SIZE], 0xEE);
	assert_eq!(rom.as_bytes()[offset + ROM_STRIDE - 1], 0xEE);
}
