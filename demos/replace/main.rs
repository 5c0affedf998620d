//! Player Replacement Driver
//!
//! Encodes a custom player texture and model and patches them into the game
//! archives and, optionally, a disc image.
//!
//! # Steps
//!
//! 1. Encode the body and face PNGs, splicing the special weapon artwork
//!    from the PC texture archive into the face.
//! 2. Rebuild `PL00T.BIN` around the two compressed textures.
//! 3. Encode the OBJ submeshes and build `PL00P010`.
//! 4. Patch the PSX (and PC, when configured) model archives.
//! 5. Replace every rebuilt archive in the disc image.
//!
//! # Configuration
//!
//! Settings are read from a TOML file (default `replace.toml`) and may be
//! overridden with `MML2_` environment variables, using `__` between
//! sections (`MML2_ROM__OUTPUT=patched.bin`).
//!
//! ```toml
//! source_dir = "replace/MIKU_MODEL"
//!
//! [texture]
//! body = "default_body.png"
//! face = "default_face.png"
//!
//! [model]
//! body = ["a00_BODY.OBJ", "a01_HIPS.OBJ", "a02_LEG_RIGHT_TOP.OBJ",
//!         "a03_LEG_RIGHT_BOTTOM.OBJ", "a04_LEG_LEFT_TOP.OBJ", "a05_LEG_LEFT_BOTTOM.OBJ"]
//! head = "b00_HEAD.OBJ"
//! feet = ["c00_FOOT_RIGHT.OBJ", "c01_FOOT_LEFT.OBJ"]
//! left = ["d00_ARM_LEFT_TOP.OBJ", "d01_ARM_LEFT_BOTTOM.OBJ", "d02_HAND_LEFT.OBJ"]
//! right = ["e00_ARM_RIGHT_TOP.OBJ", "e01_ARM_RIGHT_BOTTOM.OBJ", "e02_HAND_RIGHT.OBJ"]
//!
//! [archives]
//! psx_in = "replace/PSX_IN"
//! psx_out = "replace/PSX_OUT"
//! pc_in = "replace/PC_IN"
//!
//! [rom]
//! input = "TRACK_01_READONLY.bin"
//! output = "Mega Man Legends 2 (USA) (Track 1).bin"
//! ```
//!
//! # Usage
//!
//! ```bash
//! cargo run --example replace -- --config replace.toml
//! ```

use std::{
	fs,
	path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use clap::Parser;
use log::{info, warn};
use mml2_rs::{
	RomImage,
	mml2_types::file::{
		model::{patch_pc_archive, patch_psx_archive},
		texture_archive::{special_weapon_block, splice_special_weapon},
	},
	prelude::*,
};
use serde::Deserialize;
use walkdir::WalkDir;

/// Stock primitive arrays of head submesh 1, kept as-is
const HEAD_1_VERTICES: &str =
	"5f2cde3ba12fde3bb06faf3b00402f39b5a32f3b4ba02f3b007c1f380598bf38fb9bbf38001cfe38a6cfce3b5accce3b506caf3b";
const HEAD_1_TRIANGLES: &str = "01101f1b051f00008a8100e03a2b3d363a360000838301a0072f002f03260000078401a03336382b39360000888101a0201b3f103b1f0000830503e0";
const HEAD_1_QUADS: &str =
	"2222201b3a223b1f874181e11e2206221f1b051f08c240e01f1b01101f000002034522a0201b20003f103f0283c402a0";

/// Stock primitive arrays of head submesh 2
const HEAD_2_VERTICES: &str = "0060003bb5a32f3b4ba02f3b2d14103bd317103b00ec4f390598bf38fb9bbf38";
const HEAD_2_TRIANGLES: &str = "202b2f2e20360000850100a0102e1f2b1f360000840200a022231f2b1d23000086c201a0";
const HEAD_2_QUADS: &str = "06231d23102e1f2b8103a1a03a232f2e2223202b8281a1a0";

#[derive(Parser)]
#[command(name = "replace")]
#[command(author = "mml2-rs project")]
#[command(version)]
#[command(about = "Replace the player texture and model and patch the disc image", long_about = None)]
struct Cli {
	/// TOML configuration file
	#[arg(short, long, value_name = "FILE", default_value = "replace.toml")]
	config: PathBuf,

	/// Skip the disc image step even if configured
	#[arg(long, default_value_t = false)]
	no_rom: bool,
}

#[derive(Debug, Deserialize)]
struct ReplaceConfig {
	/// Directory holding the PNG and OBJ sources
	source_dir: PathBuf,
	texture: TextureConfig,
	model: ModelConfig,
	archives: ArchiveConfig,
	rom: Option<RomConfig>,
	/// Clamp and truncate instead of failing
	#[serde(default)]
	compatible: bool,
}

#[derive(Debug, Deserialize)]
struct TextureConfig {
	body: PathBuf,
	face: PathBuf,
}

#[derive(Debug, Deserialize)]
struct ModelConfig {
	body: Vec<PathBuf>,
	head: PathBuf,
	feet: Vec<PathBuf>,
	left: Vec<PathBuf>,
	right: Vec<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct ArchiveConfig {
	psx_in: PathBuf,
	psx_out: PathBuf,
	pc_in: PathBuf,
	/// Directory for patched PC archives; PC archives are left alone when unset
	pc_out: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct RomConfig {
	input: PathBuf,
	output: PathBuf,
}

fn main() -> Result<()> {
	env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

	let cli = Cli::parse();
	let config = load_config(&cli.config)?;
	let options = if config.compatible {
		CodecOptions::compatible()
	} else {
		CodecOptions::strict()
	};
	fs::create_dir_all(&config.archives.psx_out)?;

	replace_textures(&config, options).context("Unable to encode player texture")?;
	replace_model(&config, options).context("Unable to encode player model")?;

	match (&config.rom, cli.no_rom) {
		(Some(rom), false) => update_rom(&config.archives, rom)?,
		(Some(_), true) => info!("Skipping disc image"),
		(None, _) => warn!("No [rom] section configured; archives written to {}", config.archives.psx_out.display()),
	}
	Ok(())
}

fn load_config(path: &Path) -> Result<ReplaceConfig> {
	let settings = config::Config::builder()
		.add_source(config::File::from(path))
		.add_source(config::Environment::with_prefix("MML2").separator("__"))
		.build()
		.with_context(|| format!("Failed to load {}", path.display()))?;
	settings.try_deserialize().context("Invalid configuration")
}

fn read(path: &Path) -> Result<Vec<u8>> {
	fs::read(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn write(path: &Path, data: &[u8]) -> Result<()> {
	fs::write(path, data).with_context(|| format!("Failed to write {}", path.display()))?;
	info!("Wrote {} ({} bytes)", path.display(), data.len());
	Ok(())
}

fn load_texture(path: &Path, options: CodecOptions) -> Result<Texture> {
	let img = image::open(path).with_context(|| format!("Failed to open {}", path.display()))?.to_rgba8();
	let (width, height) = img.dimensions();
	Texture::from_rgba(img.as_raw(), width, height, options).with_context(|| format!("Failed to encode {}", path.display()))
}

fn replace_textures(config: &ReplaceConfig, options: CodecOptions) -> Result<()> {
	let body = load_texture(&config.source_dir.join(&config.texture.body), options)?;
	let mut face = load_texture(&config.source_dir.join(&config.texture.face), options)?;

	let dat = read(&config.archives.pc_in.join("PL00T.DAT"))?;
	splice_special_weapon(&mut face, special_weapon_block(&dat)?)?;

	let source = read(&config.archives.psx_in.join("PL00T.BIN"))?;
	let mut archive = PlayerTextureArchive::from_template(&source, &PlayerTextureLayout::megaman())?;
	archive.replace_textures(&body, &face)?;
	write(&config.archives.psx_out.join("PL00T.BIN"), &archive.to_bytes(source.len())?)
}

fn encode_files(root: &Path, files: &[PathBuf], options: CodecOptions) -> Result<Vec<EncodedMesh>> {
	files
		.iter()
		.map(|file| {
			let path = root.join(file);
			let text = fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))?;
			encode_obj(&text, 0, options).with_context(|| format!("Failed to encode {}", path.display()))
		})
		.collect()
}

fn fixed_head_mesh(vertices: &str, triangles: &str, quads: &str) -> Result<EncodedMesh> {
	Ok(EncodedMesh::from_raw_parts(&hex::decode(vertices)?, &hex::decode(triangles)?, &hex::decode(quads)?)?)
}

fn replace_model(config: &ReplaceConfig, options: CodecOptions) -> Result<()> {
	let root = &config.source_dir;
	let model = &config.model;

	let mut head = encode_files(root, std::slice::from_ref(&model.head), options)?;
	head.push(fixed_head_mesh(HEAD_1_VERTICES, HEAD_1_TRIANGLES, HEAD_1_QUADS)?);
	head.push(fixed_head_mesh(HEAD_2_VERTICES, HEAD_2_TRIANGLES, HEAD_2_QUADS)?);

	let layout = PlayerModelLayout::megaman();
	let mut writer = ModelWriter::new(layout.clone());
	writer.write_group("body", &encode_files(root, &model.body, options)?)?;
	writer.write_group("head", &head)?;
	writer.write_group("feet", &encode_files(root, &model.feet, options)?)?;
	writer.write_group("left", &encode_files(root, &model.left, options)?)?;
	writer.write_group("right", &encode_files(root, &model.right, options)?)?;
	let blob = writer.finish();

	let mut psx = read(&config.archives.psx_in.join("PL00P010.BIN"))?;
	patch_psx_archive(&mut psx, &blob, &layout)?;
	write(&config.archives.psx_out.join("PL00P010.BIN"), &psx)?;

	if let Some(pc_out) = &config.archives.pc_out {
		let mut pc = read(&config.archives.pc_in.join("PL00P010.DAT"))?;
		patch_pc_archive(&mut pc, &blob, &layout)?;
		fs::create_dir_all(pc_out)?;
		write(&pc_out.join("PL00P010.DAT"), &pc)?;
	}
	Ok(())
}

fn update_rom(archives: &ArchiveConfig, config: &RomConfig) -> Result<()> {
	let mut rom = RomImage::open(&config.input).with_context(|| format!("Failed to open {}", config.input.display()))?;

	let mut patched = 0;
	for entry in WalkDir::new(&archives.psx_out).max_depth(1).sort_by_file_name() {
		let entry = entry?;
		if !entry.file_type().is_file() {
			continue;
		}
		let name = entry.file_name().to_string_lossy().into_owned();
		let original = read(&archives.psx_in.join(&name))?;
		let replacement = read(entry.path())?;
		rom.replace(&original, &replacement, &name)?;
		patched += 1;
	}

	if patched == 0 {
		bail!("No archives found in {}", archives.psx_out.display());
	}
	rom.save(&config.output).with_context(|| format!("Failed to write {}", config.output.display()))?;
	info!("Patched {patched} archive(s) into {}", config.output.display());
	Ok(())
}
