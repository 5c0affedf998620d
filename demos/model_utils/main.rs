//! Model CLI Utility
//!
//! Encodes OBJ meshes into player model primitive arrays and inspects models.
//!
//! # Features
//!
//! - **encode**: Convert one OBJ to vertex / triangle / quad arrays
//! - **build**: Build a `PL00P010` model from a JSON manifest of OBJ files
//! - **read**: Summarize a player model blob
//! - **inspect**: Summarize the skinned entity meshes of a memory dump
//!
//! # Usage
//!
//! ```bash
//! cargo run --example model_utils -- encode head.obj out/head
//! cargo run --example model_utils -- build manifest.json PL00P010.bin
//! cargo run --example model_utils -- read PL00P010.bin
//! cargo run --example model_utils -- inspect dump.bin --table 0x124800
//! ```
//!
//! The manifest maps every submesh group of the model to its OBJ files:
//!
//! ```json
//! { "body": ["10_BODY.obj", "11_HIPS.obj"], "head": ["20_HEAD.obj"] }
//! ```

use std::{
	collections::BTreeMap,
	fs,
	path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use log::info;
use mml2_rs::{
	mml2_types::file::{AnimationSet, entity_table::read_characters, obj::FACE_MATERIAL},
	prelude::*,
};

fn main() -> Result<()> {
	env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

	let cli = Cli::parse();
	match cli.command {
		Command::Encode(args) => run_encode(args),
		Command::Build(args) => run_build(args),
		Command::Read(args) => run_read(args),
		Command::Inspect(args) => run_inspect(args),
	}
}

#[derive(Parser)]
#[command(name = "model_utils")]
#[command(author = "mml2-rs project")]
#[command(version)]
#[command(about = "Encode, build and inspect MML2 meshes", long_about = None)]
struct Cli {
	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand)]
enum Command {
	/// Encode one OBJ into primitive arrays
	Encode(EncodeArgs),
	/// Build a player model from a manifest
	Build(BuildArgs),
	/// Summarize a player model
	Read(ReadArgs),
	/// Summarize the character meshes of a memory dump
	Inspect(InspectArgs),
}

#[derive(Args)]
struct EncodeArgs {
	/// OBJ file path
	#[arg(value_name = "INPUT_OBJ")]
	input: PathBuf,

	/// Output prefix; `.vert`, `.tri` and `.quad` are appended
	#[arg(value_name = "OUTPUT_PREFIX")]
	output: PathBuf,

	/// Material of triangle faces
	#[arg(short, long, default_value_t = 0)]
	material: u8,

	/// Clamp and truncate instead of failing
	#[arg(short, long, default_value_t = false)]
	compatible: bool,
}

#[derive(Args)]
struct BuildArgs {
	/// JSON manifest mapping group names to OBJ files
	#[arg(value_name = "MANIFEST")]
	manifest: PathBuf,

	/// Output model blob
	#[arg(value_name = "OUTPUT")]
	output: PathBuf,

	/// Draw head triangles with the face texture
	#[arg(short, long, default_value_t = false)]
	face_material: bool,

	/// Clamp and truncate instead of failing
	#[arg(short, long, default_value_t = false)]
	compatible: bool,
}

#[derive(Args)]
struct ReadArgs {
	/// Player model blob
	#[arg(value_name = "MODEL")]
	input: PathBuf,

	/// Print every submesh, including empty ones
	#[arg(short, long, default_value_t = false)]
	verbose: bool,
}

#[derive(Args)]
struct InspectArgs {
	/// Memory dump holding the entity table
	#[arg(value_name = "DUMP")]
	input: PathBuf,

	/// Offset of the entity table
	#[arg(short, long, value_name = "OFFSET", value_parser = parse_offset, default_value = "0")]
	table: usize,

	/// Clamp and truncate instead of failing
	#[arg(short, long, default_value_t = false)]
	compatible: bool,
}

fn parse_offset(value: &str) -> Result<usize, String> {
	match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
		Some(hex) => usize::from_str_radix(hex, 16).map_err(|e| e.to_string()),
		None => value.parse().map_err(|e: std::num::ParseIntError| e.to_string()),
	}
}

fn options(compatible: bool) -> CodecOptions {
	if compatible {
		CodecOptions::compatible()
	} else {
		CodecOptions::strict()
	}
}

fn encode_file(path: &Path, material: u8, options: CodecOptions) -> Result<EncodedMesh> {
	let text = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
	let mesh = encode_obj(&text, material, options).with_context(|| format!("Failed to encode {}", path.display()))?;
	info!(
		"{}: {} vertices, {} triangles, {} quads",
		path.display(),
		mesh.vertices.len(),
		mesh.triangles.len(),
		mesh.quads.len()
	);
	Ok(mesh)
}

fn run_encode(args: EncodeArgs) -> Result<()> {
	let mesh = encode_file(&args.input, args.material, options(args.compatible))?;

	for (ext, bytes) in [("vert", mesh.vertex_bytes()), ("tri", mesh.triangle_bytes()), ("quad", mesh.quad_bytes())] {
		let path = args.output.with_extension(ext);
		fs::write(&path, &bytes).with_context(|| format!("Failed to write {}", path.display()))?;
		println!("{} ({} bytes)", path.display(), bytes.len());
	}
	Ok(())
}

fn run_build(args: BuildArgs) -> Result<()> {
	let text = fs::read_to_string(&args.manifest)
		.with_context(|| format!("Failed to read {}", args.manifest.display()))?;
	let manifest: BTreeMap<String, Vec<PathBuf>> = serde_json::from_str(&text).context("Invalid manifest")?;
	let root = args.manifest.parent().unwrap_or(Path::new("."));

	let layout = PlayerModelLayout::megaman();
	for name in manifest.keys() {
		if layout.group(name).is_none() {
			bail!("Unknown submesh group {name:?}");
		}
	}

	let mut writer = ModelWriter::new(layout.clone());
	for group in &layout.groups {
		let files = manifest.get(group.name).map(Vec::as_slice).unwrap_or_default();
		let material = if args.face_material && group.name == "head" {
			FACE_MATERIAL
		} else {
			0
		};
		let meshes =
			files.iter().map(|file| encode_file(&root.join(file), material, options(args.compatible))).collect::<Result<Vec<_>>>()?;
		writer.write_group(group.name, &meshes)?;
	}

	for (i, region) in writer.regions().iter().enumerate() {
		info!("Region {i}: 0x{:X}..0x{:X} ({} bytes free)", region.start, region.end, region.len());
	}

	let model = writer.finish();
	fs::write(&args.output, &model).with_context(|| format!("Failed to write {}", args.output.display()))?;
	println!("{} ({} bytes)", args.output.display(), model.len());
	Ok(())
}

fn run_read(args: ReadArgs) -> Result<()> {
	let blob = fs::read(&args.input).with_context(|| format!("Failed to read {}", args.input.display()))?;
	let model = read_player_model(&blob, &PlayerModelLayout::megaman())?;

	for submesh in &model.submeshes {
		if !args.verbose && submesh.positions.is_empty() {
			continue;
		}
		println!(
			"{:>5}[{}]: {:>3} vertices, {:>3} triangles, {:>3} quads",
			submesh.group,
			submesh.index,
			submesh.positions.len(),
			submesh.triangles.len(),
			submesh.quads.len()
		);
	}
	Ok(())
}

fn run_inspect(args: InspectArgs) -> Result<()> {
	let data = fs::read(&args.input).with_context(|| format!("Failed to read {}", args.input.display()))?;
	let characters = read_characters(&data, args.table)?;
	if characters.is_empty() {
		println!("No character entries in the table at 0x{:X}", args.table);
		return Ok(());
	}

	for record in characters {
		println!("{}:", record.id_string());
		let mesh = match EntityMesh::parse(&data, record.mesh_ofs as usize, options(args.compatible)) {
			Ok(mesh) => mesh,
			Err(err) => {
				println!("  mesh error: {err}");
				continue;
			}
		};
		println!(
			"  {} bones, {} vertices, {} triangles, {} textures, {} draw calls",
			mesh.skeleton.len(),
			mesh.vertices.len(),
			mesh.corners.len() / 3,
			mesh.textures.len(),
			mesh.draw_calls().len()
		);

		if record.has_animations() {
			match AnimationSet::parse(&data, record.tracks_ofs as usize, record.control_ofs as usize, mesh.skeleton.len()) {
				Ok(set) => println!("  {} pools, {} animations", set.pools.len(), set.definitions.len()),
				Err(err) => println!("  animation error: {err}"),
			}
		}
	}
	Ok(())
}
