//! Texture CLI Utility
//!
//! Encodes, decodes and verifies 256×256 paletted player textures.
//!
//! # Features
//!
//! - **encode**: Convert a PNG to raw palette + image bytes, or a compressed archive entry
//! - **decode**: Convert a compressed archive entry (or raw texture) to PNG
//! - **verify**: Check that a PNG survives the encode → compress → decompress round trip
//! - **dat**: Dump every texture of a PC `.DAT` archive to PNG
//! - **vram**: Render one texture page of a VRAM dump to PNG
//!
//! # Usage
//!
//! ```bash
//! # Encode a PNG as a compressed entry
//! cargo run --example texture_utils -- encode body.png body.bin --entry
//!
//! # Decode the face texture of PL00T.BIN
//! cargo run --example texture_utils -- decode PL00T.BIN face.png --offset 0x3800
//!
//! # Verify the round trip
//! cargo run --example texture_utils -- verify body.png
//! ```

use std::{
	fs,
	path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use image::RgbaImage;
use log::{info, warn};
use mml2_rs::{
	mml2_types::file::{
		dat,
		texture::{TEXTURE_HEIGHT, TEXTURE_WIDTH},
		vram::{Framebuffer, PAGE_SIZE},
	},
	prelude::*,
};

#[derive(Parser)]
#[command(name = "texture_utils")]
#[command(author = "mml2-rs project")]
#[command(version = "1.0")]
#[command(about = "Player texture utility - encode, decode, and verify 4bpp textures", long_about = None)]
struct Cli {
	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand)]
enum Commands {
	/// Encode a 256×256 PNG
	Encode {
		/// Input PNG file path
		#[arg(value_name = "INPUT_PNG")]
		input: PathBuf,

		/// Output file path
		#[arg(value_name = "OUTPUT")]
		output: PathBuf,

		/// Write a compressed archive entry instead of raw bytes
		#[arg(short, long)]
		entry: bool,

		/// Clamp colors and truncate palettes instead of failing
		#[arg(short, long)]
		compatible: bool,
	},

	/// Decode a texture to PNG
	Decode {
		/// Input archive or raw texture path
		#[arg(value_name = "INPUT")]
		input: PathBuf,

		/// Output PNG file path
		#[arg(value_name = "OUTPUT_PNG")]
		output: PathBuf,

		/// Offset of the entry header inside the archive
		#[arg(short, long, default_value = "0", value_parser = parse_offset)]
		offset: usize,

		/// Treat the input as raw palette + image bytes
		#[arg(short, long)]
		raw: bool,
	},

	/// Verify the encode/decode round trip of a PNG
	Verify {
		/// Input PNG file path
		#[arg(value_name = "INPUT_PNG")]
		input: PathBuf,
	},

	/// Dump every texture of a PC `.DAT` archive
	Dat {
		/// Input `.DAT` file path
		#[arg(value_name = "INPUT_DAT")]
		input: PathBuf,

		/// Output directory
		#[arg(value_name = "OUTPUT_DIR")]
		output: PathBuf,
	},

	/// Render a texture page from a VRAM dump
	Vram {
		/// Input VRAM dump (1024×512 16-bit)
		#[arg(value_name = "INPUT_VRAM")]
		input: PathBuf,

		/// Output PNG file path
		#[arg(value_name = "OUTPUT_PNG")]
		output: PathBuf,

		/// Image coordinate word
		#[arg(long, value_parser = parse_word)]
		image: u16,

		/// Palette coordinate word
		#[arg(long, value_parser = parse_word)]
		palette: u16,
	},
}

fn main() -> Result<()> {
	env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

	let cli = Cli::parse();
	match cli.command {
		Commands::Encode {
			input,
			output,
			entry,
			compatible,
		} => handle_encode(&input, &output, entry, compatible),
		Commands::Decode {
			input,
			output,
			offset,
			raw,
		} => handle_decode(&input, &output, offset, raw),
		Commands::Verify {
			input,
		} => handle_verify(&input),
		Commands::Dat {
			input,
			output,
		} => handle_dat(&input, &output),
		Commands::Vram {
			input,
			output,
			image,
			palette,
		} => handle_vram(&input, &output, image, palette),
	}
}

/// Accepts decimal or `0x` prefixed hexadecimal offsets.
fn parse_offset(value: &str) -> Result<usize, String> {
	match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
		Some(hex) => usize::from_str_radix(hex, 16).map_err(|e| e.to_string()),
		None => value.parse().map_err(|e: std::num::ParseIntError| e.to_string()),
	}
}

fn parse_word(value: &str) -> Result<u16, String> {
	let parsed = parse_offset(value)?;
	u16::try_from(parsed).map_err(|e| e.to_string())
}

/// Load a PNG as RGBA8.
fn load_png(path: &Path) -> Result<RgbaImage> {
	let img = image::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
	Ok(img.to_rgba8())
}

fn save_rgba(path: &Path, rgba: Vec<u8>, width: u32, height: u32) -> Result<()> {
	let img = RgbaImage::from_raw(width, height, rgba).context("Failed to create image buffer")?;
	img.save(path).with_context(|| format!("Failed to write {}", path.display()))?;
	Ok(())
}

fn options(compatible: bool) -> CodecOptions {
	if compatible {
		CodecOptions::compatible()
	} else {
		CodecOptions::strict()
	}
}

fn handle_encode(input: &Path, output: &Path, entry: bool, compatible: bool) -> Result<()> {
	let img = load_png(input)?;
	let (width, height) = img.dimensions();
	let texture = Texture::from_rgba(img.as_raw(), width, height, options(compatible))?;

	let bytes = if entry {
		let entry = TextureEntry::encode(ImageHeader::default(), &texture)?;
		info!("Compressed to {} bytes (bitfield {} bytes)", entry.len(), entry.bitfield.len());
		entry.to_bytes()
	} else {
		texture.to_bytes()
	};

	fs::write(output, &bytes).with_context(|| format!("Failed to write {}", output.display()))?;
	info!("Wrote {} ({} bytes)", output.display(), bytes.len());
	Ok(())
}

fn handle_decode(input: &Path, output: &Path, offset: usize, raw: bool) -> Result<()> {
	let data = fs::read(input).with_context(|| format!("Failed to read {}", input.display()))?;
	let texture = if raw {
		Texture::from_bytes(data.get(offset..).unwrap_or_default())?
	} else {
		let entry = TextureEntry::parse(&data, offset)?;
		info!(
			"Entry at 0x{offset:X}: type {}, {} colors, image at ({}, {})",
			entry.header.kind, entry.header.color_count, entry.header.image_x, entry.header.image_y
		);
		entry.decode()?
	};

	save_rgba(output, texture.to_rgba(), TEXTURE_WIDTH, TEXTURE_HEIGHT)?;
	info!("Wrote {}", output.display());
	Ok(())
}

fn handle_verify(input: &Path) -> Result<()> {
	let img = load_png(input)?;
	let (width, height) = img.dimensions();
	let texture = Texture::from_rgba(img.as_raw(), width, height, CodecOptions::strict())?;
	let bytes = texture.to_bytes();

	let packed = compress(&bytes);
	let restored = decompress(&packed.bitfield, &packed.payload, bytes.len())?;
	if restored != bytes {
		bail!("Decompressed bytes differ from the encoded texture");
	}

	let decoded = Texture::from_bytes(&restored)?.to_rgba();
	let mismatched = decoded
		.chunks_exact(4)
		.zip(img.as_raw().chunks_exact(4))
		.filter(|(a, b)| a[3] != b[3] || (a[3] != 0 && a[..3] != b[..3]))
		.count();

	let ratio = (packed.bitfield.len() + packed.payload.len()) as f64 / bytes.len() as f64 * 100.0;
	println!("Compressed: {} bytes ({ratio:.1}%)", packed.bitfield.len() + packed.payload.len());
	println!("Pixels differing after quantization: {mismatched}");
	if mismatched > 0 {
		warn!("Colors are quantized to 15 bits; differences above are expected for non-5-bit sources");
	}
	Ok(())
}

fn handle_dat(input: &Path, output: &Path) -> Result<()> {
	let data = fs::read(input).with_context(|| format!("Failed to read {}", input.display()))?;
	let textures = dat::read_textures(&data)?;
	fs::create_dir_all(output)?;

	for (i, texture) in textures.iter().enumerate() {
		let path = output.join(format!("{i:03}.png"));
		save_rgba(&path, texture.to_rgba(), texture.width, texture.height)?;
		info!("  [{i}] {}×{} -> {}", texture.width, texture.height, path.display());
	}
	info!("Extracted {} texture(s)", textures.len());
	Ok(())
}

fn handle_vram(input: &Path, output: &Path, image: u16, palette: u16) -> Result<()> {
	let data = fs::read(input).with_context(|| format!("Failed to read {}", input.display()))?;
	let framebuffer = Framebuffer::new(&data)?;
	let rgba = framebuffer.render_page(image, palette)?;
	save_rgba(output, rgba, PAGE_SIZE as u32, PAGE_SIZE as u32)?;
	info!("Wrote {}", output.display());
	Ok(())
}
