//! Disc image CLI Utility
//!
//! Finds and replaces archives inside a raw (2352-byte sector) disc image.
//!
//! # Usage
//!
//! ```bash
//! # Print the offset of PL00T.BIN inside the image
//! cargo run --example rom_utils -- locate game.bin PL00T.BIN
//!
//! # Replace the archive and write a patched image
//! cargo run --example rom_utils -- patch game.bin PL00T.BIN PL00T.new.BIN -o patched.bin
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use mml2_rs::{RomImage, mml2_types::file::rom::split_sectors};

#[derive(Parser)]
#[command(name = "rom_utils")]
#[command(author = "mml2-rs project")]
#[command(version = "1.0")]
#[command(about = "Disc image utility - locate and patch archives", long_about = None)]
struct Cli {
	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand)]
enum Commands {
	/// Print where an archive is stored in the image
	Locate {
		/// Disc image path
		#[arg(value_name = "IMAGE")]
		image: PathBuf,

		/// Unmodified archive to search for
		#[arg(value_name = "ORIGINAL")]
		original: PathBuf,

		/// Print the first bytes of every sector at the located offset
		#[arg(short, long)]
		verbose: bool,
	},

	/// Replace an archive in the image
	Patch {
		/// Disc image path
		#[arg(value_name = "IMAGE")]
		image: PathBuf,

		/// Unmodified archive to search for
		#[arg(value_name = "ORIGINAL")]
		original: PathBuf,

		/// Replacement archive
		#[arg(value_name = "REPLACEMENT")]
		replacement: PathBuf,

		/// Output image path (defaults to overwriting the input)
		#[arg(short, long, value_name = "OUTPUT")]
		output: Option<PathBuf>,
	},
}

fn main() -> Result<()> {
	env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

	let cli = Cli::parse();
	match cli.command {
		Commands::Locate {
			image,
			original,
			verbose,
		} => {
			let rom = RomImage::open(&image).with_context(|| format!("Failed to open {}", image.display()))?;
			let needle = std::fs::read(&original).with_context(|| format!("Failed to read {}", original.display()))?;
			let name = display_name(&original);
			let offset = rom.locate(&needle, &name)?;
			println!("{name}: 0x{offset:X} ({} sectors)", split_sectors(&needle).len());

			if verbose {
				for (i, sector) in split_sectors(&needle).iter().enumerate() {
					let head = &sector[..sector.len().min(16)];
					println!("  sector {i:>3} @ 0x{:08X}: {}", offset + i * mml2_rs::ROM_STRIDE, hex::encode(head));
				}
			}
			Ok(())
		}
		Commands::Patch {
			image,
			original,
			replacement,
			output,
		} => {
			let mut rom = RomImage::open(&image).with_context(|| format!("Failed to open {}", image.display()))?;
			let needle = std::fs::read(&original).with_context(|| format!("Failed to read {}", original.display()))?;
			let data =
				std::fs::read(&replacement).with_context(|| format!("Failed to read {}", replacement.display()))?;
			rom.replace(&needle, &data, &display_name(&original))?;

			let output = output.unwrap_or(image);
			rom.save(&output).with_context(|| format!("Failed to write {}", output.display()))?;
			info!("Wrote {}", output.display());
			Ok(())
		}
	}
}

fn display_name(path: &std::path::Path) -> String {
	path.file_name().map_or_else(|| path.display().to_string(), |name| name.to_string_lossy().into_owned())
}
