use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::debug;

use opensnes_tools::gfx::{self, ConvertOptions};
use opensnes_tools::output::{binary_base, name_from_path, with_suffix};
use opensnes_tools::{setup_logging, Bpp};

#[derive(Parser)]
#[command(name = "gfx2snes")]
#[command(version = "1.1.0", about = "SNES graphics converter")]
#[command(long_about = "Converts PNG/BMP images to SNES tile format.\n\
Reorganizes the image to 128px wide (VRAM layout) before conversion.\n\n\
Examples:\n  gfx2snes -s 16 -c sprite.png sprite.h   # 16x16 sprites\n  \
gfx2snes -s 8 -b 2 -c font.png font.h    # 8x8 tiles, 2bpp")]
struct Cli {
    /// Bits per pixel
    #[arg(short, long, default_value = "4", value_parser = parse_bpp)]
    bpp: Bpp,

    /// Block/sprite size in pixels
    #[arg(short, long, default_value_t = 8, value_parser = parse_block_size)]
    size: usize,

    /// Output as C header file
    #[arg(short, long)]
    c_header: bool,

    /// Variable name for C output (defaults to the input file name)
    #[arg(short, long)]
    name: Option<String>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Input image (.png or indexed .bmp)
    input: PathBuf,

    /// Output header, or base name for the .pic/.pal pair
    output: PathBuf,
}

fn parse_bpp(s: &str) -> Result<Bpp, String> {
    let bits: u32 = s.parse().map_err(|_| "BPP must be 2 or 4".to_string())?;
    Bpp::try_from(bits).map_err(|e| e.to_string())
}

fn parse_block_size(s: &str) -> Result<usize, String> {
    match s.parse() {
        Ok(size @ (8 | 16 | 32)) => Ok(size),
        _ => Err("Block size must be 8, 16, or 32".to_string()),
    }
}

fn run(cli: Cli) -> Result<()> {
    let opts = ConvertOptions {
        bpp: cli.bpp,
        block_size: cli.size,
    };
    let data = gfx::convert_file(&cli.input, &opts)?;
    let name = cli.name.unwrap_or_else(|| name_from_path(&cli.input));
    debug!("Name: {}", name);

    if cli.c_header {
        data.save_c_header(&cli.output, "gfx2snes", &name)?;
        println!(
            "Output: {} ({} tiles, {} colors)",
            cli.output.display(),
            data.tile_count(),
            data.palette.len()
        );
    } else {
        let base = binary_base(&cli.output);
        let pic = with_suffix(&base, "pic");
        let pal = with_suffix(&base, "pal");
        data.save_tiles(&pic)?;
        println!("Tiles: {} ({} bytes)", pic.display(), data.tiles.len());
        data.save_palette(&pal)?;
        println!("Palette: {} ({} bytes)", pal.display(), data.palette.len() * 2);
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
