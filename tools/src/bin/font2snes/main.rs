use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::debug;

use opensnes_tools::font::{convert_font_file, FONT_CHARS};
use opensnes_tools::output::name_from_path;
use opensnes_tools::{setup_logging, Bpp};

#[derive(Parser)]
#[command(name = "font2snes")]
#[command(version = "1.0.0", about = "SNES font converter for OpenSNES")]
#[command(long_about = "Converts a PNG font image to SNES tile format.\n\n\
Font image layouts:\n  \
- 128x48 pixels: 16 cols x 6 rows of 8x8 chars (recommended)\n  \
- 768x8 pixels: 96 chars in a single row\n  \
- any grid of 8x8 cells holding exactly 96 characters (ASCII 32-127)")]
struct Cli {
    /// Bits per pixel
    #[arg(short, long, default_value = "2", value_parser = parse_bpp)]
    bpp: Bpp,

    /// Output as C header instead of binary
    #[arg(short, long)]
    c_header: bool,

    /// Variable name for C output (defaults to the output file name)
    #[arg(short, long)]
    name: Option<String>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Input font image
    input: PathBuf,

    /// Output header or tile file; binary palettes go next to it as .pal
    output: PathBuf,
}

fn parse_bpp(s: &str) -> Result<Bpp, String> {
    let bits: u32 = s.parse().map_err(|_| "BPP must be 2 or 4".to_string())?;
    Bpp::try_from(bits).map_err(|e| e.to_string())
}

fn run(cli: Cli) -> Result<()> {
    debug!("Input:  {}", cli.input.display());
    debug!("Output: {}", cli.output.display());
    debug!("Format: {}", if cli.c_header { "C header" } else { "binary" });

    let data = convert_font_file(&cli.input, cli.bpp)?;

    if cli.c_header {
        let name = cli.name.unwrap_or_else(|| name_from_path(&cli.output));
        data.save_c_header(&cli.output, "font2snes", &name)?;
    } else {
        data.save_tiles(&cli.output)?;
        let pal = cli.output.with_extension("pal");
        data.save_palette(&pal)?;
        debug!("Palette written to {}", pal.display());
    }

    println!("Converted {} characters to {}bpp format", FONT_CHARS, cli.bpp);
    println!("Output: {} ({} bytes)", cli.output.display(), data.tiles.len());
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
