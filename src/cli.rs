//! Command-line interface implementation

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::budget::HardwareBudget;
use crate::import::load_png;
use crate::layout::{self, Geometry};
use crate::output::{write_binary, write_report};
use crate::palette::OutputPalette;
use crate::pipeline;

/// Exit codes
const EXIT_SUCCESS: u8 = 0;
const EXIT_ERROR: u8 = 1;
const EXIT_INVALID_ARGS: u8 = 2;

/// px2nes - Convert quantized images into NES PPU background/sprite data
#[derive(Parser)]
#[command(name = "px2nes")]
#[command(about = "Convert quantized images into NES PPU background/sprite data")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert a 4-colour greyscale PNG into PRG and CHR data files
    Convert {
        /// Input PNG (width x height must match the tile geometry)
        input: PathBuf,

        /// Output PRG data file
        #[arg(long, default_value = "prg.bin")]
        prg: PathBuf,

        /// Output CHR data file
        #[arg(long, default_value = "chr.bin")]
        chr: PathBuf,

        /// Output palette: four NES colour ids as hex 00-3f
        #[arg(long, num_args = 4, value_names = ["C0", "C1", "C2", "C3"])]
        palette: Option<Vec<String>>,

        /// Image width in tiles
        #[arg(long, default_value_t = 32)]
        width: usize,

        /// Image height in tiles
        #[arg(long, default_value_t = 28)]
        height: usize,

        /// Write a JSON conversion report
        #[arg(long)]
        report: Option<PathBuf>,
    },
}

/// Run the CLI application
pub fn run() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Commands::Convert {
            input,
            prg,
            chr,
            palette,
            width,
            height,
            report,
        } => run_convert(
            &input,
            &prg,
            &chr,
            palette.as_deref(),
            width,
            height,
            report.as_deref(),
        ),
    }
}

/// Execute the convert command
fn run_convert(
    input: &Path,
    prg_path: &Path,
    chr_path: &Path,
    palette: Option<&[String]>,
    width: usize,
    height: usize,
    report: Option<&Path>,
) -> ExitCode {
    let geometry = match Geometry::new(width, height) {
        Ok(g) => g,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    };

    let palette = match palette {
        Some(values) => match OutputPalette::parse(values) {
            Ok(p) => p,
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::from(EXIT_INVALID_ARGS);
            }
        },
        None => OutputPalette::default(),
    };

    let imported = match load_png(input, &geometry) {
        Ok(imported) => imported,
        Err(e) => {
            eprintln!("Error: cannot import '{}': {}", input.display(), e);
            return ExitCode::from(EXIT_ERROR);
        }
    };
    println!("Total tiles: {}", imported.grid.cells().len());
    println!("Distinct tiles: {}", imported.table.len());

    let budget = HardwareBudget::NES;
    let conversion = match pipeline::convert(&imported.table, &imported.grid, &budget) {
        Ok(conversion) => conversion,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };
    println!("Elimination merges: {}", conversion.stats.merges);
    println!(
        "Quality loss: {:.2}% of maximum",
        conversion.stats.error_fraction * 100.0
    );
    println!("1x2-tile pairs assigned to sprites: {}", conversion.stats.sprites);
    println!(
        "Distinct sprite tile pairs: {} ({} after mirror deduplication)",
        conversion.stats.distinct_pairs, conversion.stats.representative_pairs
    );
    println!(
        "Distinct background tiles: {}",
        conversion.stats.background_tiles
    );

    let prg = layout::encode_prg(&conversion, &palette, &geometry, &budget);
    let chr = layout::encode_chr(&conversion, &imported.table, &budget);

    if let Err(e) = write_binary(prg_path, &prg) {
        eprintln!("Error: cannot write '{}': {}", prg_path.display(), e);
        return ExitCode::from(EXIT_ERROR);
    }
    if let Err(e) = write_binary(chr_path, &chr) {
        eprintln!("Error: cannot write '{}': {}", chr_path.display(), e);
        return ExitCode::from(EXIT_ERROR);
    }
    if let Some(report_path) = report {
        if let Err(e) = write_report(report_path, &conversion.stats) {
            eprintln!("Error: cannot write '{}': {}", report_path.display(), e);
            return ExitCode::from(EXIT_ERROR);
        }
    }

    println!("Wrote {} and {}", prg_path.display(), chr_path.display());
    ExitCode::from(EXIT_SUCCESS)
}
