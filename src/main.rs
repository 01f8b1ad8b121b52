//! px2nes - Command-line tool for converting quantized images into NES graphics data

use std::process::ExitCode;

use px2nes::cli;

fn main() -> ExitCode {
    cli::run()
}
