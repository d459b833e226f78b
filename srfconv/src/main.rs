use srfconv::{image_to_srf, srf_to_image};
use std::path::PathBuf;
use tracing::{info, Level};

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};

#[cfg(not(debug_assertions))]
const DEFAULT_DEBUG_LEVEL: u8 = 1;
#[cfg(debug_assertions)]
const DEFAULT_DEBUG_LEVEL: u8 = 99;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Turn debugging information on
    #[arg(short, long, default_value_t = DEFAULT_DEBUG_LEVEL, action = clap::ArgAction::Count)]
    verbosity: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// converts an SRF container to a PNG image set plus an info sidecar
    #[command(name = "srfimg")]
    SrfToImage {
        /// The srf container
        srf_file: PathBuf,

        /// The output image base name (produces <base>.png and <base>_info.txt)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write the alpha plane as a separate <base>_mask.png image
        #[arg(short, long)]
        mask: bool,

        /// Verify the trailing checksum before decoding
        #[arg(long)]
        verify: bool,

        /// Overwrite existing output files
        #[arg(short, long)]
        force: bool,
    },

    /// converts a PNG image set to an SRF container
    #[command(name = "imgsrf")]
    ImageToSrf {
        /// The image base name (expects <base>.png and <base>_info.txt)
        base: PathBuf,

        /// The output container name
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Overwrite an existing output file
        #[arg(short, long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let level = match cli.verbosity {
        0 => Level::ERROR,
        1 => Level::WARN,
        2 => Level::INFO,
        3 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_file(true)
        .with_line_number(true)
        .init();

    match cli.command {
        Commands::SrfToImage {
            srf_file,
            output,
            mask,
            verify,
            force,
        } => {
            let output = match output {
                Some(o) => o,
                None => {
                    let mut output = PathBuf::new();
                    let Some(dir) = srf_file.parent() else {
                        bail!("Invalid srf file");
                    };
                    let Some(Some(filename)) = srf_file.file_stem().map(|os| os.to_str()) else {
                        bail!("Invalid srf file");
                    };
                    output.push(dir);
                    output.push(filename);
                    info!("output base name: {}", output.display());
                    output
                }
            };
            srf_to_image(&srf_file, &output, mask, force, verify)?;
        }
        Commands::ImageToSrf {
            base,
            output,
            force,
        } => {
            let output = match output {
                Some(o) => o,
                None => {
                    let mut output = PathBuf::new();
                    let Some(dir) = base.parent() else {
                        bail!("Invalid image base name");
                    };
                    let Some(Some(filename)) = base.file_stem().map(|os| os.to_str()) else {
                        bail!("Invalid image base name");
                    };
                    let suffix = "srf";
                    output.push(dir);
                    output.push(format!("{}.{}", filename, suffix));
                    info!("output name: {}", output.display());
                    output
                }
            };
            image_to_srf(&base, &output, force)?;
        }
    }
    Ok(())
}
