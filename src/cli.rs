//! Command-line interface for tnnlib.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Drive a TNN wrapper library from the command line.
#[derive(Parser, Debug)]
#[command(name = "tnnlib")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run inference on an RGBA8 image supplied as JSON.
    Infer {
        /// Path to the model description (proto) file.
        #[arg(long)]
        proto: PathBuf,

        /// Path to the model weights file.
        #[arg(long)]
        model: PathBuf,

        /// Device string passed through to the engine (ARM, OPENCL, METAL, NPU, ...).
        #[arg(short, long, default_value = "ARM")]
        device: String,

        /// Path to input image JSON ({"width": W, "height": H, "data": [...]}).
        #[arg(short, long)]
        input: PathBuf,

        /// Output format (json, pretty).
        #[arg(short, long, default_value = "json")]
        format: String,

        /// Path to optional config file.
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Explicit path to the wrapper library instead of the fixed name.
        #[arg(long)]
        library: Option<PathBuf>,
    },

    /// Load the wrapper library and report whether its entry points resolve.
    Check {
        /// Explicit path to the wrapper library instead of the fixed name.
        #[arg(long)]
        library: Option<PathBuf>,
    },

    /// Print version metadata and validate that the model initializes.
    Info {
        /// Path to the model description (proto) file.
        #[arg(long)]
        proto: PathBuf,

        /// Path to the model weights file.
        #[arg(long)]
        model: PathBuf,

        /// Device string passed through to the engine.
        #[arg(short, long, default_value = "ARM")]
        device: String,

        /// Explicit path to the wrapper library instead of the fixed name.
        #[arg(long)]
        library: Option<PathBuf>,
    },
}

impl Cli {
    /// Parse command line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_infer() {
        let cli = Cli::parse_from([
            "tnnlib", "infer", "--proto", "a.tnnproto", "--model", "a.tnnmodel", "--input",
            "img.json",
        ]);
        match cli.command {
            Commands::Infer { device, format, library, .. } => {
                assert_eq!(device, "ARM");
                assert_eq!(format, "json");
                assert!(library.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn parse_check_with_library_path() {
        let cli = Cli::parse_from(["tnnlib", "check", "--library", "/tmp/libtnn_wrapper.so"]);
        match cli.command {
            Commands::Check { library } => {
                assert_eq!(library, Some(PathBuf::from("/tmp/libtnn_wrapper.so")));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
