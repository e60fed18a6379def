//! CLI entry point for tnnlib.

use anyhow::{Context, Result};
use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use tnnlib::cli::{Cli, Commands};
use tnnlib::config::Config;
use tnnlib::{Image, NativeLibrary, TnnSession, LIB_NAME};

/// Load the wrapper library from an explicit path when given, otherwise by
/// its fixed name.
fn load_library(path: Option<&PathBuf>) -> Result<NativeLibrary> {
    let library = match path {
        Some(path) => NativeLibrary::load_from(path)?,
        None => NativeLibrary::load()?,
    };
    Ok(library)
}

/// Parse an RGBA8 image from input JSON.
///
/// Expected format: { "width": W, "height": H, "data": [...] }
fn read_image(path: &PathBuf) -> Result<Image> {
    let input_json: Value = serde_json::from_str(
        &fs::read_to_string(path)
            .with_context(|| format!("Failed to read input: {}", path.display()))?,
    )?;

    let width = input_json["width"]
        .as_u64()
        .context("Input must have a 'width' number")? as usize;
    let height = input_json["height"]
        .as_u64()
        .context("Input must have a 'height' number")? as usize;
    let data: Vec<u8> = input_json["data"]
        .as_array()
        .context("Input must have a 'data' array")?
        .iter()
        .map(|v| v.as_u64().unwrap_or(0) as u8)
        .collect();

    Ok(Image::from_rgba8(width, height, data)?)
}

fn main() -> Result<()> {
    // Initialize logging
    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .init();

    let cli = Cli::parse_args();

    match cli.command {
        Commands::Infer {
            proto,
            model,
            device,
            input,
            format,
            config,
            library,
        } => {
            // Load optional config; the --library flag wins over it.
            let config = if let Some(config_path) = config {
                Config::from_yaml_file(&config_path)
                    .with_context(|| format!("Failed to load config: {}", config_path.display()))?
            } else {
                Config::default()
            };
            let library_path = library.or_else(|| config.library.path.map(PathBuf::from));

            info!("Loading wrapper library");
            let native = load_library(library_path.as_ref())?;

            let mut session = TnnSession::new(native);
            info!(
                "Initializing engine: {} + {} on {}",
                proto.display(),
                model.display(),
                device
            );
            session.init(&proto, &model, &device)?;

            info!("Loading input: {}", input.display());
            let image = read_image(&input)?;

            info!("Running inference...");
            let values = session.forward(&image)?;
            info!("Inference complete: {} output values", values.len());

            session.deinit()?;

            let output = serde_json::json!({
                "len": values.len(),
                "values": values,
            });

            if format == "pretty" {
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                println!("{}", serde_json::to_string(&output)?);
            }
        }

        Commands::Check { library } => {
            match load_library(library.as_ref()) {
                Ok(_) => {
                    println!("Status: OK (library loaded, all entry points resolved)");
                }
                Err(e) => {
                    eprintln!("Library check failed: {}", e);
                    std::process::exit(1);
                }
            }
        }

        Commands::Info {
            proto,
            model,
            device,
            library,
        } => {
            println!("tnnlib v{}", env!("CARGO_PKG_VERSION"));
            println!("library name: {}", LIB_NAME);
            println!();
            println!("Proto: {}", proto.display());
            println!("Model: {}", model.display());
            println!("Device: {}", device);

            let native = load_library(library.as_ref())?;
            let mut session = TnnSession::new(native);

            info!("Initializing engine...");
            session.init(&proto, &model, &device)?;
            println!("Status: OK (engine initialized)");
            session.deinit()?;
        }
    }

    Ok(())
}
