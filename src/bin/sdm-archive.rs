//! sdm-archive CLI
//!
//! Command-line interface for sparse distributed memory archives.
//!
//! Provides commands for:
//! - Ingesting files/directories into a bundle
//! - Reconstructing files from a bundle
//! - Listing bundle contents
//! - Inspecting bundle parameters

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use sdm_archive::bundle::reader;
use sdm_archive::{Bundle, SdmArchive, SdmConfig, SdmResult, TieBreak};

/// Format bytes as human-readable size
fn format_bytes(bytes: usize) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit_idx = 0;

    while size >= 1024.0 && unit_idx < UNITS.len() - 1 {
        size /= 1024.0;
        unit_idx += 1;
    }

    if unit_idx == 0 {
        format!("{} {}", bytes, UNITS[unit_idx])
    } else {
        format!("{:.2} {}", size, UNITS[unit_idx])
    }
}

/// Logical name for a single-file input
fn logical_name_for(path: &Path) -> String {
    path.file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("input.bin")
        .to_string()
}

/// Bundles ending in .json use the JSON encoding, anything else bincode.
fn is_json_bundle(path: &Path) -> bool {
    path.extension().map(|e| e == "json").unwrap_or(false)
}

fn save_bundle(bundle: &Bundle, path: &Path) -> SdmResult<()> {
    if is_json_bundle(path) {
        bundle.save_json(path)
    } else {
        bundle.save_binary(path)
    }
}

fn load_bundle(path: &Path) -> SdmResult<Bundle> {
    if is_json_bundle(path) {
        Bundle::load_json(path)
    } else {
        Bundle::load_binary(path)
    }
}

#[derive(Parser)]
#[command(name = "sdm-archive")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Sparse distributed memory archive operations")]
#[command(long_about = "sdm-archive - Sparse Distributed Memory archive CLI\n\n\
    Stores files as superimposed bit chunks across a fixed set of pseudorandom\n\
    hard locations, then serializes the whole memory plus a file index into a\n\
    self-describing bundle. Reconstruction re-derives the address space from\n\
    the bundle's seed alone.\n\n\
    Examples:\n\
      sdm-archive ingest -i ./data -b data.bundle.json\n\
      sdm-archive extract -b data.bundle.json -o ./restored\n\
      sdm-archive list -b data.bundle.json\n\
      sdm-archive info -b data.bundle.json")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest files and/or directories into a bundle
    Ingest {
        /// Input path(s): files or directories
        #[arg(short, long, required = true, num_args = 1..)]
        input: Vec<PathBuf>,

        /// Output bundle path (.json for JSON, anything else for binary)
        #[arg(short, long)]
        bundle: PathBuf,

        /// Number of hard locations
        #[arg(short = 'p', long, default_value_t = 2048)]
        addresses: usize,

        /// Vector length and chunk size in bits
        #[arg(short = 'n', long, default_value_t = 256)]
        dim: usize,

        /// Address-space seed
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Neighborhood radius as a fraction of the vector length
        #[arg(long, default_value_t = 0.451)]
        radius: f64,

        /// Print per-file progress
        #[arg(short, long)]
        verbose: bool,
    },

    /// Reconstruct files from a bundle
    Extract {
        /// Bundle path
        #[arg(short, long)]
        bundle: PathBuf,

        /// Output directory
        #[arg(short, long)]
        output: PathBuf,

        /// Reconstruct only this file (default: all files)
        name: Option<String>,
    },

    /// List the files a bundle can reconstruct
    List {
        /// Bundle path
        #[arg(short, long)]
        bundle: PathBuf,
    },

    /// Show bundle parameters
    Info {
        /// Bundle path
        #[arg(short, long)]
        bundle: PathBuf,
    },
}

fn cmd_ingest(
    inputs: &[PathBuf],
    bundle_path: &Path,
    addresses: usize,
    dim: usize,
    seed: u64,
    radius: f64,
    verbose: bool,
) -> SdmResult<()> {
    let config = SdmConfig {
        addresses,
        dim,
        seed,
        radius_fraction: radius,
        tie_break: TieBreak::Zero,
        ..Default::default()
    };
    let mut archive = SdmArchive::new(config)?;

    let mut ingested = 0usize;
    for input in inputs {
        if input.is_dir() {
            ingested += archive.ingest_directory(input, verbose)?;
        } else {
            let logical = logical_name_for(input);
            match archive.ingest_file(input, &logical, verbose) {
                Ok(()) => ingested += 1,
                Err(e) => eprintln!("Skipping {}: {}", input.display(), e),
            }
        }
    }

    if ingested == 0 {
        eprintln!("No files ingested; not writing a bundle.");
        return Ok(());
    }

    let bundle = archive.to_bundle()?;
    save_bundle(&bundle, bundle_path)?;
    println!(
        "Wrote {} ({} files, {} locations x {} bits)",
        bundle_path.display(),
        bundle.files.len(),
        bundle.addresses,
        bundle.dim
    );
    Ok(())
}

fn cmd_extract(bundle_path: &Path, output: &Path, name: Option<&str>) -> SdmResult<()> {
    let bundle = load_bundle(bundle_path)?;
    let memory = reader::rebuild_memory(&bundle)?;

    let names: Vec<String> = match name {
        Some(n) => vec![n.to_string()],
        None => bundle.file_names().map(|s| s.to_string()).collect(),
    };

    for file_name in &names {
        let data = reader::reconstruct_with(&bundle, &memory, file_name)?;
        let out_path = output.join(file_name);
        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&out_path, &data)?;
        println!("Reconstructed {} ({})", out_path.display(), format_bytes(data.len()));
    }
    Ok(())
}

fn cmd_list(bundle_path: &Path) -> SdmResult<()> {
    let bundle = load_bundle(bundle_path)?;
    for (name, record) in &bundle.files {
        println!(
            "{}  {} chunks  {}",
            name,
            record.chunk_keys.len(),
            format_bytes(record.byte_len())
        );
    }
    Ok(())
}

fn cmd_info(bundle_path: &Path) -> SdmResult<()> {
    let bundle = load_bundle(bundle_path)?;
    let total_bits: usize = bundle.files.values().map(|r| r.bit_len).sum();
    println!("Bundle:       {}", bundle_path.display());
    println!("Format:       v{} / {}", bundle.version, bundle.strategy);
    println!("Locations:    {}", bundle.addresses);
    println!("Vector bits:  {}", bundle.dim);
    println!("Radius:       {}", bundle.radius);
    println!("Chunk size:   {} bits", bundle.chunk_size);
    println!("Seed:         {}", bundle.seed);
    println!("Files:        {}", bundle.files.len());
    println!("Payload:      {}", format_bytes(total_bits / 8));
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match &cli.command {
        Commands::Ingest {
            input,
            bundle,
            addresses,
            dim,
            seed,
            radius,
            verbose,
        } => cmd_ingest(input, bundle, *addresses, *dim, *seed, *radius, *verbose),
        Commands::Extract {
            bundle,
            output,
            name,
        } => cmd_extract(bundle, output, name.as_deref()),
        Commands::List { bundle } => cmd_list(bundle),
        Commands::Info { bundle } => cmd_info(bundle),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
