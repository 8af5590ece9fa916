mod archive;
mod config;
mod export;
mod links;
mod model;
mod modinfo;
mod scan;
mod source_mod;
mod util;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

use std::path::PathBuf;

use clap::Parser;
use colored::Colorize;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Writes a modlist.json describing the Vintage Story mods in a folder
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Config file holding the mods folder under [ModPath] path
    #[arg(short, long, default_value = config::DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Where to write the mod list
    #[arg(short, long, default_value = export::DEFAULT_OUTPUT_FILE)]
    output: PathBuf,

    /// Mods folder to scan. Skips the config file.
    #[arg(short, long)]
    mods_dir: Option<PathBuf>,
}

fn run(args: Args) -> Result<()> {
    let mod_dir = match args.mods_dir {
        Some(dir) => dir,
        None => util::resolve_mod_dir(&args.config),
    };
    println!("Scanning mods in: {}", mod_dir.display().to_string().bold());

    let report = scan::scan_mod_dir(&mod_dir)?;
    let list = export::write_mod_list(report.mods, &args.output)?;
    export::print_summary(&list, &report.skipped, &args.output);
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
    info!("Starting vs-modlist version {}", env!("CARGO_PKG_VERSION"));
    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}
