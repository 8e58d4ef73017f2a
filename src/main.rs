use albumfetch::configuration::{create_config, ConfigFolder};
use albumfetch::startup::{create_catalog, run, run_batch};
use clap::{Arg, ArgMatches, Command};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("albumfetch=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Command::new("albumfetch")
        .about("🎵 Download artist catalogs album by album 🎵")
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("FILE")
                .global(true)
                .value_parser(clap::value_parser!(PathBuf))
                .help("Configuration file to use instead of ~/.albumfetch/config.yaml"),
        )
        .subcommand(
            Command::new("run")
                .about("🚀 Choose one catalog and download the albums not yet in the completion log"),
        )
        .subcommand(
            Command::new("batch")
                .about("📦 Download every catalog, skipping albums whose folder is not empty"),
        )
        .subcommand(
            Command::new("catalog")
                .about("🔎 Create a catalog file from a Spotify artist or album search")
                .arg(Arg::new("query").required(true).num_args(1..)),
        )
        .subcommand(
            Command::new("config").about("🛠️ Create or update configuration file for albumfetch"),
        )
        .get_matches();

    let cfg_folder = config_folder(&args);

    match args.subcommand() {
        Some(("run", _)) => {
            println!("\x1b[1m\x1b[34mStarting downloads...\x1b[0m");
            run(cfg_folder)?;
            Ok(())
        }
        Some(("batch", _)) => {
            println!("\x1b[1m\x1b[34mStarting batch downloads...\x1b[0m");
            run_batch(cfg_folder)?;
            Ok(())
        }
        Some(("catalog", sub)) => {
            let query = sub
                .get_many::<String>("query")
                .map(|words| words.cloned().collect::<Vec<_>>().join(" "))
                .unwrap_or_default();
            println!("\x1b[1m\x1b[34mSearching Spotify for '{}'...\x1b[0m", query);
            create_catalog(cfg_folder, &query).await?;
            Ok(())
        }
        Some(("config", _)) => {
            println!("\x1b[1m\x1b[34mConfiguring albumfetch...\x1b[0m");
            create_config(cfg_folder)
        }
        _ => {
            print_usage();
            Ok(())
        }
    }
}

fn config_folder(args: &ArgMatches) -> ConfigFolder {
    match args.get_one::<PathBuf>("config") {
        Some(file) => ConfigFolder::with_file(file),
        None => ConfigFolder::new(),
    }
}

fn print_usage() {
    println!("\x1b[1m\x1b[31mInvalid command!\x1b[0m\n");
    println!("📖 Available Commands:");
    println!("  \x1b[1m\x1b[32malbumfetch run\x1b[0m             - 🚀 Pick a catalog and download it");
    println!("  \x1b[1m\x1b[32malbumfetch batch\x1b[0m           - 📦 Download every catalog unattended");
    println!("  \x1b[1m\x1b[32malbumfetch catalog <QUERY>\x1b[0m - 🔎 Build a catalog from Spotify");
    println!("  \x1b[1m\x1b[32malbumfetch config\x1b[0m          - 🛠️  Create or update configuration file");
    println!("\x1b[33mPut catalog files in the data directory, then run or batch them!\x1b[0m\n");
}
