//! Entry points behind each command.
//!
//! `run` downloads one catalog chosen by the operator and records finished
//! albums in the completion log. `batch` goes through every catalog without
//! asking, judges completion by looking at the album folders and clears the
//! downloader cache at the end. `catalog` writes a new catalog file from a
//! Spotify search.

use crate::api_client::{fetch_catalog, SpotifyClient, SpotifyError};
use crate::configuration::{get_configuration, ConfigFolder, Settings};
use crate::error::{AppError, Result};
use crate::foundation::catalog::{list_catalog_files, load_catalog, select_catalog, Catalog};
use crate::foundation::tracker::{CompletionLog, CompletionTracker, FolderPresence};
use crate::foundation::utils::sanitize_folder_name;
use crate::process::{
    build_tasks, clean_cache_best_effort, run_tasks, BatchSummary, Downloader, ExternalDownloader,
};
use anyhow::Context;
use std::path::{Path, PathBuf};
use std::{env, fs, io};
use tracing::{error, info};

pub fn load_settings(cfg_folder: &ConfigFolder) -> anyhow::Result<Settings> {
    if !cfg_folder.config_file.exists() {
        println!(
            "\x1b[33mNo configuration found at {}, using defaults. Run 'albumfetch config' to create one.\x1b[0m",
            cfg_folder.config_file.display()
        );
    }

    get_configuration(&cfg_folder.config_file).with_context(|| {
        format!(
            "Unable to load configuration from {}",
            cfg_folder.config_file.display()
        )
    })
}

/// Interactive run: pick one catalog, skip albums already in the completion log.
pub fn run(cfg_folder: ConfigFolder) -> anyhow::Result<()> {
    let settings = load_settings(&cfg_folder)?;

    fs::create_dir_all(&settings.download_root).with_context(|| {
        format!("Unable to create {}", settings.download_root.display())
    })?;
    let log = CompletionLog::open(&settings.completion_log)?;

    let catalog_path = match choose_catalog(&settings.data_dir) {
        Ok(path) => path,
        Err(e @ (AppError::NoCatalogs(_) | AppError::SelectionError(_))) => {
            eprintln!("\x1b[1m\x1b[31m{}. Exiting...\x1b[0m", e);
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let catalog = load_catalog(&catalog_path)?;
    let downloader = ExternalDownloader::new(settings.downloader.clone());

    let summary = process_catalog(&catalog, &settings, &log, &downloader)?;
    print_summary(&summary);
    println!("\n\x1b[1m\x1b[32mAll downloads finished!\x1b[0m");

    Ok(())
}

fn choose_catalog(data_dir: &Path) -> Result<PathBuf> {
    let files = list_catalog_files(data_dir)?;
    let stdin = io::stdin();
    select_catalog(&files, stdin.lock(), io::stdout())
}

/// Unattended run over every catalog file; a non-empty album folder counts as downloaded.
pub fn run_batch(cfg_folder: ConfigFolder) -> anyhow::Result<()> {
    let settings = load_settings(&cfg_folder)?;

    let files = match list_catalog_files(&settings.data_dir) {
        Ok(files) => files,
        Err(e @ AppError::NoCatalogs(_)) => {
            eprintln!("\x1b[1m\x1b[31m{}. Exiting...\x1b[0m", e);
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    fs::create_dir_all(&settings.download_root).with_context(|| {
        format!("Unable to create {}", settings.download_root.display())
    })?;

    let downloader = ExternalDownloader::new(settings.downloader.clone())
        .with_cache_dir(absolute(&settings.cache_dir)?);

    let mut succeeded = 0;
    let mut failed = 0;

    for file in &files {
        let catalog = match load_catalog(file) {
            Ok(catalog) => catalog,
            Err(e) => {
                eprintln!("\x1b[31m{}\x1b[0m", e);
                continue;
            }
        };

        println!("\x1b[1m\x1b[34mProcessing {}...\x1b[0m", catalog.artist_name);
        let summary = match process_catalog(&catalog, &settings, &FolderPresence, &downloader) {
            Ok(summary) => summary,
            Err(e) => {
                error!(artist = %catalog.artist_name, error = %e, "catalog skipped");
                eprintln!("\x1b[31mSkipping {}: {}\x1b[0m", catalog.artist_name, e);
                continue;
            }
        };
        print_summary(&summary);

        succeeded += summary.succeeded();
        failed += summary.failed().len();
    }

    clean_cache_best_effort(&settings.cache_dir);

    println!(
        "\n\x1b[1m\x1b[32mAll downloads finished! {} succeeded, {} failed.\x1b[0m",
        succeeded, failed
    );
    Ok(())
}

/// The downloader runs inside each album folder, so a relative cache path would
/// land in a different place for every album.
fn absolute(path: &Path) -> io::Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(env::current_dir()?.join(path))
    }
}

/// Schedules and downloads every pending album of one catalog.
pub fn process_catalog(
    catalog: &Catalog,
    settings: &Settings,
    tracker: &dyn CompletionTracker,
    downloader: &dyn Downloader,
) -> Result<BatchSummary> {
    let tasks = build_tasks(catalog, &settings.download_root, tracker)?;
    info!(artist = %catalog.artist_name, pending = tasks.len(), "tasks built");

    if tasks.is_empty() {
        println!(
            "\x1b[32mNothing to download for {}. Everything is up-to-date!\x1b[0m",
            catalog.artist_name
        );
        return Ok(BatchSummary::default());
    }

    run_tasks(tasks, settings.worker_count, downloader, tracker)
}

fn print_summary(summary: &BatchSummary) {
    if summary.is_empty() {
        return;
    }

    println!(
        "\x1b[34m{} album(s) downloaded, {} failed.\x1b[0m",
        summary.succeeded(),
        summary.failed().len()
    );
    for (task, reason) in summary.failed() {
        eprintln!("\x1b[31m  {}: {}\x1b[0m", task.label(), reason);
    }
}

/// Builds a catalog file from a Spotify search and stores it in the data directory.
pub async fn create_catalog(cfg_folder: ConfigFolder, query: &str) -> anyhow::Result<()> {
    let settings = load_settings(&cfg_folder)?;

    let client_id = credential(settings.spotify.client_id.as_deref(), "SPOTIFY_CLIENT_ID");
    let client_secret = credential(
        settings.spotify.client_secret.as_deref(),
        "SPOTIFY_CLIENT_SECRET",
    );
    let (Some(client_id), Some(client_secret)) = (client_id, client_secret) else {
        return Err(SpotifyError::MissingCredentials.into());
    };

    let client = SpotifyClient::authenticate(&client_id, &client_secret).await?;
    let catalog = match fetch_catalog(&client, query).await {
        Ok(catalog) => catalog,
        Err(e @ (SpotifyError::EmptyQuery | SpotifyError::NoResults(_))) => {
            eprintln!("\x1b[1m\x1b[31m{}. Exiting...\x1b[0m", e);
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let json = serde_json::to_string_pretty(&catalog)?;
    println!("{json}");

    let path = write_catalog(&settings.data_dir, &catalog)?;
    println!(
        "\x1b[32mCatalog with {} album(s) saved to {}\x1b[0m",
        catalog.albums.len(),
        path.display()
    );
    Ok(())
}

fn credential(configured: Option<&str>, env_var: &str) -> Option<String> {
    configured
        .filter(|value| !value.trim().is_empty())
        .map(str::to_string)
        .or_else(|| env::var(env_var).ok())
        .filter(|value| !value.trim().is_empty())
}

/// Writes `catalog` as `<data_dir>/<artist>.json`, replacing an older file for the same artist.
pub fn write_catalog(data_dir: &Path, catalog: &Catalog) -> Result<PathBuf> {
    fs::create_dir_all(data_dir)?;
    let path = data_dir.join(format!("{}.json", sanitize_folder_name(&catalog.artist_name)));
    fs::write(&path, serde_json::to_string_pretty(catalog)?)?;
    Ok(path)
}
