use config::{ConfigError, Environment, File, FileFormat};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::{env, fs, io};

#[derive(Deserialize, Debug, Clone)]
pub struct Settings {
    /// Directory holding one catalog JSON file per artist.
    pub data_dir: PathBuf,
    pub download_root: PathBuf,
    pub completion_log: PathBuf,
    /// Scratch directory shared by every downloader process in batch mode.
    pub cache_dir: PathBuf,
    pub worker_count: usize,
    pub downloader: DownloaderSettings,
    #[serde(default)]
    pub spotify: SpotifySettings,
}

/// How the external downloader is started: `program args... <url> [cache_flag <cache_dir>]`.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct DownloaderSettings {
    pub program: String,
    pub args: Vec<String>,
    pub cache_flag: String,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct SpotifySettings {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
}

impl Default for DownloaderSettings {
    fn default() -> Self {
        Self {
            program: "python3".to_string(),
            args: vec!["-m".to_string(), "spotdl".to_string()],
            cache_flag: "--cache-dir".to_string(),
        }
    }
}

/// Loads settings from built-in defaults, the optional YAML file and `ALBUMFETCH_*` variables.
///
/// Later sources win. Nested keys use a double underscore in the environment,
/// e.g. `ALBUMFETCH_DOWNLOADER__PROGRAM=python`.
pub fn get_configuration(cfg_file: &Path) -> Result<Settings, ConfigError> {
    let defaults = DownloaderSettings::default();

    let settings = config::Config::builder()
        .set_default("data_dir", "data")?
        .set_default("download_root", "downloads")?
        .set_default("completion_log", "downloaded_log.json")?
        .set_default("cache_dir", ".spotdl-cache")?
        .set_default("worker_count", 4_i64)?
        .set_default("downloader.program", defaults.program)?
        .set_default("downloader.args", defaults.args)?
        .set_default("downloader.cache_flag", defaults.cache_flag)?
        .add_source(
            File::from(cfg_file.to_path_buf())
                .format(FileFormat::Yaml)
                .required(false),
        )
        .add_source(
            Environment::with_prefix("ALBUMFETCH")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let settings = settings.try_deserialize::<Settings>()?;
    validate(&settings)?;
    Ok(settings)
}

fn validate(settings: &Settings) -> Result<(), ConfigError> {
    if settings.worker_count == 0 {
        return Err(ConfigError::Message(
            "worker_count must be at least 1".to_string(),
        ));
    }
    if settings.downloader.program.trim().is_empty() {
        return Err(ConfigError::Message(
            "downloader.program must not be empty".to_string(),
        ));
    }
    Ok(())
}

pub struct ConfigFolder {
    pub config_dir: PathBuf,
    pub config_file: PathBuf,
}

impl ConfigFolder {
    pub fn new() -> Self {
        let home_dir = env::var("HOME")
            .or_else(|_| env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string());

        Self::in_home(Path::new(&home_dir))
    }

    pub fn in_home(home_dir: &Path) -> Self {
        let config_dir = home_dir.join(".albumfetch");
        Self {
            config_file: config_dir.join("config.yaml"),
            config_dir,
        }
    }

    /// Uses an explicit config file instead of the one under the home directory.
    pub fn with_file(config_file: &Path) -> Self {
        let config_dir = config_file
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Self {
            config_dir,
            config_file: config_file.to_path_buf(),
        }
    }
}

impl Default for ConfigFolder {
    fn default() -> Self {
        Self::new()
    }
}

pub fn create_config(cfg_folder: ConfigFolder) -> Result<(), Box<dyn std::error::Error>> {
    println!("\x1b[1m\x1b[32mCreating configuration...\x1b[0m");

    if cfg_folder.config_file.exists() && !confirm_overwrite()? {
        println!("\x1b[33mOperation cancelled.\x1b[0m");
        return Ok(());
    }

    write_template(&cfg_folder)?;

    println!("\x1b[32mConfiguration file created at:");
    println!("  -> {}", cfg_folder.config_file.display());
    println!("\x1b[0mPlease edit the configuration file with your specific settings.");

    Ok(())
}

fn write_template(cfg_folder: &ConfigFolder) -> io::Result<()> {
    fs::create_dir_all(&cfg_folder.config_dir)?;
    fs::write(&cfg_folder.config_file, include_str!("config_template.yaml"))
}

fn confirm_overwrite() -> Result<bool, io::Error> {
    println!("\x1b[31mThe configuration file already exists.");
    println!("Do you want to overwrite it? Your current settings will be lost. (y/N)\x1b[0m");

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    Ok(input.trim().eq_ignore_ascii_case("y"))
}
