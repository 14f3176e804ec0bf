use anyhow::Context;
use std::path::{Path, PathBuf};

pub const DEFAULT_PACMAN_CONF: &str = "/etc/pacman.conf";
pub const DEFAULT_ROOT_DIR: &str = "/";
pub const DEFAULT_DB_PATH: &str = "/var/lib/pacman";
pub const DEFAULT_AUR_URL: &str = "https://aur.archlinux.org";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub download_dir: Option<PathBuf>,
    pub pacman_conf: PathBuf,
    pub aur_url: String,
    pub verbose: u8,
    pub quiet: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            download_dir: None,
            pacman_conf: DEFAULT_PACMAN_CONF.into(),
            aur_url: DEFAULT_AUR_URL.into(),
            verbose: 0,
            quiet: false,
        }
    }
}

impl Config {
    /// Directory snapshots are unpacked into: the configured target, or the
    /// current directory.
    pub fn download_dir(&self) -> anyhow::Result<PathBuf> {
        match &self.download_dir {
            Some(dir) => dir
                .canonicalize()
                .with_context(|| format!("Invalid download directory {}", dir.display())),
            None => std::env::current_dir().context("Failed to read current directory"),
        }
    }

    pub fn log_level(&self) -> log::LevelFilter {
        if self.quiet {
            return log::LevelFilter::Warn;
        }
        match self.verbose {
            0 => log::LevelFilter::Info,
            1 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    }
}

/// The parts of pacman.conf needed to find the package databases.
#[derive(Debug, Clone, PartialEq)]
pub struct PacmanConfig {
    pub root_dir: PathBuf,
    pub db_path: PathBuf,
    /// Sync repositories in the order they are declared.
    pub repos: Vec<String>,
}

impl Default for PacmanConfig {
    fn default() -> Self {
        Self {
            root_dir: DEFAULT_ROOT_DIR.into(),
            db_path: DEFAULT_DB_PATH.into(),
            repos: Vec::new(),
        }
    }
}

impl PacmanConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("Could not read pacman config {}", path.display()))?;
        Ok(Self::parse(&data))
    }

    /// Falls back to the defaults, without repositories, when the file is
    /// missing.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::from_file(path) {
            Ok(conf) => conf,
            Err(e) => {
                log::warn!("{:#}", e);
                Self::default()
            }
        }
    }

    pub fn parse(data: &str) -> Self {
        let mut conf = Self::default();

        for line in data.lines() {
            let line = match line.split_once('#') {
                Some((content, _)) => content.trim(),
                None => line.trim(),
            };
            if line.is_empty() {
                continue;
            }

            if let Some(section) = line.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
                let section = section.trim();
                if section != "options" && !conf.repos.iter().any(|r| r == section) {
                    conf.repos.push(section.to_string());
                }
                continue;
            }

            if let Some((key, value)) = line.split_once('=') {
                match key.trim() {
                    "RootDir" => conf.root_dir = value.trim().into(),
                    "DBPath" => conf.db_path = value.trim().into(),
                    _ => {}
                }
            }
        }

        log::debug!("Registered sync repositories: {:?}", conf.repos);
        conf
    }

    pub fn local_db_dir(&self) -> PathBuf {
        self.db_path.join("local")
    }

    pub fn sync_db_path(&self, repo: &str) -> PathBuf {
        self.db_path.join("sync").join(format!("{}.db", repo))
    }
}
