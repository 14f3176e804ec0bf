use crate::config::PacmanConfig;
use anyhow::Context;
use flate2::read::GzDecoder;
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use xz2::read::XzDecoder;
use zstd::stream::read::Decoder as ZstdDecoder;

const GZIP_MAGIC: &[u8] = &[0x1f, 0x8b];
const XZ_MAGIC: &[u8] = &[0xfd, b'7', b'z', b'X', b'Z', 0x00];
const ZSTD_MAGIC: &[u8] = &[0x28, 0xb5, 0x2f, 0xfd];

/// Value of a `%FIELD%` block in a pacman `desc` file.
fn desc_field<'a>(desc: &'a str, field: &str) -> Option<&'a str> {
    let mut lines = desc.lines();
    lines.find(|line| line.trim() == field)?;
    lines.next().map(str::trim).filter(|v| !v.is_empty())
}

/// Packages installed on the system, read from `<DBPath>/local/*/desc`.
#[derive(Debug, Default)]
pub struct LocalIndex {
    packages: HashMap<String, String>,
}

impl LocalIndex {
    pub fn open(dir: &Path) -> anyhow::Result<Self> {
        let mut packages = HashMap::new();

        if !dir.is_dir() {
            log::warn!("Local database {} not found", dir.display());
            return Ok(Self { packages });
        }

        let entries = std::fs::read_dir(dir)
            .with_context(|| format!("Failed to read local database {}", dir.display()))?;
        for entry in entries {
            let desc_path = entry?.path().join("desc");
            let Ok(desc) = std::fs::read_to_string(&desc_path) else {
                continue;
            };
            if let Some(name) = desc_field(&desc, "%NAME%") {
                let version = desc_field(&desc, "%VERSION%").unwrap_or_default();
                packages.insert(name.to_string(), version.to_string());
            }
        }

        log::debug!("Loaded {} installed packages", packages.len());
        Ok(Self { packages })
    }

    pub fn version(&self, name: &str) -> Option<&str> {
        self.packages.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.packages.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

impl aurdeps::LocalDb for LocalIndex {
    fn is_installed(&self, name: &str) -> bool {
        self.packages.contains_key(name)
    }
}

/// Package names of one sync repository.
#[derive(Debug)]
pub struct SyncIndex {
    name: String,
    packages: HashSet<String>,
}

impl SyncIndex {
    pub fn from_file(name: &str, path: &Path) -> anyhow::Result<Self> {
        let mut file = File::open(path)
            .with_context(|| format!("Failed to open sync database {}", path.display()))?;

        let mut magic = [0u8; 6];
        let read = file.read(&mut magic)?;
        let magic = &magic[..read];
        let file = File::open(path)?;

        let reader: Box<dyn Read> = if magic.starts_with(GZIP_MAGIC) {
            Box::new(GzDecoder::new(file))
        } else if magic.starts_with(XZ_MAGIC) {
            Box::new(XzDecoder::new(file))
        } else if magic.starts_with(ZSTD_MAGIC) {
            Box::new(ZstdDecoder::new(file)?)
        } else {
            Box::new(file)
        };

        Self::parse(name, BufReader::new(reader))
            .with_context(|| format!("Failed to parse sync database {}", path.display()))
    }

    fn parse<R: Read>(name: &str, reader: R) -> anyhow::Result<Self> {
        let mut archive = tar::Archive::new(reader);
        let mut packages = HashSet::new();

        for entry in archive.entries()? {
            let mut entry = entry?;
            let is_desc = entry.path()?.file_name().is_some_and(|f| f == "desc");
            if !is_desc {
                continue;
            }

            let mut desc = String::new();
            entry.read_to_string(&mut desc)?;
            if let Some(pkgname) = desc_field(&desc, "%NAME%") {
                packages.insert(pkgname.to_string());
            }
        }

        log::debug!("Parsed {} packages from {}", packages.len(), name);
        Ok(Self {
            name: name.to_string(),
            packages,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn contains(&self, pkgname: &str) -> bool {
        self.packages.contains(pkgname)
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

/// Every sync repository registered in pacman.conf, in declaration order.
#[derive(Debug, Default)]
pub struct SyncRepos {
    dbs: Vec<SyncIndex>,
}

impl SyncRepos {
    pub fn new(dbs: Vec<SyncIndex>) -> Self {
        Self { dbs }
    }

    /// Opens each configured repository. Repositories without a database
    /// file (never synced) are skipped with a warning.
    pub fn open(conf: &PacmanConfig) -> anyhow::Result<Self> {
        let mut dbs = Vec::with_capacity(conf.repos.len());

        for repo in &conf.repos {
            let path = conf.sync_db_path(repo);
            if !path.exists() {
                log::warn!("Database for {} not found at {}", repo, path.display());
                continue;
            }
            dbs.push(SyncIndex::from_file(repo, &path)?);
        }

        Ok(Self { dbs })
    }

    pub fn find(&self, pkgname: &str) -> Option<&SyncIndex> {
        self.dbs.iter().find(|db| db.contains(pkgname))
    }

    pub fn iter(&self) -> impl Iterator<Item = &SyncIndex> {
        self.dbs.iter()
    }
}

impl aurdeps::SyncDbs for SyncRepos {
    fn find_repo(&self, name: &str) -> Option<String> {
        self.find(name).map(|db| db.name().to_string())
    }
}

/// Installed packages that no sync repository provides, sorted by name.
pub fn query_foreign<'a>(local: &'a LocalIndex, repos: &SyncRepos) -> Vec<(&'a str, &'a str)> {
    let mut foreign: Vec<(&str, &str)> = local
        .iter()
        .filter(|(name, _)| repos.find(name).is_none())
        .collect();
    foreign.sort_unstable();
    foreign
}
