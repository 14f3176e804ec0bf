use crate::extract::extract_snapshot;
use aurdeps::{AurPackage, RemoteIndex};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const RPC_VERSION: &str = "5";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryType {
    Info,
    Search,
}

impl QueryType {
    fn as_str(self) -> &'static str {
        match self {
            QueryType::Info => "info",
            QueryType::Search => "search",
        }
    }
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    results: Vec<AurPackage>,
}

fn parse_response(body: &str) -> anyhow::Result<Vec<AurPackage>> {
    let response: RpcResponse = serde_json::from_str(body)?;
    if response.kind == "error" {
        anyhow::bail!(
            "AUR RPC error: {}",
            response.error.unwrap_or_else(|| "unknown error".into())
        );
    }
    Ok(response.results)
}

/// Client for the AUR RPC interface and its snapshot/cgit endpoints.
pub struct AurClient {
    base_url: String,
}

impl AurClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn query(&self, kind: QueryType, arg: &str) -> anyhow::Result<Vec<AurPackage>> {
        let url = format!("{}/rpc/", self.base_url);
        log::debug!("RPC {} query for {}", kind.as_str(), arg);

        let arg_key = match kind {
            QueryType::Info => "arg[]",
            QueryType::Search => "arg",
        };
        let body = ureq::get(&url)
            .query("v", RPC_VERSION)
            .query("type", kind.as_str())
            .query(arg_key, arg)
            .call()?
            .into_body()
            .read_to_string()?;

        parse_response(&body)
    }

    pub fn info(&self, name: &str) -> anyhow::Result<Vec<AurPackage>> {
        self.query(QueryType::Info, name)
    }

    pub fn search(&self, term: &str) -> anyhow::Result<Vec<AurPackage>> {
        self.query(QueryType::Search, term)
    }

    pub fn snapshot_url(&self, pkg: &AurPackage) -> String {
        match &pkg.url_path {
            Some(path) => format!("{}{}", self.base_url, path),
            None => format!("{}/cgit/aur.git/snapshot/{}.tar.gz", self.base_url, pkg.base()),
        }
    }

    pub fn pkgbuild_url(&self, pkg: &AurPackage) -> String {
        format!("{}/cgit/aur.git/plain/PKGBUILD?h={}", self.base_url, pkg.base())
    }

    pub fn fetch_pkgbuild(&self, pkg: &AurPackage) -> anyhow::Result<String> {
        let url = self.pkgbuild_url(pkg);
        log::debug!("Fetching {}", url);
        Ok(ureq::get(&url).call()?.into_body().read_to_string()?)
    }

    /// Downloads and unpacks the snapshot of `pkg` into `dest`, returning the
    /// directory holding its PKGBUILD.
    pub fn download(&self, pkg: &AurPackage, dest: &Path) -> anyhow::Result<PathBuf> {
        let url = self.snapshot_url(pkg);
        log::info!("Downloading {}...", pkg.name);
        log::debug!("Fetching {}", url);

        let rsp = ureq::get(&url).call()?;
        let reader = rsp.into_body().into_reader();
        let files = extract_snapshot(reader, dest)?;
        log::debug!("Extracted {} entries for {}", files.len(), pkg.name);

        Ok(dest.join(pkg.base()))
    }
}

impl RemoteIndex for AurClient {
    fn query_info(&self, name: &str) -> anyhow::Result<Vec<AurPackage>> {
        self.info(name)
    }

    fn fetch_archive(&self, pkg: &AurPackage, dest: &Path) -> anyhow::Result<()> {
        self.download(pkg, dest).map(|_| ())
    }
}
