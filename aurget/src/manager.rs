use crate::aur::AurClient;
use crate::config::{Config, PacmanConfig};
use crate::index::{query_foreign, LocalIndex, SyncRepos};
use aurdeps::{merge_sorted_dedup, populate_typed_dependencies, AurPackage, DepList, Resolver};
use std::path::PathBuf;

/// Owns the configuration and every database handle for one run.
pub struct Helper {
    config: Config,
    local: LocalIndex,
    repos: SyncRepos,
    aur: AurClient,
}

impl Helper {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let pacman = PacmanConfig::load_or_default(&config.pacman_conf);
        let local = LocalIndex::open(&pacman.local_db_dir())?;
        let repos = SyncRepos::open(&pacman)?;
        let aur = AurClient::new(config.aur_url.clone());

        Ok(Self::with_parts(config, local, repos, aur))
    }

    pub fn with_parts(config: Config, local: LocalIndex, repos: SyncRepos, aur: AurClient) -> Self {
        Self {
            config,
            local,
            repos,
            aur,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn resolver(&self, workdir: PathBuf) -> Resolver<'_> {
        Resolver::new(&self.local, &self.repos, &self.aur, workdir)
    }

    /// Downloads each target's snapshot and, with `with_deps`, the AUR
    /// dependencies declared in its PKGBUILD. Failures are reported per
    /// target; the number of failed targets is returned.
    pub fn download(&self, targets: &[String], with_deps: bool) -> anyhow::Result<usize> {
        let dest = self.config.download_dir()?;
        let resolver = self.resolver(dest.clone());
        let mut failed = 0;

        for target in targets {
            if let Some(repo) = self.repos.find(target) {
                println!("{} is available in {}", target, repo.name());
                continue;
            }

            let pkg = match self.aur.info(target) {
                Ok(results) => match results.into_iter().next() {
                    Some(pkg) => pkg,
                    None => {
                        eprintln!("!! no results found for {}", target);
                        failed += 1;
                        continue;
                    }
                },
                Err(e) => {
                    eprintln!("!! {}: {:#}", target, e);
                    failed += 1;
                    continue;
                }
            };

            if let Err(e) = self.aur.download(&pkg, &dest) {
                eprintln!("!! failed to download {}: {:#}", pkg.name, e);
                failed += 1;
                continue;
            }
            if !self.config.quiet {
                println!("{} downloaded to {}", pkg.name, dest.display());
            }

            if with_deps {
                match resolver.resolve_and_fetch(pkg.base()) {
                    Ok(fetched) => log::info!("Fetched {} dependencies for {}", fetched, pkg.name),
                    Err(e) => {
                        eprintln!("!! {}: {}", pkg.name, e);
                        failed += 1;
                    }
                }
            }
        }

        Ok(failed)
    }

    /// Looks up each target in the AUR, filling missing dependency arrays
    /// from the package's PKGBUILD.
    pub fn info(&self, targets: &[String]) -> Vec<AurPackage> {
        let mut found = Vec::new();

        for target in targets {
            let mut pkg = match self.aur.info(target) {
                Ok(results) => match results.into_iter().next() {
                    Some(pkg) => pkg,
                    None => {
                        eprintln!("!! no results found for {}", target);
                        continue;
                    }
                },
                Err(e) => {
                    eprintln!("!! {}: {:#}", target, e);
                    continue;
                }
            };

            if !pkg.has_dependency_info() {
                match self.aur.fetch_pkgbuild(&pkg) {
                    Ok(pkgbuild) => fill_from_pkgbuild(&mut pkg, &pkgbuild),
                    Err(e) => log::warn!("Could not fetch PKGBUILD for {}: {:#}", pkg.name, e),
                }
            }

            found.push(pkg);
        }

        found
    }

    /// Runs one search per term and folds the results into a single list
    /// sorted by name.
    pub fn search(&self, terms: &[String]) -> DepList<AurPackage> {
        let mut merged = DepList::new();

        for term in terms {
            let mut results = match self.aur.search(term) {
                Ok(results) => results,
                Err(e) => {
                    eprintln!("!! {}: {:#}", term, e);
                    continue;
                }
            };
            results.sort_by(|a, b| a.name.cmp(&b.name));

            merged = merge_sorted_dedup(
                merged,
                DepList::from(results),
                |a: &AurPackage, b: &AurPackage| a.name.cmp(&b.name),
                |dup: AurPackage| log::trace!("Dropping duplicate result {}", dup.name),
            );
        }

        merged
    }

    pub fn foreign(&self) -> Vec<(&str, &str)> {
        query_foreign(&self.local, &self.repos)
    }
}

/// Fills the dependency arrays of `pkg` from its PKGBUILD text. A malformed
/// array is logged and the record is kept with whatever was parsed before it.
pub fn fill_from_pkgbuild(pkg: &mut AurPackage, pkgbuild: &str) {
    if let Err(e) = populate_typed_dependencies(pkg, pkgbuild) {
        log::warn!("{}: {}", pkg.name, e);
    }
}
