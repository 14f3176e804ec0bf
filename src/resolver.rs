use crate::error::{DepError, Result};
use crate::parser::extract_flat_dependencies;
use crate::types::AurPackage;
use std::path::{Path, PathBuf};

pub const PKGBUILD: &str = "PKGBUILD";

/// Installed packages.
pub trait LocalDb {
    fn is_installed(&self, name: &str) -> bool;
}

/// Official sync repositories, searched in configuration order.
pub trait SyncDbs {
    /// Name of the first repository carrying `name`.
    fn find_repo(&self, name: &str) -> Option<String>;
}

/// A remote index of package recipes (the AUR).
pub trait RemoteIndex {
    fn query_info(&self, name: &str) -> anyhow::Result<Vec<AurPackage>>;

    /// Downloads the source snapshot of `pkg` into `dest`.
    fn fetch_archive(&self, pkg: &AurPackage, dest: &Path) -> anyhow::Result<()>;
}

pub struct Resolver<'a> {
    local: &'a dyn LocalDb,
    repos: &'a dyn SyncDbs,
    remote: &'a dyn RemoteIndex,
    workdir: PathBuf,
}

impl<'a> Resolver<'a> {
    pub fn new(
        local: &'a dyn LocalDb,
        repos: &'a dyn SyncDbs,
        remote: &'a dyn RemoteIndex,
        workdir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            local,
            repos,
            remote,
            workdir: workdir.into(),
        }
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    pub fn pkgbuild_path(&self, package_name: &str) -> PathBuf {
        self.workdir.join(package_name).join(PKGBUILD)
    }

    /// Reads the PKGBUILD of an already downloaded `package_name` and fetches
    /// every build or runtime dependency that is neither installed nor in a
    /// sync repository but exists in the remote index.
    ///
    /// Returns how many dependencies were found in the remote index, whether
    /// or not their archive fetch succeeded. Dependencies found nowhere are
    /// skipped silently. Fetched packages are not resolved further.
    pub fn resolve_and_fetch(&self, package_name: &str) -> Result<usize> {
        let path = self.pkgbuild_path(package_name);
        let pkgbuild = std::fs::read_to_string(&path)
            .map_err(|source| DepError::RecipeNotFound { path, source })?;

        let deps = extract_flat_dependencies(&pkgbuild)?;
        drop(pkgbuild);

        log::debug!("Fetching uninstalled dependencies for {}...", package_name);

        let mut fetched = 0;
        for depend in &deps {
            log::debug!("Attempting to find {}", depend);

            if self.local.is_installed(depend) {
                log::debug!("{} is installed", depend);
                continue;
            }

            if let Some(repo) = self.repos.find_repo(depend) {
                log::info!("{} is available in {}", depend, repo);
                continue;
            }

            let results = match self.remote.query_info(depend) {
                Ok(results) => results,
                Err(e) => {
                    log::warn!("Remote lookup for {} failed: {:#}", depend, e);
                    continue;
                }
            };

            let Some(pkg) = results.first() else {
                log::debug!("{} not found anywhere, skipping", depend);
                continue;
            };

            log::debug!("{} is in the AUR", depend);
            fetched += 1;
            if let Err(e) = self.remote.fetch_archive(pkg, &self.workdir) {
                log::error!("Failed to fetch {}: {:#}", pkg.name, e);
            }
        }

        Ok(fetched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashSet;

    struct Installed(HashSet<&'static str>);

    impl LocalDb for Installed {
        fn is_installed(&self, name: &str) -> bool {
            self.0.contains(name)
        }
    }

    struct Repos(Vec<(&'static str, HashSet<&'static str>)>);

    impl SyncDbs for Repos {
        fn find_repo(&self, name: &str) -> Option<String> {
            self.0
                .iter()
                .find(|(_, pkgs)| pkgs.contains(name))
                .map(|(repo, _)| repo.to_string())
        }
    }

    #[derive(Default)]
    struct FakeAur {
        known: HashSet<&'static str>,
        broken: HashSet<&'static str>,
        unreachable: HashSet<&'static str>,
        queried: RefCell<Vec<String>>,
        fetched: RefCell<Vec<String>>,
    }

    impl RemoteIndex for FakeAur {
        fn query_info(&self, name: &str) -> anyhow::Result<Vec<AurPackage>> {
            self.queried.borrow_mut().push(name.to_string());
            if self.broken.contains(name) {
                anyhow::bail!("connection reset");
            }
            if self.known.contains(name) {
                Ok(vec![AurPackage::new(name, "1.0-1")])
            } else {
                Ok(vec![])
            }
        }

        fn fetch_archive(&self, pkg: &AurPackage, _dest: &Path) -> anyhow::Result<()> {
            self.fetched.borrow_mut().push(pkg.name.clone());
            if self.unreachable.contains(pkg.name.as_str()) {
                anyhow::bail!("network down");
            }
            Ok(())
        }
    }

    fn workdir_with(pkgbuild: &str) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("mypkg")).unwrap();
        std::fs::write(dir.path().join("mypkg").join(PKGBUILD), pkgbuild).unwrap();
        dir
    }

    #[test]
    fn test_remote_only_dependency_is_fetched_once() {
        let dir = workdir_with("pkgname=mypkg\ndepends=('libfoo>=2')\n");
        let local = Installed(HashSet::new());
        let repos = Repos(vec![]);
        let aur = FakeAur {
            known: HashSet::from(["libfoo"]),
            ..Default::default()
        };

        let resolver = Resolver::new(&local, &repos, &aur, dir.path());
        assert_eq!(resolver.resolve_and_fetch("mypkg").unwrap(), 1);
        assert_eq!(*aur.fetched.borrow(), vec!["libfoo".to_string()]);
    }

    #[test]
    fn test_lookup_chain_short_circuits() {
        let dir = workdir_with(
            "pkgname=mypkg\ndepends=('glibc' 'python' 'libfoo')\nmakedepends=('cmake' 'virtual-dep')\n",
        );
        let local = Installed(HashSet::from(["glibc"]));
        let repos = Repos(vec![
            ("core", HashSet::from(["python"])),
            ("extra", HashSet::from(["python", "cmake"])),
        ]);
        let aur = FakeAur {
            known: HashSet::from(["libfoo", "glibc"]),
            ..Default::default()
        };

        let resolver = Resolver::new(&local, &repos, &aur, dir.path());
        assert_eq!(resolver.resolve_and_fetch("mypkg").unwrap(), 1);

        assert_eq!(
            *aur.queried.borrow(),
            vec!["libfoo".to_string(), "virtual-dep".to_string()]
        );
        assert_eq!(*aur.fetched.borrow(), vec!["libfoo".to_string()]);
    }

    #[test]
    fn test_remote_failure_is_not_an_error() {
        let dir = workdir_with("pkgname=mypkg\ndepends=('flaky' 'libfoo')\n");
        let local = Installed(HashSet::new());
        let repos = Repos(vec![]);
        let aur = FakeAur {
            known: HashSet::from(["libfoo"]),
            broken: HashSet::from(["flaky"]),
            ..Default::default()
        };

        let resolver = Resolver::new(&local, &repos, &aur, dir.path());
        assert_eq!(resolver.resolve_and_fetch("mypkg").unwrap(), 1);
    }

    #[test]
    fn test_failed_fetch_still_counts() {
        let dir = workdir_with("pkgname=mypkg\ndepends=('libfoo')\n");
        let local = Installed(HashSet::new());
        let repos = Repos(vec![]);
        let aur = FakeAur {
            known: HashSet::from(["libfoo"]),
            unreachable: HashSet::from(["libfoo"]),
            ..Default::default()
        };

        let resolver = Resolver::new(&local, &repos, &aur, dir.path());
        assert_eq!(resolver.resolve_and_fetch("mypkg").unwrap(), 1);
        assert_eq!(*aur.fetched.borrow(), vec!["libfoo".to_string()]);
    }

    #[test]
    fn test_missing_pkgbuild() {
        let dir = tempfile::tempdir().unwrap();
        let local = Installed(HashSet::new());
        let repos = Repos(vec![]);
        let aur = FakeAur::default();

        let resolver = Resolver::new(&local, &repos, &aur, dir.path());
        let err = resolver.resolve_and_fetch("nope").unwrap_err();

        match err {
            DepError::RecipeNotFound { path, .. } => {
                assert_eq!(path, dir.path().join("nope").join(PKGBUILD));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_malformed_pkgbuild_fetches_nothing() {
        let dir = workdir_with("pkgname=mypkg\ndepends=(libfoo\n)\n");
        let local = Installed(HashSet::new());
        let repos = Repos(vec![]);
        let aur = FakeAur {
            known: HashSet::from(["libfoo"]),
            ..Default::default()
        };

        let resolver = Resolver::new(&local, &repos, &aur, dir.path());
        assert!(matches!(
            resolver.resolve_and_fetch("mypkg"),
            Err(DepError::MalformedRecipe { .. })
        ));
        assert!(aur.fetched.borrow().is_empty());
    }
}
