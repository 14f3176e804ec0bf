use crate::core::DepList;
use crate::parser::DepKind;
use serde::{Deserialize, Serialize};

/// A package record as returned by the AUR RPC interface.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct AurPackage {
    #[serde(rename = "ID", default)]
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub package_base: Option<String>,
    pub version: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "URL", default)]
    pub url: Option<String>,
    #[serde(rename = "URLPath", default)]
    pub url_path: Option<String>,
    #[serde(default)]
    pub maintainer: Option<String>,
    #[serde(default)]
    pub num_votes: u64,
    #[serde(default)]
    pub popularity: f64,
    #[serde(default)]
    pub out_of_date: Option<i64>,
    #[serde(default)]
    pub license: Vec<String>,
    #[serde(default)]
    pub depends: DepList<String>,
    #[serde(default)]
    pub make_depends: DepList<String>,
    #[serde(default)]
    pub opt_depends: DepList<String>,
}

impl AurPackage {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            ..Self::default()
        }
    }

    /// Name of the package base, which is what the AUR serves snapshots and
    /// PKGBUILDs under.
    pub fn base(&self) -> &str {
        self.package_base.as_deref().unwrap_or(&self.name)
    }

    pub fn deps(&self, kind: DepKind) -> &DepList<String> {
        match kind {
            DepKind::Depends => &self.depends,
            DepKind::MakeDepends => &self.make_depends,
            DepKind::OptDepends => &self.opt_depends,
        }
    }

    pub fn deps_mut(&mut self, kind: DepKind) -> &mut DepList<String> {
        match kind {
            DepKind::Depends => &mut self.depends,
            DepKind::MakeDepends => &mut self.make_depends,
            DepKind::OptDepends => &mut self.opt_depends,
        }
    }

    pub fn has_dependency_info(&self) -> bool {
        !(self.depends.is_empty() && self.make_depends.is_empty() && self.opt_depends.is_empty())
    }
}
