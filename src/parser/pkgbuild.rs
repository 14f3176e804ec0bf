use super::array::{parse_array, ParseMode};
use crate::core::DepList;
use crate::error::{DepError, Result};
use crate::types::AurPackage;
use std::fmt;

pub const DEPENDS_PREFIX: &str = "depends=";
pub const MAKEDEPENDS_PREFIX: &str = "makedepends=";
pub const OPTDEPENDS_PREFIX: &str = "optdepends=";

/// The dependency arrays recognised in a PKGBUILD.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DepKind {
    Depends,
    MakeDepends,
    OptDepends,
}

impl DepKind {
    pub const ALL: [DepKind; 3] = [DepKind::Depends, DepKind::MakeDepends, DepKind::OptDepends];

    pub fn prefix(self) -> &'static str {
        match self {
            DepKind::Depends => DEPENDS_PREFIX,
            DepKind::MakeDepends => MAKEDEPENDS_PREFIX,
            DepKind::OptDepends => OPTDEPENDS_PREFIX,
        }
    }

    /// Classifies a trimmed line by its declaration prefix. Returns `None`
    /// for lines that declare none of the dependency arrays.
    pub fn classify(line: &str) -> Option<DepKind> {
        // Longer prefixes first.
        [DepKind::MakeDepends, DepKind::OptDepends, DepKind::Depends]
            .into_iter()
            .find(|kind| line.starts_with(kind.prefix()))
    }
}

impl fmt::Display for DepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.prefix().trim_end_matches('='))
    }
}

/// One recognised declaration: its 1-based line number, kind and the
/// trimmed line text.
struct Declaration<'a> {
    line: usize,
    kind: DepKind,
    text: &'a str,
}

impl<'a> Declaration<'a> {
    /// Text between the first `(` and the first `)` of the line. Arrays must
    /// open and close on the same line.
    fn body(&self) -> Result<&'a str> {
        let malformed = |reason| DepError::MalformedRecipe {
            line: self.line,
            kind: self.kind,
            reason,
        };

        let open = self.text.find('(').ok_or_else(|| malformed("missing '('"))?;
        let close = self.text.find(')').ok_or_else(|| malformed("missing ')'"))?;
        if close < open {
            return Err(malformed("')' before '('"));
        }

        Ok(&self.text[open + 1..close])
    }
}

fn declarations(pkgbuild: &str) -> impl Iterator<Item = Declaration<'_>> {
    pkgbuild.lines().enumerate().filter_map(|(idx, raw)| {
        let text = raw.trim();
        DepKind::classify(text).map(|kind| Declaration {
            line: idx + 1,
            kind,
            text,
        })
    })
}

/// Collects the `depends` and `makedepends` entries of a PKGBUILD into a
/// single set of bare package names.
pub fn extract_flat_dependencies(pkgbuild: &str) -> Result<DepList<String>> {
    let mut deps = DepList::new();

    for decl in declarations(pkgbuild) {
        match decl.kind {
            DepKind::Depends | DepKind::MakeDepends => {
                parse_array(decl.body()?, &mut deps, ParseMode::Strip);
            }
            DepKind::OptDepends => {}
        }
    }

    Ok(deps)
}

/// Fills the three dependency fields of `pkg` from a PKGBUILD, keeping
/// version constraints and optdepends descriptions intact.
pub fn populate_typed_dependencies(pkg: &mut AurPackage, pkgbuild: &str) -> Result<()> {
    for decl in declarations(pkgbuild) {
        let body = decl.body()?;
        parse_array(body, pkg.deps_mut(decl.kind), ParseMode::Raw);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PKGBUILD: &str = r#"# Maintainer: Someone <someone@example.org>
pkgname=mypkg
pkgver=1.2.3
pkgrel=1
arch=('x86_64')
depends=('foo>=1.0' 'bar')
  makedepends=('baz' 'foo')
optdepends=('qux: optional feature')
checkdepends=('check')

build() {
  make
}
"#;

    fn names(list: &DepList<String>) -> Vec<&str> {
        list.iter().map(String::as_str).collect()
    }

    #[test]
    fn test_classify_prefixes() {
        assert_eq!(DepKind::classify("depends=(a)"), Some(DepKind::Depends));
        assert_eq!(DepKind::classify("makedepends=(a)"), Some(DepKind::MakeDepends));
        assert_eq!(DepKind::classify("optdepends=(a)"), Some(DepKind::OptDepends));
        assert_eq!(DepKind::classify("checkdepends=(a)"), None);
        assert_eq!(DepKind::classify("depends_x86_64=(a)"), None);
        assert_eq!(DepKind::classify("#depends=(a)"), None);
    }

    #[test]
    fn test_flat_extraction_merges_build_and_make() {
        let deps = extract_flat_dependencies(PKGBUILD).unwrap();
        assert_eq!(names(&deps), vec!["foo", "bar", "baz"]);
    }

    #[test]
    fn test_flat_extraction_on_first_line() {
        let deps = extract_flat_dependencies("depends=('foo>=1.0' 'bar')\nmakedepends=('baz')").unwrap();
        assert_eq!(names(&deps), vec!["foo", "bar", "baz"]);
    }

    #[test]
    fn test_flat_extraction_is_idempotent() {
        let first = extract_flat_dependencies(PKGBUILD).unwrap();
        let second = extract_flat_dependencies(PKGBUILD).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_populate_routes_by_kind() {
        let mut pkg = AurPackage::new("mypkg", "1.2.3-1");
        populate_typed_dependencies(&mut pkg, PKGBUILD).unwrap();

        assert_eq!(names(&pkg.depends), vec!["foo>=1.0", "bar"]);
        assert_eq!(names(&pkg.make_depends), vec!["baz", "foo"]);
        assert_eq!(names(&pkg.opt_depends), vec!["qux: optional feature"]);
    }

    #[test]
    fn test_populate_only_optdepends() {
        let mut pkg = AurPackage::new("mypkg", "1.0-1");
        populate_typed_dependencies(&mut pkg, "\noptdepends=('qux: optional feature')\n").unwrap();

        assert!(pkg.depends.is_empty());
        assert!(pkg.make_depends.is_empty());
        assert_eq!(names(&pkg.opt_depends), vec!["qux: optional feature"]);
    }

    #[test]
    fn test_unclosed_array_is_malformed() {
        let err = extract_flat_dependencies("pkgname=x\ndepends=(foo bar\n  baz)\n").unwrap_err();
        match err {
            DepError::MalformedRecipe { line, kind, .. } => {
                assert_eq!(line, 2);
                assert_eq!(kind, DepKind::Depends);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_paren_without_newline() {
        assert!(matches!(
            extract_flat_dependencies("depends=(foo bar"),
            Err(DepError::MalformedRecipe { .. })
        ));
    }

    #[test]
    fn test_flat_extraction_ignores_malformed_optdepends() {
        let deps = extract_flat_dependencies("depends=(a)\noptdepends=(b\n").unwrap();
        assert_eq!(names(&deps), vec!["a"]);
    }

    #[test]
    fn test_empty_array() {
        let deps = extract_flat_dependencies("depends=()\n").unwrap();
        assert!(deps.is_empty());
    }

    #[test]
    fn test_populate_rejects_unclosed_optdepends() {
        let mut pkg = AurPackage::new("mypkg", "1.0-1");
        let err = populate_typed_dependencies(&mut pkg, "optdepends=('a: b'\n").unwrap_err();
        assert!(matches!(
            err,
            DepError::MalformedRecipe {
                kind: DepKind::OptDepends,
                line: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_malformed_line_after_valid_array() {
        let pkgbuild = "pkgname=x\nmakedepends=(cmake)\ndepends=(foo\n";

        let flat = extract_flat_dependencies(pkgbuild).unwrap_err();
        assert!(matches!(
            flat,
            DepError::MalformedRecipe {
                kind: DepKind::Depends,
                line: 3,
                ..
            }
        ));

        let mut pkg = AurPackage::new("x", "1.0-1");
        let typed = populate_typed_dependencies(&mut pkg, pkgbuild).unwrap_err();
        assert!(matches!(
            typed,
            DepError::MalformedRecipe {
                kind: DepKind::Depends,
                line: 3,
                ..
            }
        ));
        assert_eq!(names(&pkg.make_depends), vec!["cmake"]);
    }

    #[test]
    fn test_display_kind() {
        assert_eq!(DepKind::MakeDepends.to_string(), "makedepends");
        assert_eq!(
            DepError::MalformedRecipe {
                line: 4,
                kind: DepKind::Depends,
                reason: "missing ')'"
            }
            .to_string(),
            "Malformed depends array on line 4: missing ')'"
        );
    }
}
