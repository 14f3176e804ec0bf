use flate2::read::GzDecoder;
use std::fs;
use std::io::Read;
use std::path::{Component, Path};
use tar::{Archive, EntryType};

/// Rejects absolute paths and `..` components so an archive cannot write
/// outside the target directory.
fn is_contained(path: &Path) -> bool {
    path.components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

/// Unpacks a gzip-compressed AUR snapshot into `target_dir`, returning the
/// relative paths written.
pub fn extract_snapshot<R: Read>(reader: R, target_dir: &Path) -> anyhow::Result<Vec<String>> {
    let mut archive = Archive::new(GzDecoder::new(reader));
    let mut extracted = Vec::new();

    fs::create_dir_all(target_dir)?;

    for entry_result in archive.entries()? {
        let mut entry = entry_result?;
        let raw_path = entry.path()?.into_owned();
        let raw_str = raw_path.to_string_lossy().into_owned();

        if !is_contained(&raw_path) {
            log::warn!("Skipping unsafe archive entry: {}", raw_str);
            continue;
        }

        match entry.header().entry_type() {
            EntryType::Directory | EntryType::Regular | EntryType::Symlink => {
                if entry.unpack_in(target_dir)? {
                    extracted.push(raw_str);
                } else {
                    log::debug!("Skipping entry outside target: {}", raw_str);
                }
            }
            EntryType::XGlobalHeader | EntryType::XHeader => {}
            _ => {
                log::debug!("Skipping unsupported entry type: {}", raw_str);
            }
        }
    }

    Ok(extracted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;

    fn snapshot(files: &[(&str, &str)]) -> Vec<u8> {
        let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
        for (path, content) in files {
            let mut header = tar::Header::new_gnu();
            header.set_size(content.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder.append_data(&mut header, path, content.as_bytes()).unwrap();
        }
        builder.into_inner().unwrap().finish().unwrap()
    }

    #[test]
    fn test_extract_snapshot() {
        let data = snapshot(&[
            ("libfoo/PKGBUILD", "pkgname=libfoo\ndepends=('glibc')\n"),
            ("libfoo/.SRCINFO", "pkgbase = libfoo\n"),
        ]);
        let dir = tempfile::tempdir().unwrap();

        let files = extract_snapshot(data.as_slice(), dir.path()).unwrap();

        assert_eq!(files, vec!["libfoo/PKGBUILD".to_string(), "libfoo/.SRCINFO".to_string()]);
        let pkgbuild = fs::read_to_string(dir.path().join("libfoo/PKGBUILD")).unwrap();
        assert!(pkgbuild.contains("depends=('glibc')"));
    }

    #[test]
    fn test_is_contained() {
        assert!(is_contained(Path::new("foo/PKGBUILD")));
        assert!(is_contained(Path::new("./foo")));
        assert!(!is_contained(Path::new("../etc/passwd")));
        assert!(!is_contained(Path::new("/etc/passwd")));
    }
}
