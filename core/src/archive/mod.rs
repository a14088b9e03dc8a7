use crate::error::{CoreError, CoreResult};
use std::fs::{self, File};
use std::io::Read;
use std::path::Path;
use tempfile::TempDir;
use zip::ZipArchive;

const S_IFMT: u32 = 0o170000;
const S_IFLNK: u32 = 0o120000;

/// A submission unpacked into a scratch directory. The directory is removed
/// when this value is dropped.
pub struct ExtractedArchive {
    dir: TempDir,
}

impl ExtractedArchive {
    pub fn root(&self) -> &Path {
        self.dir.path()
    }
}

/// Unzips `archive` into a fresh temporary directory.
///
/// Entries whose names would land outside the directory, and symlink entries,
/// are skipped. A file that is not a readable ZIP container maps to
/// `CoreError::Zip`.
pub fn extract_to_tempdir(archive: &Path) -> CoreResult<ExtractedArchive> {
    let file = File::open(archive)?;
    let mut zip = ZipArchive::new(file).map_err(|e| CoreError::Zip(e.to_string()))?;

    let dir = tempfile::Builder::new().prefix("wns_submission_").tempdir()?;
    log::debug!(
        "extracting {} ({} entries) into {}",
        archive.display(),
        zip.len(),
        dir.path().display()
    );

    for i in 0..zip.len() {
        let mut entry = zip.by_index(i).map_err(|e| CoreError::Zip(e.to_string()))?;
        let rel = match entry.enclosed_name() {
            Some(p) => p.to_path_buf(),
            None => {
                log::warn!("skipping zip entry with unsafe path: {}", entry.name());
                continue;
            }
        };
        if entry
            .unix_mode()
            .is_some_and(|mode| mode & S_IFMT == S_IFLNK)
        {
            log::warn!("skipping symlink zip entry: {}", entry.name());
            continue;
        }

        let out = dir.path().join(&rel);
        if entry.is_dir() {
            fs::create_dir_all(&out)?;
            continue;
        }
        if let Some(parent) = out.parent() {
            fs::create_dir_all(parent)?;
        }
        // Read errors here are decompression or CRC failures of the container itself.
        let mut bytes = Vec::new();
        entry
            .read_to_end(&mut bytes)
            .map_err(|e| CoreError::Zip(format!("{}: {}", entry.name(), e)))?;
        fs::write(&out, bytes)?;
    }

    Ok(ExtractedArchive { dir })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::{FileOptions, ZipWriter};

    fn write_zip(path: &Path, entries: &[(&str, &[u8])]) {
        let f = File::create(path).unwrap();
        let mut zw = ZipWriter::new(f);
        let opts = FileOptions::<()>::default();
        for (name, bytes) in entries {
            zw.start_file(*name, opts).unwrap();
            zw.write_all(bytes).unwrap();
        }
        zw.finish().unwrap();
    }

    #[test]
    fn extracts_nested_entries() {
        let tmp = tempfile::tempdir().unwrap();
        let zip_path = tmp.path().join("s.zip");
        write_zip(
            &zip_path,
            &[("classification.json", &b"{}"[..]), ("wns_case_01/a.png", &b"x"[..])],
        );
        let extracted = extract_to_tempdir(&zip_path).unwrap();
        assert!(extracted.root().join("classification.json").is_file());
        assert!(extracted.root().join("wns_case_01").join("a.png").is_file());
    }

    #[test]
    fn tempdir_is_removed_on_drop() {
        let tmp = tempfile::tempdir().unwrap();
        let zip_path = tmp.path().join("s.zip");
        write_zip(&zip_path, &[("a.txt", &b"a"[..])]);
        let extracted = extract_to_tempdir(&zip_path).unwrap();
        let root = extracted.root().to_path_buf();
        assert!(root.is_dir());
        drop(extracted);
        assert!(!root.exists());
    }

    #[test]
    fn escaping_entries_are_skipped() {
        let tmp = tempfile::tempdir().unwrap();
        let zip_path = tmp.path().join("s.zip");
        write_zip(&zip_path, &[("../evil.txt", &b"x"[..]), ("ok.txt", &b"y"[..])]);
        let extracted = extract_to_tempdir(&zip_path).unwrap();
        assert!(extracted.root().join("ok.txt").is_file());
        assert!(!extracted.root().parent().unwrap().join("evil.txt").exists());
    }

    #[test]
    fn symlink_entries_are_skipped() {
        let tmp = tempfile::tempdir().unwrap();
        let zip_path = tmp.path().join("s.zip");
        let mut zw = ZipWriter::new(File::create(&zip_path).unwrap());
        let opts = FileOptions::<()>::default();
        zw.add_symlink("wns_case_01", "/etc", opts).unwrap();
        zw.start_file("ok.txt", opts).unwrap();
        zw.write_all(b"y").unwrap();
        zw.finish().unwrap();

        let extracted = extract_to_tempdir(&zip_path).unwrap();
        assert!(extracted.root().join("ok.txt").is_file());
        assert!(fs::symlink_metadata(extracted.root().join("wns_case_01")).is_err());
    }

    #[test]
    fn non_zip_is_a_zip_error() {
        let tmp = tempfile::tempdir().unwrap();
        let p = tmp.path().join("not_a.zip");
        fs::write(&p, &b"plain text, not a zip"[..]).unwrap();
        let err = extract_to_tempdir(&p).err().unwrap();
        assert!(matches!(err, CoreError::Zip(_)));
    }
}
