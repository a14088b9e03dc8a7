#![allow(dead_code)]

use png::{BitDepth, ColorType};
use serde_json::{Map, Value};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use submission_core::validator::challenge::{challenge_v1, Challenge};
use submission_core::validator::manifest::ExpectedPatchManifest;
use tempfile::TempDir;
use walkdir::WalkDir;
use zip::write::{FileOptions, ZipWriter};
use zip::CompressionMethod;

/// A submission laid out on disk, zipped on demand.
pub struct SubmissionFixture {
    tmp: TempDir,
}

impl SubmissionFixture {
    pub fn new() -> Self {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("submission")).unwrap();
        Self { tmp }
    }

    pub fn root(&self) -> PathBuf {
        self.tmp.path().join("submission")
    }

    pub fn write_classification(&self, predictions: &Map<String, Value>) {
        let body = serde_json::to_vec_pretty(predictions).unwrap();
        fs::write(self.root().join("classification.json"), body).unwrap();
    }

    pub fn write_file(&self, rel: &str, bytes: &[u8]) {
        let p = self.root().join(rel);
        if let Some(parent) = p.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(p, bytes).unwrap();
    }

    pub fn create_dir(&self, rel: &str) {
        fs::create_dir_all(self.root().join(rel)).unwrap();
    }

    /// Zips the submission root (entries sorted, stored) next to it.
    pub fn zip(&self, name: &str) -> PathBuf {
        let out = self.tmp.path().join(name);
        zip_dir(&self.root(), &out);
        out
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.tmp.path().join(name)
    }
}

pub fn zip_dir(root_dir: &Path, out_zip: &Path) {
    let mut entries: Vec<(PathBuf, String)> = Vec::new();
    for e in WalkDir::new(root_dir).min_depth(1) {
        let e = e.unwrap();
        let rel = e.path().strip_prefix(root_dir).unwrap();
        let mut rel_s = rel.to_string_lossy().replace('\\', "/");
        if e.file_type().is_dir() {
            rel_s.push('/');
        }
        entries.push((e.path().to_path_buf(), rel_s));
    }
    entries.sort_by(|a, b| a.1.cmp(&b.1));

    let mut zw = ZipWriter::new(File::create(out_zip).unwrap());
    let opts = FileOptions::<()>::default().compression_method(CompressionMethod::Stored);
    for (abs_path, rel) in entries {
        if rel.ends_with('/') {
            zw.add_directory(rel, opts).unwrap();
            continue;
        }
        zw.start_file(rel, opts).unwrap();
        let mut rf = File::open(abs_path).unwrap();
        std::io::copy(&mut rf, &mut zw).unwrap();
    }
    zw.finish().unwrap();
}

pub fn encode_png(width: u32, height: u32, color: ColorType, depth: BitDepth, data: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    {
        let mut enc = png::Encoder::new(&mut out, width, height);
        enc.set_color(color);
        enc.set_depth(depth);
        enc.set_compression(png::Compression::Fast);
        let mut w = enc.write_header().unwrap();
        w.write_image_data(data).unwrap();
        w.finish().unwrap();
    }
    out
}

/// 8-bit grey label map: row `y` filled with label `1 + y % 10`.
pub fn label_patch(height: usize, width: usize) -> Vec<u8> {
    let mut data = Vec::with_capacity(height * width);
    for y in 0..height {
        data.extend(std::iter::repeat(1 + (y % 10) as u8).take(width));
    }
    encode_png(width as u32, height as u32, ColorType::Grayscale, BitDepth::Eight, &data)
}

pub fn valid_predictions() -> Map<String, Value> {
    challenge_v1()
        .unwrap()
        .expected_keys
        .iter()
        .enumerate()
        .map(|(i, k)| (k.clone(), serde_json::json!((i as f64 + 0.5) / 40.0)))
        .collect()
}

/// The published challenge with tiny patches, for fast fixtures.
pub fn small_challenge() -> Challenge {
    let mut c = challenge_v1().unwrap();
    c.patch_shape = [8, 8];
    c
}

pub fn patch_names(case: u32) -> Vec<String> {
    vec![
        format!("wns_{:02}_patch_a.png", case),
        format!("wns_{:02}_patch_b.png", case),
    ]
}

pub fn two_patch_manifest() -> ExpectedPatchManifest {
    (1..=6).map(|c| (c, patch_names(c))).collect()
}

/// Writes a complete, valid submission whose patches have the given size.
pub fn write_valid_submission(fx: &SubmissionFixture, side: usize) {
    fx.write_classification(&valid_predictions());
    let patch = label_patch(side, side);
    for case in 1..=6 {
        for name in patch_names(case) {
            fx.write_file(&format!("wns_case_{:02}/{}", case, name), &patch);
        }
    }
}

/// A valid 1x1 grey PNG whose header then claims `width` x `height`.
pub fn png_with_claimed_size(width: u32, height: u32) -> Vec<u8> {
    let mut png = encode_png(1, 1, ColorType::Grayscale, BitDepth::Eight, &[1]);
    png[16..20].copy_from_slice(&width.to_be_bytes());
    png[20..24].copy_from_slice(&height.to_be_bytes());
    let crc = crc32(&png[12..29]);
    png[29..33].copy_from_slice(&crc.to_be_bytes());
    png
}

fn crc32(bytes: &[u8]) -> u32 {
    let mut crc = 0xffff_ffffu32;
    for b in bytes {
        crc ^= *b as u32;
        for _ in 0..8 {
            crc = if crc & 1 == 1 { (crc >> 1) ^ 0xedb8_8320 } else { crc >> 1 };
        }
    }
    !crc
}
