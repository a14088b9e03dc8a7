pub mod patch;

use crate::report::{format_name_list, format_shape, ArchiveReport, Section};
use crate::validator::challenge::Challenge;
use crate::validator::manifest::ExpectedPatchManifest;
use patch::PixelType;
use std::collections::BTreeSet;
use std::path::Path;
use walkdir::WalkDir;

/// Checks every case folder of an extracted submission against the manifest.
pub fn check_segmentations(
    root: &Path,
    challenge: &Challenge,
    manifest: &ExpectedPatchManifest,
    report: &mut ArchiveReport,
) {
    let no_patches = BTreeSet::new();
    for case in challenge.case_numbers() {
        let expected = manifest.expected_for(case).unwrap_or(&no_patches);
        check_case(root, case, expected, challenge, report);
    }

    if !report.section_failed(Section::Segmentation) {
        report.success(
            Section::Segmentation,
            "No errors in the segmentations files!",
        );
    }
}

fn check_case(
    root: &Path,
    case: u32,
    expected: &BTreeSet<String>,
    challenge: &Challenge,
    report: &mut ArchiveReport,
) {
    let case_str = challenge.case_dir_name(case);
    let case_path = root.join(&case_str);

    if case_path.is_file() {
        report.error(
            Section::Segmentation,
            format!("Folder for case '{}' is a file.", case_str),
        );
        return;
    }
    if !case_path.is_dir() {
        report.warning(
            Section::Segmentation,
            format!("Folder for case '{}' is missing.", case_str),
        );
        return;
    }

    let found = list_patches(&case_path, &challenge.patch_extension);

    let missing: Vec<&String> = expected.difference(&found).collect();
    if !missing.is_empty() {
        report.error(
            Section::Segmentation,
            format!(
                "{} is missing the following patches {}",
                case_str,
                format_name_list(missing)
            ),
        );
    }

    let unexpected: Vec<&String> = found.difference(expected).collect();
    if !unexpected.is_empty() {
        report.warning(
            Section::Segmentation,
            format!(
                "{} contains the following unexpected patches {}",
                case_str,
                format_name_list(unexpected)
            ),
        );
    }

    for name in &found {
        check_patch(&case_path.join(name), name, challenge, report);
    }
}

/// Names of the `*.<ext>` entries directly inside `dir`, directories excluded.
fn list_patches(dir: &Path, ext: &str) -> BTreeSet<String> {
    let suffix = format!(".{}", ext);
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| match e {
            Ok(e) => Some(e),
            Err(err) => {
                log::warn!("skipping unreadable entry in {}: {}", dir.display(), err);
                None
            }
        })
        .filter(|e| !e.file_type().is_dir())
        .filter_map(|e| e.file_name().to_str().map(str::to_string))
        .filter(|name| name.ends_with(&suffix))
        .collect()
}

fn check_patch(path: &Path, name: &str, challenge: &Challenge, report: &mut ArchiveReport) {
    let inspection = match patch::inspect_patch(path) {
        Ok(i) => i,
        Err(e) => {
            log::debug!("failed to decode {}: {}", path.display(), e);
            report.error(
                Section::Segmentation,
                format!("{} is not a valid PNG file.", name),
            );
            return;
        }
    };

    if inspection.dtype != PixelType::Uint8 {
        report.error(
            Section::Segmentation,
            format!(
                "{} has dtype {} (instead of {}).",
                name,
                inspection.dtype,
                PixelType::Uint8
            ),
        );
    }
    if inspection.shape != challenge.patch_shape {
        report.error(
            Section::Segmentation,
            format!(
                "{} has shape {} (instead of {}).",
                name,
                format_shape(&inspection.shape),
                format_shape(&challenge.patch_shape)
            ),
        );
    }

    let unexpected: Vec<String> = inspection
        .values
        .difference(&challenge.allowed_labels)
        .map(|v| v.to_string())
        .collect();
    if !unexpected.is_empty() {
        report.warning(
            Section::Segmentation,
            format!(
                "{} contains unexpected classes [{}]",
                name,
                unexpected.join(", ")
            ),
        );
    }
}
