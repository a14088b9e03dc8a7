pub mod challenge;
pub mod manifest;

use crate::archive;
use crate::classification::check_classification;
use crate::error::{CoreError, CoreResult};
use crate::report::{ArchiveReport, Section};
use crate::segmentation::check_segmentations;
use challenge::Challenge;
use manifest::ExpectedPatchManifest;
use std::path::Path;

pub struct SubmissionValidator {
    challenge: Challenge,
    manifest: ExpectedPatchManifest,
}

impl SubmissionValidator {
    pub fn new_v1(manifest: ExpectedPatchManifest) -> CoreResult<Self> {
        Self::with_challenge(challenge::challenge_v1()?, manifest)
    }

    /// Fails when the manifest does not list every case of the challenge.
    pub fn with_challenge(challenge: Challenge, manifest: ExpectedPatchManifest) -> CoreResult<Self> {
        manifest.ensure_covers(challenge.case_numbers())?;
        Ok(Self {
            challenge,
            manifest,
        })
    }

    /// Runs every check against one submission archive.
    ///
    /// Never fails: problems with the archive itself are recorded in the
    /// report and end the check early.
    pub fn validate_zip(&self, submission_zip: &Path) -> ArchiveReport {
        let mut report = ArchiveReport::new(submission_zip);

        if !submission_zip.is_file() {
            report.error(
                Section::Archive,
                "The archive could not be found. Please check the path that you supplied.",
            );
            return report;
        }

        let extracted = match archive::extract_to_tempdir(submission_zip) {
            Ok(x) => x,
            Err(CoreError::Zip(reason)) => {
                log::debug!("{}: {}", submission_zip.display(), reason);
                report.error(
                    Section::Archive,
                    "This ZIP file is corrupted and cannot be opened.",
                );
                return report;
            }
            Err(e) => {
                report.error(
                    Section::Archive,
                    format!("The archive could not be extracted: {}", e),
                );
                return report;
            }
        };

        check_classification(extracted.root(), &self.challenge, &mut report);
        check_segmentations(
            extracted.root(),
            &self.challenge,
            &self.manifest,
            &mut report,
        );

        if !report.section_failed(Section::Classification)
            && !report.section_failed(Section::Segmentation)
        {
            report.success(Section::Submission, "The submission is completely valid!");
        }

        report
    }
}
