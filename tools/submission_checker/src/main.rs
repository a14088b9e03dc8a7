use std::ffi::OsString;
use std::path::{Path, PathBuf};
use submission_core::validator::manifest::{ExpectedPatchManifest, MANIFEST_FILE_NAME};
use submission_core::validator::SubmissionValidator;

const MANIFEST_ENV: &str = "WNS_EXPECTED_PATCHES";

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let archives: Vec<OsString> = std::env::args_os().skip(1).collect();
    if archives.is_empty() {
        eprintln!("usage: submission_checker <path/to/submission.zip>...");
        std::process::exit(2);
    }

    let manifest_path = locate_manifest();
    log::debug!("using patch manifest {}", manifest_path.display());
    let validator = match ExpectedPatchManifest::load(&manifest_path)
        .and_then(SubmissionValidator::new_v1)
    {
        Ok(v) => v,
        Err(e) => {
            eprintln!(
                "could not load patch manifest {}: {}",
                manifest_path.display(),
                e
            );
            std::process::exit(2);
        }
    };

    // Findings go to stdout only; the exit status does not reflect them.
    for archive in &archives {
        let report = validator.validate_zip(Path::new(archive));
        println!("\n{}", report.header());
        for line in report.lines() {
            println!("{}", line);
        }
    }
}

fn locate_manifest() -> PathBuf {
    if let Some(p) = std::env::var_os(MANIFEST_ENV) {
        return PathBuf::from(p);
    }
    let in_cwd = PathBuf::from(MANIFEST_FILE_NAME);
    if in_cwd.is_file() {
        return in_cwd;
    }
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(MANIFEST_FILE_NAME)))
        .filter(|p| p.is_file())
        .unwrap_or(in_cwd)
}
