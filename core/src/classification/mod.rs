pub mod auc;

use crate::report::{format_name_list, ArchiveReport, Section};
use crate::validator::challenge::Challenge;
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

/// Checks the classification results file at the root of an extracted submission.
pub fn check_classification(root: &Path, challenge: &Challenge, report: &mut ArchiveReport) {
    let name = challenge.classification_file.as_str();
    let path = root.join(name);

    if let Some(predictions) = read_predictions(&path, name, report) {
        check_predictions(&predictions, name, challenge, report);
    }

    if !report.section_failed(Section::Classification) {
        report.success(Section::Classification, format!("{} is valid!", name));
    }
}

fn read_predictions(
    path: &Path,
    name: &str,
    report: &mut ArchiveReport,
) -> Option<Map<String, Value>> {
    let meta = match fs::metadata(path) {
        Ok(m) => m,
        Err(_) => {
            report.error(Section::Classification, format!("{} is missing.", name));
            return None;
        }
    };
    if meta.is_dir() {
        report.error(Section::Classification, format!("{} is a directory.", name));
        return None;
    }

    let bytes = match fs::read(path) {
        Ok(b) => b,
        Err(e) => {
            report.error(
                Section::Classification,
                format!("{} could not be read: {}", name, e),
            );
            return None;
        }
    };
    let text = match std::str::from_utf8(&bytes) {
        Ok(t) => t,
        Err(_) => {
            report.error(
                Section::Classification,
                format!("{} contains invalid unicode characters.", name),
            );
            return None;
        }
    };
    let value: Value = match serde_json::from_str(text) {
        Ok(v) => v,
        Err(e) => {
            report.error(
                Section::Classification,
                format!(
                    "{} is not a valid JSON file ({}). \
                     http://json.parser.online.fr/ can tell you what the issue is...",
                    name, e
                ),
            );
            return None;
        }
    };
    match value {
        Value::Object(map) => Some(map),
        other => {
            report.error(
                Section::Classification,
                format!(
                    "{} must contain a JSON object (found {}).",
                    name,
                    json_type_name(&other)
                ),
            );
            None
        }
    }
}

fn check_predictions(
    predictions: &Map<String, Value>,
    name: &str,
    challenge: &Challenge,
    report: &mut ArchiveReport,
) {
    let found: BTreeSet<String> = predictions.keys().cloned().collect();

    let missing: Vec<&String> = challenge.expected_keys.difference(&found).collect();
    if !missing.is_empty() {
        report.error(
            Section::Classification,
            format!(
                "{} is missing the following keys {}",
                name,
                format_name_list(missing)
            ),
        );
    }

    let unexpected: Vec<&String> = found.difference(&challenge.expected_keys).collect();
    if !unexpected.is_empty() {
        report.warning(
            Section::Classification,
            format!(
                "{} contains the following unexpected keys {}",
                name,
                format_name_list(unexpected)
            ),
        );
    }

    let mut scores = Vec::with_capacity(predictions.len());
    for (key, value) in predictions {
        match value.as_f64() {
            Some(score) => {
                if !(0.0..=1.0).contains(&score) {
                    report.warning(
                        Section::Classification,
                        format!(
                            "In {}, key {} has a float value ({}) not in range [0, 1].",
                            name, key, value
                        ),
                    );
                }
                scores.push(score);
            }
            None => report.error(
                Section::Classification,
                format!(
                    "In {}, key {} has a value of type {} (instead of float).",
                    name,
                    key,
                    json_type_name(value)
                ),
            ),
        }
    }

    // Scores must at least be usable by the ranking metric.
    if predictions.len() > 2 && !report.section_failed(Section::Classification) {
        let dummy_gt: Vec<bool> = (0..scores.len()).map(|i| i == 0).collect();
        if let Err(e) = auc::roc_auc_score(&dummy_gt, &scores) {
            report.error(
                Section::Classification,
                format!("Unexpected error when computing the AUC {}", e),
            );
        }
    }
}

fn json_type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
