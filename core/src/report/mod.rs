use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
    Success,
}

impl Severity {
    /// Console prefix, padded so messages line up.
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Error => "ERROR:  ",
            Severity::Warning => "WARNING:",
            Severity::Success => "SUCCESS:",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Archive,
    Classification,
    Segmentation,
    Submission,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub section: Section,
    pub severity: Severity,
    pub message: String,
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\t{}\t{}", self.severity.label(), self.message)
    }
}

/// Findings collected while checking one archive, in the order they were found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveReport {
    pub archive: PathBuf,
    pub findings: Vec<Finding>,
}

impl ArchiveReport {
    pub fn new(archive: &Path) -> Self {
        Self {
            archive: archive.to_path_buf(),
            findings: Vec::new(),
        }
    }

    pub fn error(&mut self, section: Section, message: impl Into<String>) {
        self.push(section, Severity::Error, message.into());
    }

    pub fn warning(&mut self, section: Section, message: impl Into<String>) {
        self.push(section, Severity::Warning, message.into());
    }

    pub fn success(&mut self, section: Section, message: impl Into<String>) {
        self.push(section, Severity::Success, message.into());
    }

    fn push(&mut self, section: Section, severity: Severity, message: String) {
        log::debug!("{:?} {:?}: {}", section, severity, message);
        self.findings.push(Finding {
            section,
            severity,
            message,
        });
    }

    /// A section fails on any error or warning; warnings only soften the label.
    pub fn section_failed(&self, section: Section) -> bool {
        self.findings
            .iter()
            .any(|f| f.section == section && f.severity != Severity::Success)
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.findings
            .iter()
            .filter(|f| f.severity == severity)
            .count()
    }

    /// True once the overall submission success line has been recorded.
    pub fn is_valid(&self) -> bool {
        self.findings
            .iter()
            .any(|f| f.section == Section::Submission && f.severity == Severity::Success)
    }

    pub fn header(&self) -> String {
        format!("Checking archive: {}", self.archive.display())
    }

    pub fn lines(&self) -> Vec<String> {
        self.findings.iter().map(|f| f.to_string()).collect()
    }
}

/// Renders names the way the checker has always listed them: `['a', 'b']`.
pub fn format_name_list<'a, I>(names: I) -> String
where
    I: IntoIterator<Item = &'a String>,
{
    let quoted: Vec<String> = names.into_iter().map(|n| format!("'{}'", n)).collect();
    format!("[{}]", quoted.join(", "))
}

pub fn format_shape(shape: &[usize]) -> String {
    match shape {
        [single] => format!("({},)", single),
        _ => {
            let dims: Vec<String> = shape.iter().map(|d| d.to_string()).collect();
            format!("({})", dims.join(", "))
        }
    }
}
