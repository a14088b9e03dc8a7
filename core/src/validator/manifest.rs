use crate::error::{CoreError, CoreResult};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

pub const MANIFEST_FILE_NAME: &str = "expected_patches.json";

/// Expected patch file names per case, keyed by case number.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpectedPatchManifest {
    cases: BTreeMap<u32, BTreeSet<String>>,
}

impl ExpectedPatchManifest {
    pub fn load(path: &Path) -> CoreResult<Self> {
        let s = fs::read_to_string(path)?;
        Self::from_json_str(&s)
    }

    /// Parses `{"1": ["a.png", ...], "2": [...]}`.
    pub fn from_json_str(s: &str) -> CoreResult<Self> {
        let raw: BTreeMap<String, Vec<String>> = serde_json::from_str(s)?;
        let mut cases = BTreeMap::new();
        for (key, patches) in raw {
            let case: u32 = key.trim().parse().map_err(|_| {
                CoreError::InvalidInput(format!("manifest key {:?} is not a case number", key))
            })?;
            cases
                .entry(case)
                .or_insert_with(BTreeSet::new)
                .extend(patches);
        }
        Ok(Self { cases })
    }

    pub fn expected_for(&self, case: u32) -> Option<&BTreeSet<String>> {
        self.cases.get(&case)
    }

    pub fn ensure_covers(&self, cases: impl IntoIterator<Item = u32>) -> CoreResult<()> {
        let missing: Vec<String> = cases
            .into_iter()
            .filter(|c| !self.cases.contains_key(c))
            .map(|c| c.to_string())
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(CoreError::InvalidInput(format!(
                "manifest has no entry for case(s): {}",
                missing.join(", ")
            )))
        }
    }
}

impl FromIterator<(u32, Vec<String>)> for ExpectedPatchManifest {
    fn from_iter<I: IntoIterator<Item = (u32, Vec<String>)>>(iter: I) -> Self {
        let mut cases: BTreeMap<u32, BTreeSet<String>> = BTreeMap::new();
        for (case, patches) in iter {
            cases.entry(case).or_default().extend(patches);
        }
        Self { cases }
    }
}
