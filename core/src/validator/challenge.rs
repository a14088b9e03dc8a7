use crate::error::{CoreError, CoreResult};
use serde::Deserialize;
use std::collections::BTreeSet;

pub const CHALLENGE_V1: &str = "wns_challenge_v1";

/// Static description of what a submission must contain.
#[derive(Debug, Clone, Deserialize)]
pub struct Challenge {
    pub challenge_version: String,
    pub classification_file: String,
    pub expected_keys: BTreeSet<String>,
    pub cases: u32,
    pub case_dir_prefix: String,
    pub patch_extension: String,
    pub allowed_labels: BTreeSet<u16>,
    /// (height, width).
    pub patch_shape: [usize; 2],
}

impl Challenge {
    pub fn case_dir_name(&self, case: u32) -> String {
        format!("{}{:02}", self.case_dir_prefix, case)
    }

    pub fn case_numbers(&self) -> impl Iterator<Item = u32> {
        1..=self.cases
    }
}

pub fn challenge_v1() -> CoreResult<Challenge> {
    let json = include_str!("challenge_v1.json");
    let challenge: Challenge = serde_json::from_str(json)?;
    if challenge.challenge_version != CHALLENGE_V1 {
        return Err(CoreError::InvalidInput(format!(
            "embedded challenge is not {}",
            CHALLENGE_V1
        )));
    }
    Ok(challenge)
}
