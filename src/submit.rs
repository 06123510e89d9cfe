// Flag insertion and content submission.
//
// HackMyVM exposes no API for these yet, so nothing here talks to the
// network: inputs are validated and the prepared form is handed back to the
// caller. `check_flag` always reports that nothing was inserted.

use crate::catalog::{Catalog, CatalogSource};
use crate::error::{Error, Result};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Validate the machine (unless `no_verify`) and attempt to insert `flag`.
///
/// There is no insertion endpoint, so the result is always `false`.
pub fn check_flag<S: CatalogSource + ?Sized>(
    catalog: &mut Catalog<'_, S>,
    flag: &str,
    machine: &str,
    no_verify: bool,
) -> Result<bool> {
    if !no_verify {
        catalog.ensure_exists(machine)?;
    }
    debug!(machine, flag_len = flag.len(), "flag insertion is not available");
    Ok(false)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ChallengeCategory {
    Stego,
    Programming,
    Crypto,
    Web,
    Reversing,
    #[serde(rename = "OSINT")]
    Osint,
    Forensic,
    Misc,
}

impl ChallengeCategory {
    pub const ALL: [ChallengeCategory; 8] = [
        ChallengeCategory::Stego,
        ChallengeCategory::Programming,
        ChallengeCategory::Crypto,
        ChallengeCategory::Web,
        ChallengeCategory::Reversing,
        ChallengeCategory::Osint,
        ChallengeCategory::Forensic,
        ChallengeCategory::Misc,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ChallengeCategory::Stego => "Stego",
            ChallengeCategory::Programming => "Programming",
            ChallengeCategory::Crypto => "Crypto",
            ChallengeCategory::Web => "Web",
            ChallengeCategory::Reversing => "Reversing",
            ChallengeCategory::Osint => "OSINT",
            ChallengeCategory::Forensic => "Forensic",
            ChallengeCategory::Misc => "Misc",
        }
    }
}

impl fmt::Display for ChallengeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Exact, case-sensitive match against the platform's category names.
impl FromStr for ChallengeCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ChallengeCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| Error::CategoryNotFound(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MachineLevel {
    Easy,
    Medium,
    Hard,
}

impl MachineLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            MachineLevel::Easy => "Easy",
            MachineLevel::Medium => "Medium",
            MachineLevel::Hard => "Hard",
        }
    }
}

impl FromStr for MachineLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Easy" => Ok(MachineLevel::Easy),
            "Medium" => Ok(MachineLevel::Medium),
            "Hard" => Ok(MachineLevel::Hard),
            _ => Err(Error::LevelNotFound(s.to_string())),
        }
    }
}

/// Form fields for a new challenge, named the way the site's submit form
/// names them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChallengeSubmission {
    #[serde(rename = "chatype")]
    pub category: ChallengeCategory,
    #[serde(rename = "challengeflag")]
    pub flag: String,
    #[serde(rename = "chalevel")]
    pub description: String,
    #[serde(rename = "chasolution")]
    pub solution: String,
    #[serde(rename = "challengeurl")]
    pub url: Option<String>,
}

impl ChallengeSubmission {
    pub fn prepare(
        category: &str,
        flag: &str,
        description: &str,
        solution: &str,
        url: Option<&str>,
    ) -> Result<Self> {
        Ok(ChallengeSubmission {
            category: category.parse()?,
            flag: flag.to_string(),
            description: description.to_string(),
            solution: solution.to_string(),
            url: url.map(str::to_string),
        })
    }
}

/// Form fields for a new machine.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MachineSubmission {
    #[serde(rename = "vmname")]
    pub name: String,
    pub url: String,
    #[serde(rename = "flaguser")]
    pub user_flag: String,
    #[serde(rename = "flagroot")]
    pub root_flag: String,
    pub level: MachineLevel,
    pub notes: String,
    /// Staff-only.
    pub writeup: String,
}

impl MachineSubmission {
    #[allow(clippy::too_many_arguments)]
    pub fn prepare(
        name: &str,
        url: &str,
        user_flag: &str,
        root_flag: &str,
        level: &str,
        notes: &str,
        writeup: &str,
    ) -> Result<Self> {
        Ok(MachineSubmission {
            name: name.to_string(),
            url: url.to_string(),
            user_flag: user_flag.to_string(),
            root_flag: root_flag.to_string(),
            level: level.parse()?,
            notes: notes.to_string(),
            writeup: writeup.to_string(),
        })
    }
}
