use crate::core::coordinator::SubmissionCoordinator;
use crate::core::selection::CandidateToggle;
use crate::domain::model::{Category, PartyId};
use crate::domain::ports::{BallotApi, SessionStore};
use crate::utils::error::{BallotError, Result};
use crate::utils::validation::Validate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// CLI 使用的選票檔案，每個類別一筆
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BallotFile {
    #[serde(default)]
    pub selection: Vec<BallotEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BallotEntry {
    pub category: Category,
    pub party: PartyId,
    /// 候選人號碼，依偏好順序
    #[serde(default)]
    pub candidates: Vec<u32>,
}

impl BallotFile {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| BallotError::InvalidConfigValueError {
            field: "ballot".to_string(),
            value: String::new(),
            reason: format!("TOML parsing error: {}", e),
        })
    }

    /// 透過切換操作套用到選票上，與互動介面走相同的規則
    pub fn apply<A: BallotApi, S: SessionStore>(
        &self,
        coordinator: &mut SubmissionCoordinator<A, S>,
    ) -> Result<()> {
        for entry in &self.selection {
            let party = coordinator
                .catalog()
                .party(entry.category, entry.party)
                .cloned()
                .ok_or_else(|| BallotError::InvalidConfigValueError {
                    field: format!("selection.{}.party", entry.category.key()),
                    value: entry.party.to_string(),
                    reason: "Party is not on the ballot for this category".to_string(),
                })?;
            coordinator.toggle_party(entry.category, &party);

            for number in &entry.candidates {
                let candidate = coordinator
                    .catalog()
                    .candidate_by_number(entry.category, entry.party, *number)
                    .cloned()
                    .ok_or_else(|| BallotError::InvalidConfigValueError {
                        field: format!("selection.{}.candidates", entry.category.key()),
                        value: number.to_string(),
                        reason: format!("No candidate with this number in party {}", party.name),
                    })?;

                match coordinator.toggle_candidate(entry.category, &candidate)? {
                    CandidateToggle::Added { preference } => tracing::debug!(
                        "{}: candidate {} set as preference {}",
                        entry.category.key(),
                        number,
                        preference
                    ),
                    other => tracing::warn!(
                        "{}: candidate {} toggle had no effect ({:?})",
                        entry.category.key(),
                        number,
                        other
                    ),
                }
            }
        }
        Ok(())
    }
}

impl Validate for BallotFile {
    fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for entry in &self.selection {
            if !seen.insert(entry.category) {
                return Err(BallotError::InvalidConfigValueError {
                    field: "selection.category".to_string(),
                    value: entry.category.key().to_string(),
                    reason: "Category listed more than once".to_string(),
                });
            }

            let unique: HashSet<_> = entry.candidates.iter().collect();
            if unique.len() != entry.candidates.len() {
                return Err(BallotError::InvalidConfigValueError {
                    field: format!("selection.{}.candidates", entry.category.key()),
                    value: format!("{:?}", entry.candidates),
                    reason: "Candidate numbers must be unique".to_string(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ballot_file() {
        let ballot = BallotFile::from_toml_str(
            r#"
[[selection]]
category = "president"
party = 10

[[selection]]
category = "deputy"
party = 20
candidates = [3, 1]
"#,
        )
        .unwrap();
        assert!(ballot.validate().is_ok());
        assert_eq!(ballot.selection.len(), 2);
        assert_eq!(ballot.selection[0].category, Category::President);
        assert!(ballot.selection[0].candidates.is_empty());
        assert_eq!(ballot.selection[1].candidates, vec![3, 1]);
    }

    #[test]
    fn test_duplicates_are_rejected() {
        let ballot = BallotFile::from_toml_str(
            r#"
[[selection]]
category = "deputy"
party = 20

[[selection]]
category = "deputy"
party = 10
"#,
        )
        .unwrap();
        assert!(ballot.validate().is_err());

        let ballot = BallotFile::from_toml_str(
            "[[selection]]\ncategory = \"parliament\"\nparty = 10\ncandidates = [2, 2]\n",
        )
        .unwrap();
        assert!(ballot.validate().is_err());
    }

    #[test]
    fn test_unknown_category_fails_to_parse() {
        assert!(BallotFile::from_toml_str("[[selection]]\ncategory = \"mayor\"\nparty = 1\n").is_err());
    }
}
