use crate::domain::model::{Candidate, CandidateRecord, Category, CategoryId, CategoryRecord, Party, PartyId};
use crate::domain::ports::BallotApi;
use crate::utils::error::{BallotError, Result};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub struct PartyBallot {
    pub party: Party,
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryBallot {
    pub category: Category,
    pub category_id: CategoryId,
    pub name: String,
    pub parties: Vec<PartyBallot>,
}

/// 選票上每個類別可選的政黨與候選人
#[derive(Debug, Clone, PartialEq)]
pub struct BallotCatalog {
    categories: Vec<CategoryBallot>,
}

impl BallotCatalog {
    pub fn assemble(
        categories: &[CategoryRecord],
        parties: &[Party],
        candidates: &[CandidateRecord],
    ) -> Result<Self> {
        let parties_by_id: HashMap<PartyId, &Party> = parties.iter().map(|p| (p.id, p)).collect();
        let mut ballots = Vec::with_capacity(Category::ALL.len());

        for category in Category::ALL {
            let needle = category.backend_name().to_lowercase();
            let record = categories
                .iter()
                .find(|c| c.name.to_lowercase().contains(&needle))
                .ok_or_else(|| BallotError::ConfigError {
                    message: format!("Categoría {} no encontrada", category.backend_name()),
                })?;

            // 依候選人出現的順序分組，保持後端順序
            let mut groups: Vec<PartyBallot> = Vec::new();
            for candidate in candidates.iter().filter(|c| c.category_id == record.id) {
                let Some(party) = parties_by_id.get(&candidate.party_id) else {
                    tracing::warn!(
                        "Candidate {} references unknown party {}, skipped",
                        candidate.id,
                        candidate.party_id
                    );
                    continue;
                };

                let index = match groups.iter().position(|g| g.party.id == party.id) {
                    Some(index) => index,
                    None => {
                        groups.push(PartyBallot {
                            party: (*party).clone(),
                            candidates: Vec::new(),
                        });
                        groups.len() - 1
                    }
                };

                if let Some(numbered) = candidate.clone().into_candidate() {
                    groups[index].candidates.push(numbered);
                }
            }

            tracing::debug!(
                "{}: {} parties loaded for category id {}",
                category.key(),
                groups.len(),
                record.id
            );

            ballots.push(CategoryBallot {
                category,
                category_id: record.id,
                name: record.name.clone(),
                parties: groups,
            });
        }

        Ok(Self {
            categories: ballots,
        })
    }

    pub fn categories(&self) -> &[CategoryBallot] {
        &self.categories
    }

    pub fn category(&self, category: Category) -> Option<&CategoryBallot> {
        self.categories.iter().find(|c| c.category == category)
    }

    pub fn category_id(&self, category: Category) -> Option<CategoryId> {
        self.category(category).map(|c| c.category_id)
    }

    pub fn party(&self, category: Category, party_id: PartyId) -> Option<&Party> {
        self.category(category)?
            .parties
            .iter()
            .map(|p| &p.party)
            .find(|p| p.id == party_id)
    }

    pub fn candidate_by_number(
        &self,
        category: Category,
        party_id: PartyId,
        ballot_number: u32,
    ) -> Option<&Candidate> {
        self.category(category)?
            .parties
            .iter()
            .find(|p| p.party.id == party_id)?
            .candidates
            .iter()
            .find(|c| c.ballot_number == ballot_number)
    }
}

/// 從後端載入類別、政黨與候選人並組成選票
pub async fn load_catalog<A: BallotApi + ?Sized>(api: &A) -> Result<BallotCatalog> {
    let categories = api.categories().await?;
    let parties = api.parties().await?;
    let candidates = api.candidates().await?;

    tracing::info!(
        "📥 Loaded {} categories, {} parties, {} candidates",
        categories.len(),
        parties.len(),
        candidates.len()
    );

    BallotCatalog::assemble(&categories, &parties, &candidates)
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_assemble_groups_by_party() {
        let catalog = catalog();
        assert_eq!(catalog.categories().len(), 5);

        let deputy = catalog.category(Category::Deputy).unwrap();
        assert_eq!(deputy.category_id, 4);
        assert_eq!(deputy.parties.len(), 2);
        assert_eq!(deputy.parties[0].party.name, "Partido Aurora");
        assert_eq!(deputy.parties[0].candidates.len(), 3);
    }

    #[test]
    fn test_president_lists_parties_without_numbered_candidates() {
        let catalog = catalog();
        let president = catalog.category(Category::President).unwrap();
        assert_eq!(president.parties.len(), 2);
        assert!(president.parties.iter().all(|p| p.candidates.is_empty()));
    }

    #[test]
    fn test_lookups() {
        let catalog = catalog();
        assert_eq!(catalog.category_id(Category::Parliament), Some(5));
        assert_eq!(
            catalog.party(Category::Deputy, 20).map(|p| p.name.as_str()),
            Some("Frente Andino")
        );
        assert!(catalog.party(Category::Deputy, 99).is_none());

        let candidate = catalog.candidate_by_number(Category::Deputy, 20, 2).unwrap();
        assert_eq!(candidate.party_id, 20);
        assert_eq!(candidate.category_id, 4);
        assert!(catalog.candidate_by_number(Category::Deputy, 20, 9).is_none());
    }

    #[test]
    fn test_missing_category_is_config_error() {
        let mut categories = categories();
        categories.retain(|c| c.id != 3);
        let err = BallotCatalog::assemble(&categories, &parties(), &candidates()).unwrap_err();
        match err {
            BallotError::ConfigError { message } => assert!(message.contains("Senador Regional")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_party_is_skipped() {
        let mut candidates = candidates();
        candidates.push(CandidateRecord {
            id: 999,
            category_id: 4,
            party_id: 77,
            ballot_number: Some(1),
            name: "Huérfano".to_string(),
        });
        let catalog = BallotCatalog::assemble(&categories(), &parties(), &candidates).unwrap();
        assert_eq!(catalog.category(Category::Deputy).unwrap().parties.len(), 2);
    }
}
