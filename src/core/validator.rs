use crate::core::messages::{MessageTable, Situation};
use crate::core::selection::SelectionStore;
use crate::domain::model::{Category, Classification, Selection};
use crate::utils::error::NullCategory;

/// 依選舉規則分類單一類別的選擇。對所有狀態皆有定義，包含不應出現的狀態。
pub fn classify(category: Category, selection: &Selection) -> Classification {
    if selection.is_empty() {
        return Classification::Blank;
    }

    if !category.allows_preferential() {
        return if selection.selected_party.is_some() {
            Classification::Valid
        } else {
            Classification::Blank
        };
    }

    if null_reason(category, selection).is_some() {
        return Classification::Null;
    }

    if selection.selected_party.is_some() {
        Classification::Valid
    } else {
        Classification::Blank
    }
}

/// NULL 狀態的原因；非 NULL 時為 `None`
pub fn null_reason(category: Category, selection: &Selection) -> Option<Situation> {
    if !category.allows_preferential() {
        return None;
    }
    if !selection.selected_candidates.is_empty() && selection.selected_party.is_none() {
        return Some(Situation::CandidatesWithoutParty);
    }
    if selection.selected_candidates.len() > category.max_preferential() {
        return Some(Situation::TooManyPreferential);
    }
    None
}

pub fn has_unresolved_null(store: &SelectionStore) -> bool {
    store
        .iter()
        .any(|(category, selection)| classify(category, selection) == Classification::Null)
}

pub fn null_categories(store: &SelectionStore, messages: &MessageTable) -> Vec<NullCategory> {
    store
        .iter()
        .filter_map(|(category, selection)| {
            null_reason(category, selection).map(|situation| NullCategory {
                category,
                message: messages.message(category, situation),
            })
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategorySummary {
    pub category: Category,
    pub classification: Classification,
    pub party_name: Option<String>,
    pub preferential_numbers: Vec<u32>,
}

/// 確認投票前顯示的摘要
pub fn summary(store: &SelectionStore) -> Vec<CategorySummary> {
    store
        .iter()
        .map(|(category, selection)| CategorySummary {
            category,
            classification: classify(category, selection),
            party_name: selection.selected_party.as_ref().map(|p| p.name.clone()),
            preferential_numbers: selection.preferential_numbers(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{Candidate, Party};

    fn party(id: i64) -> Party {
        Party {
            id,
            name: format!("Partido {}", id),
            logo_url: None,
        }
    }

    fn candidates(party_id: i64, count: usize) -> Vec<Candidate> {
        (0..count)
            .map(|i| Candidate {
                id: 100 + i as i64,
                name: format!("Candidato {}", i),
                ballot_number: i as u32 + 1,
                party_id,
                category_id: 1,
            })
            .collect()
    }

    #[test]
    fn test_president_is_never_null() {
        let states = [
            Selection::default(),
            Selection::new(Some(party(1)), vec![]),
            Selection::new(None, candidates(1, 1)),
            Selection::new(Some(party(1)), candidates(1, 3)),
        ];
        for state in &states {
            assert_ne!(classify(Category::President, state), Classification::Null);
        }
        assert_eq!(
            classify(Category::President, &states[1]),
            Classification::Valid
        );
        assert_eq!(
            classify(Category::President, &states[2]),
            Classification::Blank
        );
    }

    #[test]
    fn test_party_with_zero_to_max_candidates_is_valid() {
        for category in Category::ALL.into_iter().filter(|c| c.allows_preferential()) {
            for k in 0..=category.max_preferential() {
                let selection = Selection::new(Some(party(1)), candidates(1, k));
                assert_eq!(classify(category, &selection), Classification::Valid);
            }
        }
    }

    #[test]
    fn test_empty_is_blank() {
        for category in Category::ALL {
            assert_eq!(
                classify(category, &Selection::default()),
                Classification::Blank
            );
        }
    }

    #[test]
    fn test_candidates_without_party_is_null() {
        let selection = Selection::new(None, candidates(1, 1));
        assert_eq!(classify(Category::Deputy, &selection), Classification::Null);
        assert_eq!(
            null_reason(Category::Deputy, &selection),
            Some(Situation::CandidatesWithoutParty)
        );
    }

    #[test]
    fn test_over_max_is_null() {
        let selection = Selection::new(Some(party(1)), candidates(1, 3));
        assert_eq!(
            classify(Category::SenatorNational, &selection),
            Classification::Null
        );
        assert_eq!(
            null_reason(Category::SenatorNational, &selection),
            Some(Situation::TooManyPreferential)
        );
    }

    #[test]
    fn test_has_unresolved_null_tracks_store() {
        let mut store = SelectionStore::new();
        assert!(!has_unresolved_null(&store));

        store.toggle_party(Category::President, &party(1));
        assert!(!has_unresolved_null(&store));

        store.restore(Category::Deputy, Selection::new(None, candidates(2, 1)));
        assert!(has_unresolved_null(&store));

        let nulls = null_categories(&store, &MessageTable::new());
        assert_eq!(nulls.len(), 1);
        assert_eq!(nulls[0].category, Category::Deputy);

        store.restore(Category::Deputy, Selection::default());
        assert!(!has_unresolved_null(&store));
    }

    #[test]
    fn test_summary_reports_every_category() {
        let mut store = SelectionStore::new();
        store.toggle_party(Category::President, &party(3));

        let rows = summary(&store);
        assert_eq!(rows.len(), Category::ALL.len());
        let president = rows
            .iter()
            .find(|r| r.category == Category::President)
            .unwrap();
        assert_eq!(president.classification, Classification::Valid);
        assert_eq!(president.party_name.as_deref(), Some("Partido 3"));
        assert!(rows
            .iter()
            .filter(|r| r.category != Category::President)
            .all(|r| r.classification == Classification::Blank));
    }
}
