use crate::domain::model::{Candidate, Category, Party, Selection};
use std::collections::BTreeMap;

/// `toggle_candidate` 的結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateToggle {
    Added { preference: usize },
    Removed,
    /// 候選人不屬於目前選擇的政黨，狀態不變
    Ignored,
}

/// 超過優先票上限時的拒絕訊號
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TooManyPreferential {
    pub category: Category,
    pub max: usize,
}

/// 每個類別目前選擇的唯一真實來源
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionStore {
    selections: BTreeMap<Category, Selection>,
}

impl Default for SelectionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionStore {
    pub fn new() -> Self {
        Self {
            selections: Category::ALL
                .into_iter()
                .map(|c| (c, Selection::default()))
                .collect(),
        }
    }

    pub fn selection(&self, category: Category) -> &Selection {
        // 所有類別都在建構時建立
        &self.selections[&category]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, &Selection)> {
        self.selections.iter().map(|(c, s)| (*c, s))
    }

    fn selection_mut(&mut self, category: Category) -> &mut Selection {
        self.selections.entry(category).or_default()
    }

    pub fn toggle_party(&mut self, category: Category, party: &Party) {
        let selection = self.selection_mut(category);

        if selection.party_id() == Some(party.id) {
            selection.selected_party = None;
            tracing::debug!("{}: party {} deselected", category.key(), party.id);
        } else {
            selection.selected_party = Some(party.clone());
            tracing::debug!("{}: party {} selected", category.key(), party.id);
        }
        // 換黨或取消都會清空優先票
        selection.selected_candidates.clear();
    }

    pub fn toggle_candidate(
        &mut self,
        category: Category,
        candidate: &Candidate,
    ) -> Result<CandidateToggle, TooManyPreferential> {
        let max = category.max_preferential();
        let selection = self.selection_mut(category);

        if selection.party_id() != Some(candidate.party_id) {
            tracing::warn!(
                "{}: candidate {} ignored, party {} is not selected",
                category.key(),
                candidate.id,
                candidate.party_id
            );
            return Ok(CandidateToggle::Ignored);
        }

        if let Some(index) = selection
            .selected_candidates
            .iter()
            .position(|c| c.id == candidate.id)
        {
            selection.selected_candidates.remove(index);
            return Ok(CandidateToggle::Removed);
        }

        if selection.selected_candidates.len() >= max {
            return Err(TooManyPreferential { category, max });
        }

        selection.selected_candidates.push(candidate.clone());
        Ok(CandidateToggle::Added {
            preference: selection.selected_candidates.len(),
        })
    }

    /// 直接替換某類別的選擇，不套用切換規則（用於還原狀態）
    pub fn restore(&mut self, category: Category, selection: Selection) {
        self.selections.insert(category, selection);
    }

    pub fn reset(&mut self) {
        for selection in self.selections.values_mut() {
            *selection = Selection::default();
        }
        tracing::debug!("All selections cleared");
    }

    pub fn is_empty(&self) -> bool {
        self.selections.values().all(Selection::is_empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn party(id: i64) -> Party {
        Party {
            id,
            name: format!("Partido {}", id),
            logo_url: None,
        }
    }

    fn candidate(id: i64, party_id: i64, number: u32) -> Candidate {
        Candidate {
            id,
            name: format!("Candidato {}", id),
            ballot_number: number,
            party_id,
            category_id: 4,
        }
    }

    #[test]
    fn test_toggle_party_twice_returns_to_empty() {
        let mut store = SelectionStore::new();
        let p = party(1);

        store.toggle_party(Category::Deputy, &p);
        store
            .toggle_candidate(Category::Deputy, &candidate(10, 1, 3))
            .unwrap();
        assert_eq!(store.selection(Category::Deputy).selected_candidates.len(), 1);

        store.toggle_party(Category::Deputy, &p);
        assert!(store.selection(Category::Deputy).is_empty());
    }

    #[test]
    fn test_switching_party_discards_candidates() {
        let mut store = SelectionStore::new();
        store.toggle_party(Category::Deputy, &party(1));
        store
            .toggle_candidate(Category::Deputy, &candidate(10, 1, 3))
            .unwrap();

        store.toggle_party(Category::Deputy, &party(2));
        let selection = store.selection(Category::Deputy);
        assert_eq!(selection.party_id(), Some(2));
        assert!(selection.selected_candidates.is_empty());
    }

    #[test]
    fn test_candidate_of_other_party_is_ignored() {
        let mut store = SelectionStore::new();
        assert_eq!(
            store.toggle_candidate(Category::Deputy, &candidate(10, 1, 3)),
            Ok(CandidateToggle::Ignored)
        );

        store.toggle_party(Category::Deputy, &party(2));
        assert_eq!(
            store.toggle_candidate(Category::Deputy, &candidate(10, 1, 3)),
            Ok(CandidateToggle::Ignored)
        );
        assert!(store.selection(Category::Deputy).selected_candidates.is_empty());
    }

    #[test]
    fn test_over_max_is_rejected_without_mutation() {
        let mut store = SelectionStore::new();
        store.toggle_party(Category::Deputy, &party(1));
        store
            .toggle_candidate(Category::Deputy, &candidate(10, 1, 3))
            .unwrap();
        store
            .toggle_candidate(Category::Deputy, &candidate(11, 1, 1))
            .unwrap();
        let before = store.selection(Category::Deputy).clone();

        let result = store.toggle_candidate(Category::Deputy, &candidate(12, 1, 7));
        assert_eq!(
            result,
            Err(TooManyPreferential {
                category: Category::Deputy,
                max: 2
            })
        );
        assert_eq!(store.selection(Category::Deputy), &before);
    }

    #[test]
    fn test_president_accepts_no_candidates() {
        let mut store = SelectionStore::new();
        store.toggle_party(Category::President, &party(1));
        let result = store.toggle_candidate(Category::President, &candidate(10, 1, 1));
        assert!(result.is_err());
    }

    #[test]
    fn test_insertion_order_is_preference_order() {
        let mut store = SelectionStore::new();
        store.toggle_party(Category::Parliament, &party(1));
        assert_eq!(
            store.toggle_candidate(Category::Parliament, &candidate(11, 1, 8)),
            Ok(CandidateToggle::Added { preference: 1 })
        );
        assert_eq!(
            store.toggle_candidate(Category::Parliament, &candidate(10, 1, 2)),
            Ok(CandidateToggle::Added { preference: 2 })
        );
        assert_eq!(
            store.selection(Category::Parliament).preferential_numbers(),
            vec![8, 2]
        );

        // 取消第一個後，第二個升為第一偏好
        assert_eq!(
            store.toggle_candidate(Category::Parliament, &candidate(11, 1, 8)),
            Ok(CandidateToggle::Removed)
        );
        assert_eq!(
            store.selection(Category::Parliament).preferential_numbers(),
            vec![2]
        );
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut store = SelectionStore::new();
        store.toggle_party(Category::President, &party(1));
        store.toggle_party(Category::Deputy, &party(2));
        assert!(!store.is_empty());

        store.reset();
        assert!(store.is_empty());
        assert_eq!(store.iter().count(), Category::ALL.len());
    }
}
