use crate::domain::model::Category;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 需要向選民說明的情況
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Situation {
    TooManyPreferential,
    CandidatesWithoutParty,
}

impl Situation {
    pub fn from_key(key: &str) -> Option<Situation> {
        match key {
            "too-many-preferential" => Some(Situation::TooManyPreferential),
            "candidates-without-party" => Some(Situation::CandidatesWithoutParty),
            _ => None,
        }
    }
}

/// `(類別, 情況) → 訊息` 的對照表；可由設定檔覆寫
#[derive(Debug, Clone, Default)]
pub struct MessageTable {
    overrides: HashMap<(Category, Situation), String>,
}

impl MessageTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_override(
        mut self,
        category: Category,
        situation: Situation,
        message: impl Into<String>,
    ) -> Self {
        self.overrides.insert((category, situation), message.into());
        self
    }

    pub fn message(&self, category: Category, situation: Situation) -> String {
        if let Some(message) = self.overrides.get(&(category, situation)) {
            return message.clone();
        }
        default_message(category, situation)
    }
}

fn default_message(category: Category, situation: Situation) -> String {
    match situation {
        Situation::TooManyPreferential => format!(
            "Solo puede marcar hasta {} votos preferenciales en {}",
            category.max_preferential(),
            category.display_name()
        ),
        Situation::CandidatesWithoutParty => format!(
            "Marcó votos preferenciales sin marcar un partido en {}",
            category.display_name()
        ),
    }
}
