use crate::config::toml_config::VotingConfig;
use crate::core::catalog::BallotCatalog;
use crate::core::messages::{MessageTable, Situation};
use crate::core::selection::{CandidateToggle, SelectionStore};
use crate::core::validator;
use crate::domain::model::{
    BallotSubmission, Candidate, Category, CategoryVote, Classification, Party, Receipt,
    Selection, VoteTypeId,
};
use crate::domain::ports::{BallotApi, SessionStore};
use crate::utils::error::{BallotError, NetworkError, Result, ValidationError};
use crate::utils::validation::validate_dni;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionState {
    Idle,
    Submitting,
    Succeeded,
    Failed { session_invalidated: bool },
}

/// 重複投票時通知展示層清除憑證並導回驗證頁
#[derive(Debug, Clone, PartialEq)]
pub struct SessionInvalidated {
    pub national_id: String,
    pub message: String,
    pub prior_vote_at: Option<String>,
}

type InvalidationHook = Box<dyn Fn(&SessionInvalidated) + Send + Sync>;

/// 從傳輸層錯誤判斷是否為「此 DNI 已投票」
#[derive(Debug, Clone)]
pub struct DuplicateVoteDetector {
    codes: Vec<String>,
    statuses: Vec<u16>,
    markers: Vec<String>,
}

impl Default for DuplicateVoteDetector {
    fn default() -> Self {
        Self::from_config(&VotingConfig::default())
    }
}

impl DuplicateVoteDetector {
    pub fn from_config(config: &VotingConfig) -> Self {
        Self {
            codes: config.duplicate_vote_codes.clone(),
            statuses: config.duplicate_vote_statuses.clone(),
            markers: config
                .duplicate_vote_markers
                .iter()
                .map(|m| m.to_lowercase())
                .collect(),
        }
    }

    pub fn is_duplicate(&self, error: &NetworkError) -> bool {
        let NetworkError::Http {
            status,
            code,
            message,
            ..
        } = error
        else {
            return false;
        };

        if let Some(code) = code {
            if self.codes.iter().any(|c| c.eq_ignore_ascii_case(code)) {
                return true;
            }
        }
        if self.statuses.contains(status) {
            return true;
        }
        let message = message.to_lowercase();
        self.markers.iter().any(|m| message.contains(m.as_str()))
    }

    /// 錯誤內容中先前投票的時間（`priorVote.fecha` 或 `voto.fecha`）
    pub fn prior_vote_at(&self, error: &NetworkError) -> Option<String> {
        let details = error.details()?;
        ["priorVote", "voto"]
            .iter()
            .find_map(|key| details.get(key)?.get("fecha")?.as_str())
            .map(str::to_string)
    }
}

/// 只取 VALID 類別組成送出內容；BLANK 類別直接省略
pub fn build_submission(
    voter_id: &str,
    vote_type_id: VoteTypeId,
    store: &SelectionStore,
    catalog: &BallotCatalog,
) -> Result<BallotSubmission> {
    let mut per_category = Vec::new();

    for (category, selection) in store.iter() {
        if validator::classify(category, selection) != Classification::Valid {
            continue;
        }
        let Some(party_id) = selection.party_id() else {
            continue;
        };
        let category_id = catalog
            .category_id(category)
            .ok_or_else(|| BallotError::ConfigError {
                message: format!("No backend id for category {}", category.key()),
            })?;

        // 不接受優先票的類別（總統）只送政黨
        let preferential_candidate_numbers = if category.allows_preferential() {
            selection.preferential_numbers()
        } else {
            Vec::new()
        };

        per_category.push(CategoryVote {
            category_id,
            party_id,
            preferential_candidate_numbers,
        });
    }

    Ok(BallotSubmission {
        voter_id: voter_id.to_string(),
        vote_type_id,
        per_category,
    })
}

/// 協調驗證、組裝與送出，並保證每個工作階段最多成功送出一次
pub struct SubmissionCoordinator<A: BallotApi, S: SessionStore> {
    api: A,
    session: S,
    catalog: BallotCatalog,
    store: SelectionStore,
    messages: MessageTable,
    valid_vote_type_label: String,
    detector: DuplicateVoteDetector,
    state: SubmissionState,
    receipt: Option<Receipt>,
    hooks: Vec<InvalidationHook>,
}

impl<A: BallotApi, S: SessionStore> SubmissionCoordinator<A, S> {
    pub fn new(api: A, session: S, catalog: BallotCatalog) -> Self {
        let voting = VotingConfig::default();
        Self {
            api,
            session,
            catalog,
            store: SelectionStore::new(),
            messages: MessageTable::new(),
            valid_vote_type_label: voting.valid_vote_type_label.clone(),
            detector: DuplicateVoteDetector::from_config(&voting),
            state: SubmissionState::Idle,
            receipt: None,
            hooks: Vec::new(),
        }
    }

    pub fn with_messages(mut self, messages: MessageTable) -> Self {
        self.messages = messages;
        self
    }

    pub fn with_voting(mut self, voting: &VotingConfig) -> Self {
        self.valid_vote_type_label = voting.valid_vote_type_label.clone();
        self.detector = DuplicateVoteDetector::from_config(voting);
        self
    }

    pub fn on_session_invalidated<F>(&mut self, hook: F)
    where
        F: Fn(&SessionInvalidated) + Send + Sync + 'static,
    {
        self.hooks.push(Box::new(hook));
    }

    pub fn state(&self) -> SubmissionState {
        self.state
    }

    pub fn receipt(&self) -> Option<&Receipt> {
        self.receipt.as_ref()
    }

    pub fn catalog(&self) -> &BallotCatalog {
        &self.catalog
    }

    pub fn store(&self) -> &SelectionStore {
        &self.store
    }

    pub fn messages(&self) -> &MessageTable {
        &self.messages
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    pub fn classify(&self, category: Category) -> Classification {
        validator::classify(category, self.store.selection(category))
    }

    /// NULL 類別的說明訊息
    pub fn explain(&self, category: Category) -> Option<String> {
        validator::null_reason(category, self.store.selection(category))
            .map(|situation| self.messages.message(category, situation))
    }

    pub fn summary(&self) -> Vec<validator::CategorySummary> {
        validator::summary(&self.store)
    }

    pub fn toggle_party(&mut self, category: Category, party: &Party) -> Classification {
        self.store.toggle_party(category, party);
        self.classify(category)
    }

    pub fn toggle_candidate(
        &mut self,
        category: Category,
        candidate: &Candidate,
    ) -> std::result::Result<CandidateToggle, ValidationError> {
        self.store
            .toggle_candidate(category, candidate)
            .map_err(|rejected| ValidationError::TooManyPreferential {
                category: rejected.category,
                max: rejected.max,
                message: self
                    .messages
                    .message(rejected.category, Situation::TooManyPreferential),
            })
    }

    /// 還原先前保存的選擇，不經過切換規則
    pub fn restore_selection(&mut self, category: Category, selection: Selection) {
        self.store.restore(category, selection);
    }

    /// 清空選票；可重試的失敗之後回到 Idle
    pub fn reset(&mut self) {
        self.store.reset();
        if self.state == (SubmissionState::Failed { session_invalidated: false }) {
            self.state = SubmissionState::Idle;
        }
    }

    /// 為工作階段中已驗證的選民送出選票
    pub async fn submit_verified(&mut self) -> Result<Receipt> {
        let voter = self.session.load().await?.ok_or(BallotError::SessionMissing)?;
        if let Err(e) = validate_dni("session.national_id", &voter.national_id) {
            tracing::warn!("Stored session is invalid: {}", e);
            return Err(BallotError::SessionMissing);
        }
        self.submit(&voter.national_id).await
    }

    pub async fn submit(&mut self, voter_id: &str) -> Result<Receipt> {
        match self.state {
            SubmissionState::Succeeded => return Err(BallotError::AlreadySubmitted),
            SubmissionState::Failed {
                session_invalidated: true,
            } => return Err(BallotError::SessionClosed),
            _ => {}
        }

        if validator::has_unresolved_null(&self.store) {
            let categories = validator::null_categories(&self.store, &self.messages);
            tracing::warn!(
                "🚫 Submission blocked: {} null categories",
                categories.len()
            );
            return Err(ValidationError::UnresolvedNull { categories }.into());
        }

        self.state = SubmissionState::Submitting;
        tracing::info!("🗳️ Submitting ballot");

        let submission = match self.prepare(voter_id).await {
            Ok(submission) => submission,
            Err(e) => {
                tracing::error!("❌ Could not prepare ballot: {}", e);
                self.state = SubmissionState::Failed {
                    session_invalidated: false,
                };
                return Err(e);
            }
        };

        match self.api.submit_vote(&submission).await {
            Ok(receipt) => {
                tracing::info!(
                    "✅ Vote registered: id={} type={}",
                    receipt.vote_id,
                    receipt.vote_type_label
                );
                self.state = SubmissionState::Succeeded;
                self.receipt = Some(receipt.clone());
                self.store.reset();
                Ok(receipt)
            }
            Err(err) if self.detector.is_duplicate(&err) => {
                let event = SessionInvalidated {
                    national_id: voter_id.to_string(),
                    message: err.to_string(),
                    prior_vote_at: self.detector.prior_vote_at(&err),
                };
                tracing::warn!("⛔ Duplicate vote rejected for voter: {}", event.message);
                self.state = SubmissionState::Failed {
                    session_invalidated: true,
                };
                if let Err(e) = self.session.clear().await {
                    tracing::error!("❌ Could not clear session: {}", e);
                }
                for hook in &self.hooks {
                    hook(&event);
                }
                Err(BallotError::DuplicateVote {
                    message: event.message,
                    prior_vote_at: event.prior_vote_at,
                })
            }
            Err(err) => {
                tracing::error!("❌ Vote submission failed: {}", err);
                self.state = SubmissionState::Failed {
                    session_invalidated: false,
                };
                Err(err.into())
            }
        }
    }

    async fn prepare(&self, voter_id: &str) -> Result<BallotSubmission> {
        let vote_type_id = self.resolve_vote_type().await?;
        build_submission(voter_id, vote_type_id, &self.store, &self.catalog)
    }

    async fn resolve_vote_type(&self) -> Result<VoteTypeId> {
        let wanted = self.valid_vote_type_label.to_lowercase();
        let vote_types = self.api.vote_types().await?;
        vote_types
            .iter()
            .find(|t| t.name.trim().to_lowercase() == wanted)
            .map(|t| t.id)
            .ok_or_else(|| BallotError::ConfigError {
                message: format!(
                    "No se encontró el tipo de voto \"{}\"",
                    self.valid_vote_type_label
                ),
            })
    }
}
