use crate::domain::model::{
    BallotSubmission, CandidateRecord, CategoryRecord, Party, Receipt, VerifiedVoter, VoteType,
    VoterStatus,
};
use crate::utils::error::{NetworkError, Result};
use async_trait::async_trait;

/// 後端服務介面；只回報傳輸層錯誤，語意判斷交給上層
#[async_trait]
pub trait BallotApi: Send + Sync {
    async fn categories(&self) -> std::result::Result<Vec<CategoryRecord>, NetworkError>;
    async fn parties(&self) -> std::result::Result<Vec<Party>, NetworkError>;
    async fn candidates(&self) -> std::result::Result<Vec<CandidateRecord>, NetworkError>;
    async fn vote_types(&self) -> std::result::Result<Vec<VoteType>, NetworkError>;
    async fn verify_voter(
        &self,
        national_id: &str,
    ) -> std::result::Result<VoterStatus, NetworkError>;
    async fn submit_vote(
        &self,
        submission: &BallotSubmission,
    ) -> std::result::Result<Receipt, NetworkError>;
    async fn check_connection(&self) -> bool;
}

/// 保存已驗證選民的工作階段儲存區
pub trait SessionStore: Send + Sync {
    fn load(&self) -> impl std::future::Future<Output = Result<Option<VerifiedVoter>>> + Send;
    fn save(
        &self,
        voter: &VerifiedVoter,
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    fn clear(&self) -> impl std::future::Future<Output = Result<()>> + Send;
}
