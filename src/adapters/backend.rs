use crate::adapters::http::NetworkClient;
use crate::config::toml_config::{BallotConfig, EndpointConfig};
use crate::domain::model::{
    BallotSubmission, CandidateRecord, CategoryRecord, Party, Receipt, ReceiptEnvelope, VoteType,
    VoterStatus,
};
use crate::domain::ports::BallotApi;
use crate::utils::error::{NetworkError, Result};
use async_trait::async_trait;

/// 透過 HTTP 與後端溝通的 `BallotApi` 實作
#[derive(Debug, Clone)]
pub struct HttpBallotApi {
    client: NetworkClient,
    endpoints: EndpointConfig,
}

impl HttpBallotApi {
    pub fn new(client: NetworkClient, endpoints: EndpointConfig) -> Self {
        Self { client, endpoints }
    }

    pub fn from_config(config: &BallotConfig) -> Result<Self> {
        let mut client = NetworkClient::new(&config.backend.base_url, config.retry.policy(&config.voting))?;
        if let Some(timeout) = config.timeout() {
            client = client.with_timeout(timeout);
        }
        Ok(Self::new(client, config.backend.endpoints.clone()))
    }

    pub fn client(&self) -> &NetworkClient {
        &self.client
    }
}

#[async_trait]
impl BallotApi for HttpBallotApi {
    async fn categories(&self) -> std::result::Result<Vec<CategoryRecord>, NetworkError> {
        self.client.get_json(&self.endpoints.categories).await
    }

    async fn parties(&self) -> std::result::Result<Vec<Party>, NetworkError> {
        self.client.get_json(&self.endpoints.parties).await
    }

    async fn candidates(&self) -> std::result::Result<Vec<CandidateRecord>, NetworkError> {
        self.client.get_json(&self.endpoints.candidates).await
    }

    async fn vote_types(&self) -> std::result::Result<Vec<VoteType>, NetworkError> {
        self.client.get_json(&self.endpoints.vote_types).await
    }

    async fn verify_voter(
        &self,
        national_id: &str,
    ) -> std::result::Result<VoterStatus, NetworkError> {
        let path = self
            .endpoints
            .verify_voter
            .replace("{nationalId}", national_id);
        self.client.get_json(&path).await
    }

    async fn submit_vote(
        &self,
        submission: &BallotSubmission,
    ) -> std::result::Result<Receipt, NetworkError> {
        tracing::debug!(
            "Submitting ballot with {} category votes",
            submission.per_category.len()
        );
        let envelope: ReceiptEnvelope = self
            .client
            .post_json(&self.endpoints.votes, submission)
            .await?;
        Ok(envelope.vote)
    }

    async fn check_connection(&self) -> bool {
        self.client.ping(&self.endpoints.categories).await
    }
}
