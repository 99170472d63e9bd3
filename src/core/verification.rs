use crate::domain::model::{VerifiedVoter, Voter};
use crate::domain::ports::{BallotApi, SessionStore};
use crate::utils::error::Result;

#[derive(Debug, Clone, PartialEq)]
pub enum VerificationOutcome {
    NotRegistered,
    AlreadyVoted {
        voter: Option<Voter>,
        voted_at: Option<String>,
    },
    Eligible(VerifiedVoter),
}

/// 查詢 DNI 的投票狀態；可投票時寫入工作階段
pub async fn verify_voter<A, S>(api: &A, session: &S, national_id: &str) -> Result<VerificationOutcome>
where
    A: BallotApi + ?Sized,
    S: SessionStore,
{
    let status = api.verify_voter(national_id).await?;

    if !status.exists {
        tracing::info!("DNI not registered");
        return Ok(VerificationOutcome::NotRegistered);
    }

    if status.has_voted {
        tracing::info!("DNI already voted");
        return Ok(VerificationOutcome::AlreadyVoted {
            voter: status.voter,
            voted_at: status.prior_vote.map(|v| v.fecha),
        });
    }

    let verified = VerifiedVoter {
        national_id: national_id.to_string(),
        voter: status.voter,
    };
    session.save(&verified).await?;
    tracing::info!("✅ DNI verified, session opened");
    Ok(VerificationOutcome::Eligible(verified))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::session::InMemorySession;
    use crate::domain::model::{
        BallotSubmission, CandidateRecord, CategoryRecord, Party, PriorVote, Receipt, VoteType,
        VoterStatus,
    };
    use crate::utils::error::{BallotError, NetworkError};
    use async_trait::async_trait;

    struct StubApi {
        status: std::result::Result<VoterStatus, NetworkError>,
    }

    #[async_trait]
    impl BallotApi for StubApi {
        async fn categories(&self) -> std::result::Result<Vec<CategoryRecord>, NetworkError> {
            Ok(Vec::new())
        }

        async fn parties(&self) -> std::result::Result<Vec<Party>, NetworkError> {
            Ok(Vec::new())
        }

        async fn candidates(&self) -> std::result::Result<Vec<CandidateRecord>, NetworkError> {
            Ok(Vec::new())
        }

        async fn vote_types(&self) -> std::result::Result<Vec<VoteType>, NetworkError> {
            Ok(Vec::new())
        }

        async fn verify_voter(
            &self,
            _national_id: &str,
        ) -> std::result::Result<VoterStatus, NetworkError> {
            self.status.clone()
        }

        async fn submit_vote(
            &self,
            _submission: &BallotSubmission,
        ) -> std::result::Result<Receipt, NetworkError> {
            Err(NetworkError::Transport {
                message: "not used".to_string(),
            })
        }

        async fn check_connection(&self) -> bool {
            true
        }
    }

    fn status(exists: bool, has_voted: bool, prior_vote: Option<PriorVote>) -> VoterStatus {
        VoterStatus {
            exists,
            has_voted,
            voter: None,
            prior_vote,
            message: None,
        }
    }

    #[tokio::test]
    async fn test_eligible_voter_opens_session() {
        let api = StubApi {
            status: Ok(status(true, false, None)),
        };
        let session = InMemorySession::new();

        let outcome = verify_voter(&api, &session, "45871236").await.unwrap();

        let expected = VerifiedVoter {
            national_id: "45871236".to_string(),
            voter: None,
        };
        assert_eq!(outcome, VerificationOutcome::Eligible(expected.clone()));
        assert_eq!(session.load().await.unwrap(), Some(expected));
    }

    #[tokio::test]
    async fn test_unknown_and_voted_dni_leave_session_empty() {
        let session = InMemorySession::new();

        let unknown = StubApi {
            status: Ok(status(false, false, None)),
        };
        assert_eq!(
            verify_voter(&unknown, &session, "12345678").await.unwrap(),
            VerificationOutcome::NotRegistered
        );

        let voted = StubApi {
            status: Ok(status(
                true,
                true,
                Some(PriorVote {
                    fecha: "2026-04-12T08:00:00".to_string(),
                    vote_id: Some(3),
                }),
            )),
        };
        assert_eq!(
            verify_voter(&voted, &session, "12345678").await.unwrap(),
            VerificationOutcome::AlreadyVoted {
                voter: None,
                voted_at: Some("2026-04-12T08:00:00".to_string()),
            }
        );
        assert_eq!(session.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_backend_failure_is_propagated() {
        let api = StubApi {
            status: Err(NetworkError::Transport {
                message: "connection refused".to_string(),
            }),
        };
        let session = InMemorySession::new();

        let err = verify_voter(&api, &session, "45871236").await.unwrap_err();
        assert!(matches!(err, BallotError::Network(_)));
    }
}
