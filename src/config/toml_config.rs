use crate::adapters::retry::RetryPolicy;
use crate::core::coordinator::DuplicateVoteDetector;
use crate::core::messages::{MessageTable, Situation};
use crate::domain::model::Category;
use crate::utils::error::{BallotError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BallotConfig {
    pub backend: BackendConfig,
    pub retry: RetryConfig,
    pub voting: VotingConfig,
    /// 以類別鍵值（例如 `deputy`）覆寫錯誤訊息
    pub messages: HashMap<String, HashMap<String, String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub base_url: String,
    pub timeout_seconds: Option<u64>,
    pub endpoints: EndpointConfig,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000/api".to_string(),
            timeout_seconds: None,
            endpoints: EndpointConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    pub categories: String,
    pub parties: String,
    pub candidates: String,
    pub vote_types: String,
    /// `{nationalId}` 會被替換成 DNI
    pub verify_voter: String,
    pub votes: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            categories: "categories".to_string(),
            parties: "parties".to_string(),
            candidates: "candidates".to_string(),
            vote_types: "vote-types".to_string(),
            verify_voter: "voters/verify/{nationalId}".to_string(),
            votes: "votes".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    /// 這些狀態碼代表後端已做出決定，重送沒有意義
    pub non_retryable_statuses: Vec<u16>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 1000,
            non_retryable_statuses: vec![409],
        }
    }
}

impl RetryConfig {
    /// 重複投票的任何訊號（狀態碼、錯誤碼、訊息）都不重送
    pub fn policy(&self, voting: &VotingConfig) -> RetryPolicy {
        let final_statuses = self.non_retryable_statuses.clone();
        let detector = DuplicateVoteDetector::from_config(voting);
        RetryPolicy::exponential(self.max_attempts, Duration::from_millis(self.base_delay_ms))
            .with_retry_if(move |err| {
                if detector.is_duplicate(err) {
                    return false;
                }
                err.status()
                    .map_or(true, |status| !final_statuses.contains(&status))
            })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VotingConfig {
    pub valid_vote_type_label: String,
    pub duplicate_vote_codes: Vec<String>,
    pub duplicate_vote_statuses: Vec<u16>,
    pub duplicate_vote_markers: Vec<String>,
}

impl Default for VotingConfig {
    fn default() -> Self {
        Self {
            valid_vote_type_label: "Válido".to_string(),
            duplicate_vote_codes: vec!["DUPLICATE_VOTE".to_string(), "DNI_YA_VOTO".to_string()],
            duplicate_vote_statuses: vec![409],
            duplicate_vote_markers: vec![
                "ya ha votado".to_string(),
                "ya votó".to_string(),
                "already voted".to_string(),
            ],
        }
    }
}

impl BallotConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(BallotError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| BallotError::InvalidConfigValueError {
            field: "toml_parsing".to_string(),
            value: String::new(),
            reason: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${BALLOT_API_URL})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| BallotError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.backend.timeout_seconds.map(Duration::from_secs)
    }

    pub fn message_table(&self) -> Result<MessageTable> {
        let mut table = MessageTable::new();
        for (key, situations) in &self.messages {
            let category =
                Category::from_key(key).ok_or_else(|| BallotError::InvalidConfigValueError {
                    field: "messages".to_string(),
                    value: key.clone(),
                    reason: "Unknown category key".to_string(),
                })?;
            for (situation_key, message) in situations {
                let situation = Situation::from_key(situation_key).ok_or_else(|| {
                    BallotError::InvalidConfigValueError {
                        field: format!("messages.{}", key),
                        value: situation_key.clone(),
                        reason: "Unknown situation, expected too-many-preferential or candidates-without-party".to_string(),
                    }
                })?;
                table = table.with_override(category, situation, message.clone());
            }
        }
        Ok(table)
    }
}

impl Validate for BallotConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_backend_url("backend.base_url", &self.backend.base_url)?;
        validation::validate_range("retry.max_attempts", self.retry.max_attempts, 1, 10)?;
        validation::validate_label(
            "voting.valid_vote_type_label",
            &self.voting.valid_vote_type_label,
        )?;

        if !self.backend.endpoints.verify_voter.contains("{nationalId}") {
            return Err(BallotError::InvalidConfigValueError {
                field: "backend.endpoints.verify_voter".to_string(),
                value: self.backend.endpoints.verify_voter.clone(),
                reason: "Endpoint must contain the {nationalId} placeholder".to_string(),
            });
        }

        if let Some(timeout) = self.backend.timeout_seconds {
            validation::validate_range("backend.timeout_seconds", timeout, 1, 300)?;
        }

        self.message_table().map(|_| ())
    }
}
