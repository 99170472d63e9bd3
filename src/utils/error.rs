use crate::domain::model::Category;
use thiserror::Error;

/// 傳輸層錯誤，與選票語意無關
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NetworkError {
    #[error("Transport failure: {message}")]
    Transport { message: String },

    #[error("{message}")]
    Http {
        status: u16,
        code: Option<String>,
        message: String,
        details: Option<serde_json::Value>,
    },

    #[error("Malformed response: {message}")]
    Decode { message: String },
}

impl NetworkError {
    pub fn status(&self) -> Option<u16> {
        match self {
            NetworkError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn code(&self) -> Option<&str> {
        match self {
            NetworkError::Http { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    pub fn details(&self) -> Option<&serde_json::Value> {
        match self {
            NetworkError::Http { details, .. } => details.as_ref(),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for NetworkError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            NetworkError::Decode {
                message: err.to_string(),
            }
        } else {
            NetworkError::Transport {
                message: err.to_string(),
            }
        }
    }
}

/// 一個 NULL 類別及其說明
#[derive(Debug, Clone, PartialEq)]
pub struct NullCategory {
    pub category: Category,
    pub message: String,
}

/// 本地驗證錯誤，永遠不會送到網路上
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Ballot has unresolved null categories: {}", list_categories(.categories))]
    UnresolvedNull { categories: Vec<NullCategory> },

    #[error("{message}")]
    TooManyPreferential {
        category: Category,
        max: usize,
        message: String,
    },

    #[error("{message}")]
    CandidatesWithoutParty { category: Category, message: String },
}

fn list_categories(categories: &[NullCategory]) -> String {
    categories
        .iter()
        .map(|c| c.category.key())
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Error, Debug)]
pub enum BallotError {
    #[error("Ballot validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Backend request failed: {0}")]
    Network(#[from] NetworkError),

    #[error("Voter already voted: {message}")]
    DuplicateVote {
        message: String,
        prior_vote_at: Option<String>,
    },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid configuration value for '{field}' ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Ballot already submitted in this session")]
    AlreadySubmitted,

    #[error("No verified voter in session")]
    SessionMissing,

    #[error("Voting session was closed")]
    SessionClosed,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// 使用者可自行修正
    Low,
    /// 可重試
    Medium,
    High,
    /// 工作階段已結束或系統錯誤
    Critical,
}

impl BallotError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            BallotError::Validation(_) => ErrorSeverity::Low,
            BallotError::Network(_) => ErrorSeverity::Medium,
            BallotError::ConfigError { .. }
            | BallotError::InvalidConfigValueError { .. }
            | BallotError::MissingConfigError { .. }
            | BallotError::SerializationError(_)
            | BallotError::IoError(_) => ErrorSeverity::High,
            BallotError::DuplicateVote { .. }
            | BallotError::AlreadySubmitted
            | BallotError::SessionMissing
            | BallotError::SessionClosed => ErrorSeverity::Critical,
        }
    }

    /// 只有重複投票會強制結束工作階段
    pub fn is_session_terminal(&self) -> bool {
        matches!(self, BallotError::DuplicateVote { .. })
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            BallotError::Validation(ValidationError::UnresolvedNull { categories }) => {
                let details = categories
                    .iter()
                    .map(|c| c.message.as_str())
                    .collect::<Vec<_>>()
                    .join("; ");
                format!(
                    "Hay votos nulos. Por favor corrígelos antes de continuar. ({})",
                    details
                )
            }
            BallotError::Validation(e) => e.to_string(),
            BallotError::Network(e) => format!(
                "Error al registrar voto: {}. Por favor, intenta nuevamente.",
                e
            ),
            BallotError::DuplicateVote { message, .. } => format!(
                "{}. Este DNI ya registró su voto anteriormente.",
                message
            ),
            BallotError::SessionMissing => {
                "Debe verificar su DNI antes de acceder a la votación.".to_string()
            }
            BallotError::AlreadySubmitted => "Su voto ya fue registrado.".to_string(),
            BallotError::SessionClosed => {
                "La sesión de votación ha finalizado. Verifique su DNI nuevamente.".to_string()
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            BallotError::Validation(_) => "Fix the highlighted categories and submit again",
            BallotError::Network(_) => "Check that the backend is running and retry",
            BallotError::DuplicateVote { .. } | BallotError::SessionClosed => {
                "Verify a different DNI to start a new session"
            }
            BallotError::SessionMissing => "Run the `verify` command first",
            BallotError::AlreadySubmitted => "No further action is needed",
            _ => "Review the configuration file and command-line flags",
        }
    }
}

pub type Result<T> = std::result::Result<T, BallotError>;
