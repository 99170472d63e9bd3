pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{CliConfig, Command};

pub use adapters::{backend::HttpBallotApi, http::NetworkClient, retry::RetryPolicy};
pub use adapters::session::{FileSession, InMemorySession};
pub use config::{BallotConfig, BallotFile};
pub use core::catalog::{load_catalog, BallotCatalog};
pub use core::coordinator::{SessionInvalidated, SubmissionCoordinator, SubmissionState};
pub use core::selection::SelectionStore;
pub use core::verification::{verify_voter, VerificationOutcome};
pub use domain::model::{Category, Classification, Receipt};
pub use utils::error::{BallotError, NetworkError, Result, ValidationError};
