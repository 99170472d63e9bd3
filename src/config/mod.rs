pub mod ballot_file;
#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

pub use ballot_file::BallotFile;
#[cfg(feature = "cli")]
pub use cli::{CliConfig, Command, LogFormat};
pub use toml_config::BallotConfig;
