use crate::config::toml_config::BallotConfig;
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "ballot-engine")]
#[command(about = "Electronic ballot client: verify a voter, compose the ballot and submit it once")]
pub struct CliConfig {
    #[arg(long, help = "Path to a TOML configuration file")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Override backend.base_url from the configuration")]
    pub base_url: Option<String>,

    #[arg(long, default_value = ".ballot-session.json")]
    pub session_file: PathBuf,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Verify a DNI and open a voting session
    Verify { dni: String },
    /// Print parties and candidates for every category
    Show,
    /// Apply a ballot file and submit it for the verified voter
    Vote {
        #[arg(long)]
        ballot: PathBuf,
        #[arg(long, help = "Submit without asking for confirmation")]
        yes: bool,
    },
    /// Close the current session
    Logout,
}

impl CliConfig {
    /// 讀取設定檔，並套用命令列覆寫
    pub fn load_ballot_config(&self) -> Result<BallotConfig> {
        let mut config = match &self.config {
            Some(path) => BallotConfig::from_file(path)?,
            None => BallotConfig::default(),
        };
        if let Some(base_url) = &self.base_url {
            config.backend.base_url = base_url.clone();
        }
        config.validate()?;
        Ok(config)
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        if let Some(base_url) = &self.base_url {
            validation::validate_backend_url("base_url", base_url)?;
        }
        validation::validate_session_path("session_file", &self.session_file)?;
        if let Command::Verify { dni } = &self.command {
            validation::validate_dni("dni", dni)?;
        }
        Ok(())
    }
}
