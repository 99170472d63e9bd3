use ballot_engine::core::validator;
use ballot_engine::domain::model::{parse_backend_timestamp, Classification};
use ballot_engine::domain::ports::{BallotApi, SessionStore};
use ballot_engine::utils::error::ErrorSeverity;
use ballot_engine::utils::{logger, validation::Validate};
use ballot_engine::{
    load_catalog, verify_voter, BallotError, BallotFile, CliConfig, Command, FileSession,
    HttpBallotApi, Result, SubmissionCoordinator, VerificationOutcome,
};
use ballot_engine::config::LogFormat;
use clap::Parser;
use std::io::Write;

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    match cli.log_format {
        LogFormat::Text => logger::init_cli_logger(cli.verbose),
        LogFormat::Json => logger::init_json_logger(cli.verbose),
    }
    tracing::info!("Starting ballot-engine CLI");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    if let Err(e) = cli.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    if let Err(e) = run(&cli).await {
        tracing::error!(
            "❌ Command failed: {} (Severity: {:?})",
            e,
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        let exit_code = match e.severity() {
            ErrorSeverity::Low => 1,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        std::process::exit(exit_code);
    }
}

async fn run(cli: &CliConfig) -> Result<()> {
    let config = cli.load_ballot_config()?;
    let api = HttpBallotApi::from_config(&config)?;
    let session = FileSession::new(&cli.session_file);

    match &cli.command {
        Command::Verify { dni } => {
            match verify_voter(&api, &session, dni).await? {
                VerificationOutcome::NotRegistered => {
                    println!("❌ DNI no registrado en la base de datos de electores");
                }
                VerificationOutcome::AlreadyVoted { voter, voted_at } => {
                    let when = voted_at
                        .as_deref()
                        .map(format_timestamp)
                        .unwrap_or_else(|| "No disponible".to_string());
                    let name = voter.map(|v| v.full_name()).unwrap_or_default();
                    println!(
                        "⚠️ El DNI {} {} ya registró su voto el {}. No puede votar más de una vez.",
                        dni, name, when
                    );
                }
                VerificationOutcome::Eligible(verified) => {
                    println!("✅ DNI verificado correctamente");
                    if let Some(voter) = &verified.voter {
                        println!("   Nombre: {}", voter.full_name());
                        if let Some(district) = &voter.district {
                            println!("   Distrito: {}", district);
                        }
                        if let Some(region) = &voter.region {
                            println!("   Región: {}", region);
                        }
                    }
                }
            }
        }
        Command::Show => {
            ensure_connection(&api, &config.backend.base_url).await?;
            let catalog = load_catalog(&api).await?;
            for category in catalog.categories() {
                println!("== {} ({})", category.category, category.name);
                for party in &category.parties {
                    println!("  [{}] {}", party.party.id, party.party.name);
                    for candidate in &party.candidates {
                        println!("      {:>3}  {}", candidate.ballot_number, candidate.name);
                    }
                }
            }
        }
        Command::Vote { ballot, yes } => {
            let ballot = BallotFile::from_file(ballot)?;
            ballot.validate()?;

            if session.load().await?.is_none() {
                return Err(BallotError::SessionMissing);
            }

            ensure_connection(&api, &config.backend.base_url).await?;
            let catalog = load_catalog(&api).await?;
            let mut coordinator = SubmissionCoordinator::new(api, session, catalog)
                .with_messages(config.message_table()?)
                .with_voting(&config.voting);
            coordinator.on_session_invalidated(|event| {
                tracing::warn!(
                    "Session closed for DNI {} (prior vote: {:?})",
                    event.national_id,
                    event.prior_vote_at
                );
            });

            ballot.apply(&mut coordinator)?;
            print_summary(&coordinator.summary());
            for row in coordinator.summary() {
                if row.classification == Classification::Null {
                    if let Some(reason) = coordinator.explain(row.category) {
                        println!("⚠️ {}", reason);
                    }
                }
            }

            if !*yes && !confirm()? {
                println!("Voto no enviado");
                return Ok(());
            }

            let receipt = coordinator.submit_verified().await?;
            println!("✅ ¡Voto Registrado Exitosamente!");
            println!("   ID del voto: {}", receipt.vote_id);
            println!("   Fecha: {}", format_timestamp(&receipt.timestamp));
            println!("   Tipo de voto: {}", receipt.vote_type_label);

            coordinator.session().clear().await?;
        }
        Command::Logout => {
            session.clear().await?;
            println!("Sesión cerrada");
        }
    }

    Ok(())
}

async fn ensure_connection(api: &HttpBallotApi, base_url: &str) -> Result<()> {
    if !api.check_connection().await {
        return Err(BallotError::ConfigError {
            message: format!(
                "No se puede conectar con el servidor. Verifica que esté ejecutándose en {}",
                base_url
            ),
        });
    }
    Ok(())
}

fn print_summary(rows: &[validator::CategorySummary]) {
    println!("¿Confirmas tu voto con las siguientes selecciones?");
    for row in rows {
        let detail = match (&row.party_name, row.preferential_numbers.is_empty()) {
            (Some(party), true) => party.clone(),
            (Some(party), false) => format!(
                "{} (preferenciales: {})",
                party,
                row.preferential_numbers
                    .iter()
                    .map(|n| n.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            (None, _) => "-".to_string(),
        };
        println!(
            "  {:<30} {:<10} {}",
            row.category.display_name(),
            row.classification.label(),
            detail
        );
    }
}

fn confirm() -> Result<bool> {
    print!("Confirmar [s/N]: ");
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "s" | "si" | "sí" | "y" | "yes"))
}

fn format_timestamp(raw: &str) -> String {
    parse_backend_timestamp(raw)
        .map(|dt| dt.format("%d/%m/%Y %H:%M:%S").to_string())
        .unwrap_or_else(|| raw.to_string())
}
