use anyhow::Context;
use clap::Parser;
use league_handicap::app::{replay_season, report};
use league_handicap::config::toml_config::OutputFormat;
use league_handicap::utils::error::{EngineError, ErrorSeverity};
use league_handicap::utils::{logger, validation::Validate};
use league_handicap::{CliConfig, LeagueFile};
use std::fs::File;
use std::io::Write;

fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    // 初始化日誌
    if config.log_json {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting league-handicap CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Err(e) = config.validate() {
        fail(&e);
    }

    let league = match LeagueFile::from_file(&config.league) {
        Ok(league) => league,
        Err(e) => fail(&e),
    };

    let season = match replay_season(&league) {
        Ok(season) => season,
        Err(e) => fail(&e),
    };

    let format = config.resolved_format(&league);
    let writer: Box<dyn Write> = match config.resolved_output_path(&league) {
        Some(path) => Box::new(
            File::create(&path).with_context(|| format!("creating report file {}", path))?,
        ),
        None => Box::new(std::io::stdout().lock()),
    };

    match format {
        OutputFormat::Json => report::write_json(&season, writer)?,
        OutputFormat::Csv => report::write_csv(&season, writer)?,
    }

    tracing::info!(
        "✅ Replayed {} batch(es) for {} season {}",
        season.batches.len(),
        season.league,
        season.season
    );
    Ok(())
}

fn fail(e: &EngineError) -> ! {
    tracing::error!(
        "❌ {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    let exit_code = match e.severity() {
        ErrorSeverity::Low | ErrorSeverity::High => 1,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}
