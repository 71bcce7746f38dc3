pub mod toml_config;

#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::{validate_non_empty_string, Validate};
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use toml_config::{LeagueFile, OutputFormat};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "league-handicap")]
#[command(about = "Replay a league season through the handicap and match scoring engine")]
pub struct CliConfig {
    #[arg(long, help = "Path to the league TOML file")]
    pub league: String,

    #[arg(long, help = "Write the report to this file instead of stdout")]
    pub output: Option<String>,

    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub log_json: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// 命令列參數優先，其次是聯盟檔的 [output]
    pub fn resolved_format(&self, file: &LeagueFile) -> OutputFormat {
        self.format
            .or(file.output().format)
            .unwrap_or_default()
    }

    pub fn resolved_output_path(&self, file: &LeagueFile) -> Option<String> {
        self.output.clone().or(file.output().path)
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("league", &self.league)?;
        if let Some(path) = &self.output {
            validate_non_empty_string("output", path)?;
        }
        Ok(())
    }
}
