//! CLI commands and handlers
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use crate::application::services::{impermanent_loss_report, price_impact_report, RiskService};
use crate::infrastructure::SnapshotStore;
use crate::shared::clock::SystemClock;
use crate::shared::config::{ConfigLoader, ScoringConfig, DEFAULT_CONFIG_PATH};
use crate::shared::errors::AppError;
use crate::shared::types::Address;
use crate::shared::utils::parse_scaled;

#[derive(Parser)]
#[command(name = "riskshield")]
#[command(version, about = "Liquidity pool risk scoring and pricing calculators")]
pub struct Cli {
    /// Path to the engine config file
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Path to the registry snapshot
    #[arg(long, global = true, default_value = "riskshield-state.json")]
    pub state: PathBuf,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Price impact of a swap against a constant-product pool
    Impact {
        /// Amount sold into the pool (decimal, e.g. 1.5)
        #[arg(long)]
        amount_in: String,

        /// Reserve of the token being sold
        #[arg(long)]
        reserve_in: String,

        /// Reserve of the token being bought
        #[arg(long)]
        reserve_out: String,
    },

    /// Estimated impermanent loss and risk tier for a price move
    Il {
        /// Price change in percent (e.g. 25 or -40)
        #[arg(long, allow_hyphen_values = true)]
        price_change: i64,
    },

    /// Score a pool and store its risk profile (owner only)
    Update {
        /// Identity submitting the update
        #[arg(long)]
        caller: String,

        /// Pool address
        #[arg(long)]
        pool: String,

        /// Volatility risk (0-100)
        #[arg(long)]
        volatility: u64,

        /// Liquidity risk (0-100)
        #[arg(long)]
        liquidity: u64,

        /// Contract risk (0-100)
        #[arg(long)]
        contract: u64,

        /// Observed price change in percent
        #[arg(long, allow_hyphen_values = true)]
        price_change: i64,
    },

    /// Show the stored risk profile of a pool
    Show {
        /// Pool address
        #[arg(long)]
        pool: String,
    },
}

pub struct CommandExecutor;

impl CommandExecutor {
    /// Execute the selected command
    pub async fn execute(cli: Cli) -> Result<(), AppError> {
        let json = cli.json;

        match cli.command {
            Commands::Impact { amount_in, reserve_in, reserve_out } => {
                let report = price_impact_report(
                    parse_scaled(&amount_in)?,
                    parse_scaled(&reserve_in)?,
                    parse_scaled(&reserve_out)?,
                )?;
                if json {
                    println!("{}", Self::encode(report.to_json())?);
                } else {
                    println!("📉 Price impact\n  {}", report.render());
                }
            }
            Commands::Il { price_change } => {
                let scorer = Self::load_scoring(&cli.config)?.build_scorer()?;
                let report = impermanent_loss_report(&scorer, price_change)?;
                if json {
                    println!("{}", Self::encode(report.to_json())?);
                } else {
                    println!("📊 Impermanent loss\n  {}", report.render());
                }
            }
            Commands::Update {
                caller,
                pool,
                volatility,
                liquidity,
                contract,
                price_change,
            } => {
                let caller: Address = caller.parse()?;
                let pool: Address = pool.parse()?;
                let mut service = Self::open_service(&cli.config, &cli.state)?;

                service
                    .update_pool(caller, pool, volatility, liquidity, contract, price_change)
                    .await?;

                let report = service.pool_report(&pool);
                if json {
                    println!("{}", Self::encode(report.to_json())?);
                } else {
                    println!("✅ Risk profile stored\n{}", report.render());
                }
            }
            Commands::Show { pool } => {
                let pool: Address = pool.parse()?;
                let service = Self::open_service(&cli.config, &cli.state)?;

                let report = service.pool_report(&pool);
                if json {
                    println!("{}", Self::encode(report.to_json())?);
                } else {
                    println!("🛡️  {}", report.render());
                }
            }
        }

        Ok(())
    }

    fn open_service(config: &Path, state: &Path) -> Result<RiskService, AppError> {
        info!("Loading config from {}", config.display());
        let config = ConfigLoader::load_from(config)?;
        RiskService::open(&config, SnapshotStore::new(state), Arc::new(SystemClock))
    }

    /// Scoring constants from the config file, or the defaults when there is
    /// no config file at all
    fn load_scoring(config: &Path) -> Result<ScoringConfig, AppError> {
        if !config.exists() {
            info!("No config at {}, using default scoring", config.display());
            return Ok(ScoringConfig::default());
        }
        Ok(ConfigLoader::load_from(config)?.scoring)
    }

    fn encode(json: Result<String, serde_json::Error>) -> Result<String, AppError> {
        json.map_err(|e| AppError::ParseError(format!("Failed to encode report: {}", e)))
    }
}
