//! pkmc command-line entry point.
//!
//! # Responsibility
//! - Build `CoreConfig` from the environment plus command-line overrides.
//! - Run one catalog use-case and print its result as JSON.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use log::error;
use pkmc_core::{init_logging_from_config, App, CoreConfig, Price};

#[derive(Parser)]
#[command(name = "pkmc")]
#[command(about = "Trading-card catalog inventory", long_about = None)]
struct Cli {
    /// SQLite database file (overrides DB_PATH)
    #[arg(long, global = true)]
    db_path: Option<PathBuf>,

    /// Directory for rolling log files (overrides PKMC_LOG_DIR)
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    /// trace|debug|info|warn|error (overrides PKMC_LOG_LEVEL)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an item from extension code, language code and item type name
    CreateItem {
        /// Extension code (e.g. DRI)
        extension: String,
        /// Language code (e.g. fr)
        language: String,
        /// Item type name (e.g. Display)
        item_type: String,
        /// Unit price with at most two decimals
        #[arg(long)]
        price: Option<f64>,
    },
    /// Apply migrations and reference data, then report the seeded rows
    Init,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            error!("event=cli_exit module=cli status=error error={}", message);
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), String> {
    let config = load_config(&cli)?;
    init_logging_from_config(&config).map_err(|err| err.to_string())?;
    let app = App::initialize(config).map_err(|err| err.to_string())?;

    match cli.command {
        Commands::CreateItem {
            extension,
            language,
            item_type,
            price,
        } => {
            let price = price.map(parse_price).transpose()?;
            let ctx = app.operation_context();
            let item = app
                .item_service()
                .create_item(&ctx, &extension, &language, &item_type, price)
                .map_err(|err| err.to_string())?;
            let json = serde_json::to_string_pretty(&item).map_err(|err| err.to_string())?;
            println!("{json}");
        }
        Commands::Init => {
            let report = app.seed_report();
            println!(
                "database={} seeded_rows={} (item_types={} blocks={} extensions={} languages={})",
                app.config().db_path.display(),
                report.total(),
                report.item_types,
                report.blocks,
                report.extensions,
                report.languages
            );
        }
    }
    Ok(())
}

fn load_config(cli: &Cli) -> Result<CoreConfig, String> {
    let mut config = CoreConfig::from_env().map_err(|err| err.to_string())?;
    if let Some(path) = &cli.db_path {
        config.db_path = path.clone();
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.trim().to_ascii_lowercase();
    }
    if let Some(dir) = &cli.log_dir {
        config.log_dir = Some(dir.clone());
    }
    // Log directories must be absolute.
    if let Some(dir) = config.log_dir.take() {
        let dir = if dir.is_relative() {
            std::env::current_dir()
                .map_err(|err| format!("cannot resolve log directory: {err}"))?
                .join(dir)
        } else {
            dir
        };
        config.log_dir = Some(dir);
    }
    Ok(config)
}

fn parse_price(value: f64) -> Result<Price, String> {
    match Price::from_f64(value) {
        Some(price) if price.cents() >= 0 => Ok(price),
        _ => Err(format!("invalid price `{value}`")),
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_price, Cli, Commands};
    use clap::{CommandFactory, Parser};

    #[test]
    fn create_item_arguments_parse() {
        let cli = Cli::try_parse_from([
            "pkmc",
            "--db-path",
            "/tmp/catalog.db",
            "create-item",
            "DRI",
            "fr",
            "Display",
            "--price",
            "129.99",
        ])
        .expect("arguments should parse");

        assert_eq!(
            cli.db_path.as_deref(),
            Some(std::path::Path::new("/tmp/catalog.db"))
        );
        match cli.command {
            Commands::CreateItem {
                extension,
                language,
                item_type,
                price,
            } => {
                assert_eq!(extension, "DRI");
                assert_eq!(language, "fr");
                assert_eq!(item_type, "Display");
                assert_eq!(price, Some(129.99));
            }
            Commands::Init => panic!("expected create-item"),
        }
    }

    #[test]
    fn negative_price_is_rejected() {
        assert!(parse_price(-1.0).is_err());
        assert_eq!(parse_price(12.5).expect("valid price").cents(), 1250);
    }

    #[test]
    fn init_help_describes_the_seed_report() {
        let command = Cli::command();
        let init = command.find_subcommand("init").expect("init subcommand");
        let about = init
            .get_about()
            .map(|about| about.to_string())
            .unwrap_or_default();
        assert!(about.contains("seeded rows"));
    }
}
