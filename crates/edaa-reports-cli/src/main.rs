mod task;
mod unittest;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr};
use edaa_reports_core::{Config, Dialect};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "edaa-reports")]
#[command(about = "Read, merge, restructure and convert unit test reports", long_about = None)]
struct Cli {
    /// More log output on stderr (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read, merge, restructure and write unit test summaries
    Unittest(unittest::UnittestArgs),
    /// List supported report dialects
    Dialects,
    /// Print the default configuration
    Config,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Unittest(args) => {
            let config = Config::load().wrap_err("loading configuration")?;
            unittest::run(args, config)?;
        }
        Commands::Dialects => {
            for dialect in Dialect::ALL {
                println!("{:<14} {}", dialect.identifier(), dialect.display_name());
            }
        }
        Commands::Config => {
            print!("{}", Config::default_config_string());
        }
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
