//! Config Parser CLI
//!
//! Validates JSON configuration documents against a schema file and manages
//! the loader settings.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use json_configparser::{ParserConfig, SchemaDeclaration, SchemaRegistry, UnknownFieldPolicy};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "configparser")]
#[command(about = "Validate JSON configuration files against a typed schema")]
struct Cli {
    /// Settings file to load (optional)
    #[arg(short, long, global = true)]
    settings: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a document and print the normalized result
    Check {
        /// JSON document to validate
        document: PathBuf,

        /// Schema declaration file (JSON)
        #[arg(long)]
        schema: PathBuf,

        /// Warn about unknown keys instead of failing
        #[arg(long)]
        warn_unknown: bool,

        /// Print compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// View and manage loader settings
    #[command(subcommand)]
    Settings(SettingsCommand),
}

#[derive(Subcommand)]
enum SettingsCommand {
    /// Show current settings
    Show {
        /// Output as TOML (the default)
        #[arg(long, conflicts_with = "json")]
        toml: bool,

        /// Output as JSON instead of TOML
        #[arg(long)]
        json: bool,
    },

    /// Write a settings file with default values
    Init {
        /// Output path
        #[arg(short, long, default_value = "configparser.toml")]
        output: String,
    },
}

fn main() {
    let cli = Cli::parse();

    let settings = match ParserConfig::load_from(cli.settings.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.logging.filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli.command, settings) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(command: Commands, mut settings: ParserConfig) -> anyhow::Result<()> {
    match command {
        Commands::Check {
            document,
            schema,
            warn_unknown,
            compact,
        } => {
            if warn_unknown {
                settings.parsing.unknown_fields = UnknownFieldPolicy::Warn;
            }

            let declaration = SchemaDeclaration::from_json_file(&schema)?;
            let registry = SchemaRegistry::from_declaration(declaration, None)?.with_config(&settings);
            let args = registry.parse_file(&document)?;

            let output = if compact {
                serde_json::to_string(&args)?
            } else {
                serde_json::to_string_pretty(&args)?
            };
            println!("{}", output);
            Ok(())
        }

        Commands::Settings(SettingsCommand::Show { json, .. }) => {
            println!("{}", render_settings(&settings, json)?);
            Ok(())
        }

        Commands::Settings(SettingsCommand::Init { output }) => {
            if std::path::Path::new(&output).exists() {
                anyhow::bail!("{} already exists", output);
            }
            ParserConfig::default().save(&output)?;
            println!("Created {}", output);
            Ok(())
        }
    }
}

fn render_settings(settings: &ParserConfig, json: bool) -> anyhow::Result<String> {
    if json {
        Ok(serde_json::to_string_pretty(settings)?)
    } else {
        Ok(toml::to_string_pretty(settings)?)
    }
}
