mod config;
mod services;

use canvas::doc::Document;
use canvas::ids::{IdSource, RandomIds};
use clap::{ArgAction, Parser, Subcommand};
use share::ExportFormat;

use crate::config::{AppConfig, BASE_URL_VAR, ConfigError, ID_SEED_VAR, MAX_LINK_LEN_VAR};
use crate::services::template::{self, TemplateError};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Template(#[from] TemplateError),
}

#[derive(Parser, Debug)]
#[command(name = "charcard", about = "Create, convert, and share character card templates")]
struct Cli {
    /// Editor URL that share links point at.
    #[arg(long, global = true, env = BASE_URL_VAR)]
    base_url: Option<String>,

    /// Refuse to build share links longer than this many characters.
    #[arg(long, global = true, env = MAX_LINK_LEN_VAR)]
    max_link_len: Option<String>,

    /// Seed for deterministic entity ids during replay.
    #[arg(long, global = true, env = ID_SEED_VAR)]
    seed: Option<String>,

    /// Log more to stderr (-v info, -vv debug).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print an empty template.
    New {
        #[arg(long)]
        compact: bool,
    },
    /// Read a template in either form and print it as plain JSON.
    Import {
        /// File path, `-` for stdin, or the template text itself.
        source: String,
    },
    /// Re-encode a template.
    Export {
        source: String,
        #[arg(long)]
        compact: bool,
    },
    /// Print a share link for a template.
    Link { source: String },
    /// Print the template carried by a share link.
    Open { url: String },
    /// Apply newline-delimited JSON actions to a template and print the result.
    Replay {
        source: String,
        /// File of actions, one JSON object per line, or `-` for stdin.
        #[arg(long)]
        actions: String,
        #[arg(long)]
        compact: bool,
    },
}

impl Cli {
    fn config(&self) -> Result<AppConfig, ConfigError> {
        AppConfig::from_lookup(|key| match key {
            BASE_URL_VAR => self.base_url.clone(),
            MAX_LINK_LEN_VAR => self.max_link_len.clone(),
            ID_SEED_VAR => self.seed.clone(),
            _ => None,
        })
    }
}

fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    let level = match cli.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        _ => tracing::Level::DEBUG,
    };
    tracing_subscriber::fmt().with_writer(std::io::stderr).with_max_level(level).init();

    let config = cli.config()?;
    match cli.command {
        Command::New { compact } => print_document(&Document::default(), export_format(compact)),
        Command::Import { source } => {
            let doc = template::load_document(&template::read_source(&source)?)?;
            print_document(&doc, ExportFormat::Plain)
        }
        Command::Export { source, compact } => {
            let doc = template::load_document(&template::read_source(&source)?)?;
            print_document(&doc, export_format(compact))
        }
        Command::Link { source } => {
            let doc = template::load_document(&template::read_source(&source)?)?;
            println!("{}", template::share_link_for(&doc, &config)?);
            Ok(())
        }
        Command::Open { url } => {
            let doc = template::open_link(&url)?;
            print_document(&doc, ExportFormat::Plain)
        }
        Command::Replay { source, actions, compact } => {
            let doc = template::load_document(&template::read_source(&source)?)?;
            let actions = template::read_source(&actions)?;
            let ids: Box<dyn IdSource> = match config.id_seed {
                Some(seed) => Box::new(RandomIds::seeded(seed)),
                None => Box::new(RandomIds::new()),
            };
            let report = template::replay(&doc, &actions, ids)?;
            if report.skipped > 0 {
                eprintln!("skipped {} action(s) of unknown type", report.skipped);
            }
            print_document(&report.document, export_format(compact))
        }
    }
}

fn export_format(compact: bool) -> ExportFormat {
    if compact { ExportFormat::Compact } else { ExportFormat::Plain }
}

fn print_document(doc: &Document, format: ExportFormat) -> Result<(), CliError> {
    println!("{}", template::render(doc, format)?);
    Ok(())
}
